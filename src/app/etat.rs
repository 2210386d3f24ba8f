//! src/app/etat.rs
//!
//! État de session (sans vue, sans évaluation).
//!
//! Rôle : contenir l’état de la calculatrice (entrée, résultat, erreur, réglages, démarche)
//! et offrir des opérations simples (C/CLR/AC) sans logique d’affichage.
//!
//! Contrats :
//! - Aucune évaluation ici (pas d’appel au noyau).
//! - Actions déterministes, sans effet de bord caché.
//! - Échelle toujours bornée (Params::set_echelle).

use calculatrice_sci::noyau::params::ECHELLE_DEFAUT;
use calculatrice_sci::noyau::{Demarche, Grammaire, Params};

#[derive(Clone, Debug)]
pub struct AppCalc {
    // --- entrée utilisateur ---
    pub entree: String,

    // --- sorties ---
    pub resultat: String,       // rendu texte de l’arbre réduit
    pub valeur: Option<String>, // nombre canonique, si la réduction a abouti
    pub erreur: String,

    // --- démarche ---
    pub demarche: Demarche,
    pub afficher_demarche: bool,

    // --- réglages ---
    pub params: Params,
    pub grammaire: &'static Grammaire,
}

impl Default for AppCalc {
    fn default() -> Self {
        AppCalc::new(Params::default(), Grammaire::standard())
    }
}

impl AppCalc {
    pub fn new(params: Params, grammaire: &'static Grammaire) -> Self {
        Self {
            entree: String::new(),
            resultat: String::new(),
            valeur: None,
            erreur: String::new(),
            demarche: Demarche::default(),
            afficher_demarche: false,
            params,
            grammaire,
        }
    }

    /* ------------------------ Actions (état seulement) ------------------------ */

    /// AC : remise à zéro totale (entrée + résultats + échelle par défaut).
    pub fn reset_total(&mut self) {
        self.entree.clear();
        self.clear_resultats();
        self.params.set_echelle(ECHELLE_DEFAUT);
    }

    /// C : effacer seulement l’entrée.
    pub fn clear_entree(&mut self) {
        self.entree.clear();
    }

    /// CLR : effacer résultat + erreur + démarche (sans toucher à l’entrée).
    pub fn clear_resultats(&mut self) {
        self.resultat.clear();
        self.valeur = None;
        self.erreur.clear();
        self.demarche = Demarche::default();
    }

    /// Le dernier résultat reste affiché ; valeur et démarche ne sont plus fiables.
    pub fn set_erreur(&mut self, msg: impl Into<String>) {
        self.erreur = msg.into();
        self.valeur = None;
        self.demarche = Demarche::default();
    }

    pub fn set_resultats(
        &mut self,
        resultat: impl Into<String>,
        valeur: Option<String>,
        demarche: Demarche,
    ) {
        self.erreur.clear();
        self.resultat = resultat.into();
        self.valeur = valeur;
        self.demarche = demarche;
    }

    pub fn set_echelle(&mut self, echelle: usize) {
        self.params.set_echelle(echelle);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use calculatrice_sci::noyau::params::ECHELLE_MAX;

    #[test]
    fn erreur_conserve_le_resultat() {
        let mut a = AppCalc::default();
        a.set_resultats("14", Some("14".into()), Demarche::default());
        a.set_erreur("division par zéro");
        assert_eq!(a.resultat, "14");
        assert!(a.valeur.is_none());
        assert_eq!(a.erreur, "division par zéro");
    }

    #[test]
    fn echelle_bornee_et_reset() {
        let mut a = AppCalc::default();
        a.set_echelle(1_000_000);
        assert_eq!(a.params.echelle(), ECHELLE_MAX);
        a.entree = "1+1".into();
        a.reset_total();
        assert!(a.entree.is_empty());
        assert_eq!(a.params.echelle(), ECHELLE_DEFAUT);
    }
}
