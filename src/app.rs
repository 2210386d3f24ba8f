// src/app.rs
//
// Calculatrice scientifique — module App (racine)
// -----------------------------------------------
// Rôle:
// - Déclarer les sous-modules (etat.rs + vue.rs)
// - Ré-exporter AppCalc (pour main.rs: use app::AppCalc;)
// - Relier l’état au noyau : evaluer() + commandes « :… » de la boucle interactive

pub mod etat;
pub mod vue;

pub use etat::AppCalc;

use calculatrice_sci::noyau::{eval_expression, Grammaire, ModeResultat, UniteAngle};
use log::debug;

const AIDE: &str = "commandes : :echelle N | :angle deg|rad|grad | :mode dec|fixe|sci|ing|frac|mixte|expr \
| :grammaire standard|plate | :complexe on|off | :demarche | :c | :clr | :ac | :q";

/// Ce que la boucle doit faire après une ligne.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Sortie {
    Texte(String),
    Quitter,
}

impl AppCalc {
    /// Une ligne saisie : commande « :… » ou expression.
    pub fn traiter(&mut self, ligne: &str) -> Sortie {
        let ligne = ligne.trim();
        if ligne.is_empty() {
            return Sortie::Texte(String::new());
        }
        if let Some(cmd) = ligne.strip_prefix(':') {
            return self.commande(cmd);
        }
        self.entree = ligne.to_string();
        self.evaluer();
        Sortie::Texte(self.vue())
    }

    /// Évalue l’entrée via le noyau, puis dépose résultat/valeur/démarche dans l’état.
    pub fn evaluer(&mut self) {
        let s = self.entree.trim();
        if s.is_empty() {
            self.set_erreur("Entrée vide");
            return;
        }

        match eval_expression(s, &self.params, self.grammaire) {
            Ok(r) => {
                let valeur = r.valeur().map(|v| v.to_string());
                self.set_resultats(r.texte, valeur, r.demarche);
            }
            Err(e) => {
                debug!("échec de « {s} » : {e:?}");
                self.set_erreur(e.to_string());
            }
        }
    }

    fn commande(&mut self, cmd: &str) -> Sortie {
        let mut mots = cmd.split_whitespace();
        let nom = mots.next().unwrap_or_default();
        let arg = mots.next();

        let msg = match (nom, arg) {
            ("q" | "quitter", _) => return Sortie::Quitter,

            ("echelle", Some(n)) => match n.parse::<usize>() {
                Ok(n) => {
                    self.set_echelle(n);
                    format!("échelle : {}", self.params.echelle())
                }
                Err(_) => format!("échelle invalide : {n}"),
            },

            ("angle", Some(u)) => match u.parse::<UniteAngle>() {
                Ok(u) => {
                    self.params.unite_angle = u;
                    format!("angle : {}", u.nom())
                }
                Err(e) => e,
            },

            ("mode", Some(m)) => match m.parse::<ModeResultat>() {
                Ok(m) => {
                    self.params.mode = m;
                    format!("mode : {}", m.nom())
                }
                Err(e) => e,
            },

            ("grammaire", Some(g)) => match Grammaire::par_nom(g) {
                Some(g) => {
                    self.grammaire = g;
                    format!("grammaire : {}", g.nom())
                }
                None => format!("grammaire inconnue : {g} (standard, plate)"),
            },

            ("complexe", Some(v)) => match v {
                "on" | "oui" => {
                    self.params.complexe = true;
                    "complexe : on".to_string()
                }
                "off" | "non" => {
                    self.params.complexe = false;
                    "complexe : off".to_string()
                }
                _ => format!("valeur inconnue : {v} (on, off)"),
            },

            ("demarche", _) => {
                self.afficher_demarche = !self.afficher_demarche;
                format!(
                    "démarche : {}",
                    if self.afficher_demarche { "on" } else { "off" }
                )
            }

            ("c", _) => {
                self.clear_entree();
                String::new()
            }

            ("clr", _) => {
                self.clear_resultats();
                String::new()
            }

            ("ac", _) => {
                self.reset_total();
                "remise à zéro".to_string()
            }

            _ => AIDE.to_string(),
        };
        Sortie::Texte(msg)
    }
}
