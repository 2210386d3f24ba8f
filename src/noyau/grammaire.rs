// src/noyau/grammaire.rs
//
// Table de grammaire (données, pas de classes)
// --------------------------------------------
// Catégorie -> (précédence, comportement préfixe?, comportement infixe?)
// + ensembles lettres / chiffres / ponctuateurs.
//
// Deux valeurs immuables, construites une seule fois :
// - standard() : précédences usuelles (+ - < * / < ^)
// - plate()    : tout au même niveau (exécution immédiate gauche->droite), ^ juste au-dessus,
//                l’appel Nom[ ] au-dessus de tout

use std::collections::HashMap;
use std::sync::OnceLock;

use super::jetons::Categorie;

/// Comportements en position de tête d’expression.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Prefixe {
    /// Nombre ou identifiant -> Literal
    Nom,
    /// + / - unaire
    Signe,
    /// `.5` -> 0.5
    Point,
    /// ( ... )
    Groupe,
    /// { a, b, ... }
    Tableau,
}

/// Comportements entre deux opérandes (ou après un opérande).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Infixe {
    /// `droite` : associativité à droite (^, ->)
    Operateur { droite: bool },
    Postfixe,
    /// Nom[ args ]
    Appel,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Regle {
    pub precedence: u8,
    pub prefixe: Option<Prefixe>,
    pub infixe: Option<Infixe>,
}

#[derive(Debug)]
pub struct Grammaire {
    nom: &'static str,
    regles: HashMap<Categorie, Regle>,
    ponctuateurs: HashMap<char, Categorie>,
}

/* ------------------------ Précédences ------------------------ */

pub mod prec {
    pub const AUCUNE: u8 = 0;
    pub const FLECHE: u8 = 1;
    pub const ADDITIF: u8 = 2;
    pub const MULTIPLICATIF: u8 = 3;
    pub const PUISSANCE: u8 = 4;
    pub const PREFIXE: u8 = 6;
    pub const POSTFIXE: u8 = 7;
    pub const MAX: u8 = 10;
    pub const PUISSANCE_PLATE: u8 = 11;
    /// Nom[ ... ] en grammaire plate : au-dessus de tout opérateur
    pub const APPEL: u8 = 12;
}

static STANDARD: OnceLock<Grammaire> = OnceLock::new();
static PLATE: OnceLock<Grammaire> = OnceLock::new();

impl Grammaire {
    /// Grammaire avec précédences (calculatrice scientifique).
    pub fn standard() -> &'static Grammaire {
        STANDARD.get_or_init(|| {
            use Categorie::*;
            let mut g = Grammaire::vide("standard");

            g.regle(Nom, prec::MAX, Some(Prefixe::Nom), None);
            g.regle(ParG, prec::MAX, Some(Prefixe::Groupe), None);
            g.regle(AccoladeG, prec::MAX, Some(Prefixe::Tableau), None);
            g.regle(CrochetG, prec::MAX, None, Some(Infixe::Appel));

            g.regle(Plus, prec::ADDITIF, Some(Prefixe::Signe), Some(op_gauche()));
            g.regle(Moins, prec::ADDITIF, Some(Prefixe::Signe), Some(op_gauche()));
            g.regle(Etoile, prec::MULTIPLICATIF, None, Some(op_gauche()));
            g.regle(Barre, prec::MULTIPLICATIF, None, Some(op_gauche()));
            g.regle(Chapeau, prec::PUISSANCE, None, Some(op_droite()));
            g.regle(Fleche, prec::FLECHE, None, Some(op_droite()));

            g.regle(Point, prec::PREFIXE, Some(Prefixe::Point), None);
            g.regle(Bang, prec::PREFIXE, None, Some(Infixe::Postfixe));
            g.regle(Apostrophe, prec::POSTFIXE, None, Some(Infixe::Postfixe));

            g.delimiteurs();
            g
        })
    }

    /// Grammaire plate : aucune distinction de précédence (sauf ^).
    pub fn plate() -> &'static Grammaire {
        PLATE.get_or_init(|| {
            use Categorie::*;
            let mut g = Grammaire::vide("plate");

            g.regle(Nom, prec::MAX, Some(Prefixe::Nom), None);
            g.regle(ParG, prec::MAX, Some(Prefixe::Groupe), None);
            g.regle(AccoladeG, prec::MAX, Some(Prefixe::Tableau), None);
            g.regle(CrochetG, prec::APPEL, None, Some(Infixe::Appel));

            g.regle(Plus, prec::MAX, Some(Prefixe::Signe), Some(op_gauche()));
            g.regle(Moins, prec::MAX, Some(Prefixe::Signe), Some(op_gauche()));
            g.regle(Etoile, prec::MAX, None, Some(op_gauche()));
            g.regle(Barre, prec::MAX, None, Some(op_gauche()));
            g.regle(Chapeau, prec::PUISSANCE_PLATE, None, Some(op_droite()));
            g.regle(Fleche, prec::MAX, None, Some(op_droite()));

            g.regle(Point, prec::MAX, Some(Prefixe::Point), None);
            g.regle(Bang, prec::MAX, None, Some(Infixe::Postfixe));
            g.regle(Apostrophe, prec::MAX, None, Some(Infixe::Postfixe));

            g.delimiteurs();
            g
        })
    }

    pub fn par_nom(nom: &str) -> Option<&'static Grammaire> {
        match nom {
            "standard" => Some(Grammaire::standard()),
            "plate" => Some(Grammaire::plate()),
            _ => None,
        }
    }

    pub fn nom(&self) -> &'static str {
        self.nom
    }

    fn vide(nom: &'static str) -> Self {
        let ponctuateurs = [
            ('+', Categorie::Plus),
            ('-', Categorie::Moins),
            ('*', Categorie::Etoile),
            ('/', Categorie::Barre),
            ('^', Categorie::Chapeau),
            (',', Categorie::Virgule),
            ('.', Categorie::Point),
            ('(', Categorie::ParG),
            (')', Categorie::ParD),
            ('[', Categorie::CrochetG),
            (']', Categorie::CrochetD),
            ('{', Categorie::AccoladeG),
            ('}', Categorie::AccoladeD),
            ('!', Categorie::Bang),
            ('\'', Categorie::Apostrophe),
        ]
        .into_iter()
        .collect();

        Grammaire {
            nom,
            regles: HashMap::new(),
            ponctuateurs,
        }
    }

    fn regle(
        &mut self,
        cat: Categorie,
        precedence: u8,
        prefixe: Option<Prefixe>,
        infixe: Option<Infixe>,
    ) {
        self.regles.insert(
            cat,
            Regle {
                precedence,
                prefixe,
                infixe,
            },
        );
    }

    /// Fermants / séparateurs / fin : précédence nulle, aucun comportement.
    fn delimiteurs(&mut self) {
        use Categorie::*;
        for cat in [ParD, CrochetD, AccoladeD, Virgule, Fin] {
            self.regle(cat, prec::AUCUNE, None, None);
        }
    }

    /* ------------------------ Consultation ------------------------ */

    pub fn regle_de(&self, cat: Categorie) -> Option<&Regle> {
        self.regles.get(&cat)
    }

    pub fn connait(&self, cat: Categorie) -> bool {
        self.regles.contains_key(&cat)
    }

    pub fn prefixe(&self, cat: Categorie) -> Option<Prefixe> {
        self.regles.get(&cat).and_then(|r| r.prefixe)
    }

    pub fn infixe(&self, cat: Categorie) -> Option<Infixe> {
        self.regles.get(&cat).and_then(|r| r.infixe)
    }

    /// Précédence « de liaison » : nulle si aucun comportement infixe.
    pub fn precedence_infixe(&self, cat: Categorie) -> u8 {
        match self.regles.get(&cat) {
            Some(r) if r.infixe.is_some() => r.precedence,
            _ => prec::AUCUNE,
        }
    }

    /// Précédence propre de la catégorie (sert aussi aux opérandes préfixes).
    pub fn precedence(&self, cat: Categorie) -> u8 {
        self.regles.get(&cat).map_or(prec::AUCUNE, |r| r.precedence)
    }

    pub fn ponctuateur(&self, c: char) -> Option<Categorie> {
        self.ponctuateurs
            .get(&c)
            .copied()
            .filter(|cat| self.connait(*cat))
    }

    pub fn est_lettre(&self, c: char) -> bool {
        c.is_ascii_alphabetic()
    }

    pub fn est_chiffre(&self, c: char) -> bool {
        c.is_ascii_digit()
    }
}

fn op_gauche() -> Infixe {
    Infixe::Operateur { droite: false }
}

fn op_droite() -> Infixe {
    Infixe::Operateur { droite: true }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_ordonne_les_operateurs() {
        let g = Grammaire::standard();
        assert!(g.precedence_infixe(Categorie::Plus) < g.precedence_infixe(Categorie::Etoile));
        assert!(g.precedence_infixe(Categorie::Etoile) < g.precedence_infixe(Categorie::Chapeau));
        assert_eq!(g.precedence_infixe(Categorie::Fin), 0);
        // '(' a une précédence mais pas d’infixe : liaison nulle
        assert_eq!(g.precedence(Categorie::ParG), prec::MAX);
        assert_eq!(g.precedence_infixe(Categorie::ParG), 0);
    }

    #[test]
    fn plate_sans_distinction() {
        let g = Grammaire::plate();
        assert_eq!(
            g.precedence_infixe(Categorie::Plus),
            g.precedence_infixe(Categorie::Etoile)
        );
        assert!(g.precedence_infixe(Categorie::Chapeau) > g.precedence_infixe(Categorie::Etoile));
        assert!(g.precedence_infixe(Categorie::CrochetG) > g.precedence_infixe(Categorie::Chapeau));
    }

    #[test]
    fn meme_forme_d_enregistrement() {
        let (s, p) = (Grammaire::standard(), Grammaire::plate());
        for c in "+-*/^,.()[]{}!'".chars() {
            let cat = s.ponctuateur(c).unwrap();
            assert_eq!(p.ponctuateur(c), Some(cat));
            assert_eq!(s.prefixe(cat), p.prefixe(cat));
            assert_eq!(s.infixe(cat), p.infixe(cat));
        }
        assert!(std::ptr::eq(Grammaire::standard(), s));
        assert_eq!(Grammaire::par_nom("plate").map(Grammaire::nom), Some("plate"));
    }
}
