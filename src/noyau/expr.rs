// src/noyau/expr.rs
//
// Arbre d’expression (union étiquetée, égalité structurelle)
// ----------------------------------------------------------
// - Literal  : nombre canonique, variable libre/liée ou constante (résolu via Params)
// - Operator : binaire + - * / ^ ->
// - Prefix   : + - unaires, '.' de tête (".5")
// - Postfix  : ! (factorielle), ' (prime, symbolique)
// - Function : Nom[args] (au moins un argument)
// - Group    : ( ... ), re-dérivé au rendu
// - Array    : { ... }, porteur d’arguments auxiliaires (Sum[f, {i, 1, n}])
//
// Aucun nœud n’est jamais muté : render/evaluate rendent un nouvel arbre
// ou le même Arc. Les sous-arbres sont partagés (Arc), jamais copiés en profondeur.

use std::fmt;
use std::sync::Arc;

use num_rational::BigRational;

use super::grammaire::prec;
use super::nombre::Decimal;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Symbole {
    Plus,
    Moins,
    Fois,
    Divise,
    Puissance,
    Fleche,
    Point,
    Factorielle,
    Prime,
}

impl Symbole {
    pub fn texte(self) -> &'static str {
        match self {
            Symbole::Plus => "+",
            Symbole::Moins => "-",
            Symbole::Fois => "*",
            Symbole::Divise => "/",
            Symbole::Puissance => "^",
            Symbole::Fleche => "->",
            Symbole::Point => ".",
            Symbole::Factorielle => "!",
            Symbole::Prime => "'",
        }
    }

    /// Précédence de la grammaire standard.
    pub fn precedence(self) -> u8 {
        match self {
            Symbole::Fleche => prec::FLECHE,
            Symbole::Plus | Symbole::Moins => prec::ADDITIF,
            Symbole::Fois | Symbole::Divise => prec::MULTIPLICATIF,
            Symbole::Puissance => prec::PUISSANCE,
            Symbole::Point => prec::PREFIXE,
            Symbole::Factorielle | Symbole::Prime => prec::POSTFIXE,
        }
    }

    pub fn associatif_droite(self) -> bool {
        matches!(self, Symbole::Puissance | Symbole::Fleche)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Expr {
    Literal(String),
    Operator {
        gauche: Arc<Expr>,
        symbole: Symbole,
        droite: Arc<Expr>,
    },
    Prefix {
        symbole: Symbole,
        operande: Arc<Expr>,
    },
    Postfix {
        operande: Arc<Expr>,
        symbole: Symbole,
    },
    Function {
        nom: String,
        args: Vec<Arc<Expr>>,
    },
    Group(Arc<Expr>),
    Array(Vec<Arc<Expr>>),
}

/* ------------------------ Constructeurs ------------------------ */

impl Expr {
    pub fn literal(texte: impl Into<String>) -> Arc<Expr> {
        Arc::new(Expr::Literal(texte.into()))
    }

    pub fn nombre(d: &Decimal) -> Arc<Expr> {
        Arc::new(Expr::Literal(d.to_string()))
    }

    pub fn operator(gauche: Arc<Expr>, symbole: Symbole, droite: Arc<Expr>) -> Arc<Expr> {
        Arc::new(Expr::Operator {
            gauche,
            symbole,
            droite,
        })
    }

    pub fn prefix(symbole: Symbole, operande: Arc<Expr>) -> Arc<Expr> {
        Arc::new(Expr::Prefix { symbole, operande })
    }

    pub fn postfix(operande: Arc<Expr>, symbole: Symbole) -> Arc<Expr> {
        Arc::new(Expr::Postfix { operande, symbole })
    }

    pub fn function(nom: impl Into<String>, args: Vec<Arc<Expr>>) -> Arc<Expr> {
        Arc::new(Expr::Function {
            nom: nom.into(),
            args,
        })
    }

    pub fn group(contenu: Arc<Expr>) -> Arc<Expr> {
        Arc::new(Expr::Group(contenu))
    }

    pub fn array(elements: Vec<Arc<Expr>>) -> Arc<Expr> {
        Arc::new(Expr::Array(elements))
    }
}

/* ------------------------ Inspection ------------------------ */

impl Expr {
    /// Literal dont le texte est un nombre canonique.
    pub fn as_decimal(&self) -> Option<Decimal> {
        match self {
            Expr::Literal(t) => Decimal::parse(t),
            _ => None,
        }
    }

    pub fn est_nombre(&self) -> bool {
        self.as_decimal().is_some()
    }

    /// Literal non numérique (variable, constante, nom inconnu).
    pub fn as_nom(&self) -> Option<&str> {
        match self {
            Expr::Literal(t) if Decimal::parse(t).is_none() => Some(t),
            _ => None,
        }
    }

    /// Précédence du nœud vu comme opérande ; None : atomique.
    pub fn precedence(&self) -> Option<u8> {
        match self {
            Expr::Operator { symbole, .. } => Some(symbole.precedence()),
            Expr::Prefix {
                symbole: Symbole::Plus | Symbole::Moins,
                ..
            } => Some(prec::ADDITIF),
            _ => None,
        }
    }

    /// Opérande de `parent` qui ne se relirait pas à l’identique sans parenthèses.
    /// Préfixes et postfixes se passent `a_droite = true`.
    pub fn exige_parentheses(&self, parent: Symbole, a_droite: bool) -> bool {
        let Some(c) = self.precedence() else {
            return false;
        };
        let q = parent.precedence();
        c < q || (c == q && a_droite != parent.associatif_droite())
    }

    /// Nombre négatif ("-2") : "-2^x" se relirait -(2^x).
    fn est_nombre_negatif(&self) -> bool {
        self.as_decimal().is_some_and(|d| d.is_negative())
    }

    pub fn est_literal(&self) -> bool {
        matches!(self, Expr::Literal(_))
    }

    /// Nombre entier exact (littéral sans partie fractionnaire).
    pub fn as_rationnel_entier(&self) -> Option<BigRational> {
        let d = self.as_decimal()?;
        if d.est_entier() {
            Some(d.to_rational())
        } else {
            None
        }
    }

    /// Contenu d’un groupe, sinon le nœud lui-même.
    pub fn sans_groupe(&self) -> &Expr {
        match self {
            Expr::Group(c) => c.sans_groupe(),
            e => e,
        }
    }

    /// Division de deux littéraux : déjà « en forme de fraction ».
    pub fn est_fraction_simple(&self) -> bool {
        matches!(
            self,
            Expr::Operator { gauche, symbole: Symbole::Divise, droite }
                if gauche.est_literal() && droite.est_literal()
        )
    }
}

/* ------------------------ Texte source ------------------------ */

/// Réécrit l’arbre dans la syntaxe d’entrée (parenthèses = celles des Group).
impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Literal(t) => f.write_str(t),
            Expr::Operator {
                gauche,
                symbole,
                droite,
            } => {
                // "-2" sous * / ^ : le moins unaire absorberait l’opérateur voisin
                let serre = symbole.precedence() > prec::ADDITIF;
                ecrire_operande(f, gauche, serre)?;
                f.write_str(symbole.texte())?;
                ecrire_operande(f, droite, serre)
            }
            Expr::Prefix { symbole, operande } => write!(f, "{}{operande}", symbole.texte()),
            Expr::Postfix { operande, symbole } => {
                if operande.est_nombre_negatif() {
                    write!(f, "({operande}){}", symbole.texte())
                } else {
                    write!(f, "{operande}{}", symbole.texte())
                }
            }
            Expr::Function { nom, args } => {
                write!(f, "{nom}[")?;
                ecrire_liste(f, args)?;
                f.write_str("]")
            }
            Expr::Group(c) => write!(f, "({c})"),
            Expr::Array(elements) => {
                f.write_str("{")?;
                ecrire_liste(f, elements)?;
                f.write_str("}")
            }
        }
    }
}

fn ecrire_operande(f: &mut fmt::Formatter<'_>, e: &Expr, serre: bool) -> fmt::Result {
    if serre && e.est_nombre_negatif() {
        write!(f, "({e})")
    } else {
        write!(f, "{e}")
    }
}

fn ecrire_liste(f: &mut fmt::Formatter<'_>, items: &[Arc<Expr>]) -> fmt::Result {
    for (k, e) in items.iter().enumerate() {
        if k > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{e}")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn egalite_structurelle() {
        let a = Expr::operator(Expr::literal("2"), Symbole::Plus, Expr::literal("x"));
        let b = Expr::operator(Expr::literal("2"), Symbole::Plus, Expr::literal("x"));
        assert_eq!(a, b);
        assert!(!Arc::ptr_eq(&a, &b));

        let mut set = HashSet::new();
        set.insert(a);
        assert!(set.contains(&b));
    }

    #[test]
    fn inspection_literal() {
        assert!(Expr::Literal("4.331e-5".into()).est_nombre());
        assert!(!Expr::Literal("x".into()).est_nombre());
        assert_eq!(Expr::Literal("pi".into()).as_nom(), Some("pi"));
        assert!(Expr::Literal("12".into()).as_rationnel_entier().is_some());
        assert!(Expr::Literal("1.5".into()).as_rationnel_entier().is_none());
    }

    #[test]
    fn fraction_simple() {
        let f = Expr::operator(Expr::literal("1"), Symbole::Divise, Expr::literal("x"));
        assert!(f.est_fraction_simple());
        let g = Expr::operator(f.clone(), Symbole::Divise, Expr::literal("2"));
        assert!(!g.est_fraction_simple());
    }

    #[test]
    fn affichage_source() {
        let e = Expr::function(
            "Sum",
            vec![
                Expr::literal("i"),
                Expr::array(vec![Expr::literal("i"), Expr::literal("1"), Expr::literal("n")]),
            ],
        );
        assert_eq!(e.to_string(), "Sum[i, {i, 1, n}]");

        let g = Expr::operator(
            Expr::group(Expr::operator(Expr::literal("1"), Symbole::Plus, Expr::literal("2"))),
            Symbole::Fois,
            Expr::postfix(Expr::literal("3"), Symbole::Factorielle),
        );
        assert_eq!(g.to_string(), "(1+2)*3!");
    }

    #[test]
    fn negatif_a_gauche_entre_parentheses() {
        let moins_deux = Expr::literal("-2");
        let p = Expr::operator(moins_deux.clone(), Symbole::Puissance, Expr::literal("x"));
        assert_eq!(p.to_string(), "(-2)^x");
        let m = Expr::operator(moins_deux.clone(), Symbole::Fois, Expr::literal("x"));
        assert_eq!(m.to_string(), "(-2)*x");
        let s = Expr::operator(moins_deux.clone(), Symbole::Plus, Expr::literal("x"));
        assert_eq!(s.to_string(), "-2+x");
        let d = Expr::operator(Expr::literal("x"), Symbole::Puissance, moins_deux.clone());
        assert_eq!(d.to_string(), "x^(-2)");
        let t = Expr::operator(d, Symbole::Fois, Expr::literal("3"));
        assert_eq!(t.to_string(), "x^(-2)*3");
        let r = Expr::operator(Expr::literal("x"), Symbole::Moins, moins_deux.clone());
        assert_eq!(r.to_string(), "x--2");
        assert_eq!(Expr::postfix(moins_deux, Symbole::Prime).to_string(), "(-2)'");
    }

    #[test]
    fn parentheses_exigees_par_la_precedence() {
        let somme = Expr::operator(Expr::literal("x"), Symbole::Plus, Expr::literal("1"));
        let produit = Expr::operator(Expr::literal("2"), Symbole::Fois, Expr::literal("x"));
        let puissance = Expr::operator(Expr::literal("x"), Symbole::Puissance, Expr::literal("2"));

        assert!(somme.exige_parentheses(Symbole::Fois, false));
        assert!(somme.exige_parentheses(Symbole::Moins, true));
        assert!(!somme.exige_parentheses(Symbole::Moins, false));
        assert!(!produit.exige_parentheses(Symbole::Plus, true));
        assert!(produit.exige_parentheses(Symbole::Divise, true));
        // ^ associatif à droite
        assert!(puissance.exige_parentheses(Symbole::Puissance, false));
        assert!(!puissance.exige_parentheses(Symbole::Puissance, true));
        // -(x+1), (x+1)!
        assert!(somme.exige_parentheses(Symbole::Moins, true));
        assert!(!produit.exige_parentheses(Symbole::Moins, true));
        assert!(somme.exige_parentheses(Symbole::Factorielle, true));
        assert!(!Expr::Literal("x".into()).exige_parentheses(Symbole::Puissance, false));
    }
}
