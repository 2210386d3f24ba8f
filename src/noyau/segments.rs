// src/noyau/segments.rs
//
// Arbre de segments d’affichage (produit par Expr::render)
// -------------------------------------------------------
// Les nombres gardent leur valeur exacte (BigRational) + mode + chiffres :
// la mise en forme finale (FIXE, SCI, FRAC…) se fait au Display.
// Display = rendu texte brut ; la mise en page typographique est hors du noyau.

use std::fmt;

use num_rational::BigRational;
use num_traits::Signed;

use super::format::formater;
use super::params::{ModeResultat, UniteAngle};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Segment {
    Nombre {
        valeur: BigRational,
        mode: ModeResultat,
        chiffres: usize,
    },
    VariableLibre(String),
    VariableLiee {
        glyphe: String,
    },
    Constante {
        glyphe: String,
    },
    /// Glyphe d’opérateur : + − × ÷ →
    Operateur(&'static str),
    Parens(Segments),
    Fraction {
        num: Segments,
        den: Segments,
    },
    /// indice 2 : racine carrée
    Racine {
        indice: u32,
        radicande: Segments,
    },
    Puissance {
        base: Segments,
        exposant: Segments,
    },
    ValeurAbsolue(Segments),
    Plancher(Segments),
    Plafond(Segments),
    Fonction {
        nom: String,
        inverse: bool,
        unite: Option<UniteAngle>,
        args: Vec<Segments>,
    },
    LogBase {
        base: Segments,
        arg: Segments,
    },
    Limite {
        corps: Segments,
        variable: Segments,
        cible: Segments,
    },
    Derivee {
        corps: Segments,
        variable: Segments,
    },
    /// ∑, ∏, ∫ avec bornes
    GrandOperateur {
        symbole: char,
        corps: Segments,
        index: Segments,
        bas: Segments,
        haut: Segments,
    },
    Tableau(Vec<Segments>),
    Texte(String),
}

/// Séquence de segments (constructeur de rendu).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Segments(pub Vec<Segment>);

impl Segments {
    pub fn new() -> Self {
        Segments(Vec::new())
    }

    pub fn push(&mut self, s: Segment) {
        self.0.push(s);
    }

    pub fn append(&mut self, autres: Segments) {
        self.0.extend(autres.0);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Segment> {
        self.0.iter()
    }

    /// Une Fraction au premier niveau (la division suivante passe en ÷).
    pub fn contient_fraction(&self) -> bool {
        self.0.iter().any(|s| matches!(s, Segment::Fraction { .. }))
    }

    /// Un seul segment « atomique » : pas besoin de parenthèses autour.
    fn est_atomique(&self) -> bool {
        match self.0.as_slice() {
            [s] => {
                !matches!(s, Segment::Fraction { .. } | Segment::Puissance { .. })
                    && !s.commence_par_moins()
            }
            _ => false,
        }
    }
}

impl From<Segment> for Segments {
    fn from(s: Segment) -> Self {
        Segments(vec![s])
    }
}

impl Segment {
    fn commence_par_moins(&self) -> bool {
        match self {
            Segment::Nombre { valeur, .. } => valeur.is_negative(),
            _ => false,
        }
    }
}

/* ------------------------ Texte brut ------------------------ */

fn exposant_texte(n: u32) -> String {
    const CHIFFRES: [char; 10] = ['⁰', '¹', '²', '³', '⁴', '⁵', '⁶', '⁷', '⁸', '⁹'];
    n.to_string()
        .bytes()
        .map(|b| CHIFFRES[(b - b'0') as usize])
        .collect()
}

/// Parenthèses seulement si nécessaire.
struct Entoure<'a>(&'a Segments);

impl fmt::Display for Entoure<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.est_atomique() {
            write!(f, "{}", self.0)
        } else {
            write!(f, "({})", self.0)
        }
    }
}

fn ecrire_liste(f: &mut fmt::Formatter<'_>, items: &[Segments]) -> fmt::Result {
    for (k, s) in items.iter().enumerate() {
        if k > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{s}")?;
    }
    Ok(())
}

fn marque_unite(unite: Option<UniteAngle>) -> &'static str {
    match unite {
        Some(UniteAngle::Deg) => "°",
        Some(UniteAngle::Grad) => "ᵍ",
        Some(UniteAngle::Rad) | None => "",
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Nombre {
                valeur,
                mode,
                chiffres,
            } => f.write_str(&formater(valeur, *mode, *chiffres)),
            Segment::VariableLibre(nom) => f.write_str(nom),
            Segment::VariableLiee { glyphe } | Segment::Constante { glyphe } => f.write_str(glyphe),
            Segment::Operateur(g) => f.write_str(g),
            Segment::Parens(s) => write!(f, "({s})"),
            Segment::Fraction { num, den } => write!(f, "{}/{}", Entoure(num), Entoure(den)),
            Segment::Racine { indice, radicande } => {
                match indice {
                    2 => f.write_str("√")?,
                    3 => f.write_str("∛")?,
                    4 => f.write_str("∜")?,
                    n => write!(f, "{}√", exposant_texte(*n))?,
                }
                write!(f, "{}", Entoure(radicande))
            }
            Segment::Puissance { base, exposant } => {
                write!(f, "{}^{}", Entoure(base), Entoure(exposant))
            }
            Segment::ValeurAbsolue(s) => write!(f, "|{s}|"),
            Segment::Plancher(s) => write!(f, "⌊{s}⌋"),
            Segment::Plafond(s) => write!(f, "⌈{s}⌉"),
            Segment::Fonction {
                nom,
                inverse,
                unite,
                args,
            } => {
                f.write_str(nom)?;
                if *inverse {
                    f.write_str("⁻¹")?;
                }
                f.write_str("(")?;
                ecrire_liste(f, args)?;
                // direct : l’argument est un angle ; réciproque : le résultat
                if *inverse {
                    write!(f, "){}", marque_unite(*unite))
                } else {
                    write!(f, "{})", marque_unite(*unite))
                }
            }
            Segment::LogBase { base, arg } => write!(f, "log_{}({arg})", Entoure(base)),
            Segment::Limite {
                corps,
                variable,
                cible,
            } => write!(f, "lim[{variable}→{cible}]({corps})"),
            Segment::Derivee { corps, variable } => write!(f, "d/d{}({corps})", Entoure(variable)),
            Segment::GrandOperateur {
                symbole,
                corps,
                index,
                bas,
                haut,
            } => {
                if *symbole == '∫' {
                    write!(f, "∫[{bas}..{haut}]({corps})d{index}")
                } else {
                    write!(f, "{symbole}[{index}={bas}..{haut}]({corps})")
                }
            }
            Segment::Tableau(items) => {
                f.write_str("{")?;
                ecrire_liste(f, items)?;
                f.write_str("}")
            }
            Segment::Texte(t) => f.write_str(t),
        }
    }
}

impl fmt::Display for Segments {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for s in &self.0 {
            write!(f, "{s}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_bigint::BigInt;

    fn nombre(n: i64) -> Segment {
        Segment::Nombre {
            valeur: BigRational::from_integer(BigInt::from(n)),
            mode: ModeResultat::Decimal,
            chiffres: 20,
        }
    }

    fn var(v: &str) -> Segment {
        Segment::VariableLibre(v.to_string())
    }

    #[test]
    fn fraction_et_parentheses() {
        let den = Segments(vec![var("x"), Segment::Operateur("+"), nombre(1)]);
        let s = Segment::Fraction {
            num: nombre(1).into(),
            den,
        };
        assert_eq!(s.to_string(), "1/(x+1)");
    }

    #[test]
    fn racines() {
        let r2 = Segment::Racine {
            indice: 2,
            radicande: nombre(2).into(),
        };
        assert_eq!(r2.to_string(), "√2");
        let r5 = Segment::Racine {
            indice: 5,
            radicande: var("x").into(),
        };
        assert_eq!(r5.to_string(), "⁵√x");
    }

    #[test]
    fn fonctions_et_unites() {
        let sin = Segment::Fonction {
            nom: "sin".into(),
            inverse: false,
            unite: Some(UniteAngle::Deg),
            args: vec![nombre(30).into()],
        };
        assert_eq!(sin.to_string(), "sin(30°)");
        let asin = Segment::Fonction {
            nom: "sin".into(),
            inverse: true,
            unite: Some(UniteAngle::Deg),
            args: vec![var("x").into()],
        };
        assert_eq!(asin.to_string(), "sin⁻¹(x)°");
    }

    #[test]
    fn puissance_negative_entouree() {
        let p = Segment::Puissance {
            base: nombre(-2).into(),
            exposant: nombre(2).into(),
        };
        assert_eq!(p.to_string(), "(-2)^2");
    }

    #[test]
    fn grands_operateurs() {
        let s = Segment::GrandOperateur {
            symbole: '∑',
            corps: var("i").into(),
            index: var("i").into(),
            bas: nombre(1).into(),
            haut: var("n").into(),
        };
        assert_eq!(s.to_string(), "∑[i=1..n](i)");
        assert!(Segments(vec![s]).iter().count() == 1);
    }
}
