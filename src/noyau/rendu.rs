// src/noyau/rendu.rs
//
// Expr::render : arbre -> segments d’affichage
// -------------------------------------------
// Pur : n’évalue rien, lit seulement Params (mode, échelle, unité, noms, glyphes).
// - "/" : fraction, sauf changement de base Log[a]/Log[b] et fraction déjà ouverte (÷)
// - "*" : juxtaposition (2x, xy, 2(x+1)) sinon ×
// - "^" : exposant p/q -> racine q-ième
// - Group : parenthèses seulement autour de ce qui en a besoin

use std::sync::Arc;

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{ToPrimitive, Zero};

use super::expr::{Expr, Symbole};
use super::nombre::Decimal;
use super::params::{Fonction, Params, UniteAngle};
use super::segments::{Segment, Segments};

impl Expr {
    /// Ajoute le rendu de l’arbre au constructeur.
    pub fn render(&self, p: &Params, out: &mut Segments) {
        match self {
            Expr::Literal(t) => out.push(rendre_literal(t, p)),

            Expr::Operator {
                gauche,
                symbole,
                droite,
            } => rendre_operateur(gauche, *symbole, droite, p, out),

            Expr::Prefix { symbole, operande } => match symbole {
                Symbole::Point => {
                    let valeur = match operande.as_ref() {
                        Expr::Literal(t) if t.bytes().all(|b| b.is_ascii_digit()) => {
                            Decimal::parse(&format!("0.{t}"))
                        }
                        _ => None,
                    };
                    match valeur {
                        Some(v) => out.push(nombre(&v.to_rational(), p)),
                        None => {
                            out.push(Segment::Texte("0.".into()));
                            operande.render(p, out);
                        }
                    }
                }
                s => {
                    out.push(glyphe(*s));
                    operande.render(p, out);
                }
            },

            Expr::Postfix { operande, symbole } => {
                operande.render(p, out);
                let t = match symbole {
                    Symbole::Prime => "′",
                    s => s.texte(),
                };
                out.push(Segment::Texte(t.into()));
            }

            Expr::Group(contenu) => {
                if contenu.est_literal() || contenu.est_fraction_simple() {
                    contenu.render(p, out);
                } else {
                    out.push(Segment::Parens(rendre(contenu, p)));
                }
            }

            Expr::Array(elements) => {
                out.push(Segment::Tableau(elements.iter().map(|e| rendre(e, p)).collect()));
            }

            Expr::Function { nom, args } => rendre_fonction(nom, args, p, out),
        }
    }

    /// Rendu complet dans un nouveau constructeur.
    pub fn rendu(&self, p: &Params) -> Segments {
        rendre(self, p)
    }
}

fn rendre(e: &Expr, p: &Params) -> Segments {
    let mut s = Segments::new();
    e.render(p, &mut s);
    s
}

fn nombre(valeur: &BigRational, p: &Params) -> Segment {
    Segment::Nombre {
        valeur: valeur.clone(),
        mode: p.mode,
        chiffres: p.echelle(),
    }
}

fn entier(n: i64, p: &Params) -> Segment {
    nombre(&BigRational::from_integer(BigInt::from(n)), p)
}

fn glyphe(s: Symbole) -> Segment {
    match s {
        Symbole::Plus => Segment::Operateur("+"),
        Symbole::Moins => Segment::Operateur("-"),
        Symbole::Fois => Segment::Operateur("×"),
        Symbole::Divise => Segment::Operateur("÷"),
        Symbole::Fleche => Segment::Operateur("→"),
        autre => Segment::Texte(autre.texte().into()),
    }
}

/* ------------------------ Littéraux ------------------------ */

fn rendre_literal(t: &str, p: &Params) -> Segment {
    if let Some(d) = Decimal::parse(t) {
        return nombre(&d.to_rational(), p);
    }
    if p.est_variable_libre(t) {
        return Segment::VariableLibre(t.to_string());
    }
    if let Some(id) = p.variable_liee(t) {
        return Segment::VariableLiee {
            glyphe: id.glyphe.clone(),
        };
    }
    let glyphe = p
        .constante(t)
        .map(|c| c.glyphe.clone())
        .unwrap_or_else(|| t.to_string());
    Segment::Constante { glyphe }
}

/// Nom d’une seule lettre (candidat au tri alphabétique dans un produit).
fn lettre_seule(e: &Expr) -> Option<&str> {
    e.as_nom()
        .filter(|n| n.chars().count() == 1 && n.chars().all(|c| c.is_alphabetic()))
}

/* ------------------------ Opérateurs ------------------------ */

fn rendre_operateur(gauche: &Arc<Expr>, symbole: Symbole, droite: &Arc<Expr>, p: &Params, out: &mut Segments) {
    match symbole {
        Symbole::Divise => {
            if let (Some(a), Some(b)) = (log_simple(gauche, p), log_simple(droite, p)) {
                out.push(Segment::LogBase {
                    base: rendre(b, p),
                    arg: rendre(a, p),
                });
                return;
            }
            let g = rendre(gauche, p);
            if g.contient_fraction() {
                out.append(g);
                out.push(glyphe(Symbole::Divise));
                droite.render(p, out);
                return;
            }
            // dans une fraction, les parenthèses d’un groupe sont superflues
            let num = match gauche.as_ref() {
                Expr::Group(c) => rendre(c, p),
                _ => g,
            };
            out.push(Segment::Fraction {
                num,
                den: rendre(droite.sans_groupe(), p),
            });
        }

        Symbole::Fois => {
            let (g, d) = (gauche.as_ref(), droite.as_ref());
            if g.est_nombre() && d.as_nom().is_some() {
                g.render(p, out);
                d.render(p, out);
            } else if g.as_nom().is_some() && d.est_nombre() {
                d.render(p, out);
                g.render(p, out);
            } else if let (Some(a), Some(b)) = (lettre_seule(g), lettre_seule(d)) {
                let (premier, second) = if a <= b { (g, d) } else { (d, g) };
                premier.render(p, out);
                second.render(p, out);
            } else {
                let rg = rendre(g, p);
                let rd = rendre(d, p);
                out.append(rg);
                if !matches!(rd.0.as_slice(), [Segment::Parens(_)]) {
                    out.push(glyphe(Symbole::Fois));
                }
                out.append(rd);
            }
        }

        Symbole::Puissance => rendre_puissance(gauche, droite, p, out),

        _ => {
            gauche.render(p, out);
            out.push(glyphe(symbole));
            droite.render(p, out);
        }
    }
}

/// Log[x] à un argument (selon les noms CAS actifs) -> x
fn log_simple<'a>(e: &'a Expr, p: &Params) -> Option<&'a Expr> {
    match e {
        Expr::Function { nom, args } if args.len() == 1 && p.noms.fonction(nom) == Some(Fonction::Log) => {
            Some(args[0].as_ref())
        }
        _ => None,
    }
}

/// Exposant « a/b » d’entiers littéraux (éventuellement groupé) ou Rational[a, b].
pub(crate) fn exposant_fractionnaire(e: &Expr, p: &Params) -> Option<(BigInt, BigInt)> {
    let (a, b) = match e.sans_groupe() {
        Expr::Operator {
            gauche,
            symbole: Symbole::Divise,
            droite,
        } => (gauche.as_ref(), droite.as_ref()),
        Expr::Function { nom, args }
            if args.len() == 2 && p.noms.fonction(nom) == Some(Fonction::Rational) =>
        {
            (args[0].as_ref(), args[1].as_ref())
        }
        _ => return None,
    };
    let a = a.as_rationnel_entier()?.to_integer();
    let b = b.as_rationnel_entier()?.to_integer();
    if b.is_zero() {
        return None;
    }
    Some((a, b))
}

fn rendre_puissance(base: &Expr, exposant: &Expr, p: &Params, out: &mut Segments) {
    if let Some((a, b)) = exposant_fractionnaire(exposant, p) {
        if let Some(indice) = b.to_u32().filter(|q| *q > 1) {
            let radicande = if a == BigInt::from(1) {
                rendre(base, p)
            } else {
                Segments::from(Segment::Puissance {
                    base: rendre(base, p),
                    exposant: nombre(&BigRational::from_integer(a), p).into(),
                })
            };
            out.push(Segment::Racine { indice, radicande });
            return;
        }
    }
    out.push(Segment::Puissance {
        base: rendre(base, p),
        exposant: rendre(exposant, p),
    });
}

/* ------------------------ Fonctions ------------------------ */

fn rendre_fonction(nom: &str, args: &[Arc<Expr>], p: &Params, out: &mut Segments) {
    let r = |k: usize| rendre(&args[k], p);
    let n = args.len();

    let segment = match p.noms.fonction(nom) {
        Some(f) if f.direct().is_some() => {
            let direct = f.direct().map(|d| p.noms.nom(d)).unwrap_or(nom);
            Segment::Fonction {
                nom: direct.to_lowercase(),
                inverse: true,
                unite: f.est_trigonometrique().then_some(p.unite_angle),
                args: args.iter().map(|a| rendre(a, p)).collect(),
            }
        }
        Some(Fonction::Sqrt) if n == 1 => Segment::Racine {
            indice: 2,
            radicande: r(0),
        },
        Some(Fonction::Cqrt) if n == 1 => Segment::Racine {
            indice: 3,
            radicande: r(0),
        },
        Some(Fonction::Abs) if n == 1 => Segment::ValeurAbsolue(r(0)),
        Some(Fonction::Floor) if n == 1 => Segment::Plancher(r(0)),
        Some(Fonction::Ceiling) if n == 1 => Segment::Plafond(r(0)),
        Some(Fonction::Gamma) => generique("Γ", None, args, p),
        Some(Fonction::Sign) => generique("sgn", None, args, p),
        Some(Fonction::Power) if n == 2 => {
            rendre_puissance(&args[0], &args[1], p, out);
            return;
        }
        Some(Fonction::Log) if n == 1 => generique("ln", None, args, p),
        Some(Fonction::Log) if n == 2 => Segment::LogBase {
            base: r(1),
            arg: r(0),
        },
        Some(Fonction::Log10) if n == 1 => Segment::LogBase {
            base: entier(10, p).into(),
            arg: r(0),
        },
        Some(Fonction::Log2) if n == 1 => Segment::LogBase {
            base: entier(2, p).into(),
            arg: r(0),
        },
        Some(Fonction::Exp) if n == 1 => {
            let glyphe = p
                .constante("e")
                .map(|c| c.glyphe.clone())
                .unwrap_or_else(|| "e".into());
            Segment::Puissance {
                base: Segment::Constante { glyphe }.into(),
                exposant: r(0),
            }
        }
        Some(Fonction::Limit) if n == 2 => match borne_limite(&args[1]) {
            Some((variable, cible)) => Segment::Limite {
                corps: r(0),
                variable: rendre(variable, p),
                cible: rendre(cible, p),
            },
            None => generique_nom(nom, args, p),
        },
        Some(Fonction::D) if n == 2 => Segment::Derivee {
            corps: r(0),
            variable: r(1),
        },
        Some(f @ (Fonction::Sum | Fonction::Product | Fonction::Integrate)) if n == 2 => {
            match args[1].as_ref() {
                Expr::Array(t) if t.len() == 3 => Segment::GrandOperateur {
                    symbole: match f {
                        Fonction::Sum => '∑',
                        Fonction::Product => '∏',
                        _ => '∫',
                    },
                    corps: r(0),
                    index: rendre(&t[0], p),
                    bas: rendre(&t[1], p),
                    haut: rendre(&t[2], p),
                },
                _ => generique_nom(nom, args, p),
            }
        }
        Some(Fonction::Rational) if n == 2 => {
            match (args[0].as_rationnel_entier(), args[1].as_rationnel_entier()) {
                (Some(a), Some(b)) if !b.is_zero() => nombre(&(a / b), p),
                _ => Segment::Fraction {
                    num: r(0),
                    den: r(1),
                },
            }
        }
        _ => generique_nom(nom, args, p),
    };
    out.push(segment);
}

/// Limit[f, {x, a}] ou Limit[f, x->a]
fn borne_limite(e: &Expr) -> Option<(&Expr, &Expr)> {
    match e {
        Expr::Array(t) if t.len() == 2 => Some((t[0].as_ref(), t[1].as_ref())),
        Expr::Operator {
            gauche,
            symbole: Symbole::Fleche,
            droite,
        } => Some((gauche.as_ref(), droite.as_ref())),
        _ => None,
    }
}

fn generique(affiche: &str, unite: Option<UniteAngle>, args: &[Arc<Expr>], p: &Params) -> Segment {
    Segment::Fonction {
        nom: affiche.to_string(),
        inverse: false,
        unite,
        args: args.iter().map(|a| rendre(a, p)).collect(),
    }
}

/// Nom quelconque : minuscules, unité d’angle pour les circulaires.
fn generique_nom(nom: &str, args: &[Arc<Expr>], p: &Params) -> Segment {
    let trigo = p.noms.fonction(nom).is_some_and(|f| f.est_trigonometrique());
    generique(&nom.to_lowercase(), trigo.then_some(p.unite_angle), args, p)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::noyau::grammaire::Grammaire;
    use crate::noyau::params::ModeResultat;
    use crate::noyau::pratt::parse;

    fn texte_avec(s: &str, p: &Params) -> String {
        let e = parse(s, Grammaire::standard()).unwrap_or_else(|e| panic!("parse({s:?}) : {e}"));
        e.rendu(p).to_string()
    }

    fn texte(s: &str) -> String {
        texte_avec(s, &Params::default())
    }

    #[test]
    fn juxtaposition() {
        assert_eq!(texte("2*x"), "2x");
        assert_eq!(texte("x*2"), "2x");
        assert_eq!(texte("y*x"), "xy");
        assert_eq!(texte("2*(x+1)"), "2(x+1)");
        assert_eq!(texte("pi*x"), "π×x");
        assert_eq!(texte("2*3"), "2×3");
    }

    #[test]
    fn fractions_et_division() {
        assert_eq!(texte("1/2"), "1/2");
        assert_eq!(texte("(x+1)/2"), "(x+1)/2");
        assert_eq!(texte("(1/2)/3"), "1/2÷3");
        assert_eq!(texte("Log[8]/Log[2]"), "log_2(8)");
        match &texte_rendu("1/(x+1)").0[..] {
            [Segment::Fraction { den, .. }] => assert_eq!(den.len(), 3),
            autre => panic!("inattendu {autre:?}"),
        }
    }

    fn texte_rendu(s: &str) -> Segments {
        parse(s, Grammaire::standard())
            .unwrap_or_else(|e| panic!("parse({s:?}) : {e}"))
            .rendu(&Params::default())
    }

    #[test]
    fn racines() {
        assert_eq!(texte("x^(1/2)"), "√x");
        assert_eq!(texte("x^(2/3)"), "∛(x^2)");
        assert_eq!(texte("x^Rational[1, 5]"), "⁵√x");
        assert_eq!(texte("Sqrt[2]"), "√2");
        assert_eq!(texte("Cqrt[x+1]"), "∛(x+1)");
        assert_eq!(texte("Power[x, 1/2]"), "√x");
        assert_eq!(texte("x^2"), "x^2");
    }

    #[test]
    fn fonctions_usuelles() {
        let deg = Params::default().avec_unite(UniteAngle::Deg);
        assert_eq!(texte_avec("Sin[30]", &deg), "sin(30°)");
        assert_eq!(texte_avec("ArcSin[x]", &deg), "sin⁻¹(x)°");
        assert_eq!(texte("ArcSinh[x]"), "sinh⁻¹(x)");
        assert_eq!(texte("Abs[x]"), "|x|");
        assert_eq!(texte("Floor[x]"), "⌊x⌋");
        assert_eq!(texte("Gamma[x]"), "Γ(x)");
        assert_eq!(texte("Log[x]"), "ln(x)");
        assert_eq!(texte("Log[x, 3]"), "log_3(x)");
        assert_eq!(texte("Log10[x]"), "log_10(x)");
        assert_eq!(texte("Exp[x]"), "e^x");
        assert_eq!(texte("Foo[x, y]"), "foo(x, y)");
    }

    #[test]
    fn operateurs_symboliques() {
        assert_eq!(texte("Sum[i^2, {i, 1, n}]"), "∑[i=1..n](i^2)");
        assert_eq!(texte("Integrate[x, {x, 0, 1}]"), "∫[0..1](x)dx");
        assert_eq!(texte("Limit[1/x, x->0]"), "lim[x→0](1/x)");
        assert_eq!(texte("Limit[1/x, {x, 0}]"), "lim[x→0](1/x)");
        assert_eq!(texte("D[x^2, x]"), "d/dx(x^2)");
    }

    #[test]
    fn prefixes_et_postfixes() {
        assert_eq!(texte(".5"), "0.5");
        assert_eq!(texte("3!"), "3!");
        assert_eq!(texte("f'"), "f′");
        assert_eq!(texte("-x"), "-x");
    }

    #[test]
    fn rationnel_selon_le_mode() {
        let frac = Params::default().avec_mode(ModeResultat::Fraction);
        assert_eq!(texte_avec("Rational[1, 3]", &frac), "1/3");
        let dec = Params::default().avec_echelle(5);
        assert_eq!(texte_avec("Rational[1, 3]", &dec), "0.33333");
        assert_eq!(texte("Rational[x, 3]"), "x/3");
    }

    #[test]
    fn groupe_entre_parentheses() {
        let p = Params::default();
        let t = parse("1+2", Grammaire::standard()).unwrap();
        let g = Expr::group(t.clone());
        assert_eq!(g.rendu(&p).0, vec![Segment::Parens(t.rendu(&p))]);

        // littéral et fraction simple : rendus nus
        let l = Expr::literal("x");
        assert_eq!(Expr::group(l.clone()).rendu(&p), l.rendu(&p));
        let f = parse("1/x", Grammaire::standard()).unwrap();
        assert_eq!(Expr::group(f.clone()).rendu(&p), f.rendu(&p));
    }

    #[test]
    fn glyphes_des_identifiants() {
        use crate::noyau::params::Identifiant;
        let p = Params::default().avec_variable_liee("r", Identifiant::fixe("ρ", "2"));
        assert_eq!(texte_avec("r+pi+x+k", &p), "ρ+π+x+k");
    }
}
