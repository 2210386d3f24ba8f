//! Noyau — évaluation
//!
//! jetons -> arbre (Pratt) -> Expr::evaluate (réécriture ascendante) -> segments -> texte
//!
//! evaluate ne garantit pas un littéral terminal : seulement « pas moins réduit qu’avant ».
//! Un sous-arbre inchangé est rendu tel quel (même Arc), d’où evaluate(evaluate(T)) == evaluate(T).

use std::sync::Arc;

use log::{debug, warn};
use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::Zero;

use super::arith;
use super::erreur::{ErreurCalcul, ErreurEval};
use super::expr::{Expr, Symbole};
use super::fonctions;
use super::grammaire::Grammaire;
use super::jetons::{format_tokens, tokenize};
use super::nombre::Decimal;
use super::params::{Fonction, ModeResultat, Params};
use super::pratt::parse;
use super::rendu::exposant_fractionnaire;
use super::segments::Segments;

/// Substitutions imbriquées au-delà : récursion (constante définie par elle-même, etc.).
pub const PROFONDEUR_MAX: usize = 16;

#[derive(Default, Clone, Debug)]
pub struct Demarche {
    pub jetons: String,
    pub avant: String,
    pub apres: String,
    pub note: String,
}

#[derive(Clone, Debug)]
pub struct Resultat {
    /// Arbre tel qu’analysé.
    pub arbre: Arc<Expr>,
    /// Arbre après evaluate.
    pub reduit: Arc<Expr>,
    pub rendu: Segments,
    pub texte: String,
    pub demarche: Demarche,
}

impl Resultat {
    /// Valeur numérique, si la réduction a abouti à un nombre.
    pub fn valeur(&self) -> Option<Decimal> {
        self.reduit.as_decimal()
    }
}

/// API publique : analyse, réduit et rend une expression.
/// Les deux familles d’erreurs restent distinctes (ErreurCalcul::Analyse / ::Eval).
pub fn eval_expression(
    source: &str,
    p: &Params,
    grammaire: &Grammaire,
) -> Result<Resultat, ErreurCalcul> {
    let s = source.trim();

    // 1) Jetons (pour la démarche ; le parseur relit la source)
    let jetons = tokenize(s, grammaire)?;
    let jetons_txt = format_tokens(&jetons);
    debug!("jetons : {jetons_txt}");

    // 2) Arbre
    let arbre = parse(s, grammaire)?;
    debug!("arbre : {arbre}");

    // 3) Réduction
    let reduit = evaluer(&arbre, p)?;
    debug!("réduit : {reduit}");

    // 4) Rendu
    let rendu = reduit.rendu(p);
    let texte = rendu.to_string();

    let demarche = Demarche {
        jetons: jetons_txt,
        avant: arbre.to_string(),
        apres: reduit.to_string(),
        note: format!(
            "grammaire {}, échelle {}, angle {}, mode {}{}",
            grammaire.nom(),
            p.echelle(),
            p.unite_angle.nom(),
            p.mode.nom(),
            if p.complexe { ", complexe" } else { "" }
        ),
    };

    Ok(Resultat {
        arbre,
        reduit,
        rendu,
        texte,
        demarche,
    })
}

impl Expr {
    /// Réécriture ascendante selon Params. Le nœud racine est recopié (enfants partagés).
    pub fn evaluate(&self, p: &Params) -> Result<Arc<Expr>, ErreurEval> {
        evaluer(&Arc::new(self.clone()), p)
    }
}

/// Comme Expr::evaluate, en rendant le même Arc si rien ne change.
pub fn evaluer(e: &Arc<Expr>, p: &Params) -> Result<Arc<Expr>, ErreurEval> {
    eval(e, p, 0)
}

/// Opérande numérique : littéral nombre ou Rational[entier, entier].
pub(crate) fn valeur_numerique(e: &Expr, p: &Params) -> Option<Decimal> {
    match e {
        Expr::Literal(_) => e.as_decimal(),
        Expr::Function { nom, args }
            if args.len() == 2 && p.noms.fonction(nom) == Some(Fonction::Rational) =>
        {
            let a = args[0].as_rationnel_entier()?;
            let b = args[1].as_rationnel_entier()?;
            if b.is_zero() {
                return None;
            }
            Some(Decimal::from_rational(&(a / b), p.precision_travail()))
        }
        _ => None,
    }
}

fn eval(e: &Arc<Expr>, p: &Params, prof: usize) -> Result<Arc<Expr>, ErreurEval> {
    match e.as_ref() {
        Expr::Literal(t) => eval_literal(e, t, p, prof),

        Expr::Operator {
            gauche,
            symbole,
            droite,
        } => eval_operateur(e, gauche, *symbole, droite, p, prof),

        Expr::Prefix { symbole, operande } => eval_prefixe(e, *symbole, operande, p, prof),

        Expr::Postfix { operande, symbole } => {
            let x = encadrer(operande, eval(operande, p, prof)?, *symbole, true);
            if *symbole == Symbole::Factorielle {
                if let Some(n) = valeur_numerique(&x, p) {
                    return Ok(Expr::nombre(&arith::factorielle(&n, p.echelle())?));
                }
            }
            if Arc::ptr_eq(&x, operande) {
                Ok(e.clone())
            } else {
                Ok(Expr::postfix(x, *symbole))
            }
        }

        Expr::Group(contenu) => {
            let x = eval(contenu, p, prof)?;
            if x.est_literal() {
                Ok(x)
            } else if Arc::ptr_eq(&x, contenu) {
                Ok(e.clone())
            } else {
                Ok(Expr::group(x))
            }
        }

        Expr::Array(elements) => {
            let v = eval_tous(elements, p, prof)?;
            if let [seul] = v.as_slice() {
                return Ok(seul.clone());
            }
            if memes(elements, &v) {
                Ok(e.clone())
            } else {
                Ok(Expr::array(v))
            }
        }

        Expr::Function { nom, args } => eval_fonction(e, nom, args, p, prof),
    }
}

fn eval_tous(v: &[Arc<Expr>], p: &Params, prof: usize) -> Result<Vec<Arc<Expr>>, ErreurEval> {
    v.iter().map(|a| eval(a, p, prof)).collect()
}

fn memes(avant: &[Arc<Expr>], apres: &[Arc<Expr>]) -> bool {
    avant.len() == apres.len() && avant.iter().zip(apres).all(|(a, b)| Arc::ptr_eq(a, b))
}

/* ------------------------ Littéraux ------------------------ */

fn eval_literal(e: &Arc<Expr>, t: &str, p: &Params, prof: usize) -> Result<Arc<Expr>, ErreurEval> {
    if Decimal::parse(t).is_some() || p.mode == ModeResultat::Expression || p.est_variable_libre(t)
    {
        return Ok(e.clone());
    }
    let Some(id) = p.variable_liee(t).or_else(|| p.constante(t)) else {
        // nom inconnu
        return Ok(e.clone());
    };
    if prof >= PROFONDEUR_MAX {
        return Err(ErreurEval::Recursion { nom: t.to_string() });
    }
    let texte = (id.valeur)(p);
    normaliser(t, texte.trim(), p, prof + 1)
}

/// Texte d’une fermeture -> littéral canonique, quotient a/b, sinon ré-analyse.
fn normaliser(nom: &str, texte: &str, p: &Params, prof: usize) -> Result<Arc<Expr>, ErreurEval> {
    let n = p.echelle();
    if let Some(d) = Decimal::parse(texte) {
        return Ok(Expr::nombre(&d.arrondir(n)));
    }
    if let Some((a, b)) = texte.split_once('/') {
        if let (Some(a), Some(b)) = (Decimal::parse(a), Decimal::parse(b)) {
            let q = a.div(&b, n).ok_or(ErreurEval::DivisionParZero)?;
            return Ok(Expr::nombre(&q));
        }
    }

    warn!("« {nom} » : valeur non numérique « {texte} », ré-analysée");
    let arbre = parse(texte, Grammaire::standard())
        .map_err(|e| ErreurEval::domaine(nom, format!("valeur illisible ({e})")))?;
    eval(&arbre, p, prof)
}

/// Nom remplacé par une valeur non atomique : Group explicite là où la précédence l’exige
/// ("2*k", k = "x+1" -> 2*(x+1)).
fn encadrer(avant: &Arc<Expr>, apres: Arc<Expr>, parent: Symbole, a_droite: bool) -> Arc<Expr> {
    if avant.est_literal() && !Arc::ptr_eq(avant, &apres) && apres.exige_parentheses(parent, a_droite) {
        Expr::group(apres)
    } else {
        apres
    }
}

/* ------------------------ Opérateurs ------------------------ */

/// Log[x] à un argument -> x
fn log_simple<'a>(e: &'a Expr, p: &Params) -> Option<&'a Arc<Expr>> {
    match e {
        Expr::Function { nom, args } if args.len() == 1 && p.noms.fonction(nom) == Some(Fonction::Log) => {
            args.first()
        }
        _ => None,
    }
}

/// base^(a/b) par racine exacte ; None si la base n’est pas numérique.
fn puissance_fractionnaire(
    base: &Expr,
    (a, b): (BigInt, BigInt),
    p: &Params,
) -> Result<Option<Arc<Expr>>, ErreurEval> {
    let Some(x) = valeur_numerique(base, p) else {
        return Ok(None);
    };
    let r = BigRational::new(a, b);
    fonctions::resultat_numerique(arith::puissance_rationnelle(&x, &r, p.echelle()), p)
}

fn eval_operateur(
    e: &Arc<Expr>,
    gauche: &Arc<Expr>,
    symbole: Symbole,
    droite: &Arc<Expr>,
    p: &Params,
    prof: usize,
) -> Result<Arc<Expr>, ErreurEval> {
    // changement de base : Log[a]/Log[b] -> Log[a, b]
    if symbole == Symbole::Divise {
        if let (Some(a), Some(b)) = (log_simple(gauche, p), log_simple(droite, p)) {
            let nom = p.noms.nom(Fonction::Log).to_string();
            return eval(&Expr::function(nom, vec![a.clone(), b.clone()]), p, prof);
        }
    }

    // exposant a/b : racine exacte ; l’exposant reste intact sur une base symbolique
    if symbole == Symbole::Puissance {
        if let Some(r) = exposant_fractionnaire(droite, p) {
            let g = encadrer(gauche, eval(gauche, p, prof)?, symbole, false);
            if let Some(v) = puissance_fractionnaire(&g, r, p)? {
                return Ok(v);
            }
            return Ok(if Arc::ptr_eq(&g, gauche) {
                e.clone()
            } else {
                Expr::operator(g, symbole, droite.clone())
            });
        }
    }

    let g = encadrer(gauche, eval(gauche, p, prof)?, symbole, false);
    let d = encadrer(droite, eval(droite, p, prof)?, symbole, true);

    if let (Some(a), Some(b)) = (valeur_numerique(&g, p), valeur_numerique(&d, p)) {
        let n = p.echelle();
        let v = match symbole {
            Symbole::Plus => Some(Ok(a.add(&b, n))),
            Symbole::Moins => Some(Ok(a.sub(&b, n))),
            Symbole::Fois => Some(Ok(a.mul(&b, n))),
            Symbole::Divise => Some(a.div(&b, n).ok_or(ErreurEval::DivisionParZero)),
            Symbole::Puissance => Some(arith::puissance(&a, &b, n)),
            _ => None,
        };
        if let Some(v) = v {
            if let Some(r) = fonctions::resultat_numerique(v, p)? {
                return Ok(r);
            }
        }
    }

    if Arc::ptr_eq(&g, gauche) && Arc::ptr_eq(&d, droite) {
        Ok(e.clone())
    } else {
        Ok(Expr::operator(g, symbole, d))
    }
}

fn eval_prefixe(
    e: &Arc<Expr>,
    symbole: Symbole,
    operande: &Arc<Expr>,
    p: &Params,
    prof: usize,
) -> Result<Arc<Expr>, ErreurEval> {
    if symbole == Symbole::Point {
        if let Expr::Literal(t) = operande.as_ref() {
            if t.bytes().all(|b| b.is_ascii_digit()) {
                if let Some(d) = Decimal::parse(&format!("0.{t}")) {
                    return Ok(Expr::nombre(&d));
                }
            }
        }
    }

    let x = encadrer(operande, eval(operande, p, prof)?, symbole, true);
    match symbole {
        Symbole::Moins | Symbole::Plus => {
            if let Some(v) = valeur_numerique(&x, p) {
                let v = if symbole == Symbole::Moins { v.neg() } else { v };
                return Ok(Expr::nombre(&v.arrondir(p.echelle())));
            }
        }
        _ => {}
    }
    if Arc::ptr_eq(&x, operande) {
        Ok(e.clone())
    } else {
        Ok(Expr::prefix(symbole, x))
    }
}

/* ------------------------ Fonctions ------------------------ */

fn eval_fonction(
    e: &Arc<Expr>,
    nom: &str,
    args: &[Arc<Expr>],
    p: &Params,
    prof: usize,
) -> Result<Arc<Expr>, ErreurEval> {
    // Power[b, a/q] : même règle que ^
    if let [base, exposant] = args {
        if p.noms.fonction(nom) == Some(Fonction::Power) {
            if let Some(r) = exposant_fractionnaire(exposant, p) {
                let b = eval(base, p, prof)?;
                if let Some(v) = puissance_fractionnaire(&b, r, p)? {
                    return Ok(v);
                }
                return Ok(if Arc::ptr_eq(&b, base) {
                    e.clone()
                } else {
                    Expr::function(nom, vec![b, exposant.clone()])
                });
            }
        }
    }

    let v = eval_tous(args, p, prof)?;
    if let Some(r) = fonctions::reduire(nom, &v, p)? {
        return Ok(r);
    }
    if memes(args, &v) {
        Ok(e.clone())
    } else {
        Ok(Expr::function(nom, v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::noyau::params::{Identifiant, UniteAngle};

    fn ok_avec(s: &str, p: &Params) -> Resultat {
        eval_expression(s, p, Grammaire::standard())
            .unwrap_or_else(|e| panic!("eval_expression({s:?}) erreur: {e}"))
    }

    fn ok_texte(s: &str) -> String {
        ok_avec(s, &Params::default()).texte
    }

    fn err_eval(s: &str, p: &Params) -> ErreurEval {
        match eval_expression(s, p, Grammaire::standard()) {
            Err(ErreurCalcul::Eval(e)) => e,
            autre => panic!("erreur d’évaluation attendue pour {s:?}, obtenu {autre:?}"),
        }
    }

    // --- Arithmétique ---

    #[test]
    fn precedences_et_arithmetique() {
        assert_eq!(ok_texte("2+3*4"), "14");
        assert_eq!(ok_texte("2^3^2"), "512");
        assert_eq!(ok_texte("-3+1"), "-2");
        assert_eq!(ok_texte("0.1+0.2"), "0.3");
        assert_eq!(ok_texte("7/2"), "3.5");
        let p = Params::default().avec_echelle(5);
        assert_eq!(ok_avec("1/3", &p).texte, "0.33333");
    }

    #[test]
    fn division_par_zero() {
        assert_eq!(err_eval("1/0", &Params::default()), ErreurEval::DivisionParZero);
        assert_eq!(err_eval("0^-1", &Params::default()), ErreurEval::DivisionParZero);
    }

    #[test]
    fn puissances_fractionnaires_exactes() {
        assert_eq!(ok_texte("8^(1/3)"), "2");
        assert_eq!(ok_texte("8^(2/3)"), "4");
        assert_eq!(ok_texte("(-8)^(1/3)"), "-2");
        assert_eq!(ok_texte("16^Rational[1, 4]"), "2");
        assert_eq!(ok_texte("Power[27, 1/3]"), "3");
        // base symbolique : la racine est conservée
        assert_eq!(ok_texte("x^(1/2)"), "√x");
    }

    #[test]
    fn changement_de_base() {
        assert_eq!(ok_texte("Log[8]/Log[2]"), "3");
        let r = ok_avec("Log[x]/Log[2]", &Params::default());
        assert!(matches!(r.reduit.as_ref(), Expr::Function { nom, args } if nom == "Log" && args.len() == 2));
        assert_eq!(r.texte, "log_2(x)");
    }

    // --- Préfixes, postfixes, groupes ---

    #[test]
    fn prefixes_postfixes() {
        assert_eq!(ok_texte(".5"), "0.5");
        assert_eq!(ok_texte(".5*2"), "1");
        assert_eq!(ok_texte("5!"), "120");
        assert_eq!(ok_texte("0!"), "1");
        assert_eq!(ok_texte("x!"), "x!");
        assert_eq!(ok_texte("f'"), "f′");
        assert_eq!(ok_texte("-x"), "-x");
        assert!(matches!(
            err_eval("(-1)!", &Params::default()),
            ErreurEval::Domaine { .. }
        ));
    }

    #[test]
    fn groupes_et_tableaux() {
        assert_eq!(ok_texte("(2)"), "2");
        assert_eq!(ok_texte("{1+1}"), "2");
        assert_eq!(ok_texte("{1, x}"), "{1, x}");
        assert_eq!(ok_texte("2*(x+1)"), "2(x+1)");
    }

    // --- Symbolique ---

    #[test]
    fn sous_arbres_inchanges_partages() {
        let r = ok_avec("x+1", &Params::default());
        assert!(Arc::ptr_eq(&r.arbre, &r.reduit));
        assert_eq!(r.texte, "x+1");
        assert!(r.valeur().is_none());
    }

    #[test]
    fn idempotence_simple() {
        let p = Params::default();
        for s in ["x+2*3", "Sin[x]+pi", "Sum[i, {i, 1, n}]", "(x+1)^(1/2)", "Log[y]/Log[x]"] {
            let t = parse(s, Grammaire::standard()).unwrap();
            let une = evaluer(&t, &p).unwrap();
            let deux = evaluer(&une, &p).unwrap();
            assert_eq!(une, deux, "expr={s:?}");
        }
    }

    // --- Identifiants ---

    #[test]
    fn constantes_et_variables_liees() {
        let p = Params::default()
            .avec_constante("g", Identifiant::fixe("g", "9.81"))
            .avec_variable_liee("q", Identifiant::fixe("q", "1/4"))
            .avec_constante("k", Identifiant::fixe("κ", "2*x"));
        assert_eq!(ok_avec("2*g", &p).texte, "19.62");
        assert_eq!(ok_avec("q", &p).texte, "0.25");
        assert_eq!(ok_avec("k+1", &p).texte, "2x+1");
    }

    #[test]
    fn substitution_parenthesee_selon_precedence() {
        let p = Params::default().avec_constante("k", Identifiant::fixe("κ", "x+1"));
        let cas = [
            ("2*k", "2(x+1)", "2*(x+1)"),
            ("1-k", "1-(x+1)", "1-(x+1)"),
            ("k^2", "(x+1)^2", "(x+1)^2"),
            ("y*k", "y(x+1)", "y*(x+1)"),
            ("-k", "-(x+1)", "-(x+1)"),
            ("k!", "(x+1)!", "(x+1)!"),
            // à gauche d’un opérateur de même niveau : rien à ajouter
            ("k-1", "x+1-1", "x+1-1"),
        ];
        for (source, texte, apres) in cas {
            let r = ok_avec(source, &p);
            assert_eq!(r.texte, texte, "source={source:?}");
            assert_eq!(r.demarche.apres, apres, "source={source:?}");

            // le texte source se relit en un arbre équivalent
            let relu = evaluer(&parse(&r.demarche.apres, Grammaire::standard()).unwrap(), &p).unwrap();
            assert_eq!(relu, r.reduit, "source={source:?}");
        }
    }

    #[test]
    fn mode_expression_sans_substitution() {
        let p = Params::default().avec_mode(ModeResultat::Expression);
        assert_eq!(ok_avec("pi+1", &p).texte, "π+1");
        let p = Params::default().avec_echelle(5);
        assert_eq!(ok_avec("pi", &p).texte, "3.1416");
    }

    #[test]
    fn recursion_bornee() {
        let p = Params::default().avec_constante("a", Identifiant::fixe("a", "a+1"));
        assert_eq!(
            err_eval("a", &p),
            ErreurEval::Recursion { nom: "a".into() }
        );
    }

    #[test]
    fn demarche_renseignee() {
        let p = Params::default().avec_unite(UniteAngle::Deg);
        let r = ok_avec("Sin[30]", &p);
        assert_eq!(r.texte, "0.5");
        assert!(r.demarche.jetons.contains("Sin"));
        assert_eq!(r.demarche.avant, "Sin[30]");
        assert_eq!(r.demarche.apres, "0.5");
        assert!(r.demarche.note.contains("deg"));
    }
}
