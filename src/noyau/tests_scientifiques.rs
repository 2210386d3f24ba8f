//! Tests scientifiques (campagne) : invariants + domaines + limites contrôlées.
//!
//! But : trouver les limites sans faire chauffer la machine.
//! - budget temps global
//! - tailles bornées (profondeur, longueur)
//! - échelle modeste (20 chiffres) sauf mention
//!
//! Notes :
//! - Les angles spéciaux exacts ne sont reconnus qu’en DEG/GRAD (multiple rationnel du demi-tour).
//!   En RAD, π passe par sa valeur décimale : sin(π) n’est qu’infime, pas 0.
//! - Les comparaisons à une valeur irrationnelle passent par `assert_proche` (écart ≤ 10^-k),
//!   jamais par égalité de texte sur le dernier chiffre.

use std::time::{Duration, Instant};

use super::erreur::{ErreurAnalyse, ErreurCalcul, ErreurEval, ErreurSyntaxe};
use super::eval::{eval_expression, Resultat};
use super::expr::Expr;
use super::grammaire::Grammaire;
use super::jetons::Categorie;
use super::nombre::Decimal;
use super::params::{Identifiant, ModeResultat, Params, UniteAngle};

fn eval_ok(expr: &str, p: &Params) -> Resultat {
    eval_expression(expr, p, Grammaire::standard())
        .unwrap_or_else(|e| panic!("expr={expr:?} err={e}"))
}

fn ok_exact(expr: &str) -> String {
    eval_ok(expr, &Params::default()).texte
}

fn assert_exact_eq(expr: &str, attendu: &str, p: &Params) {
    let r = eval_ok(expr, p);
    assert_eq!(r.texte.trim(), attendu.trim(), "expr={expr:?}");
}

fn erreur_eval(expr: &str, p: &Params) -> ErreurEval {
    match eval_expression(expr, p, Grammaire::standard()) {
        Err(ErreurCalcul::Eval(e)) => e,
        autre => panic!("erreur d’évaluation attendue, expr={expr:?} obtenu={autre:?}"),
    }
}

fn assert_domaine(expr: &str, p: &Params) {
    let e = erreur_eval(expr, p);
    assert!(matches!(e, ErreurEval::Domaine { .. }), "expr={expr:?} err={e}");
}

fn assert_contains(hay: &str, needle: &str) {
    if !hay.contains(needle) {
        panic!("attendu que {hay:?} contienne {needle:?}");
    }
}

/// |valeur(expr) − attendu| < 10^-k
fn assert_proche(expr: &str, attendu: &str, k: i64) {
    let r = eval_ok(expr, &Params::default());
    let v = r
        .valeur()
        .unwrap_or_else(|| panic!("pas de valeur numérique pour {expr:?} ({})", r.texte));
    let a = Decimal::parse(attendu).unwrap_or_else(|| panic!("numéral invalide {attendu:?}"));
    let ecart = v.sub(&a, 60).abs();
    assert!(
        ecart.is_zero() || ecart.magnitude() < -k,
        "expr={expr:?} valeur={v} attendu={attendu} écart={ecart}"
    );
}

/// Budget global anti-gel.
fn budget(start: Instant, max: Duration) {
    if start.elapsed() > max {
        panic!("budget temps dépassé: {:?}", max);
    }
}

fn deg() -> Params {
    Params::default().avec_unite(UniteAngle::Deg)
}

const PI: &str = "3.14159265358979323846264338327950288";

/* ------------------------ Analyse ------------------------ */

#[test]
fn sci_precedences_standard() {
    let r = eval_ok("2+3*4", &Params::default());
    match r.arbre.as_ref() {
        Expr::Operator { droite, .. } => assert!(matches!(droite.as_ref(), Expr::Operator { .. })),
        autre => panic!("arbre inattendu {autre:?}"),
    }
    assert_eq!(r.texte, "14");
    assert_eq!(ok_exact("2^3^2"), "512");
    assert_eq!(ok_exact("-2^2"), "-4");
    assert_eq!(ok_exact("(1+2)*(3+4)"), "21");
}

#[test]
fn sci_grammaire_plate() {
    let p = Params::default();
    let plat = |s: &str| {
        eval_expression(s, &p, Grammaire::plate())
            .unwrap_or_else(|e| panic!("expr={s:?} err={e}"))
            .texte
    };
    assert_eq!(plat("2+3*4"), "20");
    assert_eq!(plat("1+2*3-4"), "5");
    assert_eq!(plat("2*(3+4)"), "14");

    // appels, préfixes et postfixes dans la même chaîne gauche -> droite
    assert_eq!(plat("2+Sin[0]"), "2");
    assert_eq!(plat("2*Sqrt[4]"), "4");
    assert_eq!(plat("-Sqrt[4]+1"), "-1");
    assert_eq!(plat("2^Sqrt[4]"), "4");
    assert_eq!(plat(".5*4"), "2");
    assert_eq!(plat("3!+1"), "7");
    assert_eq!(plat("2+3!"), "120");
    assert_eq!(plat("2*3^2"), "18");
}

#[test]
fn sci_erreurs_d_analyse() {
    let p = Params::default();
    let g = Grammaire::standard();

    match eval_expression("@", &p, g) {
        Err(ErreurCalcul::Analyse(ErreurAnalyse::Lexicale(e))) => assert_eq!(e.caractere, '@'),
        autre => panic!("lexicale attendue, obtenu {autre:?}"),
    }
    match eval_expression("(2+3", &p, g) {
        Err(ErreurCalcul::Analyse(ErreurAnalyse::Syntaxe(ErreurSyntaxe::Attendu { attendu, .. }))) => {
            assert_eq!(attendu, Categorie::ParD)
        }
        autre => panic!("Attendu ParD, obtenu {autre:?}"),
    }
    match eval_expression("2 3", &p, g) {
        Err(ErreurCalcul::Analyse(ErreurAnalyse::Syntaxe(ErreurSyntaxe::Attendu { attendu, .. }))) => {
            assert_eq!(attendu, Categorie::Fin)
        }
        autre => panic!("Attendu Fin, obtenu {autre:?}"),
    }
    assert!(matches!(
        eval_expression("2+", &p, g),
        Err(ErreurCalcul::Analyse(ErreurAnalyse::Syntaxe(ErreurSyntaxe::SansPrefixe { .. })))
    ));
    assert!(matches!(
        eval_expression("3[2]", &p, g),
        Err(ErreurCalcul::Analyse(ErreurAnalyse::Syntaxe(ErreurSyntaxe::NomDeFonction { .. })))
    ));
}

/* ------------------------ Trigonométrie (angles spéciaux) ------------------------ */

#[test]
fn sci_angles_speciaux_degres() {
    let p = deg();
    assert_exact_eq("Sin[30]", "0.5", &p);
    assert_exact_eq("Cos[60]", "0.5", &p);
    assert_exact_eq("Tan[45]", "1", &p);
    assert_exact_eq("Sin[-30]", "-0.5", &p);
    assert_exact_eq("Cos[90]", "0", &p);
    assert_exact_eq("Sin[180]", "0", &p);
    assert_exact_eq("Sin[45]", "0.7071067811865475244", &p);

    // périodicité : 390° = 30° + 360°
    assert_exact_eq("Sin[390]", "0.5", &p);

    // réciproques
    assert_exact_eq("Csc[30]", "2", &p);
    assert_exact_eq("Sec[60]", "2", &p);
    assert_exact_eq("Cot[45]", "1", &p);
}

#[test]
fn sci_indefinis_tan() {
    let p = deg();
    assert_domaine("Tan[90]", &p);
    assert_domaine("Tan[270]", &p);
    assert_domaine("Tan[-90]", &p);
    assert_domaine("Csc[0]", &p);
    // l’erreur contamine l’expression entière
    assert_domaine("1 + Tan[90]", &p);
}

#[test]
fn sci_grades() {
    let p = Params::default().avec_unite(UniteAngle::Grad);
    assert_exact_eq("Sin[100]", "1", &p);
    assert_exact_eq("Cos[200]", "-1", &p);
    assert_exact_eq("ArcSin[1]", "100", &p);
}

#[test]
fn sci_trig_inverse_degres() {
    let p = deg();
    assert_exact_eq("ArcSin[0.5]", "30", &p);
    assert_exact_eq("ArcCos[0.5]", "60", &p);
    assert_exact_eq("ArcCos[-0.5]", "120", &p);
    assert_exact_eq("ArcTan[1]", "45", &p);
    assert_exact_eq("ArcCos[-1]", "180", &p);
    assert_exact_eq("ArcSin[-1]", "-90", &p);
    assert_exact_eq("ArcCot[0]", "90", &p);
    assert_domaine("ArcSin[2]", &p);
}

#[test]
fn sci_trig_radians() {
    assert_proche("Sin[1]", "0.8414709848078965066525", 18);
    assert_proche("Cos[pi]", "-1", 18);
    assert_proche("Sin[pi]", "0", 18);
    assert_proche("ArcTan[1]*4", PI, 18);
}

/* ------------------------ Exponentielle / logarithmes / Γ ------------------------ */

#[test]
fn sci_ln_exp() {
    assert_proche("Exp[Log[2]]", "2", 18);
    assert_proche("Log[Exp[3]]", "3", 18);
    assert_proche("Log[e]", "1", 18);
    assert_proche("Exp[1]", "2.718281828459045235360287", 18);
    assert_exact_eq("Log[1]", "0", &Params::default());
    assert_domaine("Log[-2]", &Params::default());
}

#[test]
fn sci_changement_de_base() {
    assert_eq!(ok_exact("Log[27]/Log[3]"), "3");
    assert_eq!(ok_exact("Log[x]/Log[y]"), "log_y(x)");
    assert_eq!(ok_exact("Log[1000, 10]"), "3");
}

#[test]
fn sci_gamma_et_factorielle() {
    assert_eq!(ok_exact("5!"), "120");
    assert_eq!(ok_exact("0!"), "1");
    assert_eq!(ok_exact("Gamma[1]"), "1");
    assert_proche("Gamma[1/2]^2", PI, 18);
    assert_proche("Gamma[0.5]", "1.772453850905516027298167", 18);
    // x! = Γ(x + 1) hors des entiers
    assert_proche("0.5!", "0.886226925452758013649083", 18);
    assert_domaine("Gamma[0]", &Params::default());
    assert_domaine("Gamma[-2]", &Params::default());
}

/* ------------------------ Entiers ------------------------ */

#[test]
fn sci_npr_ncr_gcd_lcm_mod() {
    assert_eq!(ok_exact("Npr[10, 3]"), "720");
    assert_eq!(ok_exact("Ncr[10, 3]"), "120");
    assert_eq!(ok_exact("Ncr[50, 25]"), "126410606437752");
    assert_eq!(ok_exact("Gcd[0, 5]"), "5");
    assert_eq!(ok_exact("Lcm[2, 3, 4]"), "12");
    assert_eq!(ok_exact("Mod[5.5, 2]"), "1.5");
    assert_domaine("Npr[-1, 2]", &Params::default());
    assert_eq!(erreur_eval("Mod[3, 0]", &Params::default()), ErreurEval::DivisionParZero);
}

/* ------------------------ Modes de résultat ------------------------ */

#[test]
fn sci_modes_de_resultat() {
    let fixe = Params::default().avec_mode(ModeResultat::Fixe).avec_echelle(5);
    assert_exact_eq("1/4", "0.25000", &fixe);

    let sci = Params::default().avec_mode(ModeResultat::Scientifique);
    assert_exact_eq("0.00004331", "4.331e-5", &sci);
    assert_exact_eq("1500*1", "1.5e3", &sci);

    let ing = Params::default().avec_mode(ModeResultat::Ingenieur);
    assert_exact_eq("0.00004331", "43.31e-6", &ing);

    let frac = Params::default().avec_mode(ModeResultat::Fraction);
    assert_exact_eq("0.75", "3/4", &frac);
    assert_exact_eq("1/3", "1/3", &frac);

    let mixte = Params::default().avec_mode(ModeResultat::FractionMixte);
    assert_exact_eq("22/7", "3 1/7", &mixte);

    let expr = Params::default().avec_mode(ModeResultat::Expression);
    assert_exact_eq("pi*2", "2π", &expr);

    assert_exact_eq("1/8", "0.125", &Params::default());
}

/* ------------------------ Identifiants ------------------------ */

#[test]
fn sci_fermetures_de_constantes() {
    let p = Params::default()
        .avec_constante("c", Identifiant::fixe("c", "299792458"))
        .avec_constante("t", Identifiant::fixe("t", "1/3"))
        .avec_constante("tau", Identifiant::new("τ", |_: &Params| "2*pi".to_string()))
        .avec_constante(
            "ech",
            Identifiant::new("ε", |p: &Params| p.echelle().to_string()),
        );
    assert_exact_eq("c/1000", "299792.458", &p);
    assert_exact_eq("t", "0.33333333333333333333", &p);
    assert_exact_eq("tau", "6.283185307179586477", &p);
    assert_exact_eq("ech", "20", &p);

    // rendu sans évaluation : glyphe
    let expr = p.clone().avec_mode(ModeResultat::Expression);
    assert_exact_eq("tau", "τ", &expr);
}

#[test]
fn sci_garde_de_recursion() {
    let p = Params::default()
        .avec_constante("a", Identifiant::fixe("a", "b"))
        .avec_constante("b", Identifiant::fixe("b", "a"));
    let e = erreur_eval("a+1", &p);
    assert!(matches!(e, ErreurEval::Recursion { .. }), "{e}");

    // chaîne courte : correcte
    let p = Params::default()
        .avec_constante("a", Identifiant::fixe("a", "b+1"))
        .avec_constante("b", Identifiant::fixe("b", "2"));
    assert_exact_eq("a", "3", &p);
}

/* ------------------------ Symbolique ------------------------ */

#[test]
fn sci_sum_reste_symbolique() {
    let r = eval_ok("Sum[i^2, {i, 1, 10}]", &Params::default());
    match r.reduit.as_ref() {
        Expr::Function { nom, .. } => assert_eq!(nom, "Sum"),
        autre => panic!("Sum attendu, obtenu {autre:?}"),
    }
    assert_contains(&r.texte, "∑");
    assert!(r.valeur().is_none());

    let r = eval_ok("Limit[Sin[x]/x, x->0]", &Params::default());
    assert_eq!(r.texte, "lim[x→0](sin(x)/x)");
}

/* ------------------------ Bornes ------------------------ */

#[test]
fn sci_depassements() {
    let p = Params::default();
    for expr in ["10^200000", "9^9^9", "100000!", "Exp[10^7]"] {
        let e = erreur_eval(expr, &p);
        assert!(matches!(e, ErreurEval::Depassement { .. }), "expr={expr:?} err={e}");
    }
    // infime : ramené à 0
    assert_eq!(ok_exact("10^-200000"), "0");
}

/* ------------------------ Stress contrôlé (sans brûler) ------------------------ */

#[test]
fn sci_stress_factorielle() {
    let t0 = Instant::now();
    let sci = Params::default().avec_mode(ModeResultat::Scientifique);
    assert_exact_eq("1000!", "4.0238726007709377354e2567", &sci);
    budget(t0, Duration::from_secs(5));
}

#[test]
fn sci_stress_taille_somme_safe() {
    let t0 = Instant::now();
    let max = Duration::from_secs(2);

    // somme linéaire modérée (arbre profond à gauche)
    let mut expr = String::new();
    for k in 0..80 {
        if k > 0 {
            expr.push_str(" + ");
        }
        expr.push_str("1/2");
        budget(t0, max);
    }
    assert_eq!(ok_exact(&expr), "40");
}

#[test]
fn sci_stress_parentheses() {
    let t0 = Instant::now();
    let expr = format!("{}1{}", "(".repeat(60), ")".repeat(60));
    assert_eq!(ok_exact(&expr), "1");
    budget(t0, Duration::from_secs(2));
}

#[test]
fn sci_stress_bigint_safe() {
    let t0 = Instant::now();

    // gros numérateur contrôlé (100 chiffres)
    let big = "9".repeat(100);
    let expr = format!("{big}/7 + 1/7");
    let r = eval_ok(&expr, &Params::default());
    assert!(r.valeur().is_some());
    budget(t0, Duration::from_secs(2));
}

#[test]
fn sci_haute_precision() {
    let t0 = Instant::now();
    let p = Params::default().avec_echelle(60);
    let r = eval_ok("pi", &p);
    assert_eq!(
        r.texte,
        "3.14159265358979323846264338327950288419716939937510582097494"
    );
    budget(t0, Duration::from_secs(2));
}
