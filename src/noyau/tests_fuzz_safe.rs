//! Tests fuzz safe : robustesse + idempotence + limites contrôlées.
//!
//! But : marteler le pipeline sans brûler la machine.
//! - expressions générées par proptest, profondeur bornée
//! - pas de factorielle (croissance hors budget)
//! - budget temps global sur les cas déterministes
//! - on accepte certaines erreurs attendues (division par zéro, hors domaine, dépassement)
//! - invariant clé : evaluer(evaluer(T)) == evaluer(T)
//! - le texte source de evaluer(T) se relit et se réévalue en evaluer(T)

use std::sync::Arc;
use std::time::{Duration, Instant};

use proptest::prelude::*;
use proptest::strategy::BoxedStrategy;

use super::erreur::ErreurEval;
use super::eval::{eval_expression, evaluer};
use super::expr::Expr;
use super::grammaire::Grammaire;
use super::params::{Identifiant, ModeResultat, Params};
use super::pratt::parse;
use super::segments::{Segment, Segments};

/* ------------------------ Budget anti-gel ------------------------ */

fn budget(start: Instant, max: Duration) {
    if start.elapsed() > max {
        panic!("budget temps dépassé: {:?}", max);
    }
}

/* ------------------------ Helpers fuzz ------------------------ */

fn is_erreur_attendue(e: &ErreurEval) -> bool {
    // Liste blanche : erreurs *normales* pour un fuzz, le domaine réel est volontairement limité.
    matches!(
        e,
        ErreurEval::DivisionParZero | ErreurEval::Domaine { .. } | ErreurEval::Depassement { .. }
    )
}

fn params_fuzz() -> Params {
    // k : constante fermée sur une expression (re-parse à chaque substitution)
    Params::default()
        .avec_echelle(12)
        .avec_constante("k", Identifiant::fixe("κ", "2*x+1"))
}

fn arbre(source: &str) -> Arc<Expr> {
    parse(source, Grammaire::standard())
        .unwrap_or_else(|e| panic!("source générée illisible {source:?} : {e}"))
}

/* ------------------------ Génération d’expressions (bornée) ------------------------ */

fn feuille() -> impl Strategy<Value = String> {
    prop_oneof![
        (0u32..10).prop_map(|n| n.to_string()),
        Just("x".to_string()),
        Just("y".to_string()),
        Just("pi".to_string()),
        Just("e".to_string()),
        Just("0.5".to_string()),
        Just("k".to_string()),
    ]
}

fn expression() -> BoxedStrategy<String> {
    feuille()
        .prop_recursive(4, 24, 2, |inner| {
            let fonction = prop_oneof![
                Just("Sin"),
                Just("Cos"),
                Just("Sqrt"),
                Just("Log"),
                Just("Exp"),
                Just("Abs"),
                Just("Gamma"),
                Just("Floor"),
                Just("Foo"),
            ];
            prop_oneof![
                (inner.clone(), prop_oneof![Just("+"), Just("-"), Just("*"), Just("/"), Just("^")], inner.clone())
                    .prop_map(|(a, op, b)| format!("{a} {op} {b}")),
                inner.clone().prop_map(|a| format!("({a})")),
                inner.clone().prop_map(|a| format!("-{a}")),
                (fonction, inner.clone()).prop_map(|(f, a)| format!("{f}[{a}]")),
                (inner.clone(), inner.clone()).prop_map(|(a, b)| format!("Mod[{a}, {b}]")),
                inner.clone().prop_map(|a| format!("Sum[{a}, {{i, 1, 3}}]")),
            ]
        })
        .boxed()
}

/* ------------------------ Helper somme balancée anti pile ------------------------ */

fn somme_balancee(terme: &str, n: usize) -> String {
    let mut items: Vec<String> = (0..n).map(|_| terme.to_string()).collect();
    while items.len() > 1 {
        let mut next = Vec::new();
        let mut i = 0;
        while i < items.len() {
            if i + 1 < items.len() {
                next.push(format!("({}+{})", items[i], items[i + 1]));
                i += 2;
            } else {
                next.push(items[i].clone());
                i += 1;
            }
        }
        items = next;
    }
    items.pop().unwrap_or_else(|| "0".to_string())
}

/* ------------------------ Propriétés ------------------------ */

proptest! {
    #![proptest_config(ProptestConfig::with_cases(96))]

    #[test]
    fn fuzz_safe_evaluation_idempotente(source in expression()) {
        let p = params_fuzz();
        let t = arbre(&source);
        match evaluer(&t, &p) {
            Ok(v) => {
                let encore = evaluer(&v, &p)
                    .unwrap_or_else(|e| panic!("ré-évaluation en erreur : {source:?} -> {v} : {e}"));
                prop_assert_eq!(encore, v, "source={:?}", source);
            }
            Err(e) => prop_assert!(is_erreur_attendue(&e), "erreur non attendue: {source:?} err={e}"),
        }
    }

    #[test]
    fn fuzz_safe_texte_source_relu_a_l_identique(source in expression()) {
        // k = "2*x+1" substitué sous * / ^ - : les parenthèses doivent survivre au texte
        let p = params_fuzz();
        let Ok(v) = evaluer(&arbre(&source), &p) else {
            return Ok(());
        };
        let texte = v.to_string();
        let relu = parse(&texte, Grammaire::standard())
            .unwrap_or_else(|e| panic!("texte illisible {texte:?} (source {source:?}) : {e}"));
        let encore = evaluer(&relu, &p)
            .unwrap_or_else(|e| panic!("relecture en erreur : {texte:?} : {e}"));
        prop_assert_eq!(encore, v, "source={:?} texte={:?}", source, texte);
    }

    #[test]
    fn fuzz_safe_groupe_entre_parentheses(source in expression()) {
        let p = params_fuzz();
        let contenu = arbre(&source);
        prop_assume!(!contenu.est_literal() && !contenu.est_fraction_simple());

        let groupe = Expr::Group(contenu.clone());
        let attendu = Segments(vec![Segment::Parens(contenu.rendu(&p))]);
        prop_assert_eq!(groupe.rendu(&p), attendu);
    }

    #[test]
    fn fuzz_safe_rendu_deterministe(source in expression()) {
        let p = params_fuzz().avec_mode(ModeResultat::Expression);
        let a = eval_expression(&source, &p, Grammaire::standard());
        let b = eval_expression(&source, &p, Grammaire::standard());
        match (a, b) {
            (Ok(a), Ok(b)) => prop_assert_eq!(a.texte, b.texte),
            (Err(a), Err(b)) => prop_assert_eq!(a, b),
            (a, b) => prop_assert!(false, "résultats divergents : {a:?} / {b:?}"),
        }
    }

    #[test]
    fn fuzz_safe_source_arbitraire_sans_panique(source in "[0-9a-z+*/^().,!'\\[\\]{} -]{0,24}") {
        // l’erreur est permise, pas la panique
        let _ = eval_expression(&source, &params_fuzz(), Grammaire::standard());
    }
}

/* ------------------------ Tests déterministes ------------------------ */

#[test]
fn fuzz_safe_somme_balancee_anti_pile() {
    let t0 = Instant::now();
    let max = Duration::from_secs(2);

    let expr = somme_balancee("1/2", 800);
    budget(t0, max);

    let r = eval_expression(&expr, &Params::default().avec_echelle(10), Grammaire::standard())
        .unwrap_or_else(|e| panic!("err: {e}"));
    budget(t0, max);

    // 800*(1/2) = 400
    assert_eq!(r.texte.trim(), "400");
}

#[test]
fn fuzz_safe_somme_balancee_symbolique() {
    let t0 = Instant::now();
    let max = Duration::from_secs(2);

    let expr = somme_balancee("x", 256);
    let p = Params::default();
    let t = arbre(&expr);
    let v = evaluer(&t, &p).unwrap_or_else(|e| panic!("err: {e}"));
    budget(t0, max);

    // rien à réduire : même arbre, partagé
    assert!(Arc::ptr_eq(&t, &v));
}
