// src/noyau/fonctions.rs
//
// Réduction numérique des appels (arguments déjà évalués)
// -------------------------------------------------------
// - dispatch par NomsCas : les noms sont configurables, la sémantique non
// - arité contrôlée seulement quand tous les arguments sont numériques
// - Sum, Product, D, Integrate, Limit, Erf, PolyGamma et noms inconnus : jamais réduits
// - mode complexe : un argument hors domaine réel laisse l’appel symbolique

use std::sync::Arc;

use log::trace;

use super::arith;
use super::erreur::ErreurEval;
use super::eval::valeur_numerique;
use super::expr::Expr;
use super::nombre::Decimal;
use super::params::{Fonction, Params};

/// Nombre d’arguments accepté.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Arite {
    Exacte(usize),
    UnOuDeux,
    AuMoinsUn,
}

impl Arite {
    fn de(f: Fonction) -> Arite {
        use Fonction::*;
        match f {
            ArcTan | Log => Arite::UnOuDeux,
            Gcd | Lcm | Min | Max => Arite::AuMoinsUn,
            Power | Mod | Npr | Ncr | Rational => Arite::Exacte(2),
            _ => Arite::Exacte(1),
        }
    }

    fn accepte(self, n: usize) -> bool {
        match self {
            Arite::Exacte(k) => n == k,
            Arite::UnOuDeux => n == 1 || n == 2,
            Arite::AuMoinsUn => n >= 1,
        }
    }

    fn texte(self) -> String {
        match self {
            Arite::Exacte(k) => k.to_string(),
            Arite::UnOuDeux => "1 ou 2".into(),
            Arite::AuMoinsUn => "au moins 1".into(),
        }
    }
}

/// Appel réduit à un littéral, ou None (l’appel reste symbolique).
pub fn reduire(nom: &str, args: &[Arc<Expr>], p: &Params) -> Result<Option<Arc<Expr>>, ErreurEval> {
    let Some(f) = p.noms.fonction(nom) else {
        return Ok(None);
    };
    if f.est_symbolique() || (f == Fonction::Rational && p.mode.est_fraction()) {
        return Ok(None);
    }
    let Some(x) = args
        .iter()
        .map(|a| valeur_numerique(a, p))
        .collect::<Option<Vec<_>>>()
    else {
        return Ok(None);
    };

    let arite = Arite::de(f);
    if !arite.accepte(x.len()) {
        return Err(ErreurEval::Arite {
            fonction: nom.to_string(),
            attendu: arite.texte(),
            recu: x.len(),
        });
    }

    trace!(
        "{nom}[{}]",
        x.iter().map(|d| d.to_string()).collect::<Vec<_>>().join(", ")
    );
    resultat_numerique(calculer(f, nom, &x, p), p)
}

/// Résultat borné -> littéral ; hors domaine en mode complexe -> None.
pub(crate) fn resultat_numerique(
    r: Result<Decimal, ErreurEval>,
    p: &Params,
) -> Result<Option<Arc<Expr>>, ErreurEval> {
    match r {
        Ok(v) => Ok(Some(Expr::nombre(&arith::borner(v)?))),
        Err(ErreurEval::Domaine { fonction, detail }) if p.complexe => {
            trace!("{fonction} hors domaine réel ({detail}) : reste symbolique");
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

fn calculer(f: Fonction, nom: &str, x: &[Decimal], p: &Params) -> Result<Decimal, ErreurEval> {
    use Fonction::*;

    let n = p.echelle();
    let u = p.unite_angle;
    let a = &x[0];

    match f {
        /* ---- Circulaires (unité d’angle active) ---- */
        Sin => arith::sin(a, u, n),
        Cos => arith::cos(a, u, n),
        Tan => arith::tan(a, u, n),
        Csc => arith::csc(a, u, n),
        Sec => arith::sec(a, u, n),
        Cot => arith::cot(a, u, n),
        ArcSin => arith::asin(a, u, n),
        ArcCos => arith::acos(a, u, n),
        ArcTan if x.len() == 2 => arith::atan2(a, &x[1], u, n),
        ArcTan => arith::atan(a, u, n),
        ArcCsc => arith::acsc(a, u, n),
        ArcSec => arith::asec(a, u, n),
        ArcCot => arith::acot(a, u, n),

        /* ---- Hyperboliques (sans unité) ---- */
        Sinh => arith::sinh(a, n),
        Cosh => arith::cosh(a, n),
        Tanh => arith::tanh(a, n),
        Csch => arith::csch(a, n),
        Sech => arith::sech(a, n),
        Coth => arith::coth(a, n),
        ArcSinh => arith::asinh(a, n),
        ArcCosh => arith::acosh(a, n),
        ArcTanh => arith::atanh(a, n),
        ArcCsch => arith::acsch(a, n),
        ArcSech => arith::asech(a, n),
        ArcCoth => arith::acoth(a, n),

        /* ---- Exponentielle / logarithmes ---- */
        Exp => arith::exp(a, n),
        Log if x.len() == 2 => arith::log(a, &x[1], n),
        Log => arith::ln(a, n),
        Log10 => arith::log(a, &Decimal::from_i64(10), n),
        Log2 => arith::log(a, &Decimal::from_i64(2), n),

        /* ---- Racines / puissances ---- */
        Sqrt => arith::racine(a, 2, nom, n),
        Cqrt => arith::racine(a, 3, nom, n),
        Power => arith::puissance(a, &x[1], n),

        /* ---- Élémentaires ---- */
        Abs => Ok(a.abs().arrondir(n)),
        Sign => Ok(arith::signe(a)),
        Gcd => arith::gcd(x, n),
        Lcm => arith::lcm(x, n),
        Mod => arith::modulo(a, &x[1], n),
        Min => Ok(arith::min(x).unwrap_or_else(|| a.clone())),
        Max => Ok(arith::max(x).unwrap_or_else(|| a.clone())),
        Npr => arith::npr(a, &x[1], n),
        Ncr => arith::ncr(a, &x[1], n),
        Gamma => arith::gamma(a, n),
        Floor => Ok(arith::plancher(a)),
        Ceiling => Ok(arith::plafond(a)),
        Rational => a.div(&x[1], n).ok_or(ErreurEval::DivisionParZero),

        Sum | Product | D | Integrate | Limit | Erf | PolyGamma => {
            unreachable!("{nom} : fonction symbolique, jamais réduite")
        }
    }
}
