// src/noyau/trig.rs
//
// Trig spéciale (angles « exactement reconnus ») pour sin/cos/tan
// --------------------------------------------------------------
// - L’angle arrive comme coeff·π (coeff rationnel exact, via l’unité DEG/GRAD)
// - Réduction modulo période (sin/cos: 2 ; tan: 1)
// - Table angles spéciaux sur n ∈ {1,2,3,4,6}
// - Valeur exacte = r·√m avec m ∈ {1,2,3}
// - Réciproques : valeurs rationnelles remarquables -> coeff·π exact

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Signed, ToPrimitive, Zero};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TrigFn {
    Sin,
    Cos,
    Tan,
}

impl TrigFn {
    fn nom(self) -> &'static str {
        match self {
            TrigFn::Sin => "sin",
            TrigFn::Cos => "cos",
            TrigFn::Tan => "tan",
        }
    }
}

/// coeff·√radicande
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValeurExacte {
    pub coeff: BigRational,
    pub radicande: u32,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TrigOutcome {
    Valeur(ValeurExacte, String),
    Indefini(String),
}

/// Reconnaît les angles spéciaux lorsque l’angle vaut coeff·π.
///
/// Retour:
/// - Some(Valeur(exact, preuve)) si reconnu
/// - Some(Indefini(preuve)) si indéfini (tan(π/2), tan(3π/2))
/// - None si non reconnu
pub fn trig_special(coeff: &BigRational, f: TrigFn) -> Option<TrigOutcome> {
    let coeff_reduit = match f {
        TrigFn::Sin | TrigFn::Cos => mod_rationnel(coeff, 2),
        TrigFn::Tan => mod_rationnel(coeff, 1),
    };

    let (k, n) = rational_to_small_kn(&coeff_reduit)?; // k/n
    let k_mod = k.rem_euclid(2 * n);

    let v = |a: i64, b: i64, m: u32| ValeurExacte {
        coeff: BigRational::new(BigInt::from(a), BigInt::from(b)),
        radicande: m,
    };

    let angle_txt = format_angle_kn_pi(k_mod, n);
    let nom = f.nom();
    let valeur = |e: ValeurExacte, txt: &str| {
        TrigOutcome::Valeur(e, format!("{nom}({angle_txt}) = {txt}"))
    };

    let out = match f {
        TrigFn::Sin => match (k_mod, n) {
            (0, _) | (1, 1) | (2, 1) => valeur(v(0, 1, 1), "0"),
            (1, 6) | (5, 6) => valeur(v(1, 2, 1), "1/2"),
            (7, 6) | (11, 6) => valeur(v(-1, 2, 1), "-1/2"),
            (1, 4) | (3, 4) => valeur(v(1, 2, 2), "√2/2"),
            (5, 4) | (7, 4) => valeur(v(-1, 2, 2), "-√2/2"),
            (1, 3) | (2, 3) => valeur(v(1, 2, 3), "√3/2"),
            (4, 3) | (5, 3) => valeur(v(-1, 2, 3), "-√3/2"),
            (1, 2) => valeur(v(1, 1, 1), "1"),
            (3, 2) => valeur(v(-1, 1, 1), "-1"),
            _ => return None,
        },

        TrigFn::Cos => match (k_mod, n) {
            (0, _) | (2, 1) => valeur(v(1, 1, 1), "1"),
            (1, 1) => valeur(v(-1, 1, 1), "-1"),
            (1, 6) | (11, 6) => valeur(v(1, 2, 3), "√3/2"),
            (5, 6) | (7, 6) => valeur(v(-1, 2, 3), "-√3/2"),
            (1, 4) | (7, 4) => valeur(v(1, 2, 2), "√2/2"),
            (3, 4) | (5, 4) => valeur(v(-1, 2, 2), "-√2/2"),
            (1, 3) | (5, 3) => valeur(v(1, 2, 1), "1/2"),
            (2, 3) | (4, 3) => valeur(v(-1, 2, 1), "-1/2"),
            (1, 2) | (3, 2) => valeur(v(0, 1, 1), "0"),
            _ => return None,
        },

        TrigFn::Tan => match (k_mod, n) {
            (0, _) | (1, 1) | (2, 1) => valeur(v(0, 1, 1), "0"),
            (1, 6) | (7, 6) => valeur(v(1, 3, 3), "√3/3"),
            (5, 6) | (11, 6) => valeur(v(-1, 3, 3), "-√3/3"),
            (1, 4) | (5, 4) => valeur(v(1, 1, 1), "1"),
            (3, 4) | (7, 4) => valeur(v(-1, 1, 1), "-1"),
            (1, 3) | (4, 3) => valeur(v(1, 1, 3), "√3"),
            (2, 3) | (5, 3) => valeur(v(-1, 1, 3), "-√3"),
            (1, 2) | (3, 2) => TrigOutcome::Indefini(format!("tan({angle_txt}) = indéfini")),
            _ => return None,
        },
    };

    Some(out)
}

/// Réciproques sur les valeurs rationnelles remarquables (branche principale).
/// Retourne le coefficient de π.
pub fn inverse_special(valeur: &BigRational, f: TrigFn) -> Option<BigRational> {
    let half = BigRational::new(BigInt::one(), BigInt::from(2));
    let one = BigRational::one();
    let r = |a: i64, b: i64| BigRational::new(BigInt::from(a), BigInt::from(b));

    let signe = if valeur.is_negative() { -1 } else { 1 };
    let abs = valeur.abs();

    match f {
        TrigFn::Sin => {
            if abs.is_zero() {
                Some(BigRational::zero())
            } else if abs == half {
                Some(r(signe, 6))
            } else if abs == one {
                Some(r(signe, 2))
            } else {
                None
            }
        }
        TrigFn::Cos => {
            if abs.is_zero() {
                Some(r(1, 2))
            } else if abs == half {
                Some(if signe > 0 { r(1, 3) } else { r(2, 3) })
            } else if abs == one {
                Some(if signe > 0 { r(0, 1) } else { r(1, 1) })
            } else {
                None
            }
        }
        TrigFn::Tan => {
            if abs.is_zero() {
                Some(BigRational::zero())
            } else if abs == one {
                Some(r(signe, 4))
            } else {
                None
            }
        }
    }
}

/* ------------------------ Outils ------------------------ */

fn format_angle_kn_pi(k: i64, n: i64) -> String {
    if k == 0 {
        return "0".to_string();
    }
    if n == 1 {
        return match k {
            1 => "π".to_string(),
            _ => format!("{k}π"),
        };
    }
    if k == 1 {
        return format!("π/{n}");
    }
    format!("{k}π/{n}")
}

/// coeff mod periode (résultat dans [0, periode)).
fn mod_rationnel(coeff: &BigRational, periode: i64) -> BigRational {
    if coeff.is_zero() {
        return BigRational::zero();
    }
    let d = coeff.denom().clone();
    let m = BigInt::from(periode) * &d;
    let mut r = coeff.numer() % &m;
    if r.is_negative() {
        r += &m;
    }
    BigRational::new(r, d)
}

/// Convertit un rationnel en (k,n) i64 réduit.
/// Accepte seulement n ∈ {1,2,3,4,6}.
fn rational_to_small_kn(r: &BigRational) -> Option<(i64, i64)> {
    // BigRational est déjà réduit, dénominateur > 0
    let n = r.denom().to_i64()?;
    let k = r.numer().to_i64()?;

    if [1, 2, 3, 4, 6].contains(&n) {
        Some((k, n))
    } else {
        None
    }
}
