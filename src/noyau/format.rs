// src/noyau/format.rs
//
// Présentation d’un nombre exact selon le mode de résultat
// --------------------------------------------------------
// - DEC / EXPR : texte canonique (zéros finaux retirés)
// - FIXE       : exactement `chiffres` chiffres significatifs
// - SCI / ING  : mantisse + exposant ("4.331e-5", "43.31e-6")
// - FRAC       : réduite de fraction continue la plus simple à 10^-(chiffres-2) près
// - MIXTE      : "w n/d"

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Signed, Zero};

use super::nombre::{pow10, Decimal};
use super::params::ModeResultat;

pub fn formater(valeur: &BigRational, mode: ModeResultat, chiffres: usize) -> String {
    let chiffres = chiffres.max(1);
    match mode {
        ModeResultat::Decimal | ModeResultat::Expression => {
            Decimal::from_rational(valeur, chiffres).to_string()
        }
        ModeResultat::Fixe => format_fixe(&Decimal::from_rational(valeur, chiffres), chiffres),
        ModeResultat::Scientifique => {
            format_exposant(&Decimal::from_rational(valeur, chiffres), 1)
        }
        ModeResultat::Ingenieur => format_exposant(&Decimal::from_rational(valeur, chiffres), 3),
        ModeResultat::Fraction => format_fraction(&fraction_proche(valeur, chiffres)),
        ModeResultat::FractionMixte => format_mixte(&fraction_proche(valeur, chiffres)),
    }
}

/* ------------------------ Décimal ------------------------ */

/// Complète par des zéros jusqu’à `chiffres` chiffres significatifs.
fn format_fixe(d: &Decimal, chiffres: usize) -> String {
    if d.is_zero() {
        return if chiffres > 1 {
            format!("0.{}", "0".repeat(chiffres - 1))
        } else {
            "0".to_string()
        };
    }
    let decimales = chiffres as i64 - 1 - d.magnitude();
    let txt = d.to_string();
    if decimales <= 0 {
        return txt;
    }
    let actuelles = txt.split_once('.').map(|(_, f)| f.len()).unwrap_or(0) as i64;
    let manque = (decimales - actuelles).max(0) as usize;
    let point = if actuelles == 0 { "." } else { "" };
    format!("{txt}{point}{}", "0".repeat(manque))
}

/// m·10^e avec e multiple de `pas` (1 : scientifique, 3 : ingénieur).
fn format_exposant(d: &Decimal, pas: i64) -> String {
    if d.is_zero() {
        return "0".to_string();
    }
    let mag = d.magnitude();
    let e = mag.div_euclid(pas) * pas;
    let m = Decimal::new(d.mantisse().clone(), d.exposant() - e);
    if e == 0 {
        m.to_string()
    } else {
        format!("{m}e{e}")
    }
}

/* ------------------------ Fractions ------------------------ */

/// Réduite de fraction continue la plus simple à |v − h/k| ≤ 10^-(chiffres-2).
pub fn fraction_proche(v: &BigRational, chiffres: usize) -> BigRational {
    let tolerance = BigRational::new(BigInt::one(), pow10(chiffres.max(3) - 2));

    let (mut h1, mut h2) = (BigInt::one(), BigInt::zero());
    let (mut k1, mut k2) = (BigInt::zero(), BigInt::one());
    let mut x = v.clone();

    loop {
        let a = x.floor().to_integer();
        let h = &a * &h1 + &h2;
        let k = &a * &k1 + &k2;
        let approx = BigRational::new(h.clone(), k.clone());

        let reste = &x - BigRational::from_integer(a);
        if (&approx - v).abs() <= tolerance || reste.is_zero() {
            return approx;
        }
        x = reste.recip();
        (h2, h1) = (h1, h);
        (k2, k1) = (k1, k);
    }
}

fn format_fraction(r: &BigRational) -> String {
    if r.denom().is_one() {
        r.numer().to_string()
    } else {
        format!("{}/{}", r.numer(), r.denom())
    }
}

fn format_mixte(r: &BigRational) -> String {
    let entier = r.trunc();
    if entier.is_zero() || r.denom().is_one() {
        return format_fraction(r);
    }
    let reste = (r - &entier).abs();
    format!("{} {}/{}", entier.numer(), reste.numer(), reste.denom())
}
