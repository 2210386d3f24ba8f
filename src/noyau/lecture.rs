// src/noyau/lecture.rs
//
// Noyau « virgule fixe » : entiers scalés ×10^chiffres
// ----------------------------------------------------
// Séries et itérations exactes sur BigInt, troncature à chaque étape ;
// l’appelant prend des chiffres de garde et arrondit à la fin.
// - π (Machin), ln 2, ln 10 : cache par nombre de chiffres
// - exp, ln, sin/cos, atan, racines

use num_bigint::BigInt;
use num_traits::{Signed, Zero};
use std::collections::HashMap;
use std::sync::{Mutex, OnceLock};

use super::nombre::{pow10, Decimal};

/// Échelle de travail : un = 10^chiffres.
#[derive(Clone, Debug)]
pub struct Echelle {
    pub chiffres: usize,
    un: BigInt,
}

impl Echelle {
    pub fn new(chiffres: usize) -> Self {
        Echelle {
            chiffres,
            un: pow10(chiffres),
        }
    }

    pub fn un(&self) -> &BigInt {
        &self.un
    }

    /// d -> trunc(d × 10^chiffres)
    pub fn depuis_decimal(&self, d: &Decimal) -> BigInt {
        let decalage = d.exposant() + self.chiffres as i64;
        if decalage >= 0 {
            d.mantisse() * pow10(decalage as usize)
        } else {
            d.mantisse() / pow10((-decalage) as usize)
        }
    }

    pub fn vers_decimal(&self, x: BigInt) -> Decimal {
        Decimal::new(x, -(self.chiffres as i64))
    }

    pub fn mul(&self, a: &BigInt, b: &BigInt) -> BigInt {
        (a * b) / &self.un
    }

    pub fn div(&self, a: &BigInt, b: &BigInt) -> BigInt {
        (a * &self.un) / b
    }
}

/// Division entière arrondie vers -∞.
pub fn div_floor(a: &BigInt, b: &BigInt) -> BigInt {
    let q = a / b;
    let r = a % b;
    if !r.is_zero() && (r.is_negative() != b.is_negative()) {
        q - 1
    } else {
        q
    }
}

/* ------------------------ Séries arctan / argth en 1/q ------------------------ */

/// Σ (±)^k / ((2k+1)·q^(2k+1)), en entier scalé (troncature).
/// alterne = true  : atan(1/q)
/// alterne = false : atanh(1/q)
fn serie_inv_q_scaled(q: i64, scale: &BigInt, alterne: bool) -> BigInt {
    let q = BigInt::from(q);
    let q2 = &q * &q;

    let mut k: usize = 0;
    let mut sign_pos = true;
    let mut q_pow = q.clone(); // q^(2k+1)
    let mut sum = BigInt::zero();

    loop {
        let d = &q_pow * BigInt::from(2 * k + 1);
        let term = scale / &d;
        if term.is_zero() {
            break;
        }
        if sign_pos {
            sum += &term;
        } else {
            sum -= &term;
        }
        q_pow *= &q2;
        if alterne {
            sign_pos = !sign_pos;
        }
        k += 1;
    }
    sum
}

/* ------------------------ Constantes + cache ------------------------ */

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
enum Constante {
    Pi,
    Ln2,
    Ln10,
}

/// Chiffres supplémentaires pour amortir les troncatures des séries.
const EXTRA: usize = 10;

fn constante_compute(c: Constante, digits: usize) -> BigInt {
    let scale = pow10(digits + EXTRA);
    let v = match c {
        // Machin : π = 16·atan(1/5) − 4·atan(1/239)
        Constante::Pi => {
            BigInt::from(16) * serie_inv_q_scaled(5, &scale, true)
                - BigInt::from(4) * serie_inv_q_scaled(239, &scale, true)
        }
        // ln 2 = 2·atanh(1/3)
        Constante::Ln2 => BigInt::from(2) * serie_inv_q_scaled(3, &scale, false),
        // ln 10 = 3·ln 2 + ln(5/4) = 6·atanh(1/3) + 2·atanh(1/9)
        Constante::Ln10 => {
            BigInt::from(6) * serie_inv_q_scaled(3, &scale, false)
                + BigInt::from(2) * serie_inv_q_scaled(9, &scale, false)
        }
    };
    v / pow10(EXTRA)
}

static CACHE: OnceLock<Mutex<HashMap<(Constante, usize), BigInt>>> = OnceLock::new();

fn constante_cached(c: Constante, digits: usize) -> BigInt {
    let m = CACHE.get_or_init(|| Mutex::new(HashMap::new()));
    // un panic ailleurs ne rend pas le cache faux : on récupère la valeur
    let mut guard = m.lock().unwrap_or_else(|p| p.into_inner());

    if let Some(v) = guard.get(&(c, digits)) {
        return v.clone();
    }

    let v = constante_compute(c, digits);
    guard.insert((c, digits), v.clone());
    v
}

pub fn pi_scaled(e: &Echelle) -> BigInt {
    constante_cached(Constante::Pi, e.chiffres)
}

pub fn ln2_scaled(e: &Echelle) -> BigInt {
    constante_cached(Constante::Ln2, e.chiffres)
}

pub fn ln10_scaled(e: &Echelle) -> BigInt {
    constante_cached(Constante::Ln10, e.chiffres)
}

/* ------------------------ exp / ln ------------------------ */

/// exp(x) en entier scalé, pour |x| modéré (réduit par l’appelant, ~|x| < 3).
pub fn exp_scaled(x: &BigInt, e: &Echelle) -> BigInt {
    let un = e.un();

    // x / 2^n avec |x / 2^n| < 1/2, puis carrés successifs
    let mut n = 0u32;
    let mut r = x.clone();
    let demi = un >> 1u32;
    while r.abs() > demi {
        r >>= 1u32;
        n += 1;
    }

    // Taylor : Σ r^k / k!
    let mut sum = un.clone();
    let mut term = un.clone();
    let mut k: u64 = 1;
    loop {
        term = e.mul(&term, &r) / BigInt::from(k);
        if term.is_zero() {
            break;
        }
        sum += &term;
        k += 1;
    }

    for _ in 0..n {
        sum = e.mul(&sum, &sum);
    }
    sum
}

/// ln(m) en entier scalé, pour m ∈ [1, 10) (mantisse normalisée).
pub fn ln_scaled(m: &BigInt, e: &Echelle) -> BigInt {
    let un = e.un();

    // m / 2^k ∈ [0.75, 1.5)
    let seuil = (un * BigInt::from(3)) >> 1u32;
    let mut y = m.clone();
    let mut k: i64 = 0;
    while y >= seuil {
        y >>= 1u32;
        k += 1;
    }

    // ln(y) = 2·atanh(z), z = (y−1)/(y+1), |z| ≤ 0.2
    let z = e.div(&(&y - un), &(&y + un));
    let z2 = e.mul(&z, &z);
    let mut puissance = z.clone();
    let mut sum = BigInt::zero();
    let mut j: u64 = 0;
    loop {
        let term = &puissance / BigInt::from(2 * j + 1);
        if term.is_zero() {
            break;
        }
        sum += term;
        puissance = e.mul(&puissance, &z2);
        j += 1;
    }

    BigInt::from(2) * sum + BigInt::from(k) * ln2_scaled(e)
}

/* ------------------------ Trigonométrie ------------------------ */

/// (sin x, cos x) en entiers scalés ; x quelconque (réduit modulo 2π ici).
pub fn sin_cos_scaled(x: &BigInt, e: &Echelle) -> (BigInt, BigInt) {
    let un = e.un();
    let pi = pi_scaled(e);
    let deux_pi = &pi * 2u32;

    // r ∈ [−π, π)
    let mut r = x - div_floor(x, &deux_pi) * &deux_pi;
    if r >= pi {
        r -= &deux_pi;
    }

    let r2 = e.mul(&r, &r);

    // sin : Σ (−1)^k r^(2k+1)/(2k+1)!
    let mut s = r.clone();
    let mut term = r.clone();
    let mut k: u64 = 1;
    loop {
        term = -e.mul(&term, &r2) / BigInt::from((2 * k) * (2 * k + 1));
        if term.is_zero() {
            break;
        }
        s += &term;
        k += 1;
    }

    // cos : Σ (−1)^k r^(2k)/(2k)!
    let mut c = un.clone();
    let mut term = un.clone();
    let mut k: u64 = 1;
    loop {
        term = -e.mul(&term, &r2) / BigInt::from((2 * k - 1) * (2 * k));
        if term.is_zero() {
            break;
        }
        c += &term;
        k += 1;
    }

    (s, c)
}

/// atan(x) en entier scalé, x quelconque.
pub fn atan_scaled(x: &BigInt, e: &Echelle) -> BigInt {
    let un = e.un();
    if x.is_zero() {
        return BigInt::zero();
    }
    if x.is_negative() {
        return -atan_scaled(&-x, e);
    }
    if x > un {
        // atan(x) = π/2 − atan(1/x)
        let inv = e.div(un, x);
        return (pi_scaled(e) >> 1u32) - atan_scaled(&inv, e);
    }

    // atan(x) = 2·atan(x / (1 + √(1+x²))), deux fois : |x| ≤ tan(π/16)
    let mut y = x.clone();
    let mut facteur = 1u32;
    for _ in 0..2 {
        let rac = sqrt_scaled(&(un + e.mul(&y, &y)), e);
        y = e.div(&y, &(un + rac));
        facteur *= 2;
    }

    // Σ (−1)^k y^(2k+1)/(2k+1)
    let y2 = e.mul(&y, &y);
    let mut puissance = y.clone();
    let mut sum = BigInt::zero();
    let mut k: u64 = 0;
    loop {
        let term = &puissance / BigInt::from(2 * k + 1);
        if term.is_zero() {
            break;
        }
        if k % 2 == 0 {
            sum += term;
        } else {
            sum -= term;
        }
        puissance = e.mul(&puissance, &y2);
        k += 1;
    }

    sum * facteur
}

/* ------------------------ Racines ------------------------ */

/// √x en entier scalé : floor(√(x·10^chiffres)). x ≥ 0.
pub fn sqrt_scaled(x: &BigInt, e: &Echelle) -> BigInt {
    if !x.is_positive() {
        return BigInt::zero();
    }
    (x * e.un()).sqrt()
}

/// Racine n-ième exacte d’un décimal, arrondie à `precision` chiffres.
/// Les puissances parfaites restent exactes (∛8 = 2). x ≥ 0 ou n impair.
pub fn racine_n(x: &Decimal, n: u32, precision: usize) -> Decimal {
    if x.is_zero() {
        return Decimal::zero();
    }
    let neg = x.is_negative();
    let m = x.mantisse().abs();
    let e = x.exposant();

    // N = m·10^s avec (e − s) divisible par n et ~n·(precision+garde) chiffres
    let cible = (n as i64) * (precision as i64 + 10);
    let s0 = cible - super::nombre::nb_chiffres(&m) as i64;
    let s = s0 + (e - s0).rem_euclid(n as i64);

    let grand = if s >= 0 {
        m * pow10(s as usize)
    } else {
        m / pow10((-s) as usize)
    };
    let y = grand.nth_root(n);
    let y = if neg { -y } else { y };
    Decimal::new(y, (e - s) / n as i64).arrondir(precision)
}
