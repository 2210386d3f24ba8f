// src/noyau/arith.rs
//
// Fonctions numériques sur Decimal
// --------------------------------
// Chaque fonction travaille avec GARDE chiffres de plus que demandé,
// puis arrondit à `p` chiffres significatifs (demi-pair).
// - exp / ln / log / racines / puissances
// - trigonométrie dans l’unité d’angle active (angles spéciaux exacts d’abord)
// - hyperboliques (unité ignorée)
// - Γ (Stirling + décalage, réflexion), factorielle
// - fonctions entières : Gcd, Lcm, Mod, Npr, Ncr, Floor, Ceiling

use std::cmp::Ordering;

use log::trace;
use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Signed, ToPrimitive, Zero};

use super::erreur::ErreurEval;
use super::lecture::{self, Echelle};
use super::nombre::{nb_chiffres, pow10, Decimal, MAX_EXPOSANT};
use super::params::UniteAngle;
use super::trig::{inverse_special, trig_special, TrigFn, TrigOutcome, ValeurExacte};

/// Chiffres de garde pour les calculs intermédiaires.
pub const GARDE: usize = 10;

/// n! au-delà : résultat > 10^MAX_EXPOSANT.
pub const MAX_FACTORIELLE: i64 = 25_000;

/// Magnitude maximale (en chiffres) de l’argument des fonctions périodiques.
pub const MAX_MAGNITUDE_PERIODIQUE: i64 = 500;

/// e^x au-delà : résultat > 10^MAX_EXPOSANT.
const MAX_ARG_EXP: i64 = 230_000;

fn d(n: i64) -> Decimal {
    Decimal::from_i64(n)
}

fn demi() -> Decimal {
    Decimal::new(BigInt::from(5), -1)
}

/// Contrôle de magnitude d’un résultat : trop grand = dépassement, infime = 0.
pub fn borner(x: Decimal) -> Result<Decimal, ErreurEval> {
    if x.is_zero() {
        return Ok(x);
    }
    let m = x.magnitude();
    if m > MAX_EXPOSANT {
        return Err(ErreurEval::depassement(format!("résultat de l’ordre de 10^{m}")));
    }
    if m < -MAX_EXPOSANT {
        return Ok(Decimal::zero());
    }
    Ok(x)
}

fn renommer(e: ErreurEval, nom: &str) -> ErreurEval {
    match e {
        ErreurEval::Domaine { detail, .. } => ErreurEval::Domaine {
            fonction: nom.to_string(),
            detail,
        },
        autre => autre,
    }
}

/// 1/x, zéro interdit.
fn inverse(x: &Decimal, nom: &str, p: usize) -> Result<Decimal, ErreurEval> {
    if x.is_zero() {
        return Err(ErreurEval::domaine(nom, "argument nul"));
    }
    Decimal::un().div(x, p).ok_or(ErreurEval::DivisionParZero)
}

/// Infime devant la précision : f(x) ≈ x suffit.
fn infime(x: &Decimal, p: usize) -> bool {
    !x.is_zero() && x.magnitude() < -((p + GARDE) as i64)
}

/* ------------------------ Constantes ------------------------ */

pub fn pi(p: usize) -> Decimal {
    let ech = Echelle::new(p + GARDE);
    ech.vers_decimal(lecture::pi_scaled(&ech)).arrondir(p)
}

pub fn e(p: usize) -> Decimal {
    let ech = Echelle::new(p + GARDE);
    ech.vers_decimal(lecture::exp_scaled(ech.un(), &ech)).arrondir(p)
}

/* ------------------------ exp / ln ------------------------ */

pub fn exp(x: &Decimal, p: usize) -> Result<Decimal, ErreurEval> {
    if x.is_zero() {
        return Ok(Decimal::un());
    }
    if x.cmp_valeur(&d(MAX_ARG_EXP)) == Ordering::Greater {
        return Err(ErreurEval::depassement(format!("exp({x})")));
    }
    if x.cmp_valeur(&d(-MAX_ARG_EXP)) == Ordering::Less {
        return Ok(Decimal::zero());
    }

    let entier = x.magnitude().max(0) as usize + 1;
    let ech = Echelle::new(p + GARDE + entier);
    let xs = ech.depuis_decimal(x);
    let ln10 = lecture::ln10_scaled(&ech);

    // x = k·ln 10 + r, r ∈ [0, ln 10)
    let k = lecture::div_floor(&xs, &ln10);
    let r = &xs - &k * &ln10;
    let v = ech.vers_decimal(lecture::exp_scaled(&r, &ech));
    let k = k
        .to_i64()
        .ok_or_else(|| ErreurEval::depassement(format!("exp({x})")))?;

    borner(Decimal::new(v.mantisse().clone(), v.exposant() + k).arrondir(p))
}

/// Logarithme népérien.
pub fn ln(x: &Decimal, p: usize) -> Result<Decimal, ErreurEval> {
    if x.signum() <= 0 {
        return Err(ErreurEval::domaine("Log", format!("{x} ≤ 0")));
    }
    if *x == Decimal::un() {
        return Ok(Decimal::zero());
    }

    let mag = x.magnitude();
    // près de 1, ln x ≈ x − 1 : autant de chiffres en plus que de zéros de tête
    let ecart = x.add_exact(&Decimal::un().neg());
    let extra = (-ecart.magnitude()).max(0) as usize;
    let ech = Echelle::new(p + GARDE + extra + nb_chiffres(&BigInt::from(mag)));

    // x = m·10^mag, m ∈ [1, 10)
    let m = Decimal::new(x.mantisse().clone(), x.exposant() - mag);
    let v = lecture::ln_scaled(&ech.depuis_decimal(&m), &ech)
        + BigInt::from(mag) * lecture::ln10_scaled(&ech);

    Ok(ech.vers_decimal(v).arrondir(p))
}

/// log_base(x)
pub fn log(x: &Decimal, base: &Decimal, p: usize) -> Result<Decimal, ErreurEval> {
    if base.signum() <= 0 || *base == Decimal::un() {
        return Err(ErreurEval::domaine("Log", format!("base {base} invalide")));
    }
    let w = p + GARDE;
    let a = ln(x, w)?;
    let b = ln(base, w)?;
    a.div(&b, p).ok_or(ErreurEval::DivisionParZero)
}

/* ------------------------ Racines / puissances ------------------------ */

pub fn racine(x: &Decimal, n: u32, nom: &str, p: usize) -> Result<Decimal, ErreurEval> {
    if n == 0 {
        return Err(ErreurEval::domaine(nom, "racine d’indice 0"));
    }
    if x.is_negative() && n % 2 == 0 {
        return Err(ErreurEval::domaine(nom, format!("racine paire de {x}")));
    }
    Ok(lecture::racine_n(x, n, p))
}

/// log10 |x| approché (estimation de magnitude seulement).
fn log10_approx(x: &Decimal) -> f64 {
    let m = x.mantisse().abs();
    let n = nb_chiffres(&m);
    let tete = if n > 15 { m / pow10(n - 15) } else { m };
    let k = nb_chiffres(&tete) as i32;
    let f = tete.to_f64().unwrap_or(1.0) / 10f64.powi(k - 1);
    x.magnitude() as f64 + f.log10()
}

fn puissance_entiere(x: &Decimal, n: &BigInt, p: usize) -> Result<Decimal, ErreurEval> {
    if x.is_zero() {
        return if n.is_negative() {
            Err(ErreurEval::DivisionParZero)
        } else if n.is_zero() {
            Ok(Decimal::un())
        } else {
            Ok(Decimal::zero())
        };
    }
    if x.abs() == Decimal::un() {
        let impair = (n % 2u32) != BigInt::zero();
        return Ok(if x.is_negative() && impair {
            d(-1)
        } else {
            Decimal::un()
        });
    }

    let n = n
        .to_i64()
        .ok_or_else(|| ErreurEval::depassement(format!("exposant {n} trop grand")))?;
    let ordre = log10_approx(x) * n as f64;
    if ordre > MAX_EXPOSANT as f64 {
        return Err(ErreurEval::depassement(format!("{x}^{n}")));
    }
    if ordre < -(MAX_EXPOSANT as f64) {
        return Ok(Decimal::zero());
    }

    let v = x.pow_int(n, p).ok_or(ErreurEval::DivisionParZero)?;
    borner(v)
}

/// x^y : exposant entier exact, sinon exp(y·ln x).
pub fn puissance(x: &Decimal, y: &Decimal, p: usize) -> Result<Decimal, ErreurEval> {
    if y.is_zero() {
        return Ok(Decimal::un());
    }
    if y.est_entier() {
        let n = y
            .to_bigint()
            .ok_or_else(|| ErreurEval::depassement(format!("exposant {y} trop grand")))?;
        return puissance_entiere(x, &n, p);
    }
    if x.is_zero() {
        return if y.is_negative() {
            Err(ErreurEval::DivisionParZero)
        } else {
            Ok(Decimal::zero())
        };
    }
    if x.is_negative() {
        return Err(ErreurEval::domaine(
            "Power",
            format!("base négative {x}, exposant non entier {y}"),
        ));
    }

    let w = p + 2 * GARDE;
    let mut t = y.mul(&ln(x, w)?, w);
    // |t| grand : les chiffres entiers de t consomment de la précision
    let extra = (t.magnitude() + 1).max(0) as usize;
    if extra > 0 {
        t = y.mul(&ln(x, w + extra)?, w + extra);
    }
    exp(&t, p)
}

/// x^(a/b) par racine exacte : 8^(2/3) = ∛(8²) = 4.
pub fn puissance_rationnelle(x: &Decimal, r: &BigRational, p: usize) -> Result<Decimal, ErreurEval> {
    let num = r.numer();
    let den = r.denom();
    if den.is_one() {
        return puissance_entiere(x, num, p);
    }
    let Some(q) = den.to_u32() else {
        return puissance(x, &Decimal::from_rational(r, p + GARDE), p);
    };
    if x.is_negative() && q % 2 == 0 {
        return Err(ErreurEval::domaine(
            "Power",
            format!("racine paire d’un nombre négatif ({x})"),
        ));
    }
    if x.is_zero() {
        return if num.is_negative() {
            Err(ErreurEval::DivisionParZero)
        } else {
            Ok(Decimal::zero())
        };
    }

    let w = p + GARDE;
    let base = puissance_entiere(x, &num.abs(), w)?;
    let rac = lecture::racine_n(&base, q, w);
    if num.is_negative() {
        Decimal::un().div(&rac, p).ok_or(ErreurEval::DivisionParZero)
    } else {
        Ok(rac.arrondir(p))
    }
}

/* ------------------------ Trigonométrie ------------------------ */

fn nom_direct(f: TrigFn) -> &'static str {
    match f {
        TrigFn::Sin => "Sin",
        TrigFn::Cos => "Cos",
        TrigFn::Tan => "Tan",
    }
}

/// Demi-tour dans l’unité : 180°, 200 gon, π rad.
pub fn demi_tour(unite: UniteAngle, p: usize) -> Decimal {
    match unite {
        UniteAngle::Deg => d(180),
        UniteAngle::Grad => d(200),
        UniteAngle::Rad => pi(p),
    }
}

/// Angle exprimé en coeff·π exact (DEG/GRAD ; 0 en RAD).
fn coeff_pi(x: &Decimal, unite: UniteAngle) -> Option<BigRational> {
    let diviseur = match unite {
        UniteAngle::Deg => 180,
        UniteAngle::Grad => 200,
        UniteAngle::Rad if x.is_zero() => return Some(BigRational::zero()),
        UniteAngle::Rad => return None,
    };
    Some(x.to_rational() / BigRational::from_integer(BigInt::from(diviseur)))
}

fn valeur_exacte(v: &ValeurExacte, p: usize) -> Decimal {
    if v.radicande == 1 {
        return Decimal::from_rational(&v.coeff, p);
    }
    let w = p + GARDE;
    let rac = lecture::racine_n(&d(v.radicande as i64), 2, w);
    rac.mul(&Decimal::from_rational(&v.coeff, w), p)
}

/// Conversion unité -> radians, sans troncature (argument infime).
fn en_radians(x: &Decimal, unite: UniteAngle, p: usize) -> Decimal {
    match unite {
        UniteAngle::Rad => x.arrondir(p),
        _ => {
            let w = p + GARDE;
            let r = x.to_rational() * pi(w).to_rational() / demi_tour(unite, w).to_rational();
            Decimal::from_rational(&r, p)
        }
    }
}

/// Radians -> unité.
fn depuis_radians(r: &Decimal, unite: UniteAngle, p: usize) -> Decimal {
    match unite {
        UniteAngle::Rad => r.arrondir(p),
        _ => {
            let w = p + GARDE;
            let v = r.to_rational() * demi_tour(unite, w).to_rational() / pi(w).to_rational();
            Decimal::from_rational(&v, p)
        }
    }
}

/// coeff·π -> unité (exact en DEG/GRAD).
fn depuis_coeff_pi(c: &BigRational, unite: UniteAngle, p: usize) -> Decimal {
    let w = p + GARDE;
    Decimal::from_rational(&(c * demi_tour(unite, w).to_rational()), p)
}

fn sin_cos_num(
    x: &Decimal,
    unite: UniteAngle,
    p: usize,
) -> (BigInt, BigInt, Echelle) {
    let ech = Echelle::new(p + GARDE + x.magnitude().unsigned_abs() as usize);
    let xs = ech.depuis_decimal(x);
    let pi = lecture::pi_scaled(&ech);
    let rad = match unite {
        UniteAngle::Rad => xs,
        UniteAngle::Deg => &xs * &pi / ech.un() / 180u32,
        UniteAngle::Grad => &xs * &pi / ech.un() / 200u32,
    };
    let (s, c) = lecture::sin_cos_scaled(&rad, &ech);
    (s, c, ech)
}

fn trig_direct(f: TrigFn, x: &Decimal, unite: UniteAngle, p: usize) -> Result<Decimal, ErreurEval> {
    let nom = nom_direct(f);
    if x.magnitude() > MAX_MAGNITUDE_PERIODIQUE {
        return Err(ErreurEval::depassement(format!("{nom} : argument {x} trop grand")));
    }

    if let Some(coeff) = coeff_pi(x, unite) {
        match trig_special(&coeff, f) {
            Some(TrigOutcome::Valeur(v, preuve)) => {
                trace!("angle spécial : {preuve}");
                return Ok(valeur_exacte(&v, p));
            }
            Some(TrigOutcome::Indefini(preuve)) => return Err(ErreurEval::domaine(nom, preuve)),
            None => {}
        }
    }

    if infime(x, p) {
        let r = en_radians(x, unite, p);
        return Ok(match f {
            TrigFn::Cos => Decimal::un(),
            TrigFn::Sin | TrigFn::Tan => r,
        });
    }

    let (s, c, ech) = sin_cos_num(x, unite, p);
    match f {
        TrigFn::Sin => Ok(ech.vers_decimal(s).arrondir(p)),
        TrigFn::Cos => Ok(ech.vers_decimal(c).arrondir(p)),
        TrigFn::Tan => {
            if c.is_zero() {
                return Err(ErreurEval::domaine(nom, "cosinus nul"));
            }
            Ok(Decimal::from_rational(&BigRational::new(s, c), p))
        }
    }
}

pub fn sin(x: &Decimal, unite: UniteAngle, p: usize) -> Result<Decimal, ErreurEval> {
    trig_direct(TrigFn::Sin, x, unite, p)
}

pub fn cos(x: &Decimal, unite: UniteAngle, p: usize) -> Result<Decimal, ErreurEval> {
    trig_direct(TrigFn::Cos, x, unite, p)
}

pub fn tan(x: &Decimal, unite: UniteAngle, p: usize) -> Result<Decimal, ErreurEval> {
    trig_direct(TrigFn::Tan, x, unite, p)
}

pub fn csc(x: &Decimal, unite: UniteAngle, p: usize) -> Result<Decimal, ErreurEval> {
    let s = trig_direct(TrigFn::Sin, x, unite, p + GARDE).map_err(|e| renommer(e, "Csc"))?;
    inverse(&s, "Csc", p)
}

pub fn sec(x: &Decimal, unite: UniteAngle, p: usize) -> Result<Decimal, ErreurEval> {
    let c = trig_direct(TrigFn::Cos, x, unite, p + GARDE).map_err(|e| renommer(e, "Sec"))?;
    inverse(&c, "Sec", p)
}

/// cot x = tan(quart de tour − x)
pub fn cot(x: &Decimal, unite: UniteAngle, p: usize) -> Result<Decimal, ErreurEval> {
    let complement = match unite {
        UniteAngle::Deg => d(90).add_exact(&x.neg()),
        UniteAngle::Grad => d(100).add_exact(&x.neg()),
        UniteAngle::Rad => {
            if x.is_zero() {
                return Err(ErreurEval::domaine("Cot", "sinus nul"));
            }
            let w = p + GARDE + x.magnitude().max(0) as usize;
            pi(w).mul(&demi(), w).sub(x, w)
        }
    };
    trig_direct(TrigFn::Tan, &complement, unite, p).map_err(|e| renommer(e, "Cot"))
}

/* ------------------------ Réciproques ------------------------ */

fn trig_inverse(f: TrigFn, x: &Decimal, unite: UniteAngle, p: usize) -> Result<Decimal, ErreurEval> {
    let nom = match f {
        TrigFn::Sin => "ArcSin",
        TrigFn::Cos => "ArcCos",
        TrigFn::Tan => "ArcTan",
    };
    if f != TrigFn::Tan && x.abs().cmp_valeur(&Decimal::un()) == Ordering::Greater {
        return Err(ErreurEval::domaine(nom, format!("|{x}| > 1")));
    }

    if let Some(c) = inverse_special(&x.to_rational(), f) {
        return Ok(depuis_coeff_pi(&c, unite, p));
    }

    let w = p + GARDE;
    let rad = match f {
        TrigFn::Tan => {
            let ech = Echelle::new(w + (-x.magnitude()).max(0) as usize);
            ech.vers_decimal(lecture::atan_scaled(&ech.depuis_decimal(x), &ech))
        }
        // asin x = atan(x / √(1 − x²)), 1 − x² exact
        TrigFn::Sin => {
            let w = w + (-x.magnitude()).max(0) as usize;
            let un_moins = Decimal::un().add_exact(&x.mul_exact(x).neg());
            let rac = lecture::racine_n(&un_moins, 2, w);
            let t = x.div(&rac, w).ok_or(ErreurEval::DivisionParZero)?;
            let ech = Echelle::new(w);
            ech.vers_decimal(lecture::atan_scaled(&ech.depuis_decimal(&t), &ech))
        }
        // acos x = 2·atan(√((1 − x)/(1 + x)))
        TrigFn::Cos => {
            let num = Decimal::un().add_exact(&x.neg());
            let den = Decimal::un().add_exact(x);
            let w = w + (-num.magnitude()).max(0) as usize;
            let q = num.div(&den, w).ok_or(ErreurEval::DivisionParZero)?;
            let t = lecture::racine_n(&q, 2, w);
            let ech = Echelle::new(w);
            ech.vers_decimal(lecture::atan_scaled(&ech.depuis_decimal(&t), &ech) * 2u32)
        }
    };
    Ok(depuis_radians(&rad, unite, p))
}

pub fn asin(x: &Decimal, unite: UniteAngle, p: usize) -> Result<Decimal, ErreurEval> {
    trig_inverse(TrigFn::Sin, x, unite, p)
}

pub fn acos(x: &Decimal, unite: UniteAngle, p: usize) -> Result<Decimal, ErreurEval> {
    trig_inverse(TrigFn::Cos, x, unite, p)
}

pub fn atan(x: &Decimal, unite: UniteAngle, p: usize) -> Result<Decimal, ErreurEval> {
    trig_inverse(TrigFn::Tan, x, unite, p)
}

/// Angle du point (x, y), dans ]−demi-tour, demi-tour].
pub fn atan2(y: &Decimal, x: &Decimal, unite: UniteAngle, p: usize) -> Result<Decimal, ErreurEval> {
    let w = p + GARDE;
    if x.is_zero() {
        if y.is_zero() {
            return Err(ErreurEval::domaine("ArcTan", "angle de (0, 0)"));
        }
        let quart = demi_tour(unite, w).mul(&demi(), w);
        return Ok(if y.is_negative() { quart.neg() } else { quart }.arrondir(p));
    }

    let q = y.div(x, w + GARDE).ok_or(ErreurEval::DivisionParZero)?;
    let base = atan(&q, unite, w)?;
    if !x.is_negative() {
        return Ok(base.arrondir(p));
    }
    let tour = demi_tour(unite, w);
    let v = if y.is_negative() {
        base.sub(&tour, w)
    } else {
        base.add(&tour, w)
    };
    Ok(v.arrondir(p))
}

pub fn acsc(x: &Decimal, unite: UniteAngle, p: usize) -> Result<Decimal, ErreurEval> {
    let inv = inverse(x, "ArcCsc", p + 2 * GARDE)?;
    asin(&inv, unite, p).map_err(|e| renommer(e, "ArcCsc"))
}

pub fn asec(x: &Decimal, unite: UniteAngle, p: usize) -> Result<Decimal, ErreurEval> {
    let inv = inverse(x, "ArcSec", p + 2 * GARDE)?;
    acos(&inv, unite, p).map_err(|e| renommer(e, "ArcSec"))
}

pub fn acot(x: &Decimal, unite: UniteAngle, p: usize) -> Result<Decimal, ErreurEval> {
    if x.is_zero() {
        let w = p + GARDE;
        return Ok(demi_tour(unite, w).mul(&demi(), p));
    }
    let inv = inverse(x, "ArcCot", p + 2 * GARDE)?;
    atan(&inv, unite, p)
}

/* ------------------------ Hyperboliques ------------------------ */

/// (e^x, e^−x) avec assez de chiffres pour une différence relative exacte.
fn exp_paire(x: &Decimal, p: usize) -> Result<(Decimal, Decimal, usize), ErreurEval> {
    let w = p + GARDE + (-x.magnitude()).max(0) as usize;
    Ok((exp(x, w)?, exp(&x.neg(), w)?, w))
}

pub fn sinh(x: &Decimal, p: usize) -> Result<Decimal, ErreurEval> {
    if x.is_zero() || infime(x, p) {
        return Ok(x.arrondir(p));
    }
    let (a, b, w) = exp_paire(x, p)?;
    Ok(a.sub(&b, w).mul(&demi(), p))
}

pub fn cosh(x: &Decimal, p: usize) -> Result<Decimal, ErreurEval> {
    if x.is_zero() || infime(x, p) {
        return Ok(Decimal::un());
    }
    let (a, b, w) = exp_paire(x, p)?;
    Ok(a.add(&b, w).mul(&demi(), p))
}

pub fn tanh(x: &Decimal, p: usize) -> Result<Decimal, ErreurEval> {
    if x.is_zero() || infime(x, p) {
        return Ok(x.arrondir(p));
    }
    // 1 − |tanh x| ≈ 2e^(−2|x|), invisible à p chiffres
    let sature = d(2 * (p + GARDE) as i64);
    if x.abs().cmp_valeur(&sature) == Ordering::Greater {
        return Ok(d(x.signum() as i64));
    }
    let (a, b, w) = exp_paire(x, p)?;
    a.sub(&b, w)
        .div(&a.add(&b, w), p)
        .ok_or(ErreurEval::DivisionParZero)
}

pub fn csch(x: &Decimal, p: usize) -> Result<Decimal, ErreurEval> {
    inverse(&sinh(x, p + GARDE)?, "Csch", p)
}

pub fn sech(x: &Decimal, p: usize) -> Result<Decimal, ErreurEval> {
    inverse(&cosh(x, p + GARDE)?, "Sech", p)
}

pub fn coth(x: &Decimal, p: usize) -> Result<Decimal, ErreurEval> {
    inverse(&tanh(x, p + GARDE)?, "Coth", p)
}

pub fn asinh(x: &Decimal, p: usize) -> Result<Decimal, ErreurEval> {
    if x.is_zero() || infime(x, p) {
        return Ok(x.arrondir(p));
    }
    // asinh x = signe·ln(|x| + √(x² + 1))
    let w = p + GARDE + (-x.magnitude()).max(0) as usize;
    let ax = x.abs();
    let rac = lecture::racine_n(&ax.mul_exact(&ax).add_exact(&Decimal::un()), 2, w);
    let v = ln(&ax.add(&rac, w), p)?;
    Ok(if x.is_negative() { v.neg() } else { v })
}

pub fn acosh(x: &Decimal, p: usize) -> Result<Decimal, ErreurEval> {
    match x.cmp_valeur(&Decimal::un()) {
        Ordering::Less => return Err(ErreurEval::domaine("ArcCosh", format!("{x} < 1"))),
        Ordering::Equal => return Ok(Decimal::zero()),
        Ordering::Greater => {}
    }
    // acosh x = ln(x + √(x² − 1))
    let ecart = x.add_exact(&Decimal::un().neg());
    let w = p + GARDE + (-ecart.magnitude()).max(0) as usize;
    let rac = lecture::racine_n(&x.mul_exact(x).add_exact(&Decimal::un().neg()), 2, w);
    ln(&x.add(&rac, w), p)
}

pub fn atanh(x: &Decimal, p: usize) -> Result<Decimal, ErreurEval> {
    if x.abs().cmp_valeur(&Decimal::un()) != Ordering::Less {
        return Err(ErreurEval::domaine("ArcTanh", format!("|{x}| ≥ 1")));
    }
    if x.is_zero() || infime(x, p) {
        return Ok(x.arrondir(p));
    }
    // atanh x = ½·ln((1 + x)/(1 − x))
    let bord = Decimal::un().add_exact(&x.abs().neg());
    let extra = (-x.magnitude()).max(-bord.magnitude()).max(0) as usize;
    let w = p + GARDE + extra;
    let q = Decimal::un()
        .add_exact(x)
        .div(&Decimal::un().add_exact(&x.neg()), w)
        .ok_or(ErreurEval::DivisionParZero)?;
    Ok(ln(&q, w)?.mul(&demi(), p))
}

pub fn acsch(x: &Decimal, p: usize) -> Result<Decimal, ErreurEval> {
    asinh(&inverse(x, "ArcCsch", p + 2 * GARDE)?, p)
}

pub fn asech(x: &Decimal, p: usize) -> Result<Decimal, ErreurEval> {
    acosh(&inverse(x, "ArcSech", p + 2 * GARDE)?, p).map_err(|e| renommer(e, "ArcSech"))
}

pub fn acoth(x: &Decimal, p: usize) -> Result<Decimal, ErreurEval> {
    atanh(&inverse(x, "ArcCoth", p + 2 * GARDE)?, p).map_err(|e| renommer(e, "ArcCoth"))
}

/* ------------------------ Factorielle / Γ ------------------------ */

/// n! par multiplications successives à la précision de travail ; Γ(n+1) hors des entiers.
pub fn factorielle(x: &Decimal, p: usize) -> Result<Decimal, ErreurEval> {
    if x.is_negative() {
        return Err(ErreurEval::domaine("!", format!("{x} < 0")));
    }
    if !x.est_entier() {
        return gamma(&x.add_exact(&Decimal::un()), p);
    }
    let n = x
        .to_i64()
        .filter(|n| *n <= MAX_FACTORIELLE)
        .ok_or_else(|| ErreurEval::depassement(format!("{x}! trop grand")))?;

    let w = p + GARDE + nb_chiffres(&BigInt::from(n));
    let mut acc = Decimal::un();
    for k in 2..=n {
        acc = acc.mul(&d(k), w);
    }
    Ok(acc.arrondir(p))
}

pub fn gamma(x: &Decimal, p: usize) -> Result<Decimal, ErreurEval> {
    if x.est_entier() {
        if x.signum() <= 0 {
            return Err(ErreurEval::domaine("Gamma", format!("pôle en {x}")));
        }
        return factorielle(&x.add_exact(&d(-1)), p);
    }
    if x.abs().cmp_valeur(&d(MAX_FACTORIELLE)) == Ordering::Greater {
        return Err(ErreurEval::depassement(format!("Γ({x})")));
    }

    if x.cmp_valeur(&demi()) == Ordering::Less {
        // réflexion : Γ(x) = π / (sin(πx)·Γ(1 − x))
        let w = p + GARDE;
        let g = gamma(&Decimal::un().add_exact(&x.neg()), w)?;
        let s = sin(&x.mul_exact(&d(180)), UniteAngle::Deg, w)?;
        return pi(w)
            .div(&s.mul(&g, w), p)
            .ok_or(ErreurEval::DivisionParZero);
    }

    gamma_stirling(x, p)
}

/// Γ(x) = Γ(x + m) / (x(x+1)…(x+m−1)), x + m assez grand pour la série asymptotique.
fn gamma_stirling(x: &Decimal, p: usize) -> Result<Decimal, ErreurEval> {
    let w = p + 2 * GARDE;
    let seuil = d(w as i64 + 10);

    let mut z = x.clone();
    let mut produit = Decimal::un();
    while z.cmp_valeur(&seuil) == Ordering::Less {
        produit = produit.mul(&z, w + GARDE);
        z = z.add_exact(&Decimal::un());
    }

    let g = exp(&ln_gamma_asymptotique(&z, w)?, w)?;
    g.div(&produit, p).ok_or(ErreurEval::DivisionParZero)
}

/// ln Γ(z) = (z − ½)ln z − z + ½ln(2π) + Σ B₂ₖ / (2k(2k−1)·z^(2k−1))
fn ln_gamma_asymptotique(z: &Decimal, w: usize) -> Result<Decimal, ErreurEval> {
    let wz = w + 8;
    let lnz = ln(z, wz)?;
    let mut s = z
        .add_exact(&demi().neg())
        .mul(&lnz, wz)
        .sub(z, wz);
    let deux_pi = pi(wz).mul(&d(2), wz);
    s = s.add(&ln(&deux_pi, wz)?.mul(&demi(), wz), wz);

    let inv = Decimal::un().div(z, wz).ok_or(ErreurEval::DivisionParZero)?;
    let inv2 = inv.mul(&inv, wz);
    let mut puissance = inv;
    let seuil = s.magnitude() - wz as i64;

    let mut bernoulli = Bernoulli::new().step_by(2).skip(1); // B₂, B₄, …
    for k in 1..=(4 * w) {
        let Some(b) = bernoulli.next() else {
            break;
        };
        let c = b / BigRational::from_integer(BigInt::from(2 * k * (2 * k - 1)));
        let terme = Decimal::from_rational(&c, wz).mul(&puissance, wz);
        if terme.is_zero() || terme.magnitude() < seuil {
            break;
        }
        s = s.add(&terme, wz);
        puissance = puissance.mul(&inv2, wz);
    }
    Ok(s)
}

/// Nombres de Bernoulli B₀, B₁, B₂, … (Akiyama–Tanigawa, B₁ = +½).
struct Bernoulli {
    a: Vec<BigRational>,
}

impl Bernoulli {
    fn new() -> Self {
        Bernoulli { a: Vec::new() }
    }
}

impl Iterator for Bernoulli {
    type Item = BigRational;

    fn next(&mut self) -> Option<BigRational> {
        let m = self.a.len();
        self.a
            .push(BigRational::new(BigInt::one(), BigInt::from(m + 1)));
        for j in (1..=m).rev() {
            let diff = &self.a[j - 1] - &self.a[j];
            self.a[j - 1] = diff * BigRational::from_integer(BigInt::from(j));
        }
        Some(self.a[0].clone())
    }
}

/* ------------------------ Entiers ------------------------ */

fn entier(x: &Decimal, nom: &str) -> Result<BigInt, ErreurEval> {
    if !x.est_entier() {
        return Err(ErreurEval::domaine(nom, format!("{x} n’est pas entier")));
    }
    x.to_bigint()
        .ok_or_else(|| ErreurEval::depassement(format!("{nom} : {x} trop grand")))
}

fn naturel(x: &Decimal, nom: &str) -> Result<BigInt, ErreurEval> {
    let n = entier(x, nom)?;
    if n.is_negative() {
        return Err(ErreurEval::domaine(nom, format!("{x} < 0")));
    }
    Ok(n)
}

fn pgcd(mut a: BigInt, mut b: BigInt) -> BigInt {
    a = a.abs();
    b = b.abs();
    while !b.is_zero() {
        let r = &a % &b;
        a = b;
        b = r;
    }
    a
}

pub fn gcd(args: &[Decimal], p: usize) -> Result<Decimal, ErreurEval> {
    let mut acc = BigInt::zero();
    for a in args {
        acc = pgcd(acc, entier(a, "Gcd")?);
    }
    Ok(Decimal::from_bigint(acc).arrondir(p))
}

pub fn lcm(args: &[Decimal], p: usize) -> Result<Decimal, ErreurEval> {
    let mut acc = BigInt::one();
    for a in args {
        let n = entier(a, "Lcm")?.abs();
        if n.is_zero() {
            return Ok(Decimal::zero());
        }
        let g = pgcd(acc.clone(), n.clone());
        acc = acc / g * n;
    }
    borner(Decimal::from_bigint(acc).arrondir(p))
}

/// x − y·⌊x/y⌋ (signe du diviseur).
pub fn modulo(x: &Decimal, y: &Decimal, p: usize) -> Result<Decimal, ErreurEval> {
    if y.is_zero() {
        return Err(ErreurEval::DivisionParZero);
    }
    let (a, b) = (x.to_rational(), y.to_rational());
    let r = &a - &b * (&a / &b).floor();
    Ok(Decimal::from_rational(&r, p))
}

pub fn plancher(x: &Decimal) -> Decimal {
    if x.est_entier() {
        return x.clone();
    }
    Decimal::from_bigint(x.to_rational().floor().to_integer())
}

pub fn plafond(x: &Decimal) -> Decimal {
    if x.est_entier() {
        return x.clone();
    }
    Decimal::from_bigint(x.to_rational().ceil().to_integer())
}

/// Arrangements n!/(n−r)!
pub fn npr(n: &Decimal, r: &Decimal, p: usize) -> Result<Decimal, ErreurEval> {
    let (n, r) = (naturel(n, "Npr")?, naturel(r, "Npr")?);
    if r > n {
        return Ok(Decimal::zero());
    }
    let n = borne_factorielle(&n, "Npr")?;
    let r = borne_factorielle(&r, "Npr")?;

    let mut acc = BigInt::one();
    for k in (n - r + 1)..=n {
        acc *= k;
    }
    borner(Decimal::from_bigint(acc).arrondir(p))
}

/// Combinaisons n!/(r!(n−r)!)
pub fn ncr(n: &Decimal, r: &Decimal, p: usize) -> Result<Decimal, ErreurEval> {
    let (n, r) = (naturel(n, "Ncr")?, naturel(r, "Ncr")?);
    if r > n {
        return Ok(Decimal::zero());
    }
    let n = borne_factorielle(&n, "Ncr")?;
    let r = borne_factorielle(&r, "Ncr")?;
    let r = r.min(n - r);

    // chaque quotient partiel est entier
    let mut acc = BigInt::one();
    for i in 1..=r {
        acc = acc * (n - r + i) / i;
    }
    borner(Decimal::from_bigint(acc).arrondir(p))
}

fn borne_factorielle(n: &BigInt, nom: &str) -> Result<i64, ErreurEval> {
    n.to_i64()
        .filter(|n| *n <= MAX_FACTORIELLE)
        .ok_or_else(|| ErreurEval::depassement(format!("{nom} : {n} trop grand")))
}

pub fn signe(x: &Decimal) -> Decimal {
    d(x.signum() as i64)
}

pub fn min(args: &[Decimal]) -> Option<Decimal> {
    args.iter()
        .min_by(|a, b| a.cmp_valeur(b))
        .cloned()
}

pub fn max(args: &[Decimal]) -> Option<Decimal> {
    args.iter()
        .max_by(|a, b| a.cmp_valeur(b))
        .cloned()
}
