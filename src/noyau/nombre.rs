// src/noyau/nombre.rs
//
// Décimal à précision arbitraire
// ------------------------------
// valeur = mantisse × 10^exposant, forme normalisée (pas de zéro final dans la mantisse).
// - arithmétique exacte puis arrondi à N chiffres significatifs, demi-pair (HALF_EVEN)
// - texte canonique « plain » (sans notation exponentielle) : "14", "-0.005", "1.25"
// - conversions exactes vers/depuis BigRational

use std::cmp::Ordering;
use std::fmt;

use num_bigint::{BigInt, Sign};
use num_rational::BigRational;
use num_traits::{One, Signed, ToPrimitive, Zero};

/// Borne sur |exposant| : au-delà, la précision n’est plus bornable.
pub const MAX_EXPOSANT: i64 = 100_000;

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Decimal {
    mantisse: BigInt,
    exposant: i64,
}

pub fn pow10(n: usize) -> BigInt {
    BigInt::from(10).pow(n as u32)
}

/// Nombre de chiffres décimaux de |n| (0 -> 1).
pub fn nb_chiffres(n: &BigInt) -> usize {
    if n.is_zero() {
        return 1;
    }
    n.magnitude().to_str_radix(10).len()
}

/// Arrondi demi-pair d’un entier positif à `precision` chiffres.
/// `reste` : true si des chiffres non nuls ont déjà été perdus plus bas (sticky).
fn arrondir_entier(m: BigInt, exposant: i64, precision: usize, reste: bool) -> (BigInt, i64) {
    let n = nb_chiffres(&m);
    if n <= precision {
        return (m, exposant);
    }
    let k = n - precision;
    let div = pow10(k);
    let q = &m / &div;
    let r = &m % &div;
    let moitie = &div >> 1u32;

    let haut = match r.cmp(&moitie) {
        Ordering::Greater => true,
        Ordering::Less => false,
        Ordering::Equal => reste || (&q % 2u32) == BigInt::one(),
    };
    let q = if haut { q + 1u32 } else { q };
    (q, exposant + k as i64)
}

impl Decimal {
    pub fn zero() -> Self {
        Decimal {
            mantisse: BigInt::zero(),
            exposant: 0,
        }
    }

    pub fn un() -> Self {
        Decimal::from_i64(1)
    }

    pub fn from_i64(n: i64) -> Self {
        Decimal::new(BigInt::from(n), 0)
    }

    pub fn from_bigint(n: BigInt) -> Self {
        Decimal::new(n, 0)
    }

    /// Construit puis normalise (retire les zéros finaux).
    pub fn new(mut mantisse: BigInt, mut exposant: i64) -> Self {
        if mantisse.is_zero() {
            return Decimal::zero();
        }
        let dix = BigInt::from(10);
        while (&mantisse % &dix).is_zero() {
            mantisse /= &dix;
            exposant += 1;
        }
        Decimal { mantisse, exposant }
    }

    /* ------------------------ Lecture ------------------------ */

    /// Numéral canonique : [+-]? chiffres [. chiffres] [e [+-] chiffres]
    /// (au moins un chiffre dans la partie principale).
    pub fn parse(s: &str) -> Option<Decimal> {
        let s = s.trim();
        let (negatif, corps) = match s.as_bytes().first()? {
            b'-' => (true, &s[1..]),
            b'+' => (false, &s[1..]),
            _ => (false, s),
        };

        let (principal, exp_txt) = match corps.find(['e', 'E']) {
            Some(k) => (&corps[..k], Some(&corps[k + 1..])),
            None => (corps, None),
        };

        let (entier, frac) = match principal.find('.') {
            Some(k) => (&principal[..k], &principal[k + 1..]),
            None => (principal, ""),
        };
        if entier.is_empty() && frac.is_empty() {
            return None;
        }
        if !entier.bytes().all(|b| b.is_ascii_digit()) || !frac.bytes().all(|b| b.is_ascii_digit())
        {
            return None;
        }

        let mut exposant: i64 = match exp_txt {
            Some(t) => {
                let chiffres = t.strip_prefix(['+', '-']).unwrap_or(t);
                if chiffres.is_empty() || !chiffres.bytes().all(|b| b.is_ascii_digit()) {
                    return None;
                }
                let v: i64 = t.parse().ok()?;
                if v.abs() > MAX_EXPOSANT {
                    return None;
                }
                v
            }
            None => 0,
        };

        let chiffres = format!("{entier}{frac}");
        let mut m = BigInt::parse_bytes(chiffres.as_bytes(), 10)?;
        exposant -= frac.len() as i64;
        if negatif {
            m = -m;
        }
        Some(Decimal::new(m, exposant))
    }

    /* ------------------------ Inspection ------------------------ */

    pub fn mantisse(&self) -> &BigInt {
        &self.mantisse
    }

    pub fn exposant(&self) -> i64 {
        self.exposant
    }

    pub fn is_zero(&self) -> bool {
        self.mantisse.is_zero()
    }

    pub fn is_negative(&self) -> bool {
        self.mantisse.is_negative()
    }

    pub fn signum(&self) -> i32 {
        match self.mantisse.sign() {
            Sign::Minus => -1,
            Sign::NoSign => 0,
            Sign::Plus => 1,
        }
    }

    pub fn est_entier(&self) -> bool {
        self.exposant >= 0
    }

    /// Exposant du premier chiffre significatif (1234 -> 3, 0.05 -> -2).
    pub fn magnitude(&self) -> i64 {
        self.exposant + nb_chiffres(&self.mantisse) as i64 - 1
    }

    pub fn to_bigint(&self) -> Option<BigInt> {
        if !self.est_entier() || self.exposant > MAX_EXPOSANT {
            return None;
        }
        Some(&self.mantisse * pow10(self.exposant as usize))
    }

    pub fn to_i64(&self) -> Option<i64> {
        if self.est_entier() && self.exposant > 20 {
            return None;
        }
        self.to_bigint()?.to_i64()
    }

    pub fn to_rational(&self) -> BigRational {
        if self.exposant >= 0 {
            BigRational::from_integer(&self.mantisse * pow10(self.exposant as usize))
        } else {
            BigRational::new(self.mantisse.clone(), pow10((-self.exposant) as usize))
        }
    }

    /* ------------------------ Arrondi ------------------------ */

    /// Arrondi demi-pair à `precision` chiffres significatifs.
    pub fn arrondir(&self, precision: usize) -> Decimal {
        let precision = precision.max(1);
        let neg = self.is_negative();
        let (m, e) = arrondir_entier(self.mantisse.abs(), self.exposant, precision, false);
        Decimal::new(if neg { -m } else { m }, e)
    }

    /// Rationnel exact -> décimal arrondi à `precision` chiffres significatifs.
    pub fn from_rational(r: &BigRational, precision: usize) -> Decimal {
        if r.is_zero() {
            return Decimal::zero();
        }
        let precision = precision.max(1);
        let neg = r.is_negative();
        let n = r.numer().abs();
        let d = r.denom().abs();

        // k tel que n·10^k / d ait au moins precision+1 chiffres
        let k = precision as i64 + 2 + nb_chiffres(&d) as i64 - nb_chiffres(&n) as i64;
        let (q, reste) = if k >= 0 {
            let num = n * pow10(k as usize);
            (&num / &d, !(&num % &d).is_zero())
        } else {
            let den = d * pow10((-k) as usize);
            (&n / &den, !(&n % &den).is_zero())
        };

        let (m, e) = arrondir_entier(q, -k, precision, reste);
        Decimal::new(if neg { -m } else { m }, e)
    }

    /* ------------------------ Arithmétique ------------------------ */

    pub fn neg(&self) -> Decimal {
        Decimal {
            mantisse: -&self.mantisse,
            exposant: self.exposant,
        }
    }

    pub fn abs(&self) -> Decimal {
        Decimal {
            mantisse: self.mantisse.abs(),
            exposant: self.exposant,
        }
    }

    /// Alignement sur l’exposant commun.
    fn aligner(&self, autre: &Decimal) -> (BigInt, BigInt, i64) {
        let e = self.exposant.min(autre.exposant);
        let a = &self.mantisse * pow10((self.exposant - e) as usize);
        let b = &autre.mantisse * pow10((autre.exposant - e) as usize);
        (a, b, e)
    }

    pub fn add_exact(&self, autre: &Decimal) -> Decimal {
        if self.is_zero() {
            return autre.clone();
        }
        if autre.is_zero() {
            return self.clone();
        }
        let (a, b, e) = self.aligner(autre);
        Decimal::new(a + b, e)
    }

    pub fn add(&self, autre: &Decimal, precision: usize) -> Decimal {
        self.add_exact(autre).arrondir(precision)
    }

    pub fn sub(&self, autre: &Decimal, precision: usize) -> Decimal {
        self.add_exact(&autre.neg()).arrondir(precision)
    }

    pub fn mul_exact(&self, autre: &Decimal) -> Decimal {
        Decimal::new(&self.mantisse * &autre.mantisse, self.exposant + autre.exposant)
    }

    pub fn mul(&self, autre: &Decimal, precision: usize) -> Decimal {
        self.mul_exact(autre).arrondir(precision)
    }

    /// None si division par zéro.
    pub fn div(&self, autre: &Decimal, precision: usize) -> Option<Decimal> {
        if autre.is_zero() {
            return None;
        }
        Some(Decimal::from_rational(
            &(self.to_rational() / autre.to_rational()),
            precision,
        ))
    }

    /// Puissance entière par carrés successifs, arrondi à chaque étape (garde incluse).
    /// None si 0^négatif.
    pub fn pow_int(&self, n: i64, precision: usize) -> Option<Decimal> {
        if n == 0 {
            return Some(Decimal::un());
        }
        if n < 0 {
            if self.is_zero() {
                return None;
            }
            let garde = precision + 10;
            let pos = self.pow_int(-n, garde)?;
            return Decimal::un().div(&pos, precision);
        }

        let garde = precision + 10 + nb_chiffres(&BigInt::from(n));
        let mut e = n as u64;
        let mut acc = Decimal::un();
        let mut b = self.clone();

        while e > 0 {
            if (e & 1) == 1 {
                acc = acc.mul(&b, garde);
            }
            e >>= 1;
            if e > 0 {
                b = b.mul(&b, garde);
            }
        }
        Some(acc.arrondir(precision))
    }

    pub fn cmp_valeur(&self, autre: &Decimal) -> Ordering {
        let (a, b, _) = self.aligner(autre);
        a.cmp(&b)
    }
}

/* ------------------------ Texte canonique ------------------------ */

impl fmt::Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_zero() {
            return f.write_str("0");
        }
        let neg = self.is_negative();
        let chiffres = self.mantisse.magnitude().to_str_radix(10);
        let signe = if neg { "-" } else { "" };

        if self.exposant >= 0 {
            let zeros = "0".repeat(self.exposant as usize);
            return write!(f, "{signe}{chiffres}{zeros}");
        }

        let frac_len = (-self.exposant) as usize;
        if chiffres.len() > frac_len {
            let (ent, frac) = chiffres.split_at(chiffres.len() - frac_len);
            write!(f, "{signe}{ent}.{frac}")
        } else {
            let zeros = "0".repeat(frac_len - chiffres.len());
            write!(f, "{signe}0.{zeros}{chiffres}")
        }
    }
}
