// src/noyau/params.rs
//
// Contexte d’évaluation (lecture seule pendant render/evaluate)
// -------------------------------------------------------------
// - échelle (chiffres significatifs), bornée comme DIGITS_DEFAUT/DIGITS_MAX
// - unité d’angle, mode de résultat, drapeau complexe
// - tables d’identifiants : variables libres, liées, constantes (fermetures)
// - noms CAS configurables (Sin, ArcSin, Log, …)

use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use super::arith::{self, GARDE};

pub const ECHELLE_DEFAUT: usize = 20;
pub const ECHELLE_MAX: usize = 1000;

/* ------------------------ Unité d’angle ------------------------ */

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum UniteAngle {
    Deg,
    #[default]
    Rad,
    Grad,
}

impl UniteAngle {
    pub fn nom(self) -> &'static str {
        match self {
            UniteAngle::Deg => "deg",
            UniteAngle::Rad => "rad",
            UniteAngle::Grad => "grad",
        }
    }
}

impl FromStr for UniteAngle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, String> {
        match s.to_ascii_lowercase().as_str() {
            "deg" | "degre" | "degres" => Ok(UniteAngle::Deg),
            "rad" | "radian" | "radians" => Ok(UniteAngle::Rad),
            "grad" | "gon" | "grade" | "grades" => Ok(UniteAngle::Grad),
            _ => Err(format!("unité d’angle inconnue : {s} (deg, rad, grad)")),
        }
    }
}

/* ------------------------ Mode de résultat ------------------------ */

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum ModeResultat {
    Fixe,
    Scientifique,
    Ingenieur,
    Fraction,
    FractionMixte,
    /// Les noms ne sont jamais substitués.
    Expression,
    /// Texte canonique brut.
    #[default]
    Decimal,
}

impl ModeResultat {
    pub fn nom(self) -> &'static str {
        match self {
            ModeResultat::Fixe => "fixe",
            ModeResultat::Scientifique => "sci",
            ModeResultat::Ingenieur => "ing",
            ModeResultat::Fraction => "frac",
            ModeResultat::FractionMixte => "mixte",
            ModeResultat::Expression => "expr",
            ModeResultat::Decimal => "dec",
        }
    }

    pub fn est_fraction(self) -> bool {
        matches!(self, ModeResultat::Fraction | ModeResultat::FractionMixte)
    }
}

impl FromStr for ModeResultat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, String> {
        match s.to_ascii_lowercase().as_str() {
            "fixe" | "fix" => Ok(ModeResultat::Fixe),
            "sci" | "scientifique" => Ok(ModeResultat::Scientifique),
            "ing" | "ingenieur" | "eng" => Ok(ModeResultat::Ingenieur),
            "frac" | "fraction" => Ok(ModeResultat::Fraction),
            "mixte" | "fraction-mixte" => Ok(ModeResultat::FractionMixte),
            "expr" | "expression" => Ok(ModeResultat::Expression),
            "dec" | "decimal" => Ok(ModeResultat::Decimal),
            _ => Err(format!(
                "mode inconnu : {s} (fixe, sci, ing, frac, mixte, expr, dec)"
            )),
        }
    }
}

/* ------------------------ Identifiants ------------------------ */

pub type Valeur = Arc<dyn Fn(&Params) -> String + Send + Sync>;

/// Constante ou variable liée : glyphe affiché + texte de valeur calculé à la demande.
#[derive(Clone)]
pub struct Identifiant {
    pub glyphe: String,
    pub valeur: Valeur,
}

impl Identifiant {
    pub fn new(
        glyphe: impl Into<String>,
        valeur: impl Fn(&Params) -> String + Send + Sync + 'static,
    ) -> Self {
        Identifiant {
            glyphe: glyphe.into(),
            valeur: Arc::new(valeur),
        }
    }

    /// Valeur textuelle fixe ("1.5", "1/3", "2*x", …).
    pub fn fixe(glyphe: impl Into<String>, texte: impl Into<String>) -> Self {
        let texte = texte.into();
        Identifiant::new(glyphe, move |_| texte.clone())
    }
}

impl fmt::Debug for Identifiant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Identifiant")
            .field("glyphe", &self.glyphe)
            .finish_non_exhaustive()
    }
}

/* ------------------------ Fonctions CAS ------------------------ */

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Fonction {
    Sin,
    ArcSin,
    Cos,
    ArcCos,
    Tan,
    ArcTan,
    Csc,
    ArcCsc,
    Sec,
    ArcSec,
    Cot,
    ArcCot,
    Sinh,
    ArcSinh,
    Cosh,
    ArcCosh,
    Tanh,
    ArcTanh,
    Csch,
    ArcCsch,
    Sech,
    ArcSech,
    Coth,
    ArcCoth,
    Exp,
    Log,
    Log10,
    Log2,
    Sqrt,
    Cqrt,
    Power,
    Abs,
    Sign,
    Gcd,
    Lcm,
    Mod,
    Min,
    Max,
    Npr,
    Ncr,
    Gamma,
    Floor,
    Ceiling,
    Rational,
    Sum,
    Product,
    D,
    Integrate,
    Limit,
    Erf,
    PolyGamma,
}

impl Fonction {
    pub const TOUTES: [Fonction; 51] = [
        Fonction::Sin,
        Fonction::ArcSin,
        Fonction::Cos,
        Fonction::ArcCos,
        Fonction::Tan,
        Fonction::ArcTan,
        Fonction::Csc,
        Fonction::ArcCsc,
        Fonction::Sec,
        Fonction::ArcSec,
        Fonction::Cot,
        Fonction::ArcCot,
        Fonction::Sinh,
        Fonction::ArcSinh,
        Fonction::Cosh,
        Fonction::ArcCosh,
        Fonction::Tanh,
        Fonction::ArcTanh,
        Fonction::Csch,
        Fonction::ArcCsch,
        Fonction::Sech,
        Fonction::ArcSech,
        Fonction::Coth,
        Fonction::ArcCoth,
        Fonction::Exp,
        Fonction::Log,
        Fonction::Log10,
        Fonction::Log2,
        Fonction::Sqrt,
        Fonction::Cqrt,
        Fonction::Power,
        Fonction::Abs,
        Fonction::Sign,
        Fonction::Gcd,
        Fonction::Lcm,
        Fonction::Mod,
        Fonction::Min,
        Fonction::Max,
        Fonction::Npr,
        Fonction::Ncr,
        Fonction::Gamma,
        Fonction::Floor,
        Fonction::Ceiling,
        Fonction::Rational,
        Fonction::Sum,
        Fonction::Product,
        Fonction::D,
        Fonction::Integrate,
        Fonction::Limit,
        Fonction::Erf,
        Fonction::PolyGamma,
    ];

    /// Nom CAS par défaut (convention capitalisée).
    pub fn nom_defaut(self) -> &'static str {
        use Fonction::*;
        match self {
            Sin => "Sin",
            ArcSin => "ArcSin",
            Cos => "Cos",
            ArcCos => "ArcCos",
            Tan => "Tan",
            ArcTan => "ArcTan",
            Csc => "Csc",
            ArcCsc => "ArcCsc",
            Sec => "Sec",
            ArcSec => "ArcSec",
            Cot => "Cot",
            ArcCot => "ArcCot",
            Sinh => "Sinh",
            ArcSinh => "ArcSinh",
            Cosh => "Cosh",
            ArcCosh => "ArcCosh",
            Tanh => "Tanh",
            ArcTanh => "ArcTanh",
            Csch => "Csch",
            ArcCsch => "ArcCsch",
            Sech => "Sech",
            ArcSech => "ArcSech",
            Coth => "Coth",
            ArcCoth => "ArcCoth",
            Exp => "Exp",
            Log => "Log",
            Log10 => "Log10",
            Log2 => "Log2",
            Sqrt => "Sqrt",
            Cqrt => "Cqrt",
            Power => "Power",
            Abs => "Abs",
            Sign => "Sign",
            Gcd => "Gcd",
            Lcm => "Lcm",
            Mod => "Mod",
            Min => "Min",
            Max => "Max",
            Npr => "Npr",
            Ncr => "Ncr",
            Gamma => "Gamma",
            Floor => "Floor",
            Ceiling => "Ceiling",
            Rational => "Rational",
            Sum => "Sum",
            Product => "Product",
            D => "D",
            Integrate => "Integrate",
            Limit => "Limit",
            Erf => "Erf",
            PolyGamma => "PolyGamma",
        }
    }

    /// Circulaires directes et réciproques : portent l’unité d’angle au rendu.
    pub fn est_trigonometrique(self) -> bool {
        use Fonction::*;
        matches!(
            self,
            Sin | ArcSin | Cos | ArcCos | Tan | ArcTan | Csc | ArcCsc | Sec | ArcSec | Cot | ArcCot
        )
    }

    /// Réciproque -> fonction directe (ArcSin -> Sin, ArcCoth -> Coth).
    pub fn direct(self) -> Option<Fonction> {
        use Fonction::*;
        Some(match self {
            ArcSin => Sin,
            ArcCos => Cos,
            ArcTan => Tan,
            ArcCsc => Csc,
            ArcSec => Sec,
            ArcCot => Cot,
            ArcSinh => Sinh,
            ArcCosh => Cosh,
            ArcTanh => Tanh,
            ArcCsch => Csch,
            ArcSech => Sech,
            ArcCoth => Coth,
            _ => return None,
        })
    }

    /// Jamais réduites numériquement.
    pub fn est_symbolique(self) -> bool {
        use Fonction::*;
        matches!(self, Sum | Product | D | Integrate | Limit | Erf | PolyGamma)
    }
}

/// Correspondance fonction interne <-> identifiant CAS.
#[derive(Clone, Debug)]
pub struct NomsCas {
    vers_nom: HashMap<Fonction, String>,
    vers_fonction: HashMap<String, Fonction>,
}

impl Default for NomsCas {
    fn default() -> Self {
        let mut n = NomsCas {
            vers_nom: HashMap::new(),
            vers_fonction: HashMap::new(),
        };
        for f in Fonction::TOUTES {
            n.renommer(f, f.nom_defaut());
        }
        n
    }
}

impl NomsCas {
    pub fn fonction(&self, nom: &str) -> Option<Fonction> {
        self.vers_fonction.get(nom).copied()
    }

    pub fn nom(&self, f: Fonction) -> &str {
        self.vers_nom
            .get(&f)
            .map(String::as_str)
            .unwrap_or_else(|| f.nom_defaut())
    }

    pub fn renommer(&mut self, f: Fonction, nom: impl Into<String>) {
        let nom = nom.into();
        if let Some(ancien) = self.vers_nom.insert(f, nom.clone()) {
            self.vers_fonction.remove(&ancien);
        }
        self.vers_fonction.insert(nom, f);
    }

    /// Noms actifs des fonctions circulaires.
    pub fn trigonometriques(&self) -> Vec<&str> {
        Fonction::TOUTES
            .iter()
            .filter(|f| f.est_trigonometrique())
            .map(|f| self.nom(*f))
            .collect()
    }

    /// Nom de la fonction directe d’une réciproque (par nom actif).
    pub fn direct_de(&self, nom: &str) -> Option<&str> {
        let f = self.fonction(nom)?.direct()?;
        Some(self.nom(f))
    }
}

/* ------------------------ Params ------------------------ */

#[derive(Clone, Debug)]
pub struct Params {
    echelle: usize,
    pub unite_angle: UniteAngle,
    pub mode: ModeResultat,
    pub complexe: bool,
    pub variables_libres: BTreeSet<String>,
    pub constantes: HashMap<String, Identifiant>,
    pub variables_liees: HashMap<String, Identifiant>,
    pub noms: NomsCas,
}

impl Default for Params {
    fn default() -> Self {
        let mut constantes = HashMap::new();
        constantes.insert(
            "pi".to_string(),
            Identifiant::new("π", |p: &Params| arith::pi(p.precision_travail()).to_string()),
        );
        constantes.insert(
            "e".to_string(),
            Identifiant::new("e", |p: &Params| arith::e(p.precision_travail()).to_string()),
        );

        Params {
            echelle: ECHELLE_DEFAUT,
            unite_angle: UniteAngle::default(),
            mode: ModeResultat::default(),
            complexe: false,
            variables_libres: ["x", "y"].iter().map(|s| s.to_string()).collect(),
            constantes,
            variables_liees: HashMap::new(),
            noms: NomsCas::default(),
        }
    }
}

impl Params {
    pub fn echelle(&self) -> usize {
        self.echelle
    }

    /// Échelle + chiffres de garde.
    pub fn precision_travail(&self) -> usize {
        self.echelle + GARDE
    }

    pub fn set_echelle(&mut self, echelle: usize) {
        self.echelle = echelle.clamp(1, ECHELLE_MAX);
    }

    /* ---- Construction ---- */

    pub fn avec_echelle(mut self, echelle: usize) -> Self {
        self.set_echelle(echelle);
        self
    }

    pub fn avec_unite(mut self, unite: UniteAngle) -> Self {
        self.unite_angle = unite;
        self
    }

    pub fn avec_mode(mut self, mode: ModeResultat) -> Self {
        self.mode = mode;
        self
    }

    pub fn avec_complexe(mut self, complexe: bool) -> Self {
        self.complexe = complexe;
        self
    }

    pub fn avec_variables_libres<I, S>(mut self, noms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.variables_libres = noms.into_iter().map(Into::into).collect();
        self
    }

    pub fn avec_constante(mut self, nom: impl Into<String>, id: Identifiant) -> Self {
        self.constantes.insert(nom.into(), id);
        self
    }

    pub fn avec_variable_liee(mut self, nom: impl Into<String>, id: Identifiant) -> Self {
        self.variables_liees.insert(nom.into(), id);
        self
    }

    pub fn avec_noms(mut self, noms: NomsCas) -> Self {
        self.noms = noms;
        self
    }

    /* ---- Résolution (correspondance exacte) ---- */

    pub fn est_variable_libre(&self, nom: &str) -> bool {
        self.variables_libres.contains(nom)
    }

    pub fn variable_liee(&self, nom: &str) -> Option<&Identifiant> {
        self.variables_liees.get(nom)
    }

    pub fn constante(&self, nom: &str) -> Option<&Identifiant> {
        self.constantes.get(nom)
    }
}
