//! Noyau — moteur d’expressions de la calculatrice scientifique
//!
//! Organisation interne :
//! - jetons.rs     : catégories + lexer (fin d’entrée = Fin à l’infini)
//! - grammaire.rs  : tables de précédence (standard / plate)
//! - pratt.rs      : parseur par précédence -> Expr
//! - expr.rs       : arbre (Arc) + inspection + texte source
//! - rendu.rs      : Expr::render -> segments d’affichage
//! - segments.rs   : segments + texte brut
//! - format.rs     : présentation d’un nombre selon le mode (FIXE, SCI, FRAC…)
//! - eval.rs       : Expr::evaluate + façade eval_expression
//! - fonctions.rs  : réduction des appels (dispatch NomsCas)
//! - arith.rs      : fonctions mathématiques en précision arbitraire
//! - lecture.rs    : noyau virgule fixe (séries, π / ln 2 / ln 10 en cache)
//! - nombre.rs     : Decimal (mantisse BigInt · 10^exposant)
//! - trig.rs       : angles spéciaux exacts + indéfini
//! - params.rs     : contexte d’évaluation (échelle, unité, mode, identifiants, noms CAS)
//! - erreur.rs     : erreurs d’analyse / d’évaluation

pub mod arith;
pub mod erreur;
pub mod eval;
pub mod expr;
pub mod fonctions;
pub mod format;
pub mod grammaire;
pub mod jetons;
pub mod lecture;
pub mod nombre;
pub mod params;
pub mod pratt;
pub mod rendu;
pub mod segments;
pub mod trig;

#[cfg(test)]
mod tests_scientifiques;

#[cfg(test)]
mod tests_fuzz_safe;

// API publique
pub use erreur::{ErreurAnalyse, ErreurCalcul, ErreurEval, ErreurLexicale, ErreurSyntaxe};
pub use eval::{eval_expression, Demarche, Resultat};
pub use expr::{Expr, Symbole};
pub use grammaire::Grammaire;
pub use nombre::Decimal;
pub use params::{Fonction, Identifiant, ModeResultat, NomsCas, Params, UniteAngle};
pub use pratt::parse;
pub use segments::{Segment, Segments};
