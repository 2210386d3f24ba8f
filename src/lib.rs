// src/lib.rs
//
// Calculatrice scientifique — bibliothèque
// ----------------------------------------
// Le noyau (analyse + évaluation) est indépendant de toute interface ;
// le binaire (main.rs + app/) n’en est qu’un client.

pub mod noyau;

pub use noyau::{eval_expression, parse, ErreurCalcul, Grammaire, Params, Resultat};
