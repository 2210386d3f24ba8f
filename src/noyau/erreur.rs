// src/noyau/erreur.rs
//
// Deux familles d’erreurs, à traiter séparément par l’appelant :
// - ErreurAnalyse : « corrige ton entrée » (lexicale ou syntaxe)
// - ErreurEval    : « incalculable à cette précision / dans ce domaine »

use thiserror::Error;

use super::jetons::Categorie;

/// Caractère hors de toute catégorie enregistrée dans la grammaire.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("le jeton « {caractere} » est inconnu (position {position})")]
pub struct ErreurLexicale {
    pub caractere: char,
    pub position: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ErreurSyntaxe {
    /// Jeton sans comportement préfixe (ex: `*` en tête d’expression).
    #[error("impossible d’analyser « {jeton} » (position {position})")]
    SansPrefixe { jeton: String, position: usize },

    /// Délimiteur attendu mais autre chose trouvé.
    #[error("attendu « {attendu} », trouvé « {trouve} » (position {position})")]
    Attendu {
        attendu: Categorie,
        trouve: String,
        position: usize,
    },

    /// `[` appliqué à autre chose qu’un nom.
    #[error("nom de fonction attendu avant « [ », trouvé « {trouve} » (position {position})")]
    NomDeFonction { trouve: String, position: usize },
}

/// Erreur du parseur : lexicale ou syntaxique, jamais récupérée.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ErreurAnalyse {
    #[error(transparent)]
    Lexicale(#[from] ErreurLexicale),
    #[error(transparent)]
    Syntaxe(#[from] ErreurSyntaxe),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ErreurEval {
    #[error("division par zéro")]
    DivisionParZero,

    #[error("{fonction} : hors domaine ({detail})")]
    Domaine { fonction: String, detail: String },

    /// Résultat dont la précision ne peut pas être bornée (exposant énorme, etc.).
    #[error("dépassement : {detail}")]
    Depassement { detail: String },

    #[error("{fonction} attend {attendu} argument(s), {recu} reçu(s)")]
    Arite {
        fonction: String,
        attendu: String,
        recu: usize,
    },

    #[error("substitution récursive sans fin pour « {nom} »")]
    Recursion { nom: String },
}

impl ErreurEval {
    pub fn domaine(fonction: &str, detail: impl Into<String>) -> Self {
        ErreurEval::Domaine {
            fonction: fonction.to_string(),
            detail: detail.into(),
        }
    }

    pub fn depassement(detail: impl Into<String>) -> Self {
        ErreurEval::Depassement {
            detail: detail.into(),
        }
    }
}

/// Erreur de la façade `eval_expression`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ErreurCalcul {
    #[error(transparent)]
    Analyse(#[from] ErreurAnalyse),
    #[error(transparent)]
    Eval(#[from] ErreurEval),
}

impl From<ErreurLexicale> for ErreurCalcul {
    fn from(e: ErreurLexicale) -> Self {
        ErreurCalcul::Analyse(e.into())
    }
}

impl From<ErreurSyntaxe> for ErreurCalcul {
    fn from(e: ErreurSyntaxe) -> Self {
        ErreurCalcul::Analyse(e.into())
    }
}
