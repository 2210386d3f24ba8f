// src/noyau/jetons.rs
//
// Lexer piloté par la grammaire
// -----------------------------
// - ponctuateurs : un caractère = un jeton (sauf "->")
// - lettres      : suite maximale lettres/chiffres (Sin, ArcTan, Log10, x)
// - chiffres     : numéral avec '.' et exposant e±n (ex: 4.331e-5)
// - après la fin : jeton Fin à l’infini (le parseur n’a jamais à tester le vide)

use std::fmt;

use super::erreur::ErreurLexicale;
use super::grammaire::Grammaire;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Categorie {
    /// Noms et numéraux : la distinction se fait par Params, pas par la syntaxe.
    Nom,

    Plus,
    Moins,
    Etoile,
    Barre,
    Chapeau, // ^
    Virgule,
    Point,

    ParG,
    ParD,
    CrochetG,
    CrochetD,
    AccoladeG,
    AccoladeD,

    Bang,       // !
    Apostrophe, // '
    Fleche,     // ->

    Fin,
}

impl Categorie {
    pub fn symbole(self) -> &'static str {
        match self {
            Categorie::Nom => "nom",
            Categorie::Plus => "+",
            Categorie::Moins => "-",
            Categorie::Etoile => "*",
            Categorie::Barre => "/",
            Categorie::Chapeau => "^",
            Categorie::Virgule => ",",
            Categorie::Point => ".",
            Categorie::ParG => "(",
            Categorie::ParD => ")",
            Categorie::CrochetG => "[",
            Categorie::CrochetD => "]",
            Categorie::AccoladeG => "{",
            Categorie::AccoladeD => "}",
            Categorie::Bang => "!",
            Categorie::Apostrophe => "'",
            Categorie::Fleche => "->",
            Categorie::Fin => "fin",
        }
    }
}

impl fmt::Display for Categorie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbole())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Tok {
    pub texte: String,
    pub categorie: Categorie,
    /// Index (en caractères) du début du jeton dans la source.
    pub position: usize,
}

impl Tok {
    fn fin(position: usize) -> Self {
        Tok {
            texte: String::new(),
            categorie: Categorie::Fin,
            position,
        }
    }

    /// Texte pour les messages d’erreur (la fin n’a pas de texte).
    pub fn affichage(&self) -> &str {
        if self.categorie == Categorie::Fin {
            "fin"
        } else {
            &self.texte
        }
    }
}

pub struct Lexer<'a> {
    chars: Vec<char>,
    i: usize,
    grammaire: &'a Grammaire,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &str, grammaire: &'a Grammaire) -> Self {
        Lexer {
            chars: source.chars().collect(),
            i: 0,
            grammaire,
        }
    }

    /// Jeton suivant. Ne signale jamais la fin par une erreur : Fin indéfiniment.
    pub fn prochain(&mut self) -> Result<Tok, ErreurLexicale> {
        let g = self.grammaire;

        while self.i < self.chars.len() && self.chars[self.i].is_whitespace() {
            self.i += 1;
        }

        let debut = self.i;
        let Some(&c) = self.chars.get(debut) else {
            return Ok(Tok::fin(debut));
        };

        // Ponctuateurs
        if let Some(cat) = g.ponctuateur(c) {
            // "->" : deux caractères, un seul jeton
            if cat == Categorie::Moins
                && self.chars.get(debut + 1) == Some(&'>')
                && g.connait(Categorie::Fleche)
            {
                self.i += 2;
                return Ok(Tok {
                    texte: "->".to_string(),
                    categorie: Categorie::Fleche,
                    position: debut,
                });
            }
            self.i += 1;
            return Ok(Tok {
                texte: c.to_string(),
                categorie: cat,
                position: debut,
            });
        }

        // Identifiants : on avance sur chaque caractère suivant (pas sur le premier)
        if g.est_lettre(c) {
            self.i += 1;
            while let Some(&s) = self.chars.get(self.i) {
                if g.est_lettre(s) || g.est_chiffre(s) {
                    self.i += 1;
                } else {
                    break;
                }
            }
            return Ok(self.capture(debut));
        }

        // Numéraux : chiffres, '.', exposant e/E avec signe collé
        if g.est_chiffre(c) {
            self.i += 1;
            while let Some(&s) = self.chars.get(self.i) {
                if g.est_chiffre(s) || s == '.' {
                    self.i += 1;
                } else if s == 'e' || s == 'E' {
                    self.i += 1;
                    if matches!(self.chars.get(self.i), Some('+') | Some('-')) {
                        self.i += 1;
                    }
                } else {
                    break;
                }
            }
            return Ok(self.capture(debut));
        }

        Err(ErreurLexicale {
            caractere: c,
            position: debut,
        })
    }

    fn capture(&self, debut: usize) -> Tok {
        Tok {
            texte: self.chars[debut..self.i].iter().collect(),
            categorie: Categorie::Nom,
            position: debut,
        }
    }
}

/// Tokenize toute la source (sans le jeton Fin final).
pub fn tokenize(source: &str, grammaire: &Grammaire) -> Result<Vec<Tok>, ErreurLexicale> {
    let mut lexer = Lexer::new(source, grammaire);
    let mut out = Vec::new();
    loop {
        let t = lexer.prochain()?;
        if t.categorie == Categorie::Fin {
            return Ok(out);
        }
        out.push(t);
    }
}

/// Format utilitaire (démarche) : liste de jetons en texte.
pub fn format_tokens(tokens: &[Tok]) -> String {
    tokens
        .iter()
        .map(|t| t.texte.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}
