// src/noyau/pratt.rs
//
// Parseur par précédence (Pratt)
// ------------------------------
// parse_expression(min):
//   1) jeton -> comportement préfixe (sinon erreur « impossible d’analyser »)
//   2) tant que précédence(jeton suivant) > min : comportement infixe sur l’arbre gauche
//
// Le tampon de lecture anticipée est une petite file (pas une vraie pile).
// Le lexer rend Fin à l’infini : jamais de test « vide ».

use std::collections::VecDeque;
use std::sync::Arc;

use log::trace;

use super::erreur::{ErreurAnalyse, ErreurSyntaxe};
use super::expr::{Expr, Symbole};
use super::grammaire::{Grammaire, Infixe, Prefixe};
use super::jetons::{Categorie, Lexer, Tok};

pub struct Parser<'a> {
    lexer: Lexer<'a>,
    grammaire: &'a Grammaire,
    tampon: VecDeque<Tok>,
}

impl<'a> Parser<'a> {
    pub fn new(source: &str, grammaire: &'a Grammaire) -> Self {
        Parser {
            lexer: Lexer::new(source, grammaire),
            grammaire,
            tampon: VecDeque::new(),
        }
    }

    /// Expression complète : parse_expression(0) puis fin d’entrée obligatoire.
    pub fn parse(&mut self) -> Result<Arc<Expr>, ErreurAnalyse> {
        let e = self.parse_expression(0)?;
        self.consommer(Categorie::Fin)?;
        Ok(e)
    }

    pub fn parse_expression(&mut self, min: u8) -> Result<Arc<Expr>, ErreurAnalyse> {
        let jeton = self.suivant()?;
        let Some(prefixe) = self.grammaire.prefixe(jeton.categorie) else {
            return Err(ErreurSyntaxe::SansPrefixe {
                jeton: jeton.affichage().to_string(),
                position: jeton.position,
            }
            .into());
        };

        let mut gauche = self.appliquer_prefixe(prefixe, jeton)?;

        while min < self.precedence_suivante()? {
            let jeton = self.suivant()?;
            trace!("infixe {:?} (min={min})", jeton.categorie);
            // precedence_suivante > 0 garantit un comportement infixe
            let Some(infixe) = self.grammaire.infixe(jeton.categorie) else {
                break;
            };
            gauche = self.appliquer_infixe(infixe, gauche, jeton)?;
        }

        Ok(gauche)
    }

    /* ------------------------ Comportements préfixes ------------------------ */

    fn appliquer_prefixe(&mut self, prefixe: Prefixe, jeton: Tok) -> Result<Arc<Expr>, ErreurAnalyse> {
        match prefixe {
            Prefixe::Nom => Ok(Expr::literal(jeton.texte)),

            Prefixe::Signe | Prefixe::Point => {
                let symbole = symbole_de(jeton.categorie);
                // l’opérande se lie à la précédence propre du jeton
                let p = self.grammaire.precedence(jeton.categorie);
                let operande = self.parse_expression(p)?;
                Ok(Expr::prefix(symbole, operande))
            }

            Prefixe::Groupe => {
                let contenu = self.parse_expression(0)?;
                self.consommer(Categorie::ParD)?;
                Ok(Expr::group(contenu))
            }

            Prefixe::Tableau => {
                let mut elements = Vec::new();
                if !self.accepter(Categorie::AccoladeD)? {
                    loop {
                        elements.push(self.parse_expression(0)?);
                        if !self.accepter(Categorie::Virgule)? {
                            break;
                        }
                    }
                    self.consommer(Categorie::AccoladeD)?;
                }
                Ok(Expr::array(elements))
            }
        }
    }

    /* ------------------------ Comportements infixes ------------------------ */

    fn appliquer_infixe(
        &mut self,
        infixe: Infixe,
        gauche: Arc<Expr>,
        jeton: Tok,
    ) -> Result<Arc<Expr>, ErreurAnalyse> {
        match infixe {
            Infixe::Operateur { droite } => {
                let p = self.grammaire.precedence(jeton.categorie);
                let p = if droite { p.saturating_sub(1) } else { p };
                let d = self.parse_expression(p)?;
                Ok(Expr::operator(gauche, symbole_de(jeton.categorie), d))
            }

            Infixe::Postfixe => Ok(Expr::postfix(gauche, symbole_de(jeton.categorie))),

            Infixe::Appel => {
                let Some(nom) = gauche.as_nom() else {
                    return Err(ErreurSyntaxe::NomDeFonction {
                        trouve: gauche.to_string(),
                        position: jeton.position,
                    }
                    .into());
                };
                let nom = nom.to_string();

                // au moins un argument : "F[]" échoue sur ']' (pas de préfixe)
                let mut args = Vec::new();
                loop {
                    args.push(self.parse_expression(0)?);
                    if !self.accepter(Categorie::Virgule)? {
                        break;
                    }
                }
                self.consommer(Categorie::CrochetD)?;
                Ok(Expr::function(nom, args))
            }
        }
    }

    /* ------------------------ Tampon ------------------------ */

    fn regarder(&mut self) -> Result<&Tok, ErreurAnalyse> {
        if self.tampon.is_empty() {
            let t = self.lexer.prochain()?;
            self.tampon.push_back(t);
        }
        Ok(&self.tampon[0])
    }

    fn suivant(&mut self) -> Result<Tok, ErreurAnalyse> {
        match self.tampon.pop_front() {
            Some(t) => Ok(t),
            None => Ok(self.lexer.prochain()?),
        }
    }

    fn precedence_suivante(&mut self) -> Result<u8, ErreurAnalyse> {
        let cat = self.regarder()?.categorie;
        Ok(self.grammaire.precedence_infixe(cat))
    }

    /// Consomme le jeton attendu, sinon erreur « attendu X, trouvé Y ».
    pub fn consommer(&mut self, attendu: Categorie) -> Result<Tok, ErreurAnalyse> {
        let t = self.suivant()?;
        if t.categorie != attendu {
            return Err(ErreurSyntaxe::Attendu {
                attendu,
                trouve: t.affichage().to_string(),
                position: t.position,
            }
            .into());
        }
        Ok(t)
    }

    /// Consommation optionnelle.
    pub fn accepter(&mut self, attendu: Categorie) -> Result<bool, ErreurAnalyse> {
        if self.regarder()?.categorie != attendu {
            return Ok(false);
        }
        self.suivant()?;
        Ok(true)
    }
}

fn symbole_de(cat: Categorie) -> Symbole {
    match cat {
        Categorie::Plus => Symbole::Plus,
        Categorie::Moins => Symbole::Moins,
        Categorie::Etoile => Symbole::Fois,
        Categorie::Barre => Symbole::Divise,
        Categorie::Chapeau => Symbole::Puissance,
        Categorie::Fleche => Symbole::Fleche,
        Categorie::Point => Symbole::Point,
        Categorie::Bang => Symbole::Factorielle,
        Categorie::Apostrophe => Symbole::Prime,
        // la grammaire n’enregistre d’opérateurs que pour les catégories ci-dessus
        autre => unreachable!("catégorie sans symbole : {autre:?}"),
    }
}

/// Analyse complète d’une source avec la grammaire donnée.
pub fn parse(source: &str, grammaire: &Grammaire) -> Result<Arc<Expr>, ErreurAnalyse> {
    Parser::new(source, grammaire).parse()
}
