// src/app/vue.rs
//
// Vue texte de la session
// -----------------------
// - résultat rendu, puis « ≈ valeur » quand la présentation diffère du nombre canonique
// - erreur seule si l’évaluation a échoué
// - démarche sur demande (:demarche)

use super::etat::AppCalc;

impl AppCalc {
    pub fn vue(&self) -> String {
        if !self.erreur.is_empty() {
            return format!("erreur : {}", self.erreur);
        }

        let mut lignes = vec![format!("= {}", self.resultat)];
        if let Some(v) = &self.valeur {
            if *v != self.resultat {
                lignes.push(format!("≈ {v}"));
            }
        }

        if self.afficher_demarche {
            let d = &self.demarche;
            for (titre, contenu) in [
                ("Jetons", &d.jetons),
                ("Avant", &d.avant),
                ("Après", &d.apres),
                ("Note", &d.note),
            ] {
                lignes.push(format!("  {titre:<7}: {contenu}"));
            }
        }
        lignes.join("\n")
    }

    /// Invite de la boucle interactive : [unité mode échelle]
    pub fn invite(&self) -> String {
        format!(
            "[{} {} {}]> ",
            self.params.unite_angle.nom(),
            self.params.mode.nom(),
            self.params.echelle()
        )
    }
}
