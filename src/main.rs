// src/main.rs
//
// Calculatrice scientifique — point d’entrée terminal
// ---------------------------------------------------
// - Arguments (clap) -> Params + grammaire
// - Journal : env_logger, filtre « warn » par défaut (RUST_LOG ou -v pour plus)
// - Une expression en argument : évaluation unique ; sinon boucle ligne à ligne sur stdin

use std::io::{self, BufRead, IsTerminal, Write};
use std::process::ExitCode;

use clap::Parser;
use env_logger::Env;
use log::{error, info};

use calculatrice_sci::noyau::params::ECHELLE_DEFAUT;
use calculatrice_sci::noyau::{Grammaire, Identifiant, ModeResultat, Params, UniteAngle};

mod app;

use app::{AppCalc, Sortie};

#[derive(Parser, Debug)]
#[command(
    name = "calculatrice_sci",
    version,
    about = "Calculatrice scientifique en précision arbitraire"
)]
struct Cli {
    /// Expression à évaluer (sinon : lecture ligne à ligne sur l’entrée standard)
    expression: Option<String>,

    /// Chiffres significatifs des résultats
    #[arg(long, default_value_t = ECHELLE_DEFAUT)]
    echelle: usize,

    /// Unité d’angle : deg, rad, grad
    #[arg(long, default_value = "rad")]
    angle: UniteAngle,

    /// Présentation : dec, fixe, sci, ing, frac, mixte, expr
    #[arg(long, default_value = "dec")]
    mode: ModeResultat,

    /// Grammaire : standard (précédences) ou plate (gauche à droite)
    #[arg(long, default_value = "standard")]
    grammaire: String,

    /// Hors domaine réel : l’appel reste symbolique au lieu d’échouer
    #[arg(long)]
    complexe: bool,

    /// Lettres des variables libres
    #[arg(long, default_value = "xy")]
    variables: String,

    /// Constante supplémentaire NOM=VALEUR (répétable)
    #[arg(long = "constante", value_name = "NOM=VALEUR")]
    constantes: Vec<String>,

    /// Affiche la démarche (jetons, arbre avant/après)
    #[arg(long)]
    demarche: bool,

    /// Plus de journal (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn installer_journal(verbose: u8) {
    let mut b = env_logger::Builder::from_env(Env::default().default_filter_or("warn"));
    match verbose {
        0 => {}
        1 => {
            b.filter_level(log::LevelFilter::Info);
        }
        2 => {
            b.filter_level(log::LevelFilter::Debug);
        }
        _ => {
            b.filter_level(log::LevelFilter::Trace);
        }
    }
    b.init();
}

fn construire_params(cli: &Cli) -> Result<Params, String> {
    let mut p = Params::default()
        .avec_echelle(cli.echelle)
        .avec_unite(cli.angle)
        .avec_mode(cli.mode)
        .avec_complexe(cli.complexe)
        .avec_variables_libres(cli.variables.chars().map(String::from));

    for c in &cli.constantes {
        let (nom, valeur) = c
            .split_once('=')
            .ok_or_else(|| format!("constante invalide : {c} (attendu NOM=VALEUR)"))?;
        let nom = nom.trim();
        if nom.is_empty() || !nom.chars().all(|ch| ch.is_ascii_alphanumeric()) {
            return Err(format!("nom de constante invalide : {nom:?}"));
        }
        p = p.avec_constante(nom, Identifiant::fixe(nom, valeur.trim()));
    }
    Ok(p)
}

fn boucle(app: &mut AppCalc) -> ExitCode {
    let interactif = io::stdin().is_terminal();
    let mut stdout = io::stdout();
    let mut lignes = io::stdin().lock().lines();

    loop {
        if interactif {
            print!("{}", app.invite());
            let _ = stdout.flush();
        }
        let ligne = match lignes.next() {
            None => break,
            Some(Ok(l)) => l,
            Some(Err(e)) => {
                error!("lecture de l’entrée : {e}");
                return ExitCode::FAILURE;
            }
        };
        match app.traiter(&ligne) {
            Sortie::Quitter => break,
            Sortie::Texte(t) if t.is_empty() => {}
            Sortie::Texte(t) => println!("{t}"),
        }
    }
    ExitCode::SUCCESS
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    installer_journal(cli.verbose);

    let params = match construire_params(&cli) {
        Ok(p) => p,
        Err(msg) => {
            eprintln!("{msg}");
            return ExitCode::from(2);
        }
    };
    let Some(grammaire) = Grammaire::par_nom(&cli.grammaire) else {
        eprintln!("grammaire inconnue : {} (standard, plate)", cli.grammaire);
        return ExitCode::from(2);
    };
    info!(
        "échelle {}, angle {}, mode {}, grammaire {}",
        params.echelle(),
        params.unite_angle.nom(),
        params.mode.nom(),
        grammaire.nom()
    );

    let mut app = AppCalc::new(params, grammaire);
    app.afficher_demarche = cli.demarche;

    match cli.expression {
        Some(expr) => {
            app.entree = expr;
            app.evaluer();
            println!("{}", app.vue());
            if app.erreur.is_empty() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            }
        }
        None => boucle(&mut app),
    }
}
