//! Point d'entrée CLI pour ficha-predio

use anyhow::Result;
use clap::Parser;
use tracing::Level;
use tracing_subscriber::{fmt, EnvFilter};

// Charger .env au démarrage
fn load_env() {
    // Chercher .env dans le répertoire courant ou parent
    if dotenvy::dotenv().is_err() {
        // Essayer depuis le répertoire du binaire
        if let Ok(exe) = std::env::current_exe() {
            if let Some(dir) = exe.parent() {
                let _ = dotenvy::from_path(dir.join(".env"));
            }
        }
    }
}

mod cli;

use cli::{Commands, GenerateArgs};

/// Générer la ficha técnica catastral PDF d'une parcelle
#[derive(Parser)]
#[command(name = "ficha-predio")]
#[command(author, version)]
#[command(about = "Générer la ficha técnica catastral (PDF) d'une parcelle depuis un GeoJSON")]
#[command(long_about = "Génère le dossier technique PDF d'une parcelle urbaine : couverture, attributs, linderos, cuadro de coordenadas UTM et plan.\n\nUtilisez 'inspect' pour décrire un jeu de données.")]
#[command(args_conflicts_with_subcommands = true)]
struct Cli {
    /// Augmenter la verbosité (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Mode silencieux
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Sous-commande (défaut: génération de la ficha)
    #[command(subcommand)]
    command: Option<Commands>,

    /// Arguments de la génération (commande par défaut)
    #[command(flatten)]
    generate: Option<GenerateArgs>,
}

fn main() -> Result<()> {
    // Charger .env avant tout
    load_env();

    let cli = Cli::parse();

    // Configurer le logging
    init_logging(cli.verbose, cli.quiet);

    match cli.command {
        Some(Commands::Inspect { input }) => cli::cmd_inspect(&input)?,
        None => {
            let Some(args) = cli.generate else {
                anyhow::bail!("Missing arguments: --input, --code and --output are required");
            };
            if !cli::cmd_generate(&args)? {
                std::process::exit(1);
            }
        }
    }

    Ok(())
}

fn init_logging(verbose: u8, quiet: bool) {
    let level = match (quiet, verbose) {
        (true, _) => Level::WARN,
        (_, 0) => Level::INFO,
        (_, 1) => Level::DEBUG,
        (_, _) => Level::TRACE,
    };

    let filter = EnvFilter::from_default_env().add_directive(level.into());

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .init();
}
