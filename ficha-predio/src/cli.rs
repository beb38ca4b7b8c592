//! Définition et implémentation des commandes CLI
//!
//! - défaut : génère la ficha PDF d'une parcelle
//! - `inspect` : décrit un jeu de données GeoJSON

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use catastro::{CatastroError, Crs, CrsKind};
use clap::{Args, Subcommand};
use tracing::info;

use ficha_predio::config::Config;
use ficha_predio::dossier::format::ReportDate;
use ficha_predio::pipeline::{generate_report_from_geojson, ReportRequest};

#[derive(Subcommand)]
pub enum Commands {
    /// Describe a GeoJSON parcel dataset (records, CRS, columns)
    Inspect {
        /// Path to the GeoJSON FeatureCollection
        #[arg(short, long)]
        input: PathBuf,
    },
}

/// Arguments de la génération (commande par défaut)
#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// Path to the GeoJSON FeatureCollection of parcels
    #[arg(short, long)]
    pub input: PathBuf,

    /// Cadastral code of the parcel (exact match)
    #[arg(short, long)]
    pub code: String,

    /// Output PDF path
    #[arg(short, long)]
    pub output: PathBuf,

    /// Author shown in the "Fuente de Datos" section (défaut : config / Cartography Hub)
    #[arg(long)]
    pub author: Option<String>,

    /// Report date (YYYY-MM-DD, défaut : aujourd'hui)
    #[arg(long)]
    pub date: Option<String>,

    /// Logo image (cover page and header)
    #[arg(long)]
    pub logo: Option<PathBuf>,

    /// Map illustration of the parcel
    #[arg(long)]
    pub map: Option<PathBuf>,

    /// Config preset name (guayaquil) or path to a JSON config
    #[arg(long, default_value = "guayaquil")]
    pub config: String,

    /// Override the dataset CRS (EPSG code)
    #[arg(long)]
    pub source_epsg: Option<u32>,

    /// Write the generation report as JSON
    #[arg(long)]
    pub summary: Option<PathBuf>,
}

/// Exécute la génération ; retourne le succès
pub fn cmd_generate(args: &GenerateArgs) -> Result<bool> {
    let mut config = Config::resolve(&args.config)
        .with_context(|| format!("Cannot load config '{}'", args.config))?;
    config.apply_env();
    config.validate()?;
    let schema = config.schema()?;

    let crs_override = args.source_epsg.map(source_crs).transpose()?;

    info!(
        input = %args.input.display(),
        code = %args.code,
        output = %args.output.display(),
        config = %args.config,
        "Generating parcel report"
    );

    let mut request = ReportRequest::new(&args.code, &args.output)
        .with_date(ReportDate::from(args.date.clone()));
    if let Some(author) = &args.author {
        request = request.with_author(author);
    }
    if let Some(logo) = &args.logo {
        request = request.with_logo(logo);
    }
    if let Some(map) = &args.map {
        request = request.with_map(map);
    }

    let report = generate_report_from_geojson(
        &args.input,
        crs_override,
        &request,
        &config.document,
        &schema,
    );

    let (success, message) = report.outcome();
    println!("{}", message);
    if !report.warnings.is_empty() || !success {
        report.display();
    }
    info!("{}", report.summary());

    if let Some(path) = &args.summary {
        report
            .save_to_file(path)
            .with_context(|| format!("Cannot write summary: {}", path.display()))?;
        info!(path = %path.display(), "Generation report saved");
    }

    Ok(success)
}

/// CRS imposé par `--source-epsg`
fn source_crs(epsg: u32) -> Result<Crs> {
    let crs = Crs::from_epsg(epsg);
    if crs.kind == CrsKind::Unknown {
        return Err(CatastroError::UnknownCrs(format!("EPSG:{}", epsg)).into());
    }
    Ok(crs)
}

/// Exécute la commande inspect
pub fn cmd_inspect(input: &Path) -> Result<()> {
    let dataset = catastro::load(input)
        .with_context(|| format!("Cannot load dataset: {}", input.display()))?;

    println!("=== {} ===", input.display());
    println!("Records: {}", dataset.len());
    match &dataset.crs {
        Some(crs) => println!("CRS: {}", crs),
        None => println!("CRS: No definido"),
    }
    println!("Columns:");
    for column in dataset.columns() {
        println!("  {}", column);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_crs() {
        assert_eq!(source_crs(32717).unwrap().name, "WGS 84 / UTM zone 17S");
        assert!(source_crs(4674).unwrap().is_geographic());

        let err = source_crs(123456).unwrap_err();
        assert!(err.to_string().contains("EPSG:123456"));
    }
}
