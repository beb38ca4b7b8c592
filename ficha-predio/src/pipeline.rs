//! Génération d'une ficha : sélection → projection → assemblage → rendu
//!
//! `generate_report` ne remonte jamais d'erreur : tout est consigné dans le
//! `GenerationReport` retourné. Les erreurs de sélection et de rendu sont
//! fatales, les autres dégradent le document.

use std::path::{Path, PathBuf};
use std::time::Instant;

use catastro::{select_by_code, Crs, Dataset, Field, Schema};
use chrono::Local;
use tracing::{debug, info, warn};

use crate::config::{DocumentConfig, DEFAULT_AUTHOR};
use crate::dossier::decoration::{CoverMetadata, DossierDecoration, FooterMetadata};
use crate::dossier::format::{long_date, ReportDate};
use crate::dossier::images::{load_image, EmbeddedImage, ImageLoad};
use crate::dossier::{assemble, DossierInput};
use crate::error::FichaError;
use crate::export::pdf::{write_pdf, DocumentInfo, PageSetup};
use crate::projector;
use crate::report::{GenerationReport, Stage};

/// Paramètres d'une génération
#[derive(Debug, Clone, PartialEq)]
pub struct ReportRequest {
    pub code: String,
    pub output: PathBuf,
    /// Auteur ("Cartography Hub" par défaut, ou celui de la configuration)
    pub author: Option<String>,
    pub date: ReportDate,
    pub logo: Option<PathBuf>,
    pub map: Option<PathBuf>,
}

impl ReportRequest {
    pub fn new(code: impl Into<String>, output: impl Into<PathBuf>) -> Self {
        Self {
            code: code.into(),
            output: output.into(),
            author: None,
            date: ReportDate::Today,
            logo: None,
            map: None,
        }
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    pub fn with_date(mut self, date: impl Into<ReportDate>) -> Self {
        self.date = date.into();
        self
    }

    pub fn with_logo(mut self, path: impl Into<PathBuf>) -> Self {
        self.logo = Some(path.into());
        self
    }

    pub fn with_map(mut self, path: impl Into<PathBuf>) -> Self {
        self.map = Some(path.into());
        self
    }
}

/// Génère le PDF d'une parcelle du jeu de données
pub fn generate_report(
    dataset: &Dataset,
    request: &ReportRequest,
    document: &DocumentConfig,
    schema: &Schema,
) -> GenerationReport {
    let start = Instant::now();
    let mut report = GenerationReport::new(&request.code, &request.output);

    if let Err(e) = run(dataset, request, document, schema, &mut report) {
        warn!(code = %request.code, stage = ?report.stage, kind = %e.kind(), error = %e, "Report generation failed");
        report.record_error(&e);
    }

    report.set_duration(start.elapsed());
    report.finalize();
    report
}

/// Charge un GeoJSON puis génère le PDF
///
/// `crs_override` remplace le CRS déclaré par le fichier.
pub fn generate_report_from_geojson(
    input: &Path,
    crs_override: Option<Crs>,
    request: &ReportRequest,
    document: &DocumentConfig,
    schema: &Schema,
) -> GenerationReport {
    match catastro::load(input) {
        Ok(dataset) => {
            let dataset = match crs_override {
                Some(crs) => {
                    debug!(epsg = crs.epsg, "Source CRS overridden");
                    dataset.with_crs(Some(crs))
                }
                None => dataset,
            };
            generate_report(&dataset, request, document, schema)
        }
        Err(e) => {
            let error = FichaError::from(e);
            warn!(path = %input.display(), error = %error, "Cannot load dataset");
            let mut report = GenerationReport::new(&request.code, &request.output);
            report.record_error(&error);
            report.finalize();
            report
        }
    }
}

fn run(
    dataset: &Dataset,
    request: &ReportRequest,
    document: &DocumentConfig,
    schema: &Schema,
    report: &mut GenerationReport,
) -> Result<(), FichaError> {
    report.enter(Stage::Selection);
    let selection = select_by_code(dataset, schema.column(Field::CadastralCode), &request.code)?;
    if selection.is_ambiguous() {
        report.record_warning(format!(
            "El Código Catastral {} aparece en {} registros; se usa el primero.",
            request.code, selection.matches
        ));
    }
    let attributes = schema.extract(selection.record);

    report.enter(Stage::Projection);
    let coordinates = projector::project(selection.record.geometry.as_ref(), dataset.crs.as_ref());
    match &coordinates {
        Ok(parcel) => {
            report.utm_epsg = Some(parcel.target.epsg);
            report.coordinate_rows = parcel.rows.len();
            if let Some(warning) = &parcel.warning {
                warn!(code = %request.code, "{}", warning);
                report.record_warning(warning.clone());
            }
        }
        Err(e) => {
            warn!(code = %request.code, kind = %e.kind(), error = %e, "Coordinate table unavailable");
            report.record_warning(format!("No se pudo generar el cuadro de coordenadas: {}", e));
        }
    }

    report.enter(Stage::Assembly);
    let (date, date_warning) = request.date.resolve(Local::now().date_naive());
    if let Some(warning) = date_warning {
        warn!("{}", warning);
        report.record_warning(warning);
    }
    let date_text = long_date(date, document.language);

    let logo = optional_image(
        request.logo.as_deref().or(document.logo.as_deref()),
        "Logo",
        report,
    );
    let map = optional_image(
        request.map.as_deref().or(document.map_image.as_deref()),
        "Map",
        report,
    );

    let author = request
        .author
        .as_deref()
        .filter(|a| !a.trim().is_empty())
        .unwrap_or(if document.author.is_empty() {
            DEFAULT_AUTHOR
        } else {
            &document.author
        });

    let setup = PageSetup::square_21cm();
    let blocks = assemble(
        &DossierInput {
            attributes: &attributes,
            date: &date_text,
            city: &document.city,
            author,
            coordinates: &coordinates,
            source_crs: dataset.crs.as_ref(),
            logo: logo.as_ref(),
            map: map.as_ref(),
        },
        &setup,
    );

    let decoration = DossierDecoration {
        cover: CoverMetadata {
            code: request.code.clone(),
            date: date_text,
            organization: document.organization.clone(),
            logo,
        },
        footer: FooterMetadata {
            confidentiality: document.confidentiality_line(),
        },
    };
    let info = DocumentInfo {
        title: format!("Ficha Técnica Catastral {}", request.code),
        author: author.to_string(),
        subject: request.code.clone(),
        creator: document.organization.clone(),
        creation_date: Local::now().naive_local(),
    };

    report.enter(Stage::Render);
    report.pages = write_pdf(&request.output, &blocks, &setup, &decoration, &info)?;
    info!(
        code = %request.code,
        output = %request.output.display(),
        pages = report.pages,
        "PDF written"
    );
    Ok(())
}

/// Image optionnelle : échec de chargement consigné, le document continue
fn optional_image(
    path: Option<&Path>,
    name: &str,
    report: &mut GenerationReport,
) -> Option<EmbeddedImage> {
    match load_image(path, name) {
        ImageLoad::Loaded(image) => Some(image),
        ImageLoad::Absent => None,
        ImageLoad::Failed(reason) => {
            warn!(image = name, %reason, "Image omitted");
            report.record_warning(format!("No se pudo cargar la imagen '{}': {}", name, reason));
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::GenerationStatus;
    use catastro::{AttributeValue, ParcelRecord};
    use chrono::NaiveDate;
    use geo::polygon;
    use std::collections::BTreeMap;

    fn dataset(code: &str) -> Dataset {
        let mut attributes = BTreeMap::new();
        attributes.insert("Codigo_Cat".to_string(), AttributeValue::from(code));
        attributes.insert("Area_Escri".to_string(), AttributeValue::Number(500.0));
        let square = polygon![
            (x: -79.9001, y: -2.2001),
            (x: -79.8999, y: -2.2001),
            (x: -79.8999, y: -2.1999),
            (x: -79.9001, y: -2.1999),
            (x: -79.9001, y: -2.2001),
        ];
        Dataset::new(
            vec![ParcelRecord::new(attributes, Some(square.into()))],
            Some(Crs::wgs84()),
        )
    }

    fn output(name: &str) -> PathBuf {
        std::env::temp_dir().join(name)
    }

    #[test]
    fn test_request_builder() {
        let request = ReportRequest::new("A1", "/tmp/a1.pdf")
            .with_author("Ing. Pérez")
            .with_date(NaiveDate::from_ymd_opt(2025, 7, 14).unwrap())
            .with_logo("logo.png");

        assert_eq!(request.author.as_deref(), Some("Ing. Pérez"));
        assert_eq!(
            request.date,
            ReportDate::Date(NaiveDate::from_ymd_opt(2025, 7, 14).unwrap())
        );
        assert!(request.map.is_none());
    }

    #[test]
    fn test_generate_success() {
        let path = output("ficha_pipeline_success.pdf");
        let request = ReportRequest::new("A1", &path)
            .with_date(NaiveDate::from_ymd_opt(2025, 7, 14).unwrap());
        let report = generate_report(&dataset("A1"), &request, &DocumentConfig::default(), &Schema::default());
        let exists = path.exists();
        std::fs::remove_file(&path).ok();

        assert_eq!(report.status, GenerationStatus::Success, "{:?}", report.warnings);
        assert_eq!(report.utm_epsg, Some(32717));
        assert_eq!(report.coordinate_rows, 4);
        assert!(report.pages >= 2);
        assert!(exists);
    }

    #[test]
    fn test_degradations_are_recorded() {
        let path = output("ficha_pipeline_partial.pdf");
        let request = ReportRequest::new("A1", &path).with_date(ReportDate::Iso("14/07/2025".into()));
        let data = dataset("A1").with_crs(None);
        let report = generate_report(&data, &request, &DocumentConfig::default(), &Schema::default());
        std::fs::remove_file(&path).ok();

        assert_eq!(report.status, GenerationStatus::PartialSuccess);
        assert_eq!(report.warnings.len(), 2);
        assert_eq!(report.warnings[0].stage, Stage::Projection);
        assert_eq!(report.warnings[1].stage, Stage::Assembly);
        assert!(report.utm_epsg.is_none());
        assert!(report.error.is_none());
    }

    #[test]
    fn test_missing_code_fails_before_render() {
        let path = output("ficha_pipeline_missing.pdf");
        let request = ReportRequest::new("B7", &path);
        let report = generate_report(&dataset("A1"), &request, &DocumentConfig::default(), &Schema::default());

        assert_eq!(report.status, GenerationStatus::Failed);
        assert_eq!(report.stage, Stage::Selection);
        assert!(!path.exists());
        assert_eq!(
            report.outcome().1,
            "Error: No se encontró ningún predio con el Código Catastral: B7"
        );
    }

    #[test]
    fn test_duplicate_codes_warn() {
        let path = output("ficha_pipeline_duplicate.pdf");
        let mut data = dataset("A1");
        let copy = data.records[0].clone();
        data.records.push(copy);
        let report = generate_report(
            &data,
            &ReportRequest::new("A1", &path),
            &DocumentConfig::default(),
            &Schema::default(),
        );
        std::fs::remove_file(&path).ok();

        assert_eq!(report.status, GenerationStatus::PartialSuccess);
        assert!(report.warnings[0].message.contains("2 registros"));
    }

    #[test]
    fn test_input_type_error_from_geojson() {
        let input = output("ficha_pipeline_feature.geojson");
        std::fs::write(
            &input,
            r#"{"type":"Feature","geometry":null,"properties":{"Codigo_Cat":"A1"}}"#,
        )
        .unwrap();
        let report = generate_report_from_geojson(
            &input,
            None,
            &ReportRequest::new("A1", output("ficha_pipeline_feature.pdf")),
            &DocumentConfig::default(),
            &Schema::default(),
        );
        std::fs::remove_file(&input).ok();

        assert_eq!(report.status, GenerationStatus::Failed);
        assert_eq!(
            report.error.unwrap().kind,
            crate::error::ErrorKind::InputType
        );
    }
}
