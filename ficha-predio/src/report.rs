//! Rapport de génération avec graceful degradation
//!
//! Collecte le résultat d'une génération de ficha : statut, étape atteinte,
//! avertissements (dégradations non fatales) et erreur éventuelle.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Result;
use serde::Serialize;

use crate::error::{ErrorKind, FichaError};

/// Statut global de la génération
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum GenerationStatus {
    /// PDF écrit sans dégradation
    Success,
    /// PDF écrit avec des dégradations (image omise, cuadro en échec...)
    PartialSuccess,
    /// Aucun PDF produit
    Failed,
}

/// Étape du pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Stage {
    Selection,
    Projection,
    Assembly,
    Render,
    Done,
}

/// Dégradation non fatale
#[derive(Debug, Clone, Serialize)]
pub struct GenerationWarning {
    /// Étape où la dégradation s'est produite
    pub stage: Stage,
    pub message: String,
}

/// Erreur fatale
#[derive(Debug, Clone, Serialize)]
pub struct GenerationError {
    pub kind: ErrorKind,
    /// Message destiné à l'utilisateur
    pub message: String,
}

/// Rapport complet d'une génération
#[derive(Debug, Clone, Serialize)]
pub struct GenerationReport {
    /// Code cadastral demandé
    pub code: String,
    pub output: PathBuf,
    pub status: GenerationStatus,
    /// Dernière étape atteinte
    pub stage: Stage,
    pub duration_secs: f64,

    /// EPSG UTM retenu (si le cuadro a été calculé)
    pub utm_epsg: Option<u32>,
    pub coordinate_rows: usize,
    pub pages: usize,

    pub warnings: Vec<GenerationWarning>,
    pub error: Option<GenerationError>,
}

impl GenerationReport {
    pub fn new(code: &str, output: &Path) -> Self {
        Self {
            code: code.to_string(),
            output: output.to_path_buf(),
            status: GenerationStatus::Success,
            stage: Stage::Selection,
            duration_secs: 0.0,
            utm_epsg: None,
            coordinate_rows: 0,
            pages: 0,
            warnings: Vec::new(),
            error: None,
        }
    }

    pub fn enter(&mut self, stage: Stage) {
        self.stage = stage;
    }

    /// Enregistre une dégradation à l'étape courante
    pub fn record_warning(&mut self, message: impl Into<String>) {
        self.warnings.push(GenerationWarning {
            stage: self.stage,
            message: message.into(),
        });
    }

    /// Enregistre l'erreur fatale
    pub fn record_error(&mut self, error: &FichaError) {
        self.error = Some(GenerationError {
            kind: error.kind(),
            message: error.user_message(),
        });
    }

    pub fn set_duration(&mut self, duration: Duration) {
        self.duration_secs = duration.as_secs_f64();
    }

    /// Détermine le statut final
    pub fn finalize(&mut self) {
        self.status = if self.error.is_some() {
            GenerationStatus::Failed
        } else if self.warnings.is_empty() {
            self.stage = Stage::Done;
            GenerationStatus::Success
        } else {
            self.stage = Stage::Done;
            GenerationStatus::PartialSuccess
        };
    }

    pub fn is_success(&self) -> bool {
        self.status != GenerationStatus::Failed
    }

    /// Contrat de retour : (succès, message)
    pub fn outcome(&self) -> (bool, String) {
        match &self.error {
            Some(error) => (false, error.message.clone()),
            None => (
                true,
                format!(
                    "Informe PDF generado exitosamente como: {}",
                    self.output.display()
                ),
            ),
        }
    }

    /// Affiche le rapport sur la console
    pub fn display(&self) {
        println!("\n{}", "=".repeat(60));
        println!("FICHA REPORT - Código Catastral {}", self.code);
        println!("{}", "=".repeat(60));

        println!("\nStatus: {:?}", self.status);
        println!("Duration: {:.2}s", self.duration_secs);

        println!("\n--- SUMMARY ---");
        println!("Output: {}", self.output.display());
        match self.utm_epsg {
            Some(epsg) => println!("UTM: EPSG:{} ({} vertices)", epsg, self.coordinate_rows),
            None => println!("UTM: -"),
        }
        println!("Pages: {}", self.pages);

        if !self.warnings.is_empty() {
            println!("\n--- WARNINGS ({}) ---", self.warnings.len());
            for w in &self.warnings {
                println!("  [{:?}] {}", w.stage, w.message);
            }
        }

        if let Some(error) = &self.error {
            println!("\n--- ERROR ---");
            println!("  [{:?}] {} {}", self.stage, error.kind, error.message);
        }

        println!("\n{}", "=".repeat(60));
    }

    /// Sauvegarde le rapport en JSON
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Affichage compact pour le résumé
    pub fn summary(&self) -> String {
        format!(
            "{}: {:?}, {} pages, {} vertices, {} warnings",
            self.code,
            self.status,
            self.pages,
            self.coordinate_rows,
            self.warnings.len()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use catastro::CatastroError;

    fn report() -> GenerationReport {
        GenerationReport::new("A1", Path::new("/tmp/ficha_A1.pdf"))
    }

    #[test]
    fn test_finalize_success() {
        let mut report = report();
        report.finalize();

        assert_eq!(report.status, GenerationStatus::Success);
        assert_eq!(report.stage, Stage::Done);
        assert_eq!(
            report.outcome(),
            (
                true,
                "Informe PDF generado exitosamente como: /tmp/ficha_A1.pdf".to_string()
            )
        );
    }

    #[test]
    fn test_finalize_partial_success() {
        let mut report = report();
        report.enter(Stage::Assembly);
        report.record_warning("Logo omitted");
        report.finalize();

        assert_eq!(report.status, GenerationStatus::PartialSuccess);
        assert_eq!(report.warnings[0].stage, Stage::Assembly);
        assert!(report.outcome().0);
    }

    #[test]
    fn test_finalize_failed() {
        let mut report = report();
        report.record_error(&FichaError::Dataset(CatastroError::RecordNotFound("A1".into())));
        report.finalize();

        assert_eq!(report.status, GenerationStatus::Failed);
        assert_eq!(report.stage, Stage::Selection);
        let (ok, message) = report.outcome();
        assert!(!ok);
        assert_eq!(
            message,
            "Error: No se encontró ningún predio con el Código Catastral: A1"
        );
    }

    #[test]
    fn test_summary_and_json() {
        let mut report = report();
        report.pages = 3;
        report.coordinate_rows = 4;
        report.utm_epsg = Some(32717);
        report.finalize();

        assert!(report.summary().contains("3 pages"));

        let path = std::env::temp_dir().join("ficha_report_test.json");
        report.save_to_file(&path).unwrap();
        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(json["utm_epsg"], 32717);
        assert_eq!(json["status"], "Success");
    }
}
