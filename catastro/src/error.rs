//! Types d'erreurs pour le crate catastro

use thiserror::Error;

/// Erreurs pouvant survenir lors du chargement ou de la sélection d'une parcelle
#[derive(Debug, Error)]
pub enum CatastroError {
    /// Erreur d'I/O lors de la lecture du jeu de données
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Le document fourni n'est pas une collection de parcelles
    #[error("Invalid input type: expected {expected}, got {found}")]
    InvalidInputType {
        expected: &'static str,
        found: String,
    },

    /// Erreur de parsing d'un fichier
    #[error("Parse error in {file}: {reason}")]
    ParseError { file: String, reason: String },

    /// Colonne obligatoire absente du jeu de données
    #[error("The dataset has no '{0}' column")]
    MissingColumn(String),

    /// Aucune parcelle ne correspond au code cadastral demandé
    #[error("No parcel found with cadastral code: {0}")]
    RecordNotFound(String),

    /// Géométrie invalide
    #[error("Invalid geometry for {entity_id}: {reason}")]
    InvalidGeometry { entity_id: String, reason: String },

    /// CRS non reconnu
    #[error("Unrecognised CRS: {0}")]
    UnknownCrs(String),
}

impl CatastroError {
    /// Crée une erreur de parsing avec contexte
    pub fn parse_error(file: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ParseError {
            file: file.into(),
            reason: reason.into(),
        }
    }

    /// Crée une erreur de géométrie invalide
    pub fn invalid_geometry(entity_id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidGeometry {
            entity_id: entity_id.into(),
            reason: reason.into(),
        }
    }

    /// Crée une erreur de type d'entrée
    pub fn invalid_input(expected: &'static str, found: impl Into<String>) -> Self {
        Self::InvalidInputType {
            expected,
            found: found.into(),
        }
    }
}
