//! Erreurs de la génération d'une ficha

use std::fmt;

use catastro::CatastroError;
use serde::Serialize;
use thiserror::Error;

use crate::export::pdf::RenderError;

/// Catégorie d'erreur, indépendante de sa cause
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorKind {
    #[serde(rename = "InputTypeError")]
    InputType,
    #[serde(rename = "SchemaError")]
    Schema,
    RecordNotFound,
    #[serde(rename = "CrsError")]
    Crs,
    #[serde(rename = "GeometryTypeError")]
    GeometryType,
    #[serde(rename = "RenderError")]
    Render,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::InputType => "InputTypeError",
            Self::Schema => "SchemaError",
            Self::RecordNotFound => "RecordNotFound",
            Self::Crs => "CrsError",
            Self::GeometryType => "GeometryTypeError",
            Self::Render => "RenderError",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Erreur bloquante : aucun PDF n'est produit
#[derive(Debug, Error)]
pub enum FichaError {
    #[error(transparent)]
    Dataset(#[from] CatastroError),

    #[error(transparent)]
    Render(#[from] RenderError),
}

impl FichaError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Dataset(e) => match e {
                CatastroError::InvalidInputType { .. } | CatastroError::ParseError { .. } => {
                    ErrorKind::InputType
                }
                CatastroError::Io(_) => ErrorKind::InputType,
                CatastroError::MissingColumn(_) => ErrorKind::Schema,
                CatastroError::RecordNotFound(_) => ErrorKind::RecordNotFound,
                CatastroError::InvalidGeometry { .. } => ErrorKind::GeometryType,
                CatastroError::UnknownCrs(_) => ErrorKind::Crs,
            },
            Self::Render(_) => ErrorKind::Render,
        }
    }

    /// Message affiché à l'utilisateur
    pub fn user_message(&self) -> String {
        match self {
            Self::Dataset(CatastroError::RecordNotFound(code)) => format!(
                "Error: No se encontró ningún predio con el Código Catastral: {}",
                code
            ),
            Self::Dataset(CatastroError::MissingColumn(column)) => format!(
                "Error: El conjunto de datos no contiene la columna '{}'.",
                column
            ),
            Self::Dataset(CatastroError::InvalidInputType { expected, found }) => format!(
                "Error: Se esperaba un {} y se recibió un {}.",
                expected, found
            ),
            Self::Dataset(e) => format!("Error: {}", e),
            Self::Render(e) => format!("Error al generar el informe PDF: {}", e),
        }
    }
}
