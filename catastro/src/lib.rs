//! # catastro
//!
//! Modèle de données des parcelles urbaines (catastro) : chargement GeoJSON,
//! CRS, schéma typé des attributs et sélection par code cadastral.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use catastro::{load, select_by_code, Schema, Field};
//! use std::path::Path;
//!
//! let dataset = load(Path::new("predios.geojson"))?;
//! let schema = Schema::default();
//! let selection = select_by_code(&dataset, schema.column(Field::CadastralCode), "A1")?;
//! let attributes = schema.extract(selection.record);
//! println!("Uso: {}", attributes.land_use);
//! ```

pub mod crs;
pub mod error;
pub mod parser;
pub mod schema;
pub mod selector;
pub mod types;

pub use crs::{Crs, CrsKind};
pub use error::CatastroError;
pub use schema::{Boundary, Field, FieldKind, FieldSpec, ParcelAttributes, Schema, Side};
pub use selector::{select_by_code, Selection};
pub use types::{AttributeValue, Dataset, ParcelRecord};

use std::path::Path;

/// Charge un jeu de parcelles depuis un fichier GeoJSON
///
/// # Errors
///
/// Retourne `CatastroError` si le fichier est illisible, n'est pas du GeoJSON
/// valide ou n'est pas une FeatureCollection.
pub fn load(path: &Path) -> Result<Dataset, CatastroError> {
    let content = std::fs::read_to_string(path)?;
    parser::geojson::parse_str(&content, &path.display().to_string())
}
