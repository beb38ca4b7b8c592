//! # ficha-predio
//!
//! Génération de la ficha técnica catastral (PDF) d'une parcelle urbaine.
//!
//! ## Features
//!
//! - Choix de la zone UTM depuis le centroïde, reprojection WGS 84 → UTM
//! - Cuadro de coordenadas (UTM + géographiques) des sommets
//! - Assemblage du rapport en sept sections, couverture et pied de page
//! - Rendu PDF (lopdf) 21 × 21 cm, images JPEG intégrées
//! - Reprojection PROJ optionnelle (feature `reproject`)
//!
//! ## Usage CLI
//!
//! ```bash
//! ficha-predio --input predios.geojson --code 09-01-001 --output ficha.pdf
//! ficha-predio --input predios.geojson --code 09-01-001 --output ficha.pdf \
//!     --logo logo.png --map plano.png --date 2025-07-14
//! ficha-predio inspect --input predios.geojson
//! ```

pub mod config;
pub mod dossier;
pub mod error;
pub mod export;
pub mod pipeline;
pub mod projector;
pub mod report;
#[cfg(feature = "reproject")]
pub mod reproject;
pub mod reproject_lite;

pub use config::{Config, DocumentConfig};
pub use error::{ErrorKind, FichaError};
pub use pipeline::{generate_report, generate_report_from_geojson, ReportRequest};
pub use projector::{project, CoordinateRow, ProjectedParcel, ProjectionError, UtmZone};
pub use report::{GenerationReport, GenerationStatus};
