//! Parsers des formats de jeux de données

pub mod geojson;
