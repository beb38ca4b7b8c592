//! Types de données pour le crate catastro

use std::borrow::Cow;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use geo::Geometry;

use crate::crs::Crs;

/// Valeur d'un attribut de parcelle
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeValue {
    /// Texte libre
    Text(String),
    /// Valeur numérique
    Number(f64),
    /// Booléen
    Bool(bool),
    /// Valeur absente (null)
    Null,
}

impl AttributeValue {
    /// Valeur numérique si l'attribut est convertible en nombre fini
    ///
    /// Les textes sont acceptés s'ils représentent un nombre (`" 12.5 "`).
    pub fn as_f64(&self) -> Option<f64> {
        let value = match self {
            Self::Number(n) => *n,
            Self::Text(s) => s.trim().parse::<f64>().ok()?,
            Self::Bool(_) | Self::Null => return None,
        };
        value.is_finite().then_some(value)
    }

    /// Représentation textuelle (None pour null)
    pub fn as_text(&self) -> Option<Cow<'_, str>> {
        match self {
            Self::Text(s) => Some(Cow::Borrowed(s.as_str())),
            Self::Number(n) => Some(Cow::Owned(n.to_string())),
            Self::Bool(b) => Some(Cow::Owned(b.to_string())),
            Self::Null => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => f.write_str(s),
            Self::Number(n) => write!(f, "{}", n),
            Self::Bool(b) => write!(f, "{}", b),
            Self::Null => f.write_str("null"),
        }
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<f64> for AttributeValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

/// Une parcelle avec ses attributs et sa géométrie
#[derive(Debug, Clone, Default)]
pub struct ParcelRecord {
    /// Identifiant de la feature source (optionnel)
    pub id: Option<String>,

    /// Attributs (colonne -> valeur)
    pub attributes: BTreeMap<String, AttributeValue>,

    /// Géométrie (Polygon ou MultiPolygon attendu)
    pub geometry: Option<Geometry>,
}

impl ParcelRecord {
    pub fn new(attributes: BTreeMap<String, AttributeValue>, geometry: Option<Geometry>) -> Self {
        Self {
            id: None,
            attributes,
            geometry,
        }
    }

    /// Récupère un attribut par nom de colonne
    pub fn get(&self, column: &str) -> Option<&AttributeValue> {
        self.attributes.get(column)
    }
}

/// Jeu de données de parcelles partageant un même CRS
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    /// Parcelles, dans l'ordre du fichier source
    pub records: Vec<ParcelRecord>,

    /// CRS déclaré (None si non défini)
    pub crs: Option<Crs>,
}

impl Dataset {
    pub fn new(records: Vec<ParcelRecord>, crs: Option<Crs>) -> Self {
        Self { records, crs }
    }

    /// Remplace le CRS déclaré
    pub fn with_crs(mut self, crs: Option<Crs>) -> Self {
        self.crs = crs;
        self
    }

    /// Vrai si au moins une parcelle porte la colonne
    pub fn has_column(&self, column: &str) -> bool {
        self.records
            .iter()
            .any(|r| r.attributes.contains_key(column))
    }

    /// Union des colonnes présentes
    pub fn columns(&self) -> BTreeSet<&str> {
        self.records
            .iter()
            .flat_map(|r| r.attributes.keys().map(String::as_str))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
