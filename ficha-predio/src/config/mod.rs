//! Configuration du système
//!
//! Un fichier JSON (ou un preset embarqué) décrit le document produit et le
//! mapping des champs du schéma vers les colonnes du jeu de données. Les
//! variables `FICHA_*` priment sur le fichier.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use catastro::{Field, Schema};

use crate::dossier::format::Language;

/// Auteur et organisation par défaut
pub const DEFAULT_AUTHOR: &str = "Cartography Hub";

/// Configuration principale
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub document: DocumentConfig,

    /// Mapping clé de champ (`cadastral_code`, `deed_area`...) vers colonne
    #[serde(default)]
    pub fields: BTreeMap<String, String>,
}

/// Paramètres du document
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DocumentConfig {
    /// Signataire de la section "Fuente de Datos"
    pub author: String,

    /// Organisation affichée en couverture et en pied de page
    pub organization: String,

    pub city: String,

    /// Langue des dates
    pub language: Language,

    /// Texte du pied de page ("Informe Confidencial - <organisation>" si absent)
    pub confidentiality: Option<String>,

    pub logo: Option<PathBuf>,

    pub map_image: Option<PathBuf>,
}

impl Default for DocumentConfig {
    fn default() -> Self {
        Self {
            author: DEFAULT_AUTHOR.to_string(),
            organization: DEFAULT_AUTHOR.to_string(),
            city: "Guayaquil".to_string(),
            language: Language::Es,
            confidentiality: None,
            logo: None,
            map_image: None,
        }
    }
}

impl DocumentConfig {
    pub fn confidentiality_line(&self) -> String {
        self.confidentiality
            .clone()
            .unwrap_or_else(|| format!("Informe Confidencial - {}", self.organization))
    }
}

impl Config {
    /// Charge une configuration depuis un fichier
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .context(format!("Failed to read config file: {}", path.display()))?;

        serde_json::from_str(&content).context("Failed to parse config JSON")
    }

    /// Charge une configuration depuis un preset embarqué
    pub fn from_preset(preset: &str) -> Result<Self> {
        match preset {
            "guayaquil" => Self::load_embedded(include_str!("presets/guayaquil.json")),
            _ => anyhow::bail!("Unknown preset: {}. Use: guayaquil", preset),
        }
    }

    fn load_embedded(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Failed to parse embedded config")
    }

    /// Fichier si le chemin existe, preset sinon
    pub fn resolve(reference: &str) -> Result<Self> {
        let path = Path::new(reference);
        if path.exists() {
            Self::load(path)
        } else {
            Self::from_preset(reference)
        }
    }

    /// Applique les surcharges `FICHA_*` de l'environnement
    pub fn apply_env(&mut self) {
        self.apply_overrides(|name| std::env::var(name).ok());
    }

    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let doc = &mut self.document;
        if let Some(author) = lookup("FICHA_AUTHOR") {
            doc.author = author;
        }
        if let Some(organization) = lookup("FICHA_ORGANIZATION") {
            doc.organization = organization;
        }
        if let Some(city) = lookup("FICHA_CITY") {
            doc.city = city;
        }
        if let Some(logo) = lookup("FICHA_LOGO") {
            doc.logo = Some(PathBuf::from(logo));
        }
        if let Some(map) = lookup("FICHA_MAP_IMAGE") {
            doc.map_image = Some(PathBuf::from(map));
        }
    }

    /// Schéma typé correspondant au mapping des champs
    pub fn schema(&self) -> Result<Schema> {
        self.fields
            .iter()
            .try_fold(Schema::default(), |schema, (key, column)| {
                let field = Field::from_key(key)
                    .with_context(|| format!("Unknown field in config: {}", key))?;
                Ok(schema.with_column(field, column.clone()))
            })
    }

    /// Vérifie la cohérence de la configuration
    pub fn validate(&self) -> Result<()> {
        self.schema()?;
        if let Some((key, _)) = self.fields.iter().find(|(_, column)| column.trim().is_empty()) {
            anyhow::bail!("Empty column name for field: {}", key);
        }
        if self.document.organization.trim().is_empty() {
            anyhow::bail!("document.organization must not be empty");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guayaquil_preset() {
        let config = Config::from_preset("guayaquil").unwrap();
        config.validate().unwrap();

        assert_eq!(config.document.city, "Guayaquil");
        assert_eq!(config.fields.len(), Field::ALL.len());
        assert_eq!(config.schema().unwrap(), Schema::default());
    }

    #[test]
    fn test_unknown_preset() {
        assert!(Config::from_preset("quito").is_err());
    }

    #[test]
    fn test_custom_mapping() {
        let config: Config = serde_json::from_str(
            r#"{ "fields": { "cadastral_code": "CLAVE" }, "document": { "city": "Daule" } }"#,
        )
        .unwrap();

        let schema = config.schema().unwrap();
        assert_eq!(schema.column(Field::CadastralCode), "CLAVE");
        assert_eq!(schema.column(Field::Street), "Calle");
        assert_eq!(config.document.city, "Daule");
        assert_eq!(config.document.author, DEFAULT_AUTHOR);
    }

    #[test]
    fn test_unknown_field_rejected() {
        let config: Config = serde_json::from_str(r#"{ "fields": { "parcel_id": "ID" } }"#).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_env_overrides() {
        let mut config = Config::default();
        config.apply_overrides(|name| match name {
            "FICHA_ORGANIZATION" => Some("Municipio de Guayaquil".to_string()),
            "FICHA_LOGO" => Some("/srv/logo.png".to_string()),
            _ => None,
        });

        assert_eq!(config.document.organization, "Municipio de Guayaquil");
        assert_eq!(config.document.author, DEFAULT_AUTHOR);
        assert_eq!(config.document.logo, Some(PathBuf::from("/srv/logo.png")));
        assert_eq!(
            config.document.confidentiality_line(),
            "Informe Confidencial - Municipio de Guayaquil"
        );
    }
}
