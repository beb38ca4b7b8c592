//! Chargement d'un jeu de parcelles depuis un GeoJSON (FeatureCollection)

use std::collections::BTreeMap;

use geojson::feature::Id;
use geojson::{Feature, FeatureCollection, GeoJson, JsonObject, JsonValue};
use tracing::{debug, warn};

use crate::crs::Crs;
use crate::types::{AttributeValue, Dataset, ParcelRecord};
use crate::CatastroError;

/// Parse un document GeoJSON texte
///
/// `file` sert uniquement au contexte des erreurs.
pub fn parse_str(content: &str, file: &str) -> Result<Dataset, CatastroError> {
    let geojson = content
        .parse::<GeoJson>()
        .map_err(|e| CatastroError::parse_error(file, e.to_string()))?;
    from_geojson(geojson)
}

/// Convertit un document GeoJSON déjà parsé
///
/// Seule une FeatureCollection est acceptée : une Feature ou une Geometry
/// isolée n'est pas un jeu de données.
pub fn from_geojson(geojson: GeoJson) -> Result<Dataset, CatastroError> {
    match geojson {
        GeoJson::FeatureCollection(fc) => from_feature_collection(fc),
        GeoJson::Feature(_) => Err(CatastroError::invalid_input("FeatureCollection", "Feature")),
        GeoJson::Geometry(_) => Err(CatastroError::invalid_input("FeatureCollection", "Geometry")),
    }
}

/// Convertit une FeatureCollection en Dataset
pub fn from_feature_collection(fc: FeatureCollection) -> Result<Dataset, CatastroError> {
    let crs = parse_crs_member(fc.foreign_members.as_ref());

    let records = fc
        .features
        .into_iter()
        .enumerate()
        .map(|(index, feature)| convert_feature(feature, index))
        .collect::<Result<Vec<_>, _>>()?;

    debug!(records = records.len(), crs = ?crs.as_ref().map(|c| c.epsg), "GeoJSON dataset loaded");
    Ok(Dataset::new(records, crs))
}

/// Lit le membre `crs` (GeoJSON 2008)
///
/// Absent: WGS 84 (RFC 7946). Présent mais illisible: CRS non défini.
fn parse_crs_member(foreign: Option<&JsonObject>) -> Option<Crs> {
    let Some(member) = foreign.and_then(|f| f.get("crs")) else {
        return Some(Crs::wgs84());
    };

    let name = member
        .get("properties")
        .and_then(|p| p.get("name"))
        .and_then(JsonValue::as_str);

    match name.and_then(Crs::parse) {
        Some(crs) => Some(crs),
        None => {
            warn!(crs = %member, "Unreadable 'crs' member, dataset CRS left undefined");
            None
        }
    }
}

fn convert_feature(feature: Feature, index: usize) -> Result<ParcelRecord, CatastroError> {
    let id = match &feature.id {
        Some(Id::String(s)) => Some(s.clone()),
        Some(Id::Number(n)) => Some(n.to_string()),
        None => None,
    };

    let attributes: BTreeMap<String, AttributeValue> = feature
        .properties
        .unwrap_or_default()
        .iter()
        .map(|(key, value)| (key.clone(), json_to_attribute(value)))
        .collect();

    let geometry = match feature.geometry {
        Some(geom) => Some(geo::Geometry::<f64>::try_from(geom).map_err(|e| {
            CatastroError::invalid_geometry(
                id.clone().unwrap_or_else(|| format!("feature #{}", index)),
                e.to_string(),
            )
        })?),
        None => None,
    };

    Ok(ParcelRecord {
        id,
        attributes,
        geometry,
    })
}

/// Convertit une valeur JSON en attribut
///
/// Tableaux et objets sont conservés sous forme de texte JSON.
fn json_to_attribute(value: &JsonValue) -> AttributeValue {
    match value {
        JsonValue::Null => AttributeValue::Null,
        JsonValue::Bool(b) => AttributeValue::Bool(*b),
        JsonValue::Number(n) => n
            .as_f64()
            .map(AttributeValue::Number)
            .unwrap_or(AttributeValue::Null),
        JsonValue::String(s) => AttributeValue::Text(s.clone()),
        other => AttributeValue::Text(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::Geometry;

    const COLLECTION: &str = r#"{
        "type": "FeatureCollection",
        "crs": {"type": "name", "properties": {"name": "urn:ogc:def:crs:EPSG::4326"}},
        "features": [{
            "type": "Feature",
            "id": "p-1",
            "properties": {"Codigo_Cat": "A1", "Area_Escri": 120.5, "Calle": null, "Tags": [1, 2]},
            "geometry": {"type": "Polygon", "coordinates": [[[0,0],[1,0],[1,1],[0,1],[0,0]]]}
        }]
    }"#;

    #[test]
    fn test_parse_feature_collection() {
        let dataset = parse_str(COLLECTION, "test.geojson").unwrap();
        assert_eq!(dataset.len(), 1);
        assert_eq!(dataset.crs.as_ref().unwrap().epsg, 4326);

        let record = &dataset.records[0];
        assert_eq!(record.id.as_deref(), Some("p-1"));
        assert_eq!(record.get("Codigo_Cat"), Some(&AttributeValue::from("A1")));
        assert_eq!(record.get("Area_Escri"), Some(&AttributeValue::Number(120.5)));
        assert_eq!(record.get("Calle"), Some(&AttributeValue::Null));
        assert_eq!(record.get("Tags"), Some(&AttributeValue::from("[1,2]")));
        assert!(matches!(record.geometry, Some(Geometry::Polygon(_))));
    }

    #[test]
    fn test_missing_crs_defaults_to_wgs84() {
        let json = r#"{"type": "FeatureCollection", "features": []}"#;
        let dataset = parse_str(json, "test.geojson").unwrap();
        assert_eq!(dataset.crs.unwrap().epsg, 4326);
    }

    #[test]
    fn test_unreadable_crs_is_undefined() {
        let json = r#"{"type": "FeatureCollection",
            "crs": {"type": "name", "properties": {"name": "LOCAL_GRID"}},
            "features": []}"#;
        let dataset = parse_str(json, "test.geojson").unwrap();
        assert!(dataset.crs.is_none());
    }

    #[test]
    fn test_single_feature_is_rejected() {
        let json = r#"{"type": "Feature", "properties": {}, "geometry": null}"#;
        let result = parse_str(json, "test.geojson");
        match result {
            Err(CatastroError::InvalidInputType { expected, found }) => {
                assert_eq!(expected, "FeatureCollection");
                assert_eq!(found, "Feature");
            }
            other => panic!("Expected InvalidInputType, got {:?}", other),
        }
    }

    #[test]
    fn test_malformed_json_is_parse_error() {
        let result = parse_str("{not json", "broken.geojson");
        assert!(matches!(result, Err(CatastroError::ParseError { .. })));
    }
}
