//! Schéma typé des attributs d'une parcelle
//!
//! Chaque champ connu est associé à une colonne du jeu de données, un type
//! attendu et une valeur par défaut. La lecture ne lève jamais d'erreur :
//! valeur absente, nulle ou non convertible → valeur par défaut.

use tracing::debug;

use crate::types::ParcelRecord;

/// Texte par défaut des champs descriptifs
pub const DEFAULT_TEXT: &str = "No especificado";

/// Texte par défaut du nom de rue
pub const DEFAULT_STREET: &str = "No especificada";

/// Champs connus d'une parcelle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Field {
    CadastralCode,
    LandUse,
    BoundaryNorth,
    BoundarySouth,
    BoundaryEast,
    BoundaryWest,
    LengthNorth,
    LengthSouth,
    LengthEast,
    LengthWest,
    DeedArea,
    Street,
    ShapeArea,
    ShapeLength,
}

/// Type attendu d'un champ et sa valeur par défaut
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldKind {
    Text { default: &'static str },
    Number { default: f64 },
}

impl Field {
    pub const ALL: [Field; 14] = [
        Field::CadastralCode,
        Field::LandUse,
        Field::BoundaryNorth,
        Field::BoundarySouth,
        Field::BoundaryEast,
        Field::BoundaryWest,
        Field::LengthNorth,
        Field::LengthSouth,
        Field::LengthEast,
        Field::LengthWest,
        Field::DeedArea,
        Field::Street,
        Field::ShapeArea,
        Field::ShapeLength,
    ];

    /// Clé stable utilisée dans les fichiers de configuration
    pub fn key(self) -> &'static str {
        match self {
            Field::CadastralCode => "cadastral_code",
            Field::LandUse => "land_use",
            Field::BoundaryNorth => "boundary_north",
            Field::BoundarySouth => "boundary_south",
            Field::BoundaryEast => "boundary_east",
            Field::BoundaryWest => "boundary_west",
            Field::LengthNorth => "length_north",
            Field::LengthSouth => "length_south",
            Field::LengthEast => "length_east",
            Field::LengthWest => "length_west",
            Field::DeedArea => "deed_area",
            Field::Street => "street",
            Field::ShapeArea => "shape_area",
            Field::ShapeLength => "shape_length",
        }
    }

    pub fn from_key(key: &str) -> Option<Field> {
        Self::ALL.into_iter().find(|f| f.key() == key)
    }

    /// Colonne du cadastre de Guayaquil
    pub fn default_column(self) -> &'static str {
        match self {
            Field::CadastralCode => "Codigo_Cat",
            Field::LandUse => "Uso_de_Edi",
            Field::BoundaryNorth => "Lindero_No",
            Field::BoundarySouth => "Lindero_Su",
            Field::BoundaryEast => "Lindero_Es",
            Field::BoundaryWest => "Lindero_Oe",
            Field::LengthNorth => "Longitud_N",
            Field::LengthSouth => "Longitud_S",
            Field::LengthEast => "Longitud_E",
            Field::LengthWest => "Longitud_O",
            Field::DeedArea => "Area_Escri",
            Field::Street => "Calle",
            Field::ShapeArea => "Shape__Area",
            Field::ShapeLength => "Shape__Length",
        }
    }

    pub fn kind(self) -> FieldKind {
        match self {
            Field::LengthNorth
            | Field::LengthSouth
            | Field::LengthEast
            | Field::LengthWest
            | Field::DeedArea
            | Field::ShapeArea
            | Field::ShapeLength => FieldKind::Number { default: 0.0 },
            Field::Street => FieldKind::Text {
                default: DEFAULT_STREET,
            },
            _ => FieldKind::Text {
                default: DEFAULT_TEXT,
            },
        }
    }
}

/// Mapping d'un champ vers sa colonne
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSpec {
    pub field: Field,
    pub column: String,
    pub kind: FieldKind,
}

/// Schéma complet : un `FieldSpec` par champ, dans l'ordre de `Field::ALL`
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    specs: Vec<FieldSpec>,
}

impl Default for Schema {
    fn default() -> Self {
        Self {
            specs: Field::ALL
                .into_iter()
                .map(|field| FieldSpec {
                    field,
                    column: field.default_column().to_string(),
                    kind: field.kind(),
                })
                .collect(),
        }
    }
}

impl Schema {
    pub fn spec(&self, field: Field) -> &FieldSpec {
        &self.specs[field as usize]
    }

    /// Nom de colonne associé au champ
    pub fn column(&self, field: Field) -> &str {
        &self.spec(field).column
    }

    /// Remplace la colonne d'un champ
    pub fn with_column(mut self, field: Field, column: impl Into<String>) -> Self {
        self.specs[field as usize].column = column.into();
        self
    }

    /// Lit un champ texte
    ///
    /// Un champ numérique lu comme texte garde sa représentation décimale.
    pub fn text(&self, record: &ParcelRecord, field: Field) -> String {
        let spec = self.spec(field);
        let default = match spec.kind {
            FieldKind::Text { default } => default,
            FieldKind::Number { .. } => "",
        };
        record
            .get(&spec.column)
            .and_then(|v| v.as_text())
            .map(|s| s.into_owned())
            .unwrap_or_else(|| default.to_string())
    }

    /// Lit un champ numérique (défaut si absent ou non convertible)
    pub fn number(&self, record: &ParcelRecord, field: Field) -> f64 {
        let spec = self.spec(field);
        let default = match spec.kind {
            FieldKind::Number { default } => default,
            FieldKind::Text { .. } => 0.0,
        };
        match record.get(&spec.column) {
            Some(value) => value.as_f64().unwrap_or_else(|| {
                if !value.is_null() {
                    debug!(column = %spec.column, value = %value, "Non-numeric value, using default");
                }
                default
            }),
            None => default,
        }
    }

    /// Extrait tous les attributs utiles au rapport
    pub fn extract(&self, record: &ParcelRecord) -> ParcelAttributes {
        let boundary = |side, neighbour, length| Boundary {
            side,
            neighbour: self.text(record, neighbour),
            length: self.number(record, length),
        };

        ParcelAttributes {
            code: self.text(record, Field::CadastralCode),
            land_use: self.text(record, Field::LandUse),
            street: self.text(record, Field::Street),
            boundaries: [
                boundary(Side::North, Field::BoundaryNorth, Field::LengthNorth),
                boundary(Side::South, Field::BoundarySouth, Field::LengthSouth),
                boundary(Side::East, Field::BoundaryEast, Field::LengthEast),
                boundary(Side::West, Field::BoundaryWest, Field::LengthWest),
            ],
            deed_area: self.number(record, Field::DeedArea),
            shape_area: self.number(record, Field::ShapeArea),
            shape_length: self.number(record, Field::ShapeLength),
        }
    }
}

/// Côté d'un lindero (limite de parcelle)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    North,
    South,
    East,
    West,
}

/// Limite de parcelle : voisin et longueur en mètres
#[derive(Debug, Clone, PartialEq)]
pub struct Boundary {
    pub side: Side,
    pub neighbour: String,
    pub length: f64,
}

/// Attributs d'une parcelle, valeurs par défaut appliquées
#[derive(Debug, Clone, PartialEq)]
pub struct ParcelAttributes {
    pub code: String,
    pub land_use: String,
    pub street: String,
    /// Nord, Sud, Est, Ouest
    pub boundaries: [Boundary; 4],
    /// Surface selon l'acte (escritura)
    pub deed_area: f64,
    /// Surface calculée par le SIG
    pub shape_area: f64,
    /// Périmètre calculé par le SIG
    pub shape_length: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::AttributeValue;
    use std::collections::BTreeMap;

    fn record(pairs: &[(&str, AttributeValue)]) -> ParcelRecord {
        let attributes: BTreeMap<String, AttributeValue> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect();
        ParcelRecord::new(attributes, None)
    }

    #[test]
    fn test_defaults_when_absent() {
        let attrs = Schema::default().extract(&record(&[]));
        assert_eq!(attrs.land_use, DEFAULT_TEXT);
        assert_eq!(attrs.street, DEFAULT_STREET);
        assert_eq!(attrs.boundaries[0].neighbour, DEFAULT_TEXT);
        assert_eq!(attrs.boundaries[3].side, Side::West);
        assert_eq!(attrs.deed_area, 0.0);
        assert_eq!(attrs.shape_length, 0.0);
    }

    #[test]
    fn test_numeric_coercion() {
        let r = record(&[
            ("Area_Escri", AttributeValue::from("250.75")),
            ("Shape__Area", AttributeValue::from("n/a")),
            ("Longitud_N", AttributeValue::Number(12.3)),
            ("Longitud_S", AttributeValue::Null),
        ]);
        let attrs = Schema::default().extract(&r);
        assert_eq!(attrs.deed_area, 250.75);
        assert_eq!(attrs.shape_area, 0.0);
        assert_eq!(attrs.boundaries[0].length, 12.3);
        assert_eq!(attrs.boundaries[1].length, 0.0);
    }

    #[test]
    fn test_null_text_uses_default() {
        let r = record(&[("Uso_de_Edi", AttributeValue::Null)]);
        assert_eq!(Schema::default().text(&r, Field::LandUse), DEFAULT_TEXT);
    }

    #[test]
    fn test_column_override() {
        let schema = Schema::default().with_column(Field::CadastralCode, "CLAVE");
        assert_eq!(schema.column(Field::CadastralCode), "CLAVE");

        let r = record(&[("CLAVE", AttributeValue::from("09-01-001"))]);
        assert_eq!(schema.extract(&r).code, "09-01-001");
    }

    #[test]
    fn test_field_keys_roundtrip_table() {
        for field in Field::ALL {
            assert_eq!(Field::from_key(field.key()), Some(field));
        }
        assert_eq!(Field::from_key("unknown"), None);
    }
}
