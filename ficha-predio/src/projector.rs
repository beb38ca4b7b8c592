//! Cuadro de coordenadas : zone UTM, reprojection et sommets
//!
//! À partir de la géométrie géographique d'une parcelle :
//! 1. la zone UTM et l'hémisphère sont déduits du centroïde de la géométrie
//!    entière (MultiPolygon compris) ;
//! 2. la géométrie est reprojetée dans cette zone ;
//! 3. chaque sommet de l'anneau extérieur donne une ligne (UTM + lon/lat),
//!    sans le sommet de fermeture.
//!
//! Pour un MultiPolygon, l'anneau retenu est celui du membre de plus grande
//! surface (calculée en géographique), au même indice dans la géométrie
//! projetée.

use std::fmt;

use catastro::Crs;
use geo::{Area, Centroid, Geometry, LineString, MultiPolygon};
use thiserror::Error;
use tracing::debug;

use crate::error::ErrorKind;
use crate::reproject_lite::SmartReprojector;

/// Erreurs du calcul du cuadro de coordenadas
///
/// Les messages sont affichés tels quels dans le rapport.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProjectionError {
    #[error("El conjunto de datos de entrada no tiene un Sistema de Coordenadas (CRS) definido.")]
    MissingCrs,

    #[error("El CRS de entrada '{0}' no es geográfico. Se esperaba WGS 84 (EPSG:4326).")]
    NotGeographic(String),

    #[error("El predio no tiene geometría.")]
    MissingGeometry,

    #[error("La geometría del predio está vacía.")]
    EmptyGeometry,

    #[error("Longitud del centroide fuera de rango ({0}): la zona UTM debe estar entre 1 y 60.")]
    LongitudeOutOfRange(f64),

    #[error("No se pudo reproyectar a EPSG:{epsg}: {reason}")]
    Reprojection { epsg: u32, reason: String },
}

impl ProjectionError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::MissingGeometry | Self::EmptyGeometry => ErrorKind::GeometryType,
            _ => ErrorKind::Crs,
        }
    }
}

/// Hémisphère d'une zone UTM
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hemisphere {
    North,
    South,
}

impl Hemisphere {
    /// Nord si lat >= 0 (l'équateur est au nord)
    pub fn from_latitude(lat: f64) -> Self {
        if lat >= 0.0 {
            Self::North
        } else {
            Self::South
        }
    }

    pub fn letter(self) -> char {
        match self {
            Self::North => 'N',
            Self::South => 'S',
        }
    }
}

/// Zone UTM WGS84 (1 à 60, N ou S)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UtmZone {
    pub number: u32,
    pub hemisphere: Hemisphere,
}

impl UtmZone {
    /// Zone contenant le point (lon, lat) en degrés
    ///
    /// La longitude doit être dans [-180, 180) : aucune normalisation.
    pub fn from_lon_lat(lon: f64, lat: f64) -> Result<Self, ProjectionError> {
        let zone = ((lon + 180.0) / 6.0).floor() + 1.0;
        if !(1.0..=60.0).contains(&zone) || lat.is_nan() {
            return Err(ProjectionError::LongitudeOutOfRange(lon));
        }
        Ok(Self {
            number: zone as u32,
            hemisphere: Hemisphere::from_latitude(lat),
        })
    }

    /// 326xx au nord, 327xx au sud
    pub fn epsg(&self) -> u32 {
        match self.hemisphere {
            Hemisphere::North => 32600 + self.number,
            Hemisphere::South => 32700 + self.number,
        }
    }

    pub fn crs(&self) -> Crs {
        Crs::utm(self.number, self.hemisphere == Hemisphere::North)
    }
}

impl fmt::Display for UtmZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.number, self.hemisphere.letter())
    }
}

/// Une ligne du cuadro de coordenadas
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordinateRow {
    /// Rang du sommet, à partir de 1
    pub index: usize,
    pub easting: f64,
    pub northing: f64,
    pub lon: f64,
    pub lat: f64,
}

impl CoordinateRow {
    /// Libellé du sommet ("V-1", "V-2", ...)
    pub fn label(&self) -> String {
        format!("V-{}", self.index)
    }
}

/// Résultat de la projection d'une parcelle
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectedParcel {
    pub zone: UtmZone,
    /// CRS UTM cible
    pub target: Crs,
    pub rows: Vec<CoordinateRow>,
    /// Avertissement à afficher à la place du tableau (type de géométrie non géré)
    pub warning: Option<String>,
}

/// Calcule le cuadro de coordenadas d'une géométrie
///
/// # Errors
///
/// - CRS absent ou non géographique
/// - géométrie absente ou vide, ou anneau sans sommet à tabuler
/// - centroïde hors de [-180, 180)
/// - échec de la reprojection
pub fn project(
    geometry: Option<&Geometry>,
    crs: Option<&Crs>,
) -> Result<ProjectedParcel, ProjectionError> {
    let crs = crs.ok_or(ProjectionError::MissingCrs)?;
    if !crs.is_geographic() {
        return Err(ProjectionError::NotGeographic(crs.name.clone()));
    }

    let geometry = geometry.ok_or(ProjectionError::MissingGeometry)?;
    let centroid = geometry.centroid().ok_or(ProjectionError::EmptyGeometry)?;

    let zone = UtmZone::from_lon_lat(centroid.x(), centroid.y())?;
    let target = zone.crs();
    debug!(zone = %zone, epsg = target.epsg, lon = centroid.x(), lat = centroid.y(), "UTM zone selected");

    let rows = match geometry {
        Geometry::Polygon(_) | Geometry::MultiPolygon(_) => {
            let reprojector = SmartReprojector::new(crs.epsg, target.epsg).map_err(|e| {
                ProjectionError::Reprojection {
                    epsg: target.epsg,
                    reason: e.to_string(),
                }
            })?;
            let projected = reprojector.transform_geometry(geometry).map_err(|e| {
                ProjectionError::Reprojection {
                    epsg: target.epsg,
                    reason: e.to_string(),
                }
            })?;
            select_rings(geometry, &projected)
                .map(|(geo_ring, utm_ring)| build_rows(geo_ring, utm_ring))
                .filter(|rows| !rows.is_empty())
                .ok_or(ProjectionError::EmptyGeometry)?
        }
        other => {
            let kind = geometry_type(other);
            debug!(kind, "Geometry type has no coordinate table");
            return Ok(ProjectedParcel {
                zone,
                target,
                rows: Vec::new(),
                warning: Some(format!("Advertencia: Tipo de geometría no soportado ({}).", kind)),
            });
        }
    };

    Ok(ProjectedParcel {
        zone,
        target,
        rows,
        warning: None,
    })
}

/// Anneaux extérieurs (géographique, projeté) à tabuler
fn select_rings<'a>(
    geographic: &'a Geometry,
    projected: &'a Geometry,
) -> Option<(&'a LineString, &'a LineString)> {
    match (geographic, projected) {
        (Geometry::Polygon(g), Geometry::Polygon(p)) => Some((g.exterior(), p.exterior())),
        (Geometry::MultiPolygon(g), Geometry::MultiPolygon(p)) => {
            let index = largest_member(g)?;
            Some((g.0[index].exterior(), p.0.get(index)?.exterior()))
        }
        _ => None,
    }
}

/// Indice du membre de plus grande surface (le premier en cas d'égalité)
pub fn largest_member(mp: &MultiPolygon) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (index, poly) in mp.0.iter().enumerate() {
        let area = poly.unsigned_area();
        match best {
            Some((_, best_area)) if area <= best_area => {}
            _ => best = Some((index, area)),
        }
    }
    best.map(|(index, _)| index)
}

/// Associe les sommets des deux anneaux, sans le sommet de fermeture
pub fn build_rows(geographic: &LineString, projected: &LineString) -> Vec<CoordinateRow> {
    let count = geographic.0.len().min(projected.0.len()).saturating_sub(1);
    geographic
        .0
        .iter()
        .zip(projected.0.iter())
        .take(count)
        .enumerate()
        .map(|(i, (g, p))| CoordinateRow {
            index: i + 1,
            easting: p.x,
            northing: p.y,
            lon: g.x,
            lat: g.y,
        })
        .collect()
}

fn geometry_type(geometry: &Geometry) -> &'static str {
    match geometry {
        Geometry::Point(_) => "Point",
        Geometry::Line(_) => "Line",
        Geometry::LineString(_) => "LineString",
        Geometry::Polygon(_) => "Polygon",
        Geometry::MultiPoint(_) => "MultiPoint",
        Geometry::MultiLineString(_) => "MultiLineString",
        Geometry::MultiPolygon(_) => "MultiPolygon",
        Geometry::GeometryCollection(_) => "GeometryCollection",
        Geometry::Rect(_) => "Rect",
        Geometry::Triangle(_) => "Triangle",
    }
}
