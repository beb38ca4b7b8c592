//! Reprojection légère en Rust pur (sans dépendances externes)
//!
//! Supporte WGS84 géographique (EPSG:4326) et les 120 zones UTM WGS84
//! (EPSG:32601-32660 au nord, EPSG:32701-32760 au sud), dans les deux sens.
//! Les datums géographiques alignés sur WGS84 à moins d'un mètre (ETRS89,
//! NAD83, RGF93, GDA94, SIRGAS 2000) sont traités comme WGS84, sans
//! transformation de datum. Les autres systèmes passent par PROJ
//! (feature `reproject`).

mod ellipsoid;
mod smart;
mod utm;

pub use smart::SmartReprojector;

use anyhow::{bail, Result};
use geo::{Coord, Geometry, LineString, MultiLineString, MultiPoint, MultiPolygon, Point, Polygon};

pub use ellipsoid::WGS84;

/// Point en coordonnées géographiques (radians)
#[derive(Debug, Clone, Copy)]
pub struct Geographic {
    /// Longitude en radians
    pub lon: f64,
    /// Latitude en radians
    pub lat: f64,
}

impl Geographic {
    pub fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }

    /// Convertit en degrés
    pub fn to_degrees(self) -> (f64, f64) {
        (self.lon.to_degrees(), self.lat.to_degrees())
    }

    /// Crée depuis des degrés
    pub fn from_degrees(lon_deg: f64, lat_deg: f64) -> Self {
        Self {
            lon: lon_deg.to_radians(),
            lat: lat_deg.to_radians(),
        }
    }
}

/// Datums géographiques confondus avec WGS84 (écart sub-métrique)
const WGS84_CLASS: &[u32] = &[4258, 4269, 4171, 4283, 4674];

/// Système géré par le reprojector léger
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LiteCrs {
    Wgs84,
    Utm { zone: u32, south: bool },
}

impl LiteCrs {
    fn from_epsg(epsg: u32) -> Option<Self> {
        match epsg {
            4326 => Some(Self::Wgs84),
            code if WGS84_CLASS.contains(&code) => Some(Self::Wgs84),
            32601..=32660 => Some(Self::Utm {
                zone: epsg - 32600,
                south: false,
            }),
            32701..=32760 => Some(Self::Utm {
                zone: epsg - 32700,
                south: true,
            }),
            _ => None,
        }
    }
}

/// Reprojection légère WGS84 ↔ UTM
#[derive(Debug, Clone, Copy)]
pub struct ReprojectorLite {
    source: LiteCrs,
    target: LiteCrs,
}

impl ReprojectorLite {
    /// Crée un nouveau reprojector
    pub fn new(source_epsg: u32, target_epsg: u32) -> Result<Self> {
        let Some(source) = LiteCrs::from_epsg(source_epsg) else {
            bail!(
                "EPSG:{} non supporté. Systèmes supportés: 4326 (et datums alignés), 32601-32660, 32701-32760",
                source_epsg
            );
        };
        let Some(target) = LiteCrs::from_epsg(target_epsg) else {
            bail!(
                "EPSG:{} non supporté. Systèmes supportés: 4326 (et datums alignés), 32601-32660, 32701-32760",
                target_epsg
            );
        };

        Ok(Self { source, target })
    }

    /// Vérifie si l'EPSG est supporté (source ou cible)
    pub fn is_supported_epsg(epsg: u32) -> bool {
        LiteCrs::from_epsg(epsg).is_some()
    }

    /// Vérifie si la reprojection est supportée
    pub fn is_supported(source: u32, target: u32) -> bool {
        Self::is_supported_epsg(source) && Self::is_supported_epsg(target)
    }

    /// Transforme un point (x, y) de la source vers la cible
    pub fn transform_point(&self, x: f64, y: f64) -> Result<(f64, f64)> {
        // Étape 1: Source → Géographique (WGS84)
        let geo = match self.source {
            LiteCrs::Wgs84 => Geographic::from_degrees(x, y),
            LiteCrs::Utm { zone, south } => utm::utm_to_geographic(x, y, zone, south)?,
        };

        // Étape 2: Géographique → Cible
        match self.target {
            LiteCrs::Wgs84 => Ok(geo.to_degrees()),
            LiteCrs::Utm { zone, south } => utm::geographic_to_utm(geo, zone, south),
        }
    }

    fn transform_coord(&self, c: &Coord) -> Result<Coord> {
        let (x, y) = self.transform_point(c.x, c.y)?;
        Ok(Coord { x, y })
    }

    fn transform_linestring(&self, ls: &LineString) -> Result<LineString> {
        let coords = ls
            .coords()
            .map(|c| self.transform_coord(c))
            .collect::<Result<Vec<_>>>()?;
        Ok(LineString::new(coords))
    }

    fn transform_polygon(&self, poly: &Polygon) -> Result<Polygon> {
        let exterior = self.transform_linestring(poly.exterior())?;
        let interiors = poly
            .interiors()
            .iter()
            .map(|ring| self.transform_linestring(ring))
            .collect::<Result<Vec<_>>>()?;
        Ok(Polygon::new(exterior, interiors))
    }

    /// Transforme une géométrie
    pub fn transform_geometry(&self, geom: &Geometry) -> Result<Geometry> {
        match geom {
            Geometry::Point(p) => {
                let (x, y) = self.transform_point(p.x(), p.y())?;
                Ok(Geometry::Point(Point::new(x, y)))
            }
            Geometry::LineString(ls) => Ok(Geometry::LineString(self.transform_linestring(ls)?)),
            Geometry::Polygon(poly) => Ok(Geometry::Polygon(self.transform_polygon(poly)?)),
            Geometry::MultiPoint(mp) => {
                let points = mp
                    .iter()
                    .map(|p| {
                        let (x, y) = self.transform_point(p.x(), p.y())?;
                        Ok(Point::new(x, y))
                    })
                    .collect::<Result<Vec<_>>>()?;
                Ok(Geometry::MultiPoint(MultiPoint::new(points)))
            }
            Geometry::MultiLineString(mls) => {
                let lines = mls
                    .iter()
                    .map(|ls| self.transform_linestring(ls))
                    .collect::<Result<Vec<_>>>()?;
                Ok(Geometry::MultiLineString(MultiLineString::new(lines)))
            }
            Geometry::MultiPolygon(mp) => {
                let polys = mp
                    .iter()
                    .map(|poly| self.transform_polygon(poly))
                    .collect::<Result<Vec<_>>>()?;
                Ok(Geometry::MultiPolygon(MultiPolygon::new(polys)))
            }
            _ => bail!("Type de géométrie non supporté"),
        }
    }
}
