//! Reprojection de géométries avec PROJ
//!
//! Ce module est disponible uniquement avec le feature `reproject`. Il couvre
//! les systèmes que reproject_lite ne gère pas (autres datums, CRS projetés
//! locaux).

use anyhow::{Context, Result};
use geo::{Coord, Geometry, LineString, MultiLineString, MultiPoint, MultiPolygon, Point, Polygon};
use proj::Proj;

/// Reprojection de géométries entre deux systèmes de coordonnées
pub struct Reprojector {
    proj: Proj,
    source_epsg: u32,
    target_epsg: u32,
}

impl Reprojector {
    /// Crée un nouveau reprojector entre deux EPSG
    pub fn new(source_epsg: u32, target_epsg: u32) -> Result<Self> {
        let source = format!("EPSG:{}", source_epsg);
        let target = format!("EPSG:{}", target_epsg);

        let proj = Proj::new_known_crs(&source, &target, None).context(format!(
            "Failed to create projection from {} to {}",
            source, target
        ))?;

        Ok(Self {
            proj,
            source_epsg,
            target_epsg,
        })
    }

    pub fn source_epsg(&self) -> u32 {
        self.source_epsg
    }

    pub fn target_epsg(&self) -> u32 {
        self.target_epsg
    }

    /// Transforme une géométrie
    pub fn transform_geometry(&self, geom: &Geometry) -> Result<Geometry> {
        if self.source_epsg == self.target_epsg {
            return Ok(geom.clone());
        }

        match geom {
            Geometry::Point(p) => {
                let (x, y) = self.transform_coord(p.0)?;
                Ok(Geometry::Point(Point::new(x, y)))
            }
            Geometry::LineString(ls) => Ok(Geometry::LineString(self.transform_linestring(ls)?)),
            Geometry::Polygon(p) => Ok(Geometry::Polygon(self.transform_polygon(p)?)),
            Geometry::MultiPoint(mp) => {
                let points = mp
                    .0
                    .iter()
                    .map(|p| {
                        let (x, y) = self.transform_coord(p.0)?;
                        Ok(Point::new(x, y))
                    })
                    .collect::<Result<Vec<_>>>()?;
                Ok(Geometry::MultiPoint(MultiPoint::new(points)))
            }
            Geometry::MultiLineString(mls) => {
                let lines = mls
                    .0
                    .iter()
                    .map(|ls| self.transform_linestring(ls))
                    .collect::<Result<Vec<_>>>()?;
                Ok(Geometry::MultiLineString(MultiLineString::new(lines)))
            }
            Geometry::MultiPolygon(mp) => {
                let polys = mp
                    .0
                    .iter()
                    .map(|p| self.transform_polygon(p))
                    .collect::<Result<Vec<_>>>()?;
                Ok(Geometry::MultiPolygon(MultiPolygon::new(polys)))
            }
            // Types non supportés: retourner tel quel
            _ => Ok(geom.clone()),
        }
    }

    fn transform_coord(&self, coord: Coord) -> Result<(f64, f64)> {
        self.proj
            .convert((coord.x, coord.y))
            .context("Coordinate transformation failed")
    }

    /// Transforme une LineString (batch conversion)
    fn transform_linestring(&self, ls: &LineString) -> Result<LineString> {
        let mut coords: Vec<(f64, f64)> = ls.0.iter().map(|c| (c.x, c.y)).collect();

        self.proj
            .convert_array(&mut coords)
            .context("Batch coordinate transformation failed")?;

        let result: Vec<Coord> = coords.into_iter().map(|(x, y)| Coord { x, y }).collect();
        Ok(LineString::new(result))
    }

    fn transform_polygon(&self, p: &Polygon) -> Result<Polygon> {
        let exterior = self.transform_linestring(p.exterior())?;
        let interiors = p
            .interiors()
            .iter()
            .map(|ls| self.transform_linestring(ls))
            .collect::<Result<Vec<_>>>()?;
        Ok(Polygon::new(exterior, interiors))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sirgas_to_utm() {
        // SIRGAS 2000 et WGS84 coïncident au mètre près
        let reprojector = Reprojector::new(4674, 32717).unwrap();
        let point = Geometry::Point(Point::new(-79.9, -2.2));

        match reprojector.transform_geometry(&point).unwrap() {
            Geometry::Point(p) => {
                assert!((p.x() - 622320.0).abs() < 5.0, "x={}", p.x());
                assert!((p.y() - 9756788.0).abs() < 5.0, "y={}", p.y());
            }
            other => panic!("Expected Point geometry, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid_epsg() {
        assert!(Reprojector::new(99999, 4326).is_err());
    }
}
