//! Projection UTM (Universal Transverse Mercator) sur WGS84
//!
//! Séries de Snyder (USGS Professional Paper 1395), précision sub-métrique
//! dans la zone et ses abords immédiats. Toutes les zones 1 à 60 sont
//! acceptées, nord comme sud.

use super::ellipsoid::WGS84;
use super::Geographic;
use anyhow::{bail, Result};

/// Facteur d'échelle sur le méridien central
const K0: f64 = 0.9996;

/// False easting
const X0: f64 = 500000.0;

/// False northing de l'hémisphère sud
const Y0_SOUTH: f64 = 10000000.0;

/// Longitude du méridien central d'une zone (radians)
fn central_meridian(zone: u32) -> f64 {
    ((zone as f64 - 1.0) * 6.0 - 180.0 + 3.0).to_radians()
}

fn check_zone(zone: u32) -> Result<()> {
    if !(1..=60).contains(&zone) {
        bail!("Zone UTM {} invalide (1 à 60)", zone);
    }
    Ok(())
}

/// Longueur de l'arc de méridien depuis l'équateur
fn meridian_arc(phi: f64) -> f64 {
    let e2 = WGS84::E2;
    let e4 = e2 * e2;
    let e6 = e4 * e2;

    WGS84::A
        * ((1.0 - e2 / 4.0 - 3.0 * e4 / 64.0 - 5.0 * e6 / 256.0) * phi
            - (3.0 * e2 / 8.0 + 3.0 * e4 / 32.0 + 45.0 * e6 / 1024.0) * (2.0 * phi).sin()
            + (15.0 * e4 / 256.0 + 45.0 * e6 / 1024.0) * (4.0 * phi).sin()
            - (35.0 * e6 / 3072.0) * (6.0 * phi).sin())
}

/// Convertit des coordonnées géographiques WGS84 vers UTM
///
/// Retourne `(easting, northing)` en mètres.
pub fn geographic_to_utm(geo: Geographic, zone: u32, south: bool) -> Result<(f64, f64)> {
    check_zone(zone)?;

    let a = WGS84::A;
    let e2 = WGS84::E2;
    let ep2 = WGS84::EP2;

    let phi = geo.lat;
    let sin_phi = phi.sin();
    let cos_phi = phi.cos();
    let tan_phi = phi.tan();

    let n = a / (1.0 - e2 * sin_phi.powi(2)).sqrt();
    let t = tan_phi.powi(2);
    let c = ep2 * cos_phi.powi(2);
    let big_a = cos_phi * (geo.lon - central_meridian(zone));
    let m = meridian_arc(phi);

    let x = K0
        * n
        * (big_a
            + (1.0 - t + c) * big_a.powi(3) / 6.0
            + (5.0 - 18.0 * t + t.powi(2) + 72.0 * c - 58.0 * ep2) * big_a.powi(5) / 120.0)
        + X0;

    let y = K0
        * (m + n
            * tan_phi
            * (big_a.powi(2) / 2.0
                + (5.0 - t + 9.0 * c + 4.0 * c.powi(2)) * big_a.powi(4) / 24.0
                + (61.0 - 58.0 * t + t.powi(2) + 600.0 * c - 330.0 * ep2) * big_a.powi(6)
                    / 720.0));

    let y = if south { y + Y0_SOUTH } else { y };

    Ok((x, y))
}

/// Convertit UTM vers coordonnées géographiques WGS84
pub fn utm_to_geographic(x: f64, y: f64, zone: u32, south: bool) -> Result<Geographic> {
    check_zone(zone)?;

    let a = WGS84::A;
    let e2 = WGS84::E2;
    let ep2 = WGS84::EP2;

    let y0 = if south { Y0_SOUTH } else { 0.0 };
    let lon0 = central_meridian(zone);

    // Coordonnées réduites
    let x = x - X0;
    let y = y - y0;

    // Calcul du footprint latitude
    let m = y / K0;
    let mu = m / (a * (1.0 - e2 / 4.0 - 3.0 * e2.powi(2) / 64.0 - 5.0 * e2.powi(3) / 256.0));

    let e1 = (1.0 - (1.0 - e2).sqrt()) / (1.0 + (1.0 - e2).sqrt());

    let phi1 = mu
        + (3.0 * e1 / 2.0 - 27.0 * e1.powi(3) / 32.0) * (2.0 * mu).sin()
        + (21.0 * e1.powi(2) / 16.0 - 55.0 * e1.powi(4) / 32.0) * (4.0 * mu).sin()
        + (151.0 * e1.powi(3) / 96.0) * (6.0 * mu).sin()
        + (1097.0 * e1.powi(4) / 512.0) * (8.0 * mu).sin();

    let sin_phi1 = phi1.sin();
    let cos_phi1 = phi1.cos();
    let tan_phi1 = phi1.tan();

    let n1 = a / (1.0 - e2 * sin_phi1.powi(2)).sqrt();
    let t1 = tan_phi1.powi(2);
    let c1 = ep2 * cos_phi1.powi(2);
    let r1 = a * (1.0 - e2) / (1.0 - e2 * sin_phi1.powi(2)).powf(1.5);
    let d = x / (n1 * K0);

    let lat = phi1
        - (n1 * tan_phi1 / r1)
            * (d.powi(2) / 2.0
                - (5.0 + 3.0 * t1 + 10.0 * c1 - 4.0 * c1.powi(2) - 9.0 * ep2) * d.powi(4) / 24.0
                + (61.0 + 90.0 * t1 + 298.0 * c1 + 45.0 * t1.powi(2) - 252.0 * ep2 - 3.0 * c1.powi(2))
                    * d.powi(6)
                    / 720.0);

    let lon = lon0
        + (d - (1.0 + 2.0 * t1 + c1) * d.powi(3) / 6.0
            + (5.0 - 2.0 * c1 + 28.0 * t1 - 3.0 * c1.powi(2) + 8.0 * ep2 + 24.0 * t1.powi(2))
                * d.powi(5)
                / 120.0)
            / cos_phi1;

    Ok(Geographic::new(lon, lat))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guayaquil_forward() {
        let (x, y) = geographic_to_utm(Geographic::from_degrees(-79.9, -2.2), 17, true).unwrap();
        assert!((x - 622320.38).abs() < 1.0, "x={}", x);
        assert!((y - 9756787.62).abs() < 1.0, "y={}", y);
    }

    #[test]
    fn test_martinique_forward() {
        let (x, y) = geographic_to_utm(Geographic::from_degrees(-61.07, 14.60), 20, false).unwrap();
        assert!((x - 707904.65).abs() < 1.0, "x={}", x);
        assert!((y - 1614967.88).abs() < 1.0, "y={}", y);
    }

    #[test]
    fn test_paris_forward() {
        let (x, y) = geographic_to_utm(Geographic::from_degrees(2.35, 48.85), 31, false).unwrap();
        assert!((x - 452314.89).abs() < 1.0, "x={}", x);
        assert!((y - 5410984.89).abs() < 1.0, "y={}", y);
    }

    #[test]
    fn test_central_meridian_has_false_easting() {
        let (x, _) = geographic_to_utm(Geographic::from_degrees(-81.0, -1.0), 17, true).unwrap();
        assert!((x - 500000.0).abs() < 1e-6, "x={}", x);
    }

    #[test]
    fn test_roundtrip() {
        for (lon, lat, zone, south) in [
            (-79.9, -2.2, 17, true),
            (-83.99, -45.0, 17, true),
            (5.99, 70.0, 31, false),
            (0.01, 0.01, 31, false),
        ] {
            let (x, y) = geographic_to_utm(Geographic::from_degrees(lon, lat), zone, south).unwrap();
            let (lon2, lat2) = utm_to_geographic(x, y, zone, south).unwrap().to_degrees();
            assert!((lon2 - lon).abs() < 1e-6, "lon={} lon2={}", lon, lon2);
            assert!((lat2 - lat).abs() < 1e-6, "lat={} lat2={}", lat, lat2);
        }
    }

    #[test]
    fn test_invalid_zone() {
        assert!(geographic_to_utm(Geographic::from_degrees(0.0, 0.0), 0, false).is_err());
        assert!(utm_to_geographic(500000.0, 0.0, 61, false).is_err());
    }

    #[test]
    fn test_martinique() {
        // Fort-de-France: -61.07°E, 14.60°N
        let geo = utm_to_geographic(708000.0, 1615000.0, 20, false).unwrap();
        let (lon, lat) = geo.to_degrees();
        assert!((lon - (-61.07)).abs() < 0.2, "lon={}", lon);
        assert!((lat - 14.60).abs() < 0.2, "lat={}", lat);
    }

    #[test]
    fn test_reunion() {
        // Saint-Denis: 55.45°E, -20.88°S
        let geo = utm_to_geographic(338000.0, 7691000.0, 40, true).unwrap();
        let (lon, lat) = geo.to_degrees();
        assert!((lon - 55.45).abs() < 0.2, "lon={}", lon);
        assert!((lat - (-20.88)).abs() < 0.2, "lat={}", lat);
    }
}
