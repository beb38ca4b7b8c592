//! Systèmes de coordonnées de référence (CRS)

use std::fmt;

/// Classification d'un CRS
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrsKind {
    /// Coordonnées angulaires (longitude/latitude)
    Geographic,
    /// Coordonnées planes (mètres)
    Projected,
    /// Code EPSG hors du catalogue connu
    Unknown,
}

/// Système de coordonnées identifié par son code EPSG
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Crs {
    /// Code EPSG
    pub epsg: u32,

    /// Nom usuel (ex: "WGS 84")
    pub name: String,

    /// Géographique ou projeté
    pub kind: CrsKind,
}

/// CRS géographiques connus
const GEOGRAPHIC: &[(u32, &str)] = &[
    (4326, "WGS 84"),
    (4258, "ETRS89"),
    (4267, "NAD27"),
    (4269, "NAD83"),
    (4171, "RGF93 v1"),
    (4230, "ED50"),
    (4248, "PSAD56"),
    (4283, "GDA94"),
    (4618, "SAD69"),
    (4674, "SIRGAS 2000"),
];

/// CRS projetés connus (hors UTM WGS 84, générés)
const PROJECTED: &[(u32, &str)] = &[
    (2154, "RGF93 v1 / Lambert-93"),
    (3857, "WGS 84 / Pseudo-Mercator"),
];

impl Crs {
    /// Construit un CRS depuis son code EPSG
    pub fn from_epsg(epsg: u32) -> Self {
        if let Some(&(_, name)) = GEOGRAPHIC.iter().find(|(code, _)| *code == epsg) {
            return Self::new(epsg, name, CrsKind::Geographic);
        }
        if let Some(&(_, name)) = PROJECTED.iter().find(|(code, _)| *code == epsg) {
            return Self::new(epsg, name, CrsKind::Projected);
        }
        if let Some((zone, north)) = utm_zone_of(epsg) {
            return Self::utm(zone, north);
        }
        Self::new(epsg, &format!("EPSG:{}", epsg), CrsKind::Unknown)
    }

    fn new(epsg: u32, name: &str, kind: CrsKind) -> Self {
        Self {
            epsg,
            name: name.to_string(),
            kind,
        }
    }

    /// WGS 84 géographique (EPSG:4326)
    pub fn wgs84() -> Self {
        Self::from_epsg(4326)
    }

    /// WGS 84 / UTM zone `zone` (N ou S)
    ///
    /// La zone n'est pas bornée ici : l'appelant vérifie 1..=60.
    pub fn utm(zone: u32, north: bool) -> Self {
        let (base, letter) = if north { (32600, 'N') } else { (32700, 'S') };
        Self {
            epsg: base + zone,
            name: format!("WGS 84 / UTM zone {}{}", zone, letter),
            kind: CrsKind::Projected,
        }
    }

    /// Parse une référence CRS telle qu'écrite dans un GeoJSON
    ///
    /// Formats acceptés :
    /// - `urn:ogc:def:crs:EPSG::4326` (et `urn:ogc:def:crs:EPSG:6.6:4326`)
    /// - `EPSG:4326`
    /// - `urn:ogc:def:crs:OGC:1.3:CRS84` / `CRS84` (équivalent à 4326)
    pub fn parse(reference: &str) -> Option<Self> {
        let reference = reference.trim();
        if reference.to_ascii_uppercase().ends_with("CRS84") {
            return Some(Self::wgs84());
        }
        if !reference.to_ascii_uppercase().contains("EPSG") {
            return None;
        }
        let code = reference.rsplit(':').next()?.trim();
        code.parse::<u32>().ok().map(Self::from_epsg)
    }

    pub fn is_geographic(&self) -> bool {
        self.kind == CrsKind::Geographic
    }
}

impl fmt::Display for Crs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (EPSG:{})", self.name, self.epsg)
    }
}

/// Zone et hémisphère d'un code EPSG UTM WGS 84 (326xx / 327xx)
fn utm_zone_of(epsg: u32) -> Option<(u32, bool)> {
    match epsg {
        32601..=32660 => Some((epsg - 32600, true)),
        32701..=32760 => Some((epsg - 32700, false)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_epsg_geographic() {
        let crs = Crs::from_epsg(4326);
        assert!(crs.is_geographic());
        assert_eq!(crs.to_string(), "WGS 84 (EPSG:4326)");
    }

    #[test]
    fn test_from_epsg_utm() {
        let crs = Crs::from_epsg(32717);
        assert_eq!(crs.kind, CrsKind::Projected);
        assert_eq!(crs.name, "WGS 84 / UTM zone 17S");

        let crs = Crs::from_epsg(32631);
        assert_eq!(crs.name, "WGS 84 / UTM zone 31N");
    }

    #[test]
    fn test_from_epsg_unknown() {
        let crs = Crs::from_epsg(99999);
        assert_eq!(crs.kind, CrsKind::Unknown);
        assert!(!crs.is_geographic());
    }

    #[test]
    fn test_parse_references() {
        assert_eq!(Crs::parse("urn:ogc:def:crs:EPSG::4326").unwrap().epsg, 4326);
        assert_eq!(Crs::parse("urn:ogc:def:crs:EPSG:6.6:32717").unwrap().epsg, 32717);
        assert_eq!(Crs::parse("EPSG:4674").unwrap().epsg, 4674);
        assert_eq!(Crs::parse("urn:ogc:def:crs:OGC:1.3:CRS84").unwrap().epsg, 4326);
        assert!(Crs::parse("LAMB93").is_none());
        assert!(Crs::parse("EPSG:abc").is_none());
    }
}
