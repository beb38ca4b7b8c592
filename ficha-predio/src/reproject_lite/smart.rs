//! Reprojection intelligente : reproject_lite en priorité, fallback sur proj
//!
//! Utilise automatiquement la meilleure option disponible.

use super::ReprojectorLite;
#[cfg(not(feature = "reproject"))]
use anyhow::bail;
use anyhow::Result;
use geo::Geometry;

/// Reprojection intelligente
///
/// Essaie d'abord reproject_lite (pure Rust), puis fallback sur proj si disponible.
pub enum SmartReprojector {
    /// Reprojection légère (pure Rust)
    Lite(ReprojectorLite),
    /// Reprojection via PROJ (si feature activée)
    #[cfg(feature = "reproject")]
    Proj(crate::reproject::Reprojector),
    /// Pas de reprojection (source == cible)
    Identity,
}

impl SmartReprojector {
    /// Crée un nouveau reprojector
    pub fn new(source_epsg: u32, target_epsg: u32) -> Result<Self> {
        if source_epsg == target_epsg {
            return Ok(Self::Identity);
        }

        if ReprojectorLite::is_supported(source_epsg, target_epsg) {
            let lite = ReprojectorLite::new(source_epsg, target_epsg)?;
            return Ok(Self::Lite(lite));
        }

        #[cfg(feature = "reproject")]
        {
            let proj = crate::reproject::Reprojector::new(source_epsg, target_epsg)?;
            Ok(Self::Proj(proj))
        }

        #[cfg(not(feature = "reproject"))]
        bail!(
            "Reprojection EPSG:{} → EPSG:{} non supportée sans PROJ. \
             Systèmes supportés (reproject_lite): 4326 et UTM WGS84 (326xx/327xx). \
             Pour d'autres systèmes, compilez avec: cargo build --features reproject",
            source_epsg,
            target_epsg
        );
    }

    /// Transforme une géométrie
    pub fn transform_geometry(&self, geom: &Geometry) -> Result<Geometry> {
        match self {
            Self::Identity => Ok(geom.clone()),
            Self::Lite(lite) => lite.transform_geometry(geom),
            #[cfg(feature = "reproject")]
            Self::Proj(proj) => proj.transform_geometry(geom),
        }
    }

    /// Retourne une description du reprojector utilisé
    pub fn description(&self) -> &'static str {
        match self {
            Self::Identity => "identity (pas de reprojection)",
            Self::Lite(_) => "reproject_lite (pure Rust)",
            #[cfg(feature = "reproject")]
            Self::Proj(_) => "proj (PROJ library)",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity() {
        let r = SmartReprojector::new(32717, 32717).unwrap();
        assert!(matches!(r, SmartReprojector::Identity));
    }

    #[test]
    fn test_lite() {
        let r = SmartReprojector::new(4326, 32717).unwrap();
        assert!(matches!(r, SmartReprojector::Lite(_)));
        assert_eq!(r.description(), "reproject_lite (pure Rust)");
    }

    #[cfg(not(feature = "reproject"))]
    #[test]
    fn test_other_datum_needs_proj() {
        let err = SmartReprojector::new(4230, 32717).err().unwrap();
        assert!(err.to_string().contains("--features reproject"));
    }

    #[test]
    fn test_sirgas_is_lite() {
        let r = SmartReprojector::new(4674, 32717).unwrap();
        assert!(matches!(r, SmartReprojector::Lite(_)));
    }
}
