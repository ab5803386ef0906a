//! Coordinate reference system utilities built on top of the `proj` crate.

use proj::Proj;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SpotterError};

/// Representation of a coordinate reference system.
///
/// A CRS is stored internally as a definition string which can be an EPSG
/// identifier (`"EPSG:4326"`), a Proj4 definition or a WKT definition.  When
/// created from an EPSG code the numeric value is retained so that callers can
/// inspect it if necessary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Crs {
    definition: String,
    epsg: Option<u32>,
}

impl Crs {
    /// Creates a new CRS from the given EPSG code.
    pub fn from_epsg(code: u32) -> Self {
        Self {
            definition: format!("EPSG:{}", code),
            epsg: Some(code),
        }
    }

    /// Creates a CRS from a Proj4 definition string.
    pub fn from_proj4(definition: &str) -> Self {
        Self {
            definition: definition.to_string(),
            epsg: None,
        }
    }

    /// Creates a CRS from a WKT definition string.
    pub fn from_wkt(definition: &str) -> Self {
        Self {
            definition: definition.to_string(),
            epsg: None,
        }
    }

    /// Creates a CRS from a user-supplied string, recognizing `EPSG:n`
    /// identifiers and treating anything else as a Proj4/WKT definition.
    pub fn parse(text: &str) -> Self {
        let trimmed = text.trim();
        if let Some(code) = trimmed
            .strip_prefix("EPSG:")
            .or_else(|| trimmed.strip_prefix("epsg:"))
            .and_then(|c| c.parse::<u32>().ok())
        {
            return Self::from_epsg(code);
        }
        Self {
            definition: trimmed.to_string(),
            epsg: None,
        }
    }

    /// Returns the EPSG code for this CRS, if available.
    pub fn epsg(&self) -> Option<u32> {
        self.epsg
    }

    /// Returns the underlying definition string.
    pub fn definition(&self) -> &str {
        &self.definition
    }

    /// Common global CRS definition: WGS84 (EPSG:4326).
    pub fn wgs84() -> Self {
        Self::from_epsg(4326)
    }

    /// Common global CRS definition: Web Mercator (EPSG:3857).
    pub fn web_mercator() -> Self {
        Self::from_epsg(3857)
    }

    /// Example national CRS definition (RDN2008 / UTM zone 32N).
    pub fn rdn2008_utm32() -> Self {
        Self::from_epsg(6707)
    }

    /// Reports whether coordinates in this CRS are angular (degrees) rather
    /// than linear.
    ///
    /// Known geographic EPSG codes are matched directly; other definitions
    /// are sniffed for a geographic Proj4 or WKT header.
    pub fn is_geographic(&self) -> bool {
        if let Some(code) = self.epsg {
            return matches!(code, 4326 | 4258 | 4269 | 4283 | 4617 | 6706);
        }
        let def = self.definition.trim_start().to_ascii_uppercase();
        def.contains("+PROJ=LONGLAT") || def.starts_with("GEOGCS") || def.starts_with("GEOGCRS")
    }

    /// Transforms an `(x, y)` coordinate from this CRS to the target CRS.
    ///
    /// Coordinates are always `(x, y)` = `(east, north)` = `(lon, lat)`;
    /// the pipeline is normalized regardless of the authority axis order.
    pub fn transform_point(&self, target: &Crs, x: f64, y: f64) -> Option<(f64, f64)> {
        if self == target {
            return Some((x, y));
        }
        let proj = Proj::new_known_crs(&self.definition, &target.definition, None).ok()?;
        proj.convert((x, y)).ok()
    }

    /// Like [`Crs::transform_point`], for call sites where a failed
    /// transform is an error rather than something to skip or count.
    pub fn try_transform_point(&self, target: &Crs, x: f64, y: f64) -> Result<(f64, f64)> {
        self.transform_point(target, x, y)
            .ok_or_else(|| SpotterError::CrsTransformFailure {
                from: self.definition.clone(),
                to: target.definition.clone(),
            })
    }
}
