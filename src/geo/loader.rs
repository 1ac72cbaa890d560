//! County Geometry Loader Module
//! Downloads the county boundary archive and extracts one polygon per
//! county, keyed by federal county code.

use crate::data::{download, LoaderError};
use geojson::{FeatureCollection, GeoJson, Geometry, JsonValue};
use std::io::{Cursor, Read};
use thiserror::Error;
use tracing::{debug, info};
use zip::ZipArchive;

/// Property carrying the federal county code in the boundary dataset.
const FIPS_PROPERTY: &str = "FIPS_BEA";

#[derive(Error, Debug)]
pub enum GeoError {
    #[error(transparent)]
    Download(#[from] LoaderError),
    #[error("Failed to read geometry archive: {0}")]
    Zip(#[from] zip::result::ZipError),
    #[error("Failed to read archive member: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse county geometry: {0}")]
    Geojson(#[from] geojson::Error),
    #[error("Geometry archive contains no GeoJSON member")]
    NoVectorMember,
}

/// One county boundary polygon.
#[derive(Debug, Clone)]
pub struct CountyGeometry {
    pub fips: i64,
    pub geometry: Geometry,
}

/// Download the boundary archive and parse its GeoJSON member.
///
/// Features without a usable federal county code are skipped.
pub fn load_county_shapes(url: &str) -> Result<Vec<CountyGeometry>, GeoError> {
    info!(url, "downloading county geometry archive");
    let bytes = download(url)?;

    let mut archive = ZipArchive::new(Cursor::new(bytes))?;
    let mut raw = None;
    for i in 0..archive.len() {
        let mut member = archive.by_index(i)?;
        let name = member.name().to_lowercase();
        if name.ends_with(".geojson") || name.ends_with(".json") {
            let mut contents = String::new();
            member.read_to_string(&mut contents)?;
            raw = Some(contents);
            break;
        }
    }
    let raw = raw.ok_or(GeoError::NoVectorMember)?;

    let geojson: GeoJson = raw.parse()?;
    let collection = FeatureCollection::try_from(geojson)?;

    let mut shapes = Vec::with_capacity(collection.features.len());
    for feature in collection.features {
        let Some(geometry) = feature.geometry else {
            continue;
        };
        let fips = feature
            .properties
            .as_ref()
            .and_then(|props| props.get(FIPS_PROPERTY))
            .and_then(parse_fips);
        if let Some(fips) = fips {
            shapes.push(CountyGeometry { fips, geometry });
        }
    }

    debug!(counties = shapes.len(), "county geometry loaded");
    Ok(shapes)
}

/// The join key shows up as integer, float, or string depending on how the
/// dataset was exported.
fn parse_fips(value: &JsonValue) -> Option<i64> {
    if let Some(n) = value.as_i64() {
        return Some(n);
    }
    if let Some(f) = value.as_f64() {
        return Some(f as i64);
    }
    value
        .as_str()
        .and_then(|s| s.trim().parse::<f64>().ok())
        .map(|f| f as i64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn fips_parses_across_export_flavors() {
        assert_eq!(parse_fips(&json!(17031)), Some(17031));
        assert_eq!(parse_fips(&json!(17031.0)), Some(17031));
        assert_eq!(parse_fips(&json!("17031")), Some(17031));
        assert_eq!(parse_fips(&json!("17031.0")), Some(17031));
        assert_eq!(parse_fips(&json!("Cook")), None);
        assert_eq!(parse_fips(&json!(null)), None);
    }
}
