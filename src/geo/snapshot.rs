//! State Snapshot Module
//! Joins the latest per-county totals of one state to county geometry for
//! map rendering.

use crate::geo::CountyGeometry;
use geojson::Geometry;
use polars::prelude::*;
use std::collections::HashMap;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum SnapshotError {
    #[error("Polars error: {0}")]
    PolarsError(#[from] PolarsError),
}

/// Per-county aggregate at the latest available date, ready for the map.
#[derive(Debug, Clone)]
pub struct StateSnapshot {
    pub location: String,
    pub population: i64,
    pub total_cases: i64,
    pub geometry: Geometry,
}

/// Build the choropleth rows for one state.
///
/// One row per distinct county identity with a matching geometry record;
/// population and total cases come from that county's row at the latest
/// available date. Counties without a federal county code or without a
/// polygon are omitted. Rows are sorted by location for stable output.
pub fn build_state_snapshot(
    df: &DataFrame,
    state: &str,
    shapes: &[CountyGeometry],
) -> Result<Vec<StateSnapshot>, SnapshotError> {
    let state_df = df
        .clone()
        .lazy()
        .filter(col("state").eq(lit(state)))
        .select([
            col("county_state"),
            col("date"),
            col("population"),
            col("fips"),
            col("cases"),
        ])
        .collect()?;

    let location_ca = state_df.column("county_state")?.str()?;
    let date_ca = state_df.column("date")?.str()?;
    let population_ca = state_df.column("population")?.i64()?;
    let fips_ca = state_df.column("fips")?.i64()?;
    let cases_ca = state_df.column("cases")?.i64()?;

    // latest row per county identity; ISO dates compare chronologically
    struct Latest<'a> {
        date: &'a str,
        population: i64,
        total_cases: i64,
        fips: i64,
    }
    let mut latest: HashMap<String, Latest> = HashMap::new();

    for i in 0..state_df.height() {
        let (Some(location), Some(date), Some(fips)) =
            (location_ca.get(i), date_ca.get(i), fips_ca.get(i))
        else {
            continue;
        };
        let row = Latest {
            date,
            population: population_ca.get(i).unwrap_or(0),
            total_cases: cases_ca.get(i).unwrap_or(0),
            fips,
        };
        match latest.get(location) {
            Some(existing) if existing.date >= date => {}
            _ => {
                latest.insert(location.to_string(), row);
            }
        }
    }

    let geometry_by_fips: HashMap<i64, &Geometry> = shapes
        .iter()
        .map(|shape| (shape.fips, &shape.geometry))
        .collect();

    let mut snapshot: Vec<StateSnapshot> = latest
        .into_iter()
        .filter_map(|(location, row)| {
            geometry_by_fips.get(&row.fips).map(|geometry| StateSnapshot {
                location,
                population: row.population,
                total_cases: row.total_cases,
                geometry: (*geometry).clone(),
            })
        })
        .collect();
    snapshot.sort_by(|a, b| a.location.cmp(&b.location));

    debug!(state, counties = snapshot.len(), "state snapshot built");
    Ok(snapshot)
}
