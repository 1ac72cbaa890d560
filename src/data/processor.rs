//! Data Processor Module
//! Reshapes the wide case/death tables to long format and merges them into
//! one daily observation table.

use chrono::NaiveDate;
use polars::prelude::*;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum ProcessorError {
    #[error("Polars error: {0}")]
    PolarsError(#[from] PolarsError),
    #[error("Malformed date column header: '{0}'")]
    BadDateHeader(String),
}

/// National/geographic identity columns that are never needed downstream.
const DROP_COLUMNS: [&str; 7] = [
    "UID",
    "iso2",
    "iso3",
    "code3",
    "Country_Region",
    "Lat",
    "Long_",
];

/// Observations past this date are discarded.
pub const DATE_BOUND: &str = "2022-12-31";

/// Date headers in the source tables use a two-digit year, e.g. "1/22/20".
const HEADER_DATE_FORMAT: &str = "%m/%d/%y";

/// Melt one wide table into long format.
///
/// Every column that is not an identity column (and not in the drop set) is
/// treated as a date header and unpivoted into one (date, value) row per
/// county. Dates land in the output as ISO-8601 strings so lexicographic
/// order equals chronological order.
fn melt_wide(
    df: &DataFrame,
    keep_population_fips: bool,
    value_name: &str,
) -> Result<DataFrame, ProcessorError> {
    let county_ca = df.column("Admin2")?.str()?.clone();
    let state_ca = df.column("Province_State")?.str()?.clone();
    let combined_ca = df.column("Combined_Key")?.str()?.clone();

    let (population_ca, fips_ca) = if keep_population_fips {
        let population = df.column("Population")?.cast(&DataType::Int64)?;
        // FIPS is inferred as a float column in the raw CSV
        let fips = df.column("FIPS")?.cast(&DataType::Float64)?;
        (Some(population.i64()?.clone()), Some(fips.f64()?.clone()))
    } else {
        (None, None)
    };

    let mut identity_columns: Vec<&str> = vec!["Admin2", "Province_State", "Combined_Key", "FIPS"];
    identity_columns.extend(DROP_COLUMNS);
    if keep_population_fips {
        identity_columns.push("Population");
    }

    // Every remaining header must be a calendar date
    let mut date_columns: Vec<(String, String)> = Vec::new();
    for name in df.get_column_names() {
        let name = name.as_str();
        if identity_columns.contains(&name) {
            continue;
        }
        let parsed = NaiveDate::parse_from_str(name, HEADER_DATE_FORMAT)
            .map_err(|_| ProcessorError::BadDateHeader(name.to_string()))?;
        date_columns.push((name.to_string(), parsed.to_string()));
    }

    let height = df.height();
    let capacity = height * date_columns.len();
    let mut counties: Vec<String> = Vec::with_capacity(capacity);
    let mut states: Vec<String> = Vec::with_capacity(capacity);
    let mut combined: Vec<String> = Vec::with_capacity(capacity);
    let mut populations: Vec<Option<i64>> = Vec::new();
    let mut fips_codes: Vec<Option<i64>> = Vec::new();
    let mut dates: Vec<String> = Vec::with_capacity(capacity);
    let mut values: Vec<i64> = Vec::with_capacity(capacity);

    for (raw_name, iso_date) in &date_columns {
        let value_col = df.column(raw_name)?.cast(&DataType::Int64)?;
        let value_ca = value_col.i64()?;

        for i in 0..height {
            let (Some(county), Some(state), Some(key)) =
                (county_ca.get(i), state_ca.get(i), combined_ca.get(i))
            else {
                continue;
            };
            let Some(value) = value_ca.get(i) else {
                continue;
            };

            counties.push(county.to_string());
            states.push(state.to_string());
            combined.push(key.to_string());
            if keep_population_fips {
                populations.push(population_ca.as_ref().and_then(|ca| ca.get(i)));
                fips_codes.push(fips_ca.as_ref().and_then(|ca| ca.get(i)).map(|f| f as i64));
            }
            dates.push(iso_date.clone());
            values.push(value);
        }
    }

    let mut columns = vec![
        Column::new("county".into(), counties),
        Column::new("state".into(), states),
        Column::new("county_state".into(), combined),
    ];
    if keep_population_fips {
        columns.push(Column::new("population".into(), populations));
        columns.push(Column::new("fips".into(), fips_codes));
    }
    columns.push(Column::new("date".into(), dates));
    columns.push(Column::new(value_name.into(), values));

    Ok(DataFrame::new(columns)?)
}

/// Melt both wide tables and merge them into the unified long table.
///
/// Output: one row per (county, state, date) with columns
/// [county, state, county_state, population, fips, date, cases, deaths],
/// bounded to dates on or before 2022-12-31. Rows whose key is missing from
/// either side are dropped (inner join). Row order is not guaranteed.
pub fn melt_and_merge(df_cases: &DataFrame, df_deaths: &DataFrame) -> Result<DataFrame, ProcessorError> {
    let cases_long = melt_wide(df_cases, false, "cases")?;
    let deaths_long = melt_wide(df_deaths, true, "deaths")?;
    debug!(
        cases_rows = cases_long.height(),
        deaths_rows = deaths_long.height(),
        "wide tables melted"
    );

    let keys = ["county", "state", "county_state", "date"];
    let merged = deaths_long
        .lazy()
        .join(
            cases_long.lazy(),
            keys.map(col),
            keys.map(col),
            JoinArgs::new(JoinType::Inner),
        )
        .filter(col("date").lt_eq(lit(DATE_BOUND)))
        .collect()?;

    info!(rows = merged.height(), "daily observation table ready");
    Ok(merged)
}
