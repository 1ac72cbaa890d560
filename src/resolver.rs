//! County Resolver Module
//! Maps a free-text county name to exactly one (county, state) identity,
//! delegating disambiguation to a pluggable chooser.

use polars::prelude::*;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ResolveError {
    #[error("No matching county found for '{0}' in the dataset.")]
    NoMatch(String),
    #[error("Invalid choice. Exiting.")]
    InvalidChoice,
    #[error("Polars error: {0}")]
    PolarsError(#[from] PolarsError),
}

/// A resolved county, threaded explicitly through statistics and reporting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountyIdentity {
    pub county: String,
    pub state: String,
}

/// Picks one state out of several candidates sharing the county name.
///
/// Implementations return the 1-indexed position of the chosen state, or
/// `ResolveError::InvalidChoice` for anything unusable.
pub trait StateChooser {
    fn choose(&mut self, county: &str, states: &[String]) -> Result<usize, ResolveError>;
}

/// Normalize user input the way the report expects county names: first
/// character uppercased, the rest lowercased.
pub fn normalize_county_name(input: &str) -> String {
    let trimmed = input.trim();
    let mut chars = trimmed.chars();
    match chars.next() {
        Some(first) => {
            first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
        }
        None => String::new(),
    }
}

/// Resolve a raw county name against the observation table.
///
/// Distinct candidate states keep their first-appearance order from the
/// table; a single candidate is selected without consulting the chooser.
pub fn resolve_county(
    df: &DataFrame,
    raw_input: &str,
    chooser: &mut dyn StateChooser,
) -> Result<CountyIdentity, ResolveError> {
    let county = normalize_county_name(raw_input);

    let matches = df
        .clone()
        .lazy()
        .filter(col("county").eq(lit(county.as_str())))
        .select([col("state")])
        .collect()?;

    if matches.height() == 0 {
        return Err(ResolveError::NoMatch(county));
    }

    let state_ca = matches.column("state")?.str()?;
    let mut states: Vec<String> = Vec::new();
    for i in 0..matches.height() {
        if let Some(state) = state_ca.get(i) {
            if !states.iter().any(|s| s == state) {
                states.push(state.to_string());
            }
        }
    }

    let state = if states.len() == 1 {
        states.remove(0)
    } else {
        let choice = chooser.choose(&county, &states)?;
        if choice < 1 || choice > states.len() {
            return Err(ResolveError::InvalidChoice);
        }
        states.swap_remove(choice - 1)
    };

    Ok(CountyIdentity { county, state })
}
