//! Source dataset locations.
//!
//! There is no config file and no CLI flags; each URL can be overridden
//! through an environment variable for testing against local mirrors.

const DEFAULT_CASES_URL: &str = "https://raw.githubusercontent.com/CSSEGISandData/COVID-19/master/csse_covid_19_data/csse_covid_19_time_series/time_series_covid19_confirmed_US.csv";
const DEFAULT_DEATHS_URL: &str = "https://github.com/CSSEGISandData/COVID-19/raw/master/csse_covid_19_data/csse_covid_19_time_series/time_series_covid19_deaths_US.csv";
const DEFAULT_GEOMETRY_URL: &str = "https://github.com/babdelfa/gis/blob/main/counties_geometry.zip?raw=true";

/// URLs of the three remote datasets fetched at run start.
#[derive(Debug, Clone)]
pub struct DataSources {
    pub cases_url: String,
    pub deaths_url: String,
    pub geometry_url: String,
}

impl Default for DataSources {
    fn default() -> Self {
        Self {
            cases_url: DEFAULT_CASES_URL.to_string(),
            deaths_url: DEFAULT_DEATHS_URL.to_string(),
            geometry_url: DEFAULT_GEOMETRY_URL.to_string(),
        }
    }
}

impl DataSources {
    /// Defaults with per-URL environment overrides applied.
    pub fn from_env() -> Self {
        let mut sources = Self::default();
        if let Ok(url) = std::env::var("COVID_CASES_URL") {
            sources.cases_url = url;
        }
        if let Ok(url) = std::env::var("COVID_DEATHS_URL") {
            sources.deaths_url = url;
        }
        if let Ok(url) = std::env::var("COVID_GEOMETRY_URL") {
            sources.geometry_url = url;
        }
        sources
    }
}
