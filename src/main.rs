//! COVID-19 county report generator.
//!
//! One-shot interactive pipeline: download county geometry and the
//! case/death time series, resolve a user-entered county, print summary
//! statistics, render a time-series chart, and write an interactive
//! choropleth map of the resolved state.

mod charts;
mod cli;
mod config;
mod data;
mod geo;
mod report;
mod resolver;
mod stats;

use anyhow::Result;
use config::DataSources;
use resolver::ResolveError;
use tracing::warn;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .init();

    let sources = DataSources::from_env();
    let shapes = geo::load_county_shapes(&sources.geometry_url)?;
    let df_cases = data::fetch_csv(&sources.cases_url)?;
    let df_deaths = data::fetch_csv(&sources.deaths_url)?;
    let df = data::melt_and_merge(&df_cases, &df_deaths)?;

    println!("*** COVID19 County Report ***");
    let raw_county = cli::prompt("Enter County: ")?;

    let identity = match resolver::resolve_county(&df, &raw_county, &mut cli::StdinChooser) {
        Ok(identity) => identity,
        Err(err @ (ResolveError::NoMatch(_) | ResolveError::InvalidChoice)) => {
            println!("{err}");
            std::process::exit(1);
        }
        Err(err) => return Err(err.into()),
    };

    let observations = stats::observations_for(&df, &identity)?;
    let summary = stats::summarize(&observations);
    report::print_summary(&identity, &summary);

    let chart_path = charts::render_cases_chart(std::path::Path::new("."), &identity, &observations)?;
    if let Err(err) = open::that(&chart_path) {
        warn!(%err, "could not open chart viewer");
    }

    println!(
        "Interactive map of {} counties and total COVID19 cases as of 12/31/22:",
        identity.state
    );
    let snapshot = geo::build_state_snapshot(&df, &identity.state, &shapes)?;
    let map_path = report::write_state_map(&identity.state, &snapshot)?;
    println!("Map saved to: {}", map_path.display());

    Ok(())
}
