//! Chart Plotter Module
//! Renders the county time-series chart to a PNG with plotters.

use crate::resolver::CountyIdentity;
use crate::stats::DailyObservation;
use chrono::NaiveDate;
use plotters::prelude::*;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum ChartError {
    #[error("No observations to chart")]
    NoData,
    #[error("Failed to render chart: {0}")]
    Draw(String),
}

fn draw_err<E: std::fmt::Display>(err: E) -> ChartError {
    ChartError::Draw(err.to_string())
}

/// Draw cumulative cases against date for one county and save it as
/// `{county}_cases.png` under `output_dir`.
pub fn render_cases_chart(
    output_dir: &Path,
    identity: &CountyIdentity,
    observations: &[DailyObservation],
) -> Result<PathBuf, ChartError> {
    if observations.is_empty() {
        return Err(ChartError::NoData);
    }

    let path = output_dir.join(format!("{}_cases.png", identity.county));
    let dates: Vec<NaiveDate> = observations.iter().map(|obs| obs.date).collect();
    let max_cases = observations
        .iter()
        .map(|obs| obs.cases)
        .max()
        .unwrap_or(1)
        .max(1) as f64;
    let x_max = observations.len().saturating_sub(1).max(1) as f64;

    // the backend borrows the path, so drawing ends before the path is
    // handed back
    {
        let root = BitMapBackend::new(&path, (1024, 640)).into_drawing_area();
        root.fill(&WHITE).map_err(draw_err)?;

        let mut chart = ChartBuilder::on(&root)
            .caption(
                format!("Total COVID-19 Cases for {} County", identity.county),
                ("sans-serif", 28),
            )
            .margin(20)
            .x_label_area_size(50)
            .y_label_area_size(90)
            .build_cartesian_2d(0f64..x_max, 0f64..max_cases * 1.05)
            .map_err(draw_err)?;

        chart
            .configure_mesh()
            .x_labels(8)
            .x_label_formatter(&|x| {
                let idx = (x.round() as usize).min(dates.len() - 1);
                dates[idx].format("%Y-%m").to_string()
            })
            // plain integers on the y axis, no scientific notation
            .y_label_formatter(&|y| format!("{y:.0}"))
            .x_desc("Date")
            .y_desc("Total Number of Cases")
            .draw()
            .map_err(draw_err)?;

        chart
            .draw_series(LineSeries::new(
                observations
                    .iter()
                    .enumerate()
                    .map(|(i, obs)| (i as f64, obs.cases as f64)),
                &RED,
            ))
            .map_err(draw_err)?;

        root.present().map_err(draw_err)?;
    }

    info!(path = %path.display(), "cases chart written");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn obs(date: &str, cases: i64) -> DailyObservation {
        DailyObservation {
            date: date.parse().unwrap(),
            cases,
            deaths: 0,
            population: 1000,
        }
    }

    #[test]
    fn chart_is_written_and_its_path_returned() {
        let dir = tempfile::tempdir().unwrap();
        let identity = CountyIdentity {
            county: "Cook".into(),
            state: "Illinois".into(),
        };
        let observations = vec![
            obs("2020-03-01", 0),
            obs("2020-03-02", 5),
            obs("2020-04-01", 9),
        ];

        let path = render_cases_chart(dir.path(), &identity, &observations).unwrap();
        assert_eq!(path, dir.path().join("Cook_cases.png"));
        assert!(path.exists());
    }

    #[test]
    fn empty_observations_are_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let identity = CountyIdentity {
            county: "Cook".into(),
            state: "Illinois".into(),
        };
        assert!(matches!(
            render_cases_chart(dir.path(), &identity, &[]),
            Err(ChartError::NoData)
        ));
    }
}
