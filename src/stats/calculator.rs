//! Statistics Calculator Module
//! Derives daily new-case deltas and yearly aggregates for one resolved
//! county.

use crate::resolver::CountyIdentity;
use chrono::{Datelike, NaiveDate};
use polars::prelude::*;
use rayon::prelude::*;
use thiserror::Error;

/// Calendar years covered by the report.
pub const REPORT_YEARS: [i32; 3] = [2020, 2021, 2022];

#[derive(Error, Debug)]
pub enum StatsError {
    #[error("Polars error: {0}")]
    PolarsError(#[from] PolarsError),
    #[error("Malformed date value in observation table: '{0}'")]
    BadDate(String),
    #[error("No observations for {0}, {1}")]
    NoObservations(String, String),
}

/// One merged observation row for a single county.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DailyObservation {
    pub date: NaiveDate,
    pub cases: i64,
    pub deaths: i64,
    pub population: i64,
}

/// Aggregates of daily new cases for one calendar year.
#[derive(Debug, Clone, PartialEq)]
pub struct YearlyStats {
    pub year: i32,
    /// Mean of daily new cases, rounded to 2 decimal places.
    pub average_new_cases: f64,
    /// Sum of daily new cases, rounded to the nearest integer.
    pub total_new_cases: i64,
}

/// Everything the console report needs for one county.
#[derive(Debug, Clone, PartialEq)]
pub struct CountySummary {
    pub population: i64,
    /// Earliest date with at least one reported case; `None` means no
    /// outbreak was ever observed.
    pub first_reported: Option<NaiveDate>,
    pub yearly: Vec<YearlyStats>,
    /// Cumulative case count on the last available date.
    pub cumulative_total: i64,
}

/// Extract the observation rows for one resolved county, sorted by date
/// ascending (precondition for the delta computation).
pub fn observations_for(
    df: &DataFrame,
    identity: &CountyIdentity,
) -> Result<Vec<DailyObservation>, StatsError> {
    let county_df = df
        .clone()
        .lazy()
        .filter(
            col("county")
                .eq(lit(identity.county.as_str()))
                .and(col("state").eq(lit(identity.state.as_str()))),
        )
        .select([col("date"), col("cases"), col("deaths"), col("population")])
        .collect()?;

    let date_ca = county_df.column("date")?.str()?;
    let cases_ca = county_df.column("cases")?.i64()?;
    let deaths_ca = county_df.column("deaths")?.i64()?;
    let population_ca = county_df.column("population")?.i64()?;

    let mut observations = Vec::with_capacity(county_df.height());
    for i in 0..county_df.height() {
        let Some(raw_date) = date_ca.get(i) else {
            continue;
        };
        let date = raw_date
            .parse::<NaiveDate>()
            .map_err(|_| StatsError::BadDate(raw_date.to_string()))?;
        observations.push(DailyObservation {
            date,
            cases: cases_ca.get(i).unwrap_or(0),
            deaths: deaths_ca.get(i).unwrap_or(0),
            population: population_ca.get(i).unwrap_or(0),
        });
    }

    if observations.is_empty() {
        return Err(StatsError::NoObservations(
            identity.county.clone(),
            identity.state.clone(),
        ));
    }

    observations.sort_by_key(|obs| obs.date);
    Ok(observations)
}

/// Daily new cases: first difference of the cumulative count along the
/// sorted date axis. The first row has no prior day and is defined as 0.
pub fn daily_new_cases(observations: &[DailyObservation]) -> Vec<f64> {
    observations
        .iter()
        .enumerate()
        .map(|(i, obs)| {
            if i == 0 {
                0.0
            } else {
                (obs.cases - observations[i - 1].cases) as f64
            }
        })
        .collect()
}

/// Summarize one county's observations.
///
/// Population comes from the chronologically latest row, which makes the
/// result well defined even if the source ever carried inconsistent values.
pub fn summarize(observations: &[DailyObservation]) -> CountySummary {
    let new_cases = daily_new_cases(observations);

    // The three years are independent partitions
    let yearly: Vec<YearlyStats> = REPORT_YEARS
        .par_iter()
        .map(|&year| {
            let deltas: Vec<f64> = observations
                .iter()
                .zip(new_cases.iter())
                .filter(|(obs, _)| obs.date.year() == year)
                .map(|(_, &delta)| delta)
                .collect();

            let (average, total) = if deltas.is_empty() {
                (0.0, 0)
            } else {
                let sum: f64 = deltas.iter().sum();
                let mean = sum / deltas.len() as f64;
                ((mean * 100.0).round() / 100.0, sum.round() as i64)
            };

            YearlyStats {
                year,
                average_new_cases: average,
                total_new_cases: total,
            }
        })
        .collect();

    let first_reported = observations
        .iter()
        .find(|obs| obs.cases > 0)
        .map(|obs| obs.date);

    let last = observations.last();
    CountySummary {
        population: last.map(|obs| obs.population).unwrap_or(0),
        first_reported,
        yearly,
        cumulative_total: last.map(|obs| obs.cases).unwrap_or(0),
    }
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
    fn first_delta_is_always_zero() {
        let observations = vec![obs("2020-03-01", 10), obs("2020-03-02", 14)];
        assert_eq!(daily_new_cases(&observations), vec![0.0, 4.0]);
    }

    #[test]
    fn yearly_totals_reconcile_with_cumulative_span() {
        let observations = vec![
            obs("2020-06-01", 0),
            obs("2020-06-02", 12),
            obs("2021-02-01", 40),
            obs("2021-02-02", 55),
            obs("2022-12-30", 90),
            obs("2022-12-31", 97),
        ];
        let summary = summarize(&observations);

        let total: i64 = summary.yearly.iter().map(|y| y.total_new_cases).sum();
        let first = observations.first().unwrap().cases;
        let last = observations.last().unwrap().cases;
        assert_eq!(total, last - first);
        assert_eq!(summary.cumulative_total, 97);
    }

    #[test]
    fn yearly_average_is_rounded_to_two_decimals() {
        let observations = vec![
            obs("2020-01-01", 0),
            obs("2020-01-02", 1),
            obs("2020-01-03", 2),
        ];
        let summary = summarize(&observations);
        let y2020 = summary.yearly.iter().find(|y| y.year == 2020).unwrap();
        // deltas 0, 1, 1 -> mean 0.666... -> 0.67
        assert_eq!(y2020.average_new_cases, 0.67);
        assert_eq!(y2020.total_new_cases, 2);
    }

    #[test]
    fn first_reported_outbreak_is_earliest_nonzero_date() {
        let observations = vec![
            obs("2020-01-22", 0),
            obs("2020-01-23", 0),
            obs("2020-01-24", 3),
            obs("2020-01-25", 9),
        ];
        let summary = summarize(&observations);
        assert_eq!(
            summary.first_reported,
            Some("2020-01-24".parse().unwrap())
        );
    }

    #[test]
    fn county_without_cases_has_no_outbreak_date() {
        let observations = vec![obs("2020-01-22", 0), obs("2020-01-23", 0)];
        let summary = summarize(&observations);
        assert_eq!(summary.first_reported, None);
    }

    #[test]
    fn observations_are_sorted_and_filtered_by_identity() {
        let df = DataFrame::new(vec![
            Column::new("county".into(), vec!["Cook", "Cook", "Lake"]),
            Column::new("state".into(), vec!["Illinois", "Illinois", "Indiana"]),
            Column::new(
                "date".into(),
                vec!["2020-01-23", "2020-01-22", "2020-01-22"],
            ),
            Column::new("cases".into(), vec![5i64, 2, 7]),
            Column::new("deaths".into(), vec![0i64, 0, 1]),
            Column::new("population".into(), vec![5_150_233i64, 5_150_233, 485_493]),
        ])
        .unwrap();

        let identity = CountyIdentity {
            county: "Cook".into(),
            state: "Illinois".into(),
        };
        let observations = observations_for(&df, &identity).unwrap();
        assert_eq!(observations.len(), 2);
        assert!(observations[0].date < observations[1].date);
        assert_eq!(observations[0].cases, 2);
    }
}
