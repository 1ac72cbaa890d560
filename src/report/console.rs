//! Console Report Module
//! Formats the per-county summary for stdout.

use crate::resolver::CountyIdentity;
use crate::stats::CountySummary;

/// Insert thousands separators, e.g. 5150233 -> "5,150,233".
pub fn group_thousands(n: i64) -> String {
    let digits = n.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if n < 0 {
        format!("-{grouped}")
    } else {
        grouped
    }
}

/// Print population, first-reported outbreak, and the yearly/cumulative
/// statistics block for one resolved county.
pub fn print_summary(identity: &CountyIdentity, summary: &CountySummary) {
    println!(
        "Population of {}, {}: {}\n",
        identity.county,
        identity.state,
        group_thousands(summary.population)
    );

    match summary.first_reported {
        Some(date) => println!(
            "First Reported Outbreak in {}: {}\n",
            identity.county,
            date.format("%B %d, %Y")
        ),
        None => println!(
            "No outbreak observed in {} within the reporting window\n",
            identity.county
        ),
    }

    println!("{} County COVID19 Summary Statistics:", identity.county);
    for yearly in &summary.yearly {
        println!(
            " - Average number of new cases in {}: {}",
            yearly.year, yearly.average_new_cases
        );
    }
    for yearly in &summary.yearly {
        println!(
            " - Total number of new cases in {}: {}",
            yearly.year,
            group_thousands(yearly.total_new_cases)
        );
    }
    println!(
        " - Cumulative total number of cases: {} (December 31, 2022)\n\n",
        group_thousands(summary.cumulative_total)
    );
}
