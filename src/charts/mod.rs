//! Charts module - time-series chart rendering

mod plotter;

pub use plotter::render_cases_chart;
