//! Spreadsheet-shaped input and output.
//!
//! Pure conversions between cell grids and allocation types; no worksheet
//! is opened or written here.
//!
//! - [`analyze_divisible_rows`]: entitlement sheet to raw valuations
//! - [`analyze_discrete_rows`]: course sheet to a normalized
//!   [`DiscreteInstance`](crate::instance::DiscreteInstance)
//! - [`fractional_report`] / [`discrete_report`]: allocations to cells with
//!   summary formulas

mod report;
mod rows;

pub use report::{discrete_report, fractional_report, rowcol_to_a1, Cell, CellValue};
pub use rows::{analyze_discrete_rows, analyze_divisible_rows, DivisibleRows, COURSE_VALUATION_SUM};
