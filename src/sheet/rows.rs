//! Reading instances out of spreadsheet rows.
//!
//! Rows are the cell strings of one worksheet, top to bottom. Row and
//! column numbers in [`AllocError::MalformedRows`] are 1-based, matching
//! spreadsheet addressing.

use crate::error::{AllocError, AllocResult};
use crate::instance::{DiscreteInstance, DivisibleInstance, Valuations};
use crate::normalize::{Normalizer, NormalizerConfig};
use tracing::debug;

/// Per-agent valuation sum of the discrete layout.
pub const COURSE_VALUATION_SUM: f64 = 1000.0;

/// Raw valuations and entitlements read from a divisible-layout sheet.
#[derive(Debug, Clone, PartialEq)]
pub struct DivisibleRows {
    pub raw: Valuations,
    pub entitlements: Vec<f64>,
}

impl DivisibleRows {
    /// Normalizes the raw valuations into an instance.
    pub fn instance(&self, normalizer: &Normalizer) -> AllocResult<DivisibleInstance> {
        DivisibleInstance::new(&self.raw, self.entitlements.clone(), normalizer)
    }
}

/// Reads the divisible layout:
///
/// ```text
/// name    | entitlement | item_1 | ... | item_m |   | total
/// agent_1 | 32          | 20     | ... | 20     |   | 120
/// ...
/// total   | 64          |        |     |        |   |
/// ```
///
/// The last column and the last row hold totals and are skipped, as are
/// columns with an empty header. Empty value cells read as 0.
pub fn analyze_divisible_rows(rows: &[Vec<String>]) -> AllocResult<DivisibleRows> {
    const FIRST_ITEM_COL: usize = 2;

    if rows.len() < 3 {
        return Err(AllocError::malformed(
            rows.len() + 1,
            1,
            "expected a header row, at least one agent row and a total row",
        ));
    }
    let header = &rows[0];
    if header.len() < FIRST_ITEM_COL + 2 {
        return Err(AllocError::malformed(1, header.len() + 1, "header has no item columns"));
    }
    let item_cols: Vec<usize> = (FIRST_ITEM_COL..header.len() - 1)
        .filter(|&c| !header[c].trim().is_empty())
        .collect();
    let items: Vec<String> = item_cols.iter().map(|&c| header[c].trim().to_string()).collect();
    debug!(?items, "items");

    let agent_rows = &rows[1..rows.len() - 1];
    let mut agents = Vec::with_capacity(agent_rows.len());
    let mut entitlements = Vec::with_capacity(agent_rows.len());
    let mut values = Vec::with_capacity(agent_rows.len());
    for (i, row) in agent_rows.iter().enumerate() {
        let r = i + 2;
        agents.push(name_cell(row, r, 0)?);
        entitlements.push(number_cell(row, r, 1, false)?);
        values.push(
            item_cols
                .iter()
                .map(|&c| number_cell(row, r, c, true))
                .collect::<AllocResult<Vec<f64>>>()?,
        );
    }
    debug!(?agents, ?entitlements, "agents");

    let raw = Valuations::new(agents, items, values)?;
    Ok(DivisibleRows { raw, entitlements })
}

/// Reads the discrete (course) layout:
///
/// ```text
/// instructions ...
///         | item     | total | item_1 | ... | item_m
/// agent   | capacity | 340   | 40     | ... | 20
/// agent_1 | 6        | 1000  | 64     | ... | 132
/// ...
/// ```
///
/// Valuations are rescaled to a per-agent sum of 1000 and truncated to
/// integers. Empty value cells read as 0.
pub fn analyze_discrete_rows(rows: &[Vec<String>]) -> AllocResult<DiscreteInstance> {
    const ITEM_NAME_ROW: usize = 1;
    const FIRST_ITEM_COL: usize = 3;
    const FIRST_AGENT_ROW: usize = 3;

    if rows.len() <= FIRST_AGENT_ROW {
        return Err(AllocError::malformed(
            rows.len() + 1,
            1,
            "expected an instruction row, item names, item capacities and agent rows",
        ));
    }
    let names_row = &rows[ITEM_NAME_ROW];
    let item_cols: Vec<usize> = (FIRST_ITEM_COL..names_row.len())
        .filter(|&c| !names_row[c].trim().is_empty())
        .collect();
    if item_cols.is_empty() {
        return Err(AllocError::malformed(ITEM_NAME_ROW + 1, FIRST_ITEM_COL + 1, "no item names"));
    }
    let items: Vec<String> = item_cols.iter().map(|&c| names_row[c].trim().to_string()).collect();
    let capacity_row = &rows[ITEM_NAME_ROW + 1];
    let item_capacities = item_cols
        .iter()
        .map(|&c| capacity_cell(capacity_row, ITEM_NAME_ROW + 2, c))
        .collect::<AllocResult<Vec<u32>>>()?;
    debug!(?items, ?item_capacities, "items");

    let mut agents = Vec::new();
    let mut agent_capacities = Vec::new();
    let mut values = Vec::new();
    for (i, row) in rows[FIRST_AGENT_ROW..].iter().enumerate() {
        let r = FIRST_AGENT_ROW + i + 1;
        agents.push(name_cell(row, r, 0)?);
        agent_capacities.push(capacity_cell(row, r, 1)?);
        values.push(
            item_cols
                .iter()
                .map(|&c| number_cell(row, r, c, true))
                .collect::<AllocResult<Vec<f64>>>()?,
        );
    }
    debug!(?agents, ?agent_capacities, "agents");

    let raw = Valuations::new(agents, items, values)?;
    let normalizer = Normalizer::new(NormalizerConfig::fixed_sum(COURSE_VALUATION_SUM))?;
    DiscreteInstance::normalized(&raw, agent_capacities, item_capacities, &normalizer)
}

fn cell(row: &[String], r: usize, c: usize) -> AllocResult<&str> {
    row.get(c)
        .map(|s| s.trim())
        .ok_or_else(|| AllocError::malformed(r, c + 1, "row is too short"))
}

fn name_cell(row: &[String], r: usize, c: usize) -> AllocResult<String> {
    let s = cell(row, r, c)?;
    if s.is_empty() {
        return Err(AllocError::malformed(r, c + 1, "empty name"));
    }
    Ok(s.to_string())
}

fn number_cell(row: &[String], r: usize, c: usize, empty_is_zero: bool) -> AllocResult<f64> {
    let s = cell(row, r, c)?;
    if s.is_empty() && empty_is_zero {
        return Ok(0.0);
    }
    s.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| AllocError::malformed(r, c + 1, format!("{s:?} is not a number")))
}

fn capacity_cell(row: &[String], r: usize, c: usize) -> AllocResult<u32> {
    let s = cell(row, r, c)?;
    s.parse::<u32>().map_err(|_| {
        AllocError::malformed(r, c + 1, format!("{s:?} is not a non-negative integer"))
    })
}
