//! Rendering allocations as spreadsheet cells.
//!
//! Reports are plain cell lists; writing them anywhere is the caller's job.
//! Formulas reference the input worksheet as `input` and the report itself
//! as `output`.

use crate::instance::DiscreteInstance;
use crate::language::Language;
use crate::matching::DiscreteAllocation;
use crate::sharing::FractionalAllocation;
use std::collections::BTreeMap;

/// Content of one cell.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CellValue {
    Text(String),
    Number(f64),
    /// A formula, including the leading `=`.
    Formula(String),
}

/// A cell at a 1-based (row, column) position.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Cell {
    pub row: usize,
    pub col: usize,
    pub value: CellValue,
}

impl Cell {
    fn text(row: usize, col: usize, s: impl Into<String>) -> Self {
        Self {
            row,
            col,
            value: CellValue::Text(s.into()),
        }
    }

    fn number(row: usize, col: usize, v: f64) -> Self {
        Self {
            row,
            col,
            value: CellValue::Number(v),
        }
    }

    fn formula(row: usize, col: usize, f: impl Into<String>) -> Self {
        Self {
            row,
            col,
            value: CellValue::Formula(f.into()),
        }
    }

    /// A1-style address of the cell.
    pub fn a1(&self) -> String {
        rowcol_to_a1(self.row, self.col)
    }
}

/// Converts a 1-based (row, column) pair into an A1 address.
///
/// # Examples
///
/// ```
/// use u_fairalloc::sheet::rowcol_to_a1;
///
/// assert_eq!(rowcol_to_a1(1, 1), "A1");
/// assert_eq!(rowcol_to_a1(7, 28), "AB7");
/// ```
pub fn rowcol_to_a1(row: usize, col: usize) -> String {
    let mut letters = Vec::new();
    let mut c = col.max(1);
    while c > 0 {
        let rem = (c - 1) % 26;
        letters.push(b'A' + rem as u8);
        c = (c - 1) / 26;
    }
    letters.reverse();
    let mut out = String::from_utf8_lossy(&letters).into_owned();
    out.push_str(&row.max(1).to_string());
    out
}

#[derive(Debug, Clone, Copy)]
enum Text {
    ValuePercent,
    DueValuePercent,
    ValueRatio,
    Intro,
    AgentName,
    ItemName,
    Capacity,
    Explanation,
}

fn text(t: Text, language: Language) -> &'static str {
    use Language::{English, Hebrew};
    match (t, language) {
        (Text::ValuePercent, Hebrew) => "ערך באחוזים",
        (Text::ValuePercent, English) => "Value in percent",
        (Text::DueValuePercent, Hebrew) => "ערך מגיע באחוזים",
        (Text::DueValuePercent, English) => "Due value in percent",
        (Text::ValueRatio, Hebrew) => "יחס ערכים",
        (Text::ValueRatio, English) => "Value ratio",
        (Text::Intro, Hebrew) => "גליון זה הוא הפלט של אלגוריתם החלוקה.",
        (Text::Intro, English) => "This is the output of the fair allocation algorithm.",
        (Text::AgentName, Hebrew) => "סטודנט v",
        (Text::AgentName, English) => "student v",
        (Text::ItemName, Hebrew) => "קורס >",
        (Text::ItemName, English) => "course >",
        (Text::Capacity, Hebrew) => "מספר מקומות",
        (Text::Capacity, English) => "capacity",
        (Text::Explanation, Hebrew) => "הסבר",
        (Text::Explanation, English) => "explanation",
    }
}

/// Renders a divisible allocation next to a copy of its input sheet.
///
/// Layout: the name and entitlement columns are linked to the input sheet,
/// item names head columns 3.., fractions fill one row per agent, a total
/// row sums every item, and three trailing columns compute each agent's
/// value share, due share (entitlement share) and their ratio.
pub fn fractional_report(
    input_rows: &[Vec<String>],
    allocation: &FractionalAllocation,
    language: Language,
) -> Vec<Cell> {
    const NAME_COL: usize = 1;
    const ENTITLEMENT_COL: usize = 2;
    const FIRST_ITEM_COL: usize = 3;

    let n = allocation.agents().len();
    let m = allocation.items().len();
    let last_item_col = FIRST_ITEM_COL + m - 1;
    let mut cells = Vec::with_capacity(2 * input_rows.len() + (n + 2) * (m + 3));

    for r in 1..=input_rows.len() {
        cells.push(Cell::formula(r, NAME_COL, format!("=input!{}", rowcol_to_a1(r, NAME_COL))));
        cells.push(Cell::formula(
            r,
            ENTITLEMENT_COL,
            format!("=input!{}", rowcol_to_a1(r, ENTITLEMENT_COL)),
        ));
    }
    for (o, item) in allocation.items().iter().enumerate() {
        cells.push(Cell::text(1, FIRST_ITEM_COL + o, item.clone()));
    }
    for (i, row) in allocation.fractions().iter().enumerate() {
        for (o, &x) in row.iter().enumerate() {
            cells.push(Cell::number(i + 2, FIRST_ITEM_COL + o, x));
        }
    }

    let total_row = n + 2;
    for o in 0..m {
        let col = FIRST_ITEM_COL + o;
        cells.push(Cell::formula(
            total_row,
            col,
            format!("=SUM({}:{})", rowcol_to_a1(2, col), rowcol_to_a1(n + 1, col)),
        ));
    }

    let utility_col = m + 4;
    cells.push(Cell::text(1, utility_col, text(Text::ValuePercent, language)));
    cells.push(Cell::text(1, utility_col + 1, text(Text::DueValuePercent, language)));
    cells.push(Cell::text(1, utility_col + 2, text(Text::ValueRatio, language)));

    let entitlements = format!(
        "{}:{}",
        rowcol_to_a1(2, ENTITLEMENT_COL),
        rowcol_to_a1(n + 1, ENTITLEMENT_COL)
    );
    for i in 0..n {
        let r = i + 2;
        let range = format!(
            "{}:{}",
            rowcol_to_a1(r, FIRST_ITEM_COL),
            rowcol_to_a1(r, last_item_col)
        );
        cells.push(Cell::formula(
            r,
            utility_col,
            format!("=SUMPRODUCT(input!{range},output!{range})/SUM(input!{range})"),
        ));
        cells.push(Cell::formula(
            r,
            utility_col + 1,
            format!("={}/SUM({entitlements})", rowcol_to_a1(r, ENTITLEMENT_COL)),
        ));
        cells.push(Cell::formula(
            r,
            utility_col + 2,
            format!("={}/{}", rowcol_to_a1(r, utility_col), rowcol_to_a1(r, utility_col + 1)),
        ));
    }
    cells
}

/// Renders a discrete allocation.
///
/// Layout: an intro line, headers, then one row per agent (from row 4)
/// with its name, capacity, bundle and a 0/1 column per item. When
/// `explanations` is given, each agent's text goes in a final column.
pub fn discrete_report(
    instance: &DiscreteInstance,
    allocation: &DiscreteAllocation,
    explanations: Option<&BTreeMap<String, String>>,
    language: Language,
) -> Vec<Cell> {
    const NAME_COL: usize = 1;
    const CAPACITY_COL: usize = 2;
    const BUNDLE_COL: usize = 3;
    const FIRST_ITEM_COL: usize = 4;
    const INTRO_ROW: usize = 1;
    const ITEM_NAME_ROW: usize = 2;
    const FIRST_AGENT_ROW: usize = 4;

    let m = instance.num_items();
    let explanation_col = FIRST_ITEM_COL + m;
    let mut cells = vec![
        Cell::text(INTRO_ROW, 1, text(Text::Intro, language)),
        Cell::text(ITEM_NAME_ROW, CAPACITY_COL, text(Text::ItemName, language)),
        Cell::text(INTRO_ROW + 2, NAME_COL, text(Text::AgentName, language)),
        Cell::text(INTRO_ROW + 2, CAPACITY_COL, text(Text::Capacity, language)),
    ];
    for (o, item) in instance.items().iter().enumerate() {
        cells.push(Cell::text(ITEM_NAME_ROW, FIRST_ITEM_COL + o, item.clone()));
    }
    if explanations.is_some() {
        cells.push(Cell::text(ITEM_NAME_ROW, explanation_col, text(Text::Explanation, language)));
    }

    for (a, agent) in instance.agents().iter().enumerate() {
        let r = FIRST_AGENT_ROW + a;
        cells.push(Cell::text(r, NAME_COL, agent.clone()));
        cells.push(Cell::number(r, CAPACITY_COL, f64::from(instance.agent_capacity(a))));
        cells.push(Cell::text(r, BUNDLE_COL, allocation.bundle_names(a).join(", ")));
        for o in 0..m {
            let held = if allocation.holds(a, o) { 1.0 } else { 0.0 };
            cells.push(Cell::number(r, FIRST_ITEM_COL + o, held));
        }
        if let Some(text) = explanations.and_then(|e| e.get(agent)) {
            cells.push(Cell::text(r, explanation_col, text.clone()));
        }
    }
    cells
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instance::Valuations;

    fn ids(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn at(cells: &[Cell], row: usize, col: usize) -> &CellValue {
        &cells
            .iter()
            .rev()
            .find(|c| c.row == row && c.col == col)
            .unwrap_or_else(|| panic!("no cell at {}", rowcol_to_a1(row, col)))
            .value
    }

    #[test]
    fn test_a1() {
        assert_eq!(rowcol_to_a1(1, 1), "A1");
        assert_eq!(rowcol_to_a1(2, 26), "Z2");
        assert_eq!(rowcol_to_a1(2, 27), "AA2");
        assert_eq!(rowcol_to_a1(10, 52), "AZ10");
        assert_eq!(rowcol_to_a1(1, 703), "AAA1");
    }

    #[test]
    fn test_fractional_report() {
        let alloc = FractionalAllocation::new(
            ids(&["a", "b"]),
            ids(&["x", "y"]),
            vec![vec![1.0, 0.25], vec![0.0, 0.75]],
        );
        let input = vec![vec![String::new(); 5]; 4];
        let cells = fractional_report(&input, &alloc, Language::English);

        assert_eq!(at(&cells, 1, 1), &CellValue::Formula("=input!A1".into()));
        assert_eq!(at(&cells, 3, 2), &CellValue::Formula("=input!B3".into()));
        assert_eq!(at(&cells, 1, 3), &CellValue::Text("x".into()));
        assert_eq!(at(&cells, 3, 4), &CellValue::Number(0.75));
        assert_eq!(at(&cells, 4, 4), &CellValue::Formula("=SUM(D2:D3)".into()));
        assert_eq!(at(&cells, 1, 6), &CellValue::Text("Value in percent".into()));
        assert_eq!(
            at(&cells, 2, 6),
            &CellValue::Formula("=SUMPRODUCT(input!C2:D2,output!C2:D2)/SUM(input!C2:D2)".into())
        );
        assert_eq!(at(&cells, 3, 7), &CellValue::Formula("=B3/SUM(B2:B3)".into()));
        assert_eq!(at(&cells, 2, 8), &CellValue::Formula("=F2/G2".into()));
    }

    #[test]
    fn test_fractional_report_hebrew_headers() {
        let alloc = FractionalAllocation::new(ids(&["a"]), ids(&["x"]), vec![vec![1.0]]);
        let cells = fractional_report(&[], &alloc, Language::Hebrew);
        assert_eq!(at(&cells, 1, 7), &CellValue::Text("יחס ערכים".into()));
    }

    #[test]
    fn test_discrete_report() {
        let v = Valuations::new(
            ids(&["s1", "s2"]),
            ids(&["c1", "c2"]),
            vec![vec![3.0, 1.0], vec![1.0, 3.0]],
        )
        .unwrap();
        let inst = DiscreteInstance::new(v, vec![2, 1], vec![2, 2]).unwrap();
        let mut alloc = DiscreteAllocation::empty(inst.agents(), inst.items());
        alloc.give(0, 0);
        alloc.give(0, 1);
        alloc.give(1, 1);
        let explanations = BTreeMap::from([("s2".to_string(), "why".to_string())]);
        let cells = discrete_report(&inst, &alloc, Some(&explanations), Language::English);

        let intro = "This is the output of the fair allocation algorithm.";
        assert_eq!(at(&cells, 1, 1), &CellValue::Text(intro.into()));
        assert_eq!(at(&cells, 2, 4), &CellValue::Text("c1".into()));
        assert_eq!(at(&cells, 4, 1), &CellValue::Text("s1".into()));
        assert_eq!(at(&cells, 4, 2), &CellValue::Number(2.0));
        assert_eq!(at(&cells, 4, 3), &CellValue::Text("c1, c2".into()));
        assert_eq!(at(&cells, 5, 4), &CellValue::Number(0.0));
        assert_eq!(at(&cells, 5, 5), &CellValue::Number(1.0));
        assert_eq!(at(&cells, 5, 6), &CellValue::Text("why".into()));
        assert!(!cells.iter().any(|c| c.row == 4 && c.col == 6));
    }
}
