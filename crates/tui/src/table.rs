//! Pure view-model for the transaction table.
//!
//! Everything here is a function from (dataset, view state) to a row model;
//! the ratatui adapter in `views/transactions.rs` only translates the row
//! model into widgets. Filtering never mutates the original dataset, and the
//! column set is derived once from the first record when the table is built.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use ledgerchat_api::Transaction;
use std::cmp::Ordering;

// ─── Columns ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    Date,
    Description,
    Debit,
    Credit,
    Balance,
}

/// The fixed allowed column set, in display order.
pub const DEFAULT_COLUMNS: [Column; 5] = [
    Column::Date,
    Column::Description,
    Column::Debit,
    Column::Credit,
    Column::Balance,
];

impl Column {
    pub fn title(self) -> &'static str {
        match self {
            Self::Date => "Date",
            Self::Description => "Description",
            Self::Debit => "Debit",
            Self::Credit => "Credit",
            Self::Balance => "Balance",
        }
    }

    pub fn is_amount(self) -> bool {
        matches!(self, Self::Debit | Self::Credit | Self::Balance)
    }
}

/// Columns for a dataset: the allowed columns present on the first record,
/// or the full default set when the dataset is empty. Derived once per
/// dataset so a filtered re-render keeps the original header.
fn columns_for(first: Option<&Transaction>) -> Vec<Column> {
    let Some(first) = first else {
        return DEFAULT_COLUMNS.to_vec();
    };
    DEFAULT_COLUMNS
        .iter()
        .copied()
        .filter(|column| match column {
            Column::Date | Column::Description => true,
            Column::Debit => first.debit.is_some(),
            Column::Credit => first.credit.is_some(),
            Column::Balance => first.balance.is_some(),
        })
        .collect()
}

// ─── Sort keys ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    #[default]
    DateDesc,
    DateAsc,
    AmountDesc,
    AmountAsc,
}

impl SortKey {
    pub const ORDER: [Self; 4] = [
        Self::DateDesc,
        Self::DateAsc,
        Self::AmountDesc,
        Self::AmountAsc,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::DateDesc => "Date (Newest First)",
            Self::DateAsc => "Date (Oldest First)",
            Self::AmountDesc => "Amount (Highest First)",
            Self::AmountAsc => "Amount (Lowest First)",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::DateDesc => "date-desc",
            Self::DateAsc => "date-asc",
            Self::AmountDesc => "amount-desc",
            Self::AmountAsc => "amount-asc",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ORDER.iter().copied().find(|key| key.as_str() == s)
    }

    pub fn next(self) -> Self {
        let idx = Self::ORDER
            .iter()
            .position(|key| *key == self)
            .unwrap_or(0);
        Self::ORDER[(idx + 1) % Self::ORDER.len()]
    }
}

// ─── Row model ───────────────────────────────────────────────────────────────

/// Visual emphasis for an amount cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Neutral,
    /// A positive credit.
    Positive,
    /// A positive debit (money out).
    Negative,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    pub text: String,
    pub tone: Tone,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub cells: Vec<Cell>,
}

// ─── View state ──────────────────────────────────────────────────────────────

/// The transaction table's state: the immutable dataset, the derived column
/// set, and the three pieces of view state (visibility, search, sort).
#[derive(Debug, Clone)]
pub struct TableView {
    transactions: Vec<Transaction>,
    columns: Vec<Column>,
    visible: bool,
    search: String,
    sort: SortKey,
}

impl TableView {
    /// Build a table over `transactions`. Starts hidden, unfiltered, sorted
    /// newest-first — the state every freshly selected session gets.
    pub fn new(transactions: Vec<Transaction>) -> Self {
        let columns = columns_for(transactions.first());
        Self {
            transactions,
            columns,
            visible: false,
            search: String::new(),
            sort: SortKey::default(),
        }
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn total(&self) -> usize {
        self.transactions.len()
    }

    // ── Visibility ───────────────────────────────────────────────────────

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    pub fn toggle(&mut self) {
        self.visible = !self.visible;
    }

    pub fn toggle_label(&self) -> &'static str {
        if self.visible {
            "Hide Transactions"
        } else {
            "Show Transactions"
        }
    }

    // ── Search ───────────────────────────────────────────────────────────

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn set_search(&mut self, term: impl Into<String>) {
        self.search = term.into();
    }

    pub fn push_search_char(&mut self, c: char) {
        self.search.push(c);
    }

    pub fn pop_search_char(&mut self) {
        self.search.pop();
    }

    pub fn clear_search(&mut self) {
        self.search.clear();
    }

    // ── Sort ─────────────────────────────────────────────────────────────

    pub fn sort(&self) -> SortKey {
        self.sort
    }

    pub fn set_sort(&mut self, sort: SortKey) {
        self.sort = sort;
    }

    pub fn cycle_sort(&mut self) {
        self.sort = self.sort.next();
    }

    // ── Row model ────────────────────────────────────────────────────────

    /// Indices into the original dataset that survive the current filter,
    /// in sorted order. The sort is stable, so ties keep dataset order.
    fn visible_indices(&self) -> Vec<usize> {
        let term = self.search.to_lowercase();
        let mut indices: Vec<usize> = self
            .transactions
            .iter()
            .enumerate()
            .filter(|(_, t)| term.is_empty() || t.description.to_lowercase().contains(&term))
            .map(|(i, _)| i)
            .collect();
        indices.sort_by(|&a, &b| compare(&self.transactions[a], &self.transactions[b], self.sort));
        indices
    }

    pub fn shown(&self) -> usize {
        self.visible_indices().len()
    }

    /// Recompute the displayed rows from the original dataset.
    pub fn rows(&self) -> Vec<Row> {
        self.visible_indices()
            .into_iter()
            .map(|i| {
                let t = &self.transactions[i];
                Row {
                    cells: self.columns.iter().map(|&c| cell(t, c)).collect(),
                }
            })
            .collect()
    }

    /// The count line shown under the table.
    pub fn info_line(&self) -> String {
        format!(
            "Showing {} of {} transactions",
            self.shown(),
            self.transactions.len()
        )
    }
}

// ─── Comparators ─────────────────────────────────────────────────────────────

fn compare(a: &Transaction, b: &Transaction, sort: SortKey) -> Ordering {
    match sort {
        SortKey::DateDesc => cmp_dates(parse_date(&a.date), parse_date(&b.date), false),
        SortKey::DateAsc => cmp_dates(parse_date(&a.date), parse_date(&b.date), true),
        SortKey::AmountDesc => cmp_amounts(amount(b), amount(a)),
        SortKey::AmountAsc => cmp_amounts(amount(a), amount(b)),
    }
}

/// Unparsable dates sort last under both directions; among two unparsable
/// dates the (stable) sort keeps dataset order.
fn cmp_dates(a: Option<i64>, b: Option<i64>, ascending: bool) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => {
            if ascending {
                a.cmp(&b)
            } else {
                b.cmp(&a)
            }
        }
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn cmp_amounts(a: f64, b: f64) -> Ordering {
    a.partial_cmp(&b).unwrap_or(Ordering::Equal)
}

/// The magnitude used for amount sorting: `|debit| + credit`, missing
/// values as zero.
fn amount(t: &Transaction) -> f64 {
    t.debit.map(f64::abs).unwrap_or(0.0) + t.credit.unwrap_or(0.0)
}

/// Parse a transaction date into a sortable epoch value. Accepts RFC 3339,
/// bare ISO date-times, and plain `YYYY-MM-DD` / `YYYY/MM/DD` dates.
fn parse_date(s: &str) -> Option<i64> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.timestamp());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(dt.and_utc().timestamp());
    }
    for format in ["%Y-%m-%d", "%Y/%m/%d"] {
        if let Ok(d) = NaiveDate::parse_from_str(s, format) {
            return Some(d.and_hms_opt(0, 0, 0)?.and_utc().timestamp());
        }
    }
    None
}

// ─── Cell formatting ─────────────────────────────────────────────────────────

fn cell(t: &Transaction, column: Column) -> Cell {
    match column {
        Column::Date => Cell {
            text: format_date(&t.date),
            tone: Tone::Neutral,
        },
        Column::Description => Cell {
            text: t.description.clone(),
            tone: Tone::Neutral,
        },
        Column::Debit => Cell {
            text: format_currency(t.debit),
            tone: if t.debit.is_some_and(|v| v > 0.0) {
                Tone::Negative
            } else {
                Tone::Neutral
            },
        },
        Column::Credit => Cell {
            text: format_currency(t.credit),
            tone: if t.credit.is_some_and(|v| v > 0.0) {
                Tone::Positive
            } else {
                Tone::Neutral
            },
        },
        Column::Balance => Cell {
            text: format_currency(t.balance),
            tone: Tone::Neutral,
        },
    }
}

/// Two-decimal en-US currency. Missing values render as an empty string,
/// never `$0.00` or `$NaN`.
pub fn format_currency(value: Option<f64>) -> String {
    let Some(v) = value else {
        return String::new();
    };
    if !v.is_finite() {
        return String::new();
    }
    let negative = v < 0.0;
    let cents = (v.abs() * 100.0).round() as u64;
    let dollars = cents / 100;
    let fraction = cents % 100;

    let digits = dollars.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    let dollars: String = grouped.chars().rev().collect();

    let sign = if negative { "-" } else { "" };
    format!("{sign}${dollars}.{fraction:02}")
}

/// ISO date-times render as `MM/DD/YYYY`; anything else passes through.
pub fn format_date(raw: &str) -> String {
    if !raw.contains('T') {
        return raw.to_string();
    }
    let date = DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.date_naive())
        .or_else(|_| {
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f").map(|dt| dt.date())
        });
    match date {
        Ok(d) => d.format("%m/%d/%Y").to_string(),
        Err(_) => raw.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tx(date: &str, description: &str, debit: f64, credit: f64, balance: f64) -> Transaction {
        Transaction {
            date: date.to_string(),
            description: description.to_string(),
            debit: Some(debit),
            credit: Some(credit),
            balance: Some(balance),
        }
    }

    fn descriptions(view: &TableView) -> Vec<String> {
        let col = view
            .columns()
            .iter()
            .position(|c| *c == Column::Description)
            .unwrap();
        view.rows()
            .into_iter()
            .map(|r| r.cells[col].text.clone())
            .collect()
    }

    // ── Columns ──────────────────────────────────────────────────────────

    #[test]
    fn empty_dataset_uses_the_full_default_column_set() {
        let view = TableView::new(vec![]);
        assert_eq!(view.columns().to_vec(), DEFAULT_COLUMNS.to_vec());
        assert!(view.rows().is_empty());
    }

    #[test]
    fn columns_come_from_the_first_record() {
        let first = Transaction {
            date: "2024-01-01".to_string(),
            description: "A".to_string(),
            debit: Some(1.0),
            credit: None,
            balance: None,
        };
        let view = TableView::new(vec![first]);
        assert_eq!(
            view.columns().to_vec(),
            vec![Column::Date, Column::Description, Column::Debit]
        );
    }

    #[test]
    fn filtered_rerender_keeps_the_original_header() {
        let mut view = TableView::new(vec![tx("2024-01-01", "GROCERY", 20.0, 0.0, 100.0)]);
        let before = view.columns().to_vec();
        view.set_search("zzz");
        assert!(view.rows().is_empty());
        assert_eq!(view.columns(), &before[..]);
    }

    // ── Filtering ────────────────────────────────────────────────────────

    #[test]
    fn filter_matches_descriptions_case_insensitively() {
        let mut view = TableView::new(vec![
            tx("2024-01-01", "Grocery Store", 20.0, 0.0, 100.0),
            tx("2024-01-02", "PAYROLL", 0.0, 500.0, 600.0),
        ]);
        view.set_search("grocery");
        assert_eq!(descriptions(&view), vec!["Grocery Store"]);
        view.set_search("PAY");
        assert_eq!(descriptions(&view), vec!["PAYROLL"]);
    }

    #[test]
    fn no_match_yields_zero_rows_and_the_info_line() {
        let mut view = TableView::new(vec![
            tx("2024-01-01", "COFFEE", 4.0, 0.0, 96.0),
            tx("2024-01-02", "RENT", 900.0, 0.0, -804.0),
            tx("2024-01-03", "PAYROLL", 0.0, 2000.0, 1196.0),
        ]);
        view.set_search("zzzzz");
        assert!(view.rows().is_empty());
        assert_eq!(view.info_line(), "Showing 0 of 3 transactions");
    }

    #[test]
    fn filtering_is_not_destructive() {
        let mut view = TableView::new(vec![
            tx("2024-01-01", "COFFEE", 4.0, 0.0, 96.0),
            tx("2024-01-02", "RENT", 900.0, 0.0, -804.0),
        ]);
        view.set_search("coffee");
        assert_eq!(view.shown(), 1);
        view.clear_search();
        assert_eq!(view.shown(), 2);
        assert_eq!(view.total(), 2);
    }

    // ── Sorting ──────────────────────────────────────────────────────────

    #[test]
    fn amount_desc_orders_by_abs_debit_plus_credit() {
        let mut view = TableView::new(vec![
            tx("2024-01-01", "a", 5.0, 0.0, 0.0),
            tx("2024-01-02", "b", 0.0, 10.0, 0.0),
            tx("2024-01-03", "c", 2.0, 2.0, 0.0),
        ]);
        view.set_sort(SortKey::AmountDesc);
        assert_eq!(descriptions(&view), vec!["b", "a", "c"]);
        view.set_sort(SortKey::AmountAsc);
        assert_eq!(descriptions(&view), vec!["c", "a", "b"]);
    }

    #[test]
    fn amount_ties_keep_dataset_order() {
        let mut view = TableView::new(vec![
            tx("2024-01-01", "first", 5.0, 0.0, 0.0),
            tx("2024-01-02", "second", 0.0, 5.0, 0.0),
            tx("2024-01-03", "third", 5.0, 0.0, 0.0),
        ]);
        view.set_sort(SortKey::AmountDesc);
        assert_eq!(descriptions(&view), vec!["first", "second", "third"]);
    }

    #[test]
    fn date_sorting_works_both_directions() {
        let mut view = TableView::new(vec![
            tx("2024-03-01", "march", 0.0, 0.0, 0.0),
            tx("2024-01-01", "january", 0.0, 0.0, 0.0),
            tx("2024-02-01", "february", 0.0, 0.0, 0.0),
        ]);
        view.set_sort(SortKey::DateDesc);
        assert_eq!(descriptions(&view), vec!["march", "february", "january"]);
        view.set_sort(SortKey::DateAsc);
        assert_eq!(descriptions(&view), vec!["january", "february", "march"]);
    }

    #[test]
    fn unparsable_dates_sort_last_in_both_directions() {
        let mut view = TableView::new(vec![
            tx("not a date", "bad", 0.0, 0.0, 0.0),
            tx("2024-01-02", "good-late", 0.0, 0.0, 0.0),
            tx("2024-01-01", "good-early", 0.0, 0.0, 0.0),
        ]);
        view.set_sort(SortKey::DateDesc);
        assert_eq!(descriptions(&view), vec!["good-late", "good-early", "bad"]);
        view.set_sort(SortKey::DateAsc);
        assert_eq!(descriptions(&view), vec!["good-early", "good-late", "bad"]);
    }

    #[test]
    fn missing_amounts_sort_as_zero() {
        let mut no_amounts = tx("2024-01-01", "empty", 0.0, 0.0, 0.0);
        no_amounts.debit = None;
        no_amounts.credit = None;
        let mut view = TableView::new(vec![
            tx("2024-01-02", "big", 100.0, 0.0, 0.0),
            no_amounts,
        ]);
        view.set_sort(SortKey::AmountAsc);
        assert_eq!(descriptions(&view), vec!["empty", "big"]);
    }

    // ── Sort key plumbing ────────────────────────────────────────────────

    #[test]
    fn sort_keys_round_trip_their_wire_spelling() {
        for key in SortKey::ORDER {
            assert_eq!(SortKey::parse(key.as_str()), Some(key));
        }
        assert_eq!(SortKey::parse("alphabetical"), None);
    }

    #[test]
    fn cycle_sort_visits_every_key_and_wraps() {
        let mut view = TableView::new(vec![]);
        let start = view.sort();
        let mut seen = vec![start];
        for _ in 0..3 {
            view.cycle_sort();
            seen.push(view.sort());
        }
        view.cycle_sort();
        assert_eq!(view.sort(), start);
        seen.sort_by_key(|k| k.as_str());
        seen.dedup();
        assert_eq!(seen.len(), 4);
    }

    // ── Visibility ───────────────────────────────────────────────────────

    #[test]
    fn double_toggle_restores_visibility_and_label() {
        let mut view = TableView::new(vec![]);
        let visible = view.is_visible();
        let label = view.toggle_label();
        view.toggle();
        assert_ne!(view.is_visible(), visible);
        assert_ne!(view.toggle_label(), label);
        view.toggle();
        assert_eq!(view.is_visible(), visible);
        assert_eq!(view.toggle_label(), label);
    }

    #[test]
    fn fresh_table_starts_hidden() {
        let view = TableView::new(vec![tx("2024-01-01", "x", 1.0, 0.0, 0.0)]);
        assert!(!view.is_visible());
        assert_eq!(view.toggle_label(), "Show Transactions");
    }

    // ── Formatting ───────────────────────────────────────────────────────

    #[test]
    fn currency_formats_two_decimals_with_grouping() {
        assert_eq!(format_currency(Some(0.0)), "$0.00");
        assert_eq!(format_currency(Some(4.5)), "$4.50");
        assert_eq!(format_currency(Some(1234.56)), "$1,234.56");
        assert_eq!(format_currency(Some(1234567.891)), "$1,234,567.89");
        assert_eq!(format_currency(Some(-12.0)), "-$12.00");
    }

    #[test]
    fn missing_amounts_render_empty_never_nan_or_zero() {
        assert_eq!(format_currency(None), "");
        assert_eq!(format_currency(Some(f64::NAN)), "");
        let mut t = tx("2024-01-01", "x", 0.0, 0.0, 0.0);
        t.balance = None;
        let c = cell(&t, Column::Balance);
        assert_eq!(c.text, "");
    }

    #[test]
    fn amount_cells_carry_their_tone() {
        let t = tx("2024-01-01", "x", 25.0, 10.0, 0.0);
        assert_eq!(cell(&t, Column::Debit).tone, Tone::Negative);
        assert_eq!(cell(&t, Column::Credit).tone, Tone::Positive);
        assert_eq!(cell(&t, Column::Balance).tone, Tone::Neutral);

        let zero = tx("2024-01-01", "x", 0.0, 0.0, 0.0);
        assert_eq!(cell(&zero, Column::Debit).tone, Tone::Neutral);
        assert_eq!(cell(&zero, Column::Credit).tone, Tone::Neutral);
    }

    #[test]
    fn iso_datetimes_render_as_short_dates() {
        assert_eq!(format_date("2024-01-15T10:30:00"), "01/15/2024");
        assert_eq!(format_date("2024-01-15"), "2024-01-15");
        assert_eq!(format_date("JAN 15"), "JAN 15");
    }
}
