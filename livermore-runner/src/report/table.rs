//! Plain-text result table.
//!
//! Layout: a header row, a dashed rule under each column, then one row per
//! match. Columns are separated by two spaces. Numbers are right-aligned and
//! rounded to two decimals; text is centered. Widths are measured in
//! terminal columns, so a CJK name counts twice its character count.

use livermore_core::signal::SignalResult;

use crate::config::SortKey;

const COLUMN_GAP: &str = "  ";

#[derive(Clone, Copy, PartialEq, Eq)]
enum Align {
    Center,
    Right,
}

const ALIGNMENTS: [Align; 7] = [
    Align::Center,
    Align::Center,
    Align::Center,
    Align::Right,
    Align::Right,
    Align::Right,
    Align::Right,
];

/// Column titles; the high column names the lookback window.
pub fn headers(lookback_days: usize) -> [String; 7] {
    [
        "Symbol".to_string(),
        "Name".to_string(),
        "Category".to_string(),
        "Price".to_string(),
        format!("{lookback_days}D High"),
        "Streak".to_string(),
        "Stop".to_string(),
    ]
}

/// Stable sort by `key`; ties keep scan order.
pub fn sort_results(results: &mut [SignalResult], key: SortKey) {
    match key {
        SortKey::Category => results.sort_by(|a, b| a.category.cmp(&b.category)),
        SortKey::Symbol => results.sort_by(|a, b| a.symbol.cmp(&b.symbol)),
        SortKey::Streak => results.sort_by(|a, b| b.up_streak.cmp(&a.up_streak)),
        SortKey::None => {}
    }
}

fn row_cells(result: &SignalResult) -> [String; 7] {
    [
        result.symbol.clone(),
        result.name.clone(),
        result.category.clone(),
        format!("{:.2}", result.price),
        format!("{:.2}", result.prior_high),
        result.up_streak.to_string(),
        format!("{:.2}", result.stop_loss),
    ]
}

/// Render `results` in the given order.
pub fn render_table(results: &[SignalResult], lookback_days: usize) -> String {
    let header = headers(lookback_days);
    let rows: Vec<[String; 7]> = results.iter().map(row_cells).collect();

    let mut widths: [usize; 7] = [0; 7];
    for (i, width) in widths.iter_mut().enumerate() {
        *width = std::iter::once(&header[i])
            .chain(rows.iter().map(|r| &r[i]))
            .map(|cell| display_width(cell))
            .max()
            .unwrap_or(0);
    }

    let mut lines = Vec::with_capacity(rows.len() + 2);
    lines.push(format_row(&header, &widths));
    lines.push(
        widths
            .iter()
            .map(|&w| "-".repeat(w))
            .collect::<Vec<_>>()
            .join(COLUMN_GAP),
    );
    for row in &rows {
        lines.push(format_row(row, &widths));
    }
    lines.join("\n")
}

fn format_row(cells: &[String; 7], widths: &[usize; 7]) -> String {
    cells
        .iter()
        .zip(widths)
        .zip(ALIGNMENTS)
        .map(|((cell, &width), align)| pad(cell, width, align))
        .collect::<Vec<_>>()
        .join(COLUMN_GAP)
        .trim_end()
        .to_string()
}

fn pad(cell: &str, width: usize, align: Align) -> String {
    let fill = width.saturating_sub(display_width(cell));
    match align {
        Align::Right => format!("{}{cell}", " ".repeat(fill)),
        Align::Center => {
            let left = fill / 2;
            format!("{}{cell}{}", " ".repeat(left), " ".repeat(fill - left))
        }
    }
}

/// Terminal columns occupied by `s`.
pub fn display_width(s: &str) -> usize {
    s.chars().map(char_width).sum()
}

fn char_width(c: char) -> usize {
    match c as u32 {
        0x1100..=0x115F
        | 0x2E80..=0x303E
        | 0x3041..=0x33FF
        | 0x3400..=0x4DBF
        | 0x4E00..=0x9FFF
        | 0xA000..=0xA4CF
        | 0xAC00..=0xD7A3
        | 0xF900..=0xFAFF
        | 0xFE30..=0xFE4F
        | 0xFF00..=0xFF60
        | 0xFFE0..=0xFFE6
        | 0x1F300..=0x1F64F
        | 0x1F900..=0x1F9FF
        | 0x20000..=0x3FFFD => 2,
        _ => 1,
    }
}
