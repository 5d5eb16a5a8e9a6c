//! Plain-text tables for terminal previews.

use std::fmt::Write as _;

/// Cells wider than this are cut and marked with `…` so long addresses do
/// not push the rest of a preview off screen.
pub const MAX_CELL_WIDTH: usize = 28;

pub fn render_table(headers: &[String], rows: &[Vec<String>]) -> String {
    let header_cells = headers.iter().map(|h| fit_cell(h)).collect::<Vec<_>>();
    let body = rows
        .iter()
        .map(|row| {
            (0..headers.len())
                .map(|idx| fit_cell(row.get(idx).map(String::as_str).unwrap_or("")))
                .collect::<Vec<_>>()
        })
        .collect::<Vec<_>>();

    let mut widths = header_cells
        .iter()
        .map(|cell| cell.chars().count().max(1))
        .collect::<Vec<_>>();
    for row in &body {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut output = String::new();
    let _ = writeln!(output, "{}", join_padded(&header_cells, &widths));
    let rule = widths.iter().map(|w| "-".repeat(*w)).collect::<Vec<_>>();
    let _ = writeln!(output, "{}", join_padded(&rule, &widths));
    for row in &body {
        let _ = writeln!(output, "{}", join_padded(row, &widths));
    }
    output
}

fn join_padded(cells: &[String], widths: &[usize]) -> String {
    let line = cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| {
            let pad = width.saturating_sub(cell.chars().count());
            format!("{cell}{}", " ".repeat(pad))
        })
        .collect::<Vec<_>>()
        .join(" | ");
    line.trim_end().to_string()
}

fn fit_cell(value: &str) -> String {
    let flat = value
        .chars()
        .map(|ch| if ch.is_control() { ' ' } else { ch })
        .collect::<String>();
    if flat.chars().count() <= MAX_CELL_WIDTH {
        return flat;
    }
    let mut cut = flat.chars().take(MAX_CELL_WIDTH - 1).collect::<String>();
    cut.push('…');
    cut
}
