//! Plain-text table rendering for console reports.

use std::fmt::Write as _;

/// Renders `rows` under `headers`, left-aligning text and right-aligning
/// columns whose cells all look numeric.
pub fn render_table(headers: &[String], rows: &[Vec<String>]) -> String {
    let column_count = headers.len();
    let mut widths = headers.iter().map(|h| cell_width(h)).collect::<Vec<_>>();
    let mut numeric = vec![!rows.is_empty(); column_count];
    for row in rows {
        for (idx, cell) in row.iter().enumerate().take(column_count) {
            widths[idx] = widths[idx].max(cell_width(cell));
            numeric[idx] &= looks_numeric(cell);
        }
    }

    let mut output = String::new();
    let _ = writeln!(output, "{}", format_row(headers, &widths, &numeric));
    let rule = widths.iter().map(|w| "-".repeat((*w).max(3))).collect::<Vec<_>>();
    let _ = writeln!(output, "{}", format_row(&rule, &widths, &numeric));
    for row in rows {
        let _ = writeln!(output, "{}", format_row(row, &widths, &numeric));
    }
    output
}

pub fn print_table(headers: &[String], rows: &[Vec<String>]) {
    print!("{}", render_table(headers, rows));
}

fn format_row(values: &[String], widths: &[usize], numeric: &[bool]) -> String {
    let line = values
        .iter()
        .zip(widths)
        .zip(numeric)
        .map(|((value, width), right)| {
            let cell = value.replace(['\n', '\r', '\t'], " ");
            let pad = " ".repeat(width.saturating_sub(cell_width(&cell)));
            if *right { pad + &cell } else { cell + &pad }
        })
        .collect::<Vec<_>>()
        .join("  ");
    line.trim_end().to_string()
}

fn cell_width(value: &str) -> usize {
    value.chars().count()
}

fn looks_numeric(value: &str) -> bool {
    let trimmed = value.trim_end_matches('%');
    !trimmed.is_empty() && trimmed.parse::<f64>().is_ok()
}
