//! Query result presentation.
//!
//! Renders the executor's column metadata and row tuples as a box-drawn
//! table sized to the terminal, followed by the engine's trailing status
//! message.

use meridian_link::QueryOutcome;
use serde_json::Value as JsonValue;

/// Maximum column width before truncation
const MAX_COLUMN_WIDTH: usize = 48;

/// Minimum column width when shrinking to fit the terminal
const MIN_COLUMN_WIDTH: usize = 6;

/// Formats query outcomes for display
pub struct ResultFormatter;

impl ResultFormatter {
    pub fn new() -> Self {
        Self
    }

    /// Render one outcome: table (when there are columns) plus the trailing
    /// status message.
    pub fn render(&self, outcome: &QueryOutcome) -> String {
        let footer = match outcome.message.as_deref() {
            Some(message) => message.to_string(),
            None => {
                let n = outcome.row_count();
                format!("{} row{}", n, if n == 1 { "" } else { "s" })
            }
        };

        if outcome.columns.is_empty() {
            return footer;
        }

        let headers: Vec<&str> = outcome.column_names();
        let string_rows: Vec<Vec<String>> = outcome
            .rows
            .iter()
            .map(|row| row.iter().map(Self::format_value).collect())
            .collect();

        let widths = Self::fit_widths(&headers, &string_rows, Self::terminal_width());

        let mut output = String::new();
        Self::push_border(&mut output, &widths, '┌', '┬', '┐');
        Self::push_row(
            &mut output,
            &headers.iter().map(|h| h.to_string()).collect::<Vec<_>>(),
            &widths,
        );
        Self::push_border(&mut output, &widths, '├', '┼', '┤');
        for row in &string_rows {
            Self::push_row(&mut output, row, &widths);
        }
        Self::push_border(&mut output, &widths, '└', '┴', '┘');

        output.push_str(&footer);
        output
    }

    fn format_value(value: &JsonValue) -> String {
        match value {
            JsonValue::Null => "NULL".to_string(),
            JsonValue::String(s) => s.clone(),
            other => other.to_string(),
        }
    }

    fn terminal_width() -> usize {
        if let Some((w, _h)) = term_size::dimensions() {
            w
        } else {
            80
        }
    }

    /// Natural widths capped at [`MAX_COLUMN_WIDTH`], then shrunk widest-first
    /// until the table fits the terminal.
    fn fit_widths(headers: &[&str], rows: &[Vec<String>], terminal_width: usize) -> Vec<usize> {
        let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
        for row in rows {
            for (i, value) in row.iter().enumerate() {
                if let Some(width) = widths.get_mut(i) {
                    *width = (*width).max(value.chars().count());
                }
            }
        }

        for width in widths.iter_mut() {
            *width = (*width).min(MAX_COLUMN_WIDTH);
        }

        let border_padding = widths.len() * 3 + 1;
        let available = terminal_width
            .saturating_sub(border_padding)
            .max(widths.len());

        let mut total: usize = widths.iter().sum();
        while total > available {
            let candidate = widths
                .iter()
                .enumerate()
                .filter(|(_, w)| **w > MIN_COLUMN_WIDTH)
                .max_by_key(|(_, w)| **w)
                .map(|(i, _)| i);
            match candidate {
                Some(i) => widths[i] -= 1,
                None => break,
            }
            total = widths.iter().sum();
        }

        widths
    }

    fn truncate_value(value: &str, max_width: usize) -> String {
        let length = value.chars().count();
        if length <= max_width {
            return value.to_string();
        }
        if max_width <= 3 {
            return value.chars().take(max_width).collect();
        }
        let kept: String = value.chars().take(max_width - 3).collect();
        format!("{}...", kept)
    }

    fn push_border(output: &mut String, widths: &[usize], left: char, mid: char, right: char) {
        output.push(left);
        for (i, width) in widths.iter().enumerate() {
            output.push_str(&"─".repeat(width + 2));
            output.push(if i == widths.len() - 1 { right } else { mid });
        }
        output.push('\n');
    }

    fn push_row(output: &mut String, values: &[String], widths: &[usize]) {
        output.push('│');
        for (i, width) in widths.iter().enumerate() {
            let value = values.get(i).map(|v| v.as_str()).unwrap_or("");
            let truncated = Self::truncate_value(value, *width);
            output.push(' ');
            output.push_str(&truncated);
            output.push_str(&" ".repeat(width.saturating_sub(truncated.chars().count())));
            output.push(' ');
            output.push('│');
        }
        output.push('\n');
    }
}

impl Default for ResultFormatter {
    fn default() -> Self {
        Self::new()
    }
}
