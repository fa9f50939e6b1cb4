//! Terminal UI utilities.
//!
//! `Table` renders a box-drawn table sized to the terminal; used by
//! `shimgen list`.

use colored::*;

pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(headers: &[&str]) -> Self {
        Self {
            headers: headers.iter().map(|s| s.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    /// Rows with the wrong number of cells are dropped.
    pub fn add_row(&mut self, row: Vec<String>) {
        if row.len() == self.headers.len() {
            self.rows.push(row);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn print(&self) {
        let (_rows, cols) = console::Term::stdout().size();
        print!("{}", self.render(cols as usize));
    }

    /// Render to a string no wider than `max_width` where possible.
    pub fn render(&self, max_width: usize) -> String {
        if self.headers.is_empty() {
            return String::new();
        }

        let mut widths: Vec<usize> = self
            .headers
            .iter()
            .map(|h| console::measure_text_width(h))
            .collect();
        for row in &self.rows {
            for (i, cell) in row.iter().enumerate() {
                widths[i] = widths[i].max(console::measure_text_width(&flatten(cell)));
            }
        }

        // Shrink the widest column until it fits, never below 8.
        let overhead = 3 + 3 * widths.len();
        let budget = max_width.saturating_sub(overhead);
        while widths.iter().sum::<usize>() > budget {
            let Some((idx, &w)) = widths.iter().enumerate().max_by_key(|(_, w)| **w) else {
                break;
            };
            if w <= 8 {
                break;
            }
            widths[idx] -= 1;
        }

        let sep = |left: &str, mid: &str, right: &str| {
            let inner: Vec<String> = widths.iter().map(|w| "─".repeat(w + 2)).collect();
            format!("  {}{}{}\n", left, inner.join(mid), right)
        };
        let line = |cells: Vec<String>| {
            let mut s = String::from("  │");
            for (cell, &w) in cells.iter().zip(&widths) {
                let cut = console::truncate_str(cell, w, "...");
                let pad = w.saturating_sub(console::measure_text_width(&cut));
                s.push_str(&format!(" {}{} │", cut, " ".repeat(pad)));
            }
            s.push('\n');
            s
        };

        let mut out = sep("┌", "┬", "┐");
        out.push_str(&line(
            self.headers.iter().map(|h| h.bold().to_string()).collect(),
        ));
        out.push_str(&sep("├", "┼", "┤"));
        for row in &self.rows {
            out.push_str(&line(row.iter().map(|c| flatten(c)).collect()));
        }
        out.push_str(&sep("└", "┴", "┘"));
        out
    }
}

fn flatten(s: &str) -> String {
    s.chars()
        .map(|c| match c {
            '\n' | '\r' | '\t' => ' ',
            _ => c,
        })
        .collect()
}
