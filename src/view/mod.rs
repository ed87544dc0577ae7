//! Text rendering of the employee page: title, form, status line and table.

use std::fmt::Write;

use unicode_width::UnicodeWidthStr;

use crate::controller::{EmployeeController, Interaction, Phase};
use crate::models::{Employee, Field};

pub const TITLE: &str = "Employee Management System";
pub const EMPTY_TABLE: &str = "No employees found";

const HEADERS: [&str; 4] = ["ID", "Name", "Email", "Department"];

/// Render the whole page from the controller's current state.
pub fn render<I: Interaction>(controller: &EmployeeController<I>) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "{}", TITLE);
    let _ = writeln!(out, "{}", "=".repeat(TITLE.width()));
    out.push_str(&render_form(controller.draft(), controller.submit_label()));

    match controller.phase() {
        Phase::Idle => {}
        Phase::Loading => out.push_str("(loading...)\n"),
        Phase::Submitting => out.push_str("(saving...)\n"),
    }
    if let Some(err) = controller.last_error() {
        let _ = writeln!(out, "! {}", err);
    }

    out.push('\n');
    out.push_str(&render_table(controller.employees()));
    out
}

/// The three inputs plus the submit button label.
pub fn render_form(draft: &Employee, submit_label: &str) -> String {
    let label_width = Field::ALL
        .iter()
        .map(|field| field.as_str().width())
        .max()
        .unwrap_or(0);

    let mut out = String::new();
    if !draft.id.is_empty() {
        let _ = writeln!(out, "{:>width$}: {}", "id", draft.id, width = label_width);
    }
    for field in Field::ALL {
        let value = draft.field(field);
        let shown = if value.is_empty() {
            format!("<{}>", field.placeholder())
        } else {
            value.to_string()
        };
        let _ = writeln!(
            out,
            "{:>width$}: {}",
            field.as_str(),
            shown,
            width = label_width
        );
    }
    let _ = writeln!(out, "[{}]", submit_label);
    out
}

/// Bordered table of all records, or a placeholder row when empty.
pub fn render_table(employees: &[Employee]) -> String {
    let rows: Vec<[&str; 4]> = employees
        .iter()
        .map(|e| [e.id.as_str(), e.name.as_str(), e.email.as_str(), e.department.as_str()])
        .collect();

    let mut widths = HEADERS.map(|header| header.width());
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.width());
        }
    }

    let separator = {
        let mut line = String::from("+");
        for width in widths {
            line.push_str(&"-".repeat(width + 2));
            line.push('+');
        }
        line.push('\n');
        line
    };

    let mut out = String::new();
    out.push_str(&separator);
    out.push_str(&format_row(&HEADERS, &widths));
    out.push_str(&separator);

    if rows.is_empty() {
        // Span the placeholder across the full inner width.
        let inner = widths.iter().map(|w| w + 3).sum::<usize>() - 1;
        let _ = writeln!(out, "|{}|", pad_center(EMPTY_TABLE, inner));
    } else {
        for row in &rows {
            out.push_str(&format_row(row, &widths));
        }
    }

    out.push_str(&separator);
    out
}

fn format_row(cells: &[&str; 4], widths: &[usize; 4]) -> String {
    let mut line = String::from("|");
    for (cell, width) in cells.iter().zip(widths) {
        line.push(' ');
        line.push_str(cell);
        line.push_str(&" ".repeat(width - cell.width()));
        line.push_str(" |");
    }
    line.push('\n');
    line
}

fn pad_center(text: &str, width: usize) -> String {
    let text_width = text.width();
    if text_width >= width {
        return text.to_string();
    }
    let left = (width - text_width) / 2;
    let right = width - text_width - left;
    format!("{}{}{}", " ".repeat(left), text, " ".repeat(right))
}
