use crate::record::{Record, Status};
use crate::sheet::Sheet;
use crate::ui::{theme, Icons};
use owo_colors::OwoColorize;

pub fn status(icon: &str, label: &str, value: &str) {
    println!("{} {}: {}", icon, label.style(theme().dim.clone()), value);
}

pub fn success(label: &str) {
    println!("{} {}", Icons::CHECK, label.style(theme().success.clone()));
}

pub fn error(label: &str) {
    eprintln!("{} {}", Icons::CROSS, label.style(theme().error.clone()));
}

pub fn warn(label: &str) {
    eprintln!("{} {}", Icons::WARN, label.style(theme().warn.clone()));
}

pub fn section(title: &str) {
    println!();
    println!("━{}━", title.style(theme().header.clone()));
}

pub fn dim(text: &str) -> String {
    text.style(theme().dim.clone()).to_string()
}

pub fn muted(text: &str) -> String {
    text.style(theme().muted.clone()).to_string()
}

pub fn summary_row(label: &str, value: &str) {
    println!("  {} {}", label.style(theme().dim.clone()), value);
}

/// One record as a label/value listing in the sheet's column order
pub fn record_detail(sheet: &Sheet, record: &Record) {
    section(&format!("{} #{}", sheet.name, record.id));
    let width = sheet.schema.columns().map(|c| c.label.chars().count()).max().unwrap_or(0);
    for column in sheet.schema.columns() {
        let value = record.get(column.name).unwrap_or_default();
        let shown = match value.parse::<Status>() {
            Ok(Status::NotDone) => value.style(theme().pending.clone()).to_string(),
            Ok(Status::Done) => value.style(theme().done.clone()).to_string(),
            Err(_) if value.is_empty() => muted("-"),
            Err(_) => value.to_string(),
        };
        let label = format!("{:<width$}", column.label, width = width);
        summary_row(&label, &shown);
    }
}
