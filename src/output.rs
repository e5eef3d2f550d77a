//! Table and JSON output formatting for CLI commands.

use serde::Serialize;
use serde_json::Value;
use tabled::builder::Builder;

use pagedao_core::types::pagination::Page;
use pagedao_database::JsonRow;

/// Output format selection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table
    #[default]
    Table,
    /// JSON output
    Json,
}

/// Print a page of rows followed by its position, or the whole page as JSON.
pub fn print_page(page: &Page<JsonRow>, format: OutputFormat) {
    match format {
        OutputFormat::Table => {
            print_rows(page.items());
            if page.is_disabled() {
                print_kv("rows", &page.items().len().to_string());
                return;
            }
            print_kv("page", &position(page));
            match page.count() {
                Some(count) => print_kv("total", &count.to_string()),
                None => print_kv("total", "not counted"),
            }
        }
        OutputFormat::Json => print_json(page),
    }
}

/// One-based "n of m" position of a page.
fn position<E>(page: &Page<E>) -> String {
    format!(
        "{} of {}",
        page.page_number().saturating_add(1),
        page.total_pages()
    )
}

/// Print rows as a table whose header is the first row's columns.
fn print_rows(rows: &[JsonRow]) {
    let Some(first) = rows.first() else {
        println!("No results found.");
        return;
    };

    let header: Vec<String> = first.columns().map(str::to_string).collect();
    let mut builder = Builder::default();
    builder.push_record(header.clone());
    for row in rows {
        builder.push_record(header.iter().map(|c| cell(row.get(c))));
    }
    println!("{}", builder.build());
}

fn cell(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// Print any serializable value as pretty JSON
pub fn print_json<T: Serialize>(item: &T) {
    let json = serde_json::to_string_pretty(item).unwrap_or_else(|_| "{}".to_string());
    println!("{}", json);
}

/// Print a success message
pub fn print_success(msg: &str) {
    println!("✓ {}", msg);
}

/// Print a warning message
pub fn print_warning(msg: &str) {
    println!("⚠ {}", msg);
}

/// Print an error message
pub fn print_error(msg: &str) {
    eprintln!("✗ {}", msg);
}

/// Print a key-value pair
pub fn print_kv(key: &str, value: &str) {
    println!("  {:<24} {}", format!("{}:", key), value);
}
