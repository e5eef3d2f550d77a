//! CLI command definitions and dispatch.

pub mod count;
pub mod find;
pub mod reindex;
pub mod search;
pub mod table;

use clap::{Args, Parser, Subcommand};

use crate::output::OutputFormat;
use pagedao_core::config::AppConfig;
use pagedao_core::error::AppError;
use pagedao_core::types::pagination::{Page, PageRequest};
use pagedao_core::types::parameter::{ParamValue, Parameter};
use pagedao_database::{DatabasePool, JsonRow};

/// pagedao: paged queries over PostgreSQL
#[derive(Debug, Parser)]
#[command(name = "pagedao", version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/default.toml")]
    pub config: String,

    /// Environment overlay loaded from config/<env>
    #[arg(short, long)]
    pub env: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run a paged native SQL query
    Find(find::FindArgs),
    /// Count rows with a native SQL count query
    Count(count::CountArgs),
    /// Paged full-text search over a table
    Search(search::SearchArgs),
    /// Rebuild a table's full-text indexes
    Reindex(reindex::ReindexArgs),
    /// Check whether a table exists
    TableExists(table::TableExistsArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self, config: &AppConfig) -> Result<(), AppError> {
        let pool = DatabasePool::connect(&config.database).await?;
        let result = match &self.command {
            Commands::Find(args) => find::execute(args, &pool, config, self.format).await,
            Commands::Count(args) => count::execute(args, &pool, self.format).await,
            Commands::Search(args) => search::execute(args, &pool, config, self.format).await,
            Commands::Reindex(args) => reindex::execute(args, &pool, config).await,
            Commands::TableExists(args) => table::execute(args, &pool, self.format).await,
        };
        pool.close().await;
        result
    }
}

/// Paging options shared by paged commands
#[derive(Debug, Clone, Args)]
pub struct PageArgs {
    /// Page number, starting at 0
    #[arg(long, default_value_t = 0)]
    pub page: u64,

    /// Page size; the configured default when omitted
    #[arg(long)]
    pub size: Option<u64>,

    /// Ordering, e.g. "created_at desc, id"
    #[arg(long)]
    pub order_by: Option<String>,

    /// Skip the total count
    #[arg(long)]
    pub no_count: bool,

    /// Fetch every matching row
    #[arg(long, conflicts_with_all = ["page", "size", "no_count"])]
    pub all: bool,
}

impl PageArgs {
    /// Build the page to request, applying configured size limits.
    pub fn to_page(&self, config: &AppConfig) -> Page<JsonRow> {
        if self.all {
            let page = Page::unpaged();
            return match &self.order_by {
                Some(order_by) => page.with_order_by_str(order_by),
                None => page,
            };
        }
        config.paging.resolve(&PageRequest {
            page_number: self.page,
            page_size: self.size,
            order_by: self.order_by.clone(),
            not_count: self.no_count,
        })
    }
}

/// Parse repeated `name=value` options into named parameters.
///
/// Values are read as JSON when they parse (numbers, booleans, arrays for
/// list parameters) and as plain text otherwise.
pub fn parse_parameters(pairs: &[String]) -> Result<Option<Parameter>, AppError> {
    if pairs.is_empty() {
        return Ok(None);
    }
    let mut parameters = Parameter::new();
    for pair in pairs {
        let (name, raw) = pair.split_once('=').ok_or_else(|| {
            AppError::validation(format!("parameter must look like name=value: {pair}"))
        })?;
        let value = serde_json::from_str::<ParamValue>(raw)
            .unwrap_or_else(|_| ParamValue::Text(raw.to_string()));
        parameters.insert(name.trim(), value);
    }
    Ok(Some(parameters))
}
