//! Table existence checks.

use clap::Args;

use crate::output::{self, OutputFormat};
use pagedao_core::error::AppError;
use pagedao_database::{BaseDao, DatabasePool, JsonRow};

/// Arguments for the table-exists command
#[derive(Debug, Args)]
pub struct TableExistsArgs {
    /// Table name
    pub name: String,
}

/// Execute the table-exists command
pub async fn execute(
    args: &TableExistsArgs,
    pool: &DatabasePool,
    format: OutputFormat,
) -> Result<(), AppError> {
    let exists = BaseDao::<JsonRow>::new()
        .table_exists(&pool.session(), &args.name)
        .await?;

    match format {
        OutputFormat::Table if exists => {
            output::print_success(&format!("Table '{}' exists", args.name))
        }
        OutputFormat::Table => {
            output::print_warning(&format!("Table '{}' does not exist", args.name))
        }
        OutputFormat::Json => output::print_json(&serde_json::json!({
            "table": args.name,
            "exists": exists,
        })),
    }
    Ok(())
}
