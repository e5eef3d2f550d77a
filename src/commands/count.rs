//! Native SQL count queries.

use clap::Args;

use crate::output::{self, OutputFormat};
use pagedao_core::error::AppError;
use pagedao_database::{BaseDao, DatabasePool, JsonRow};

use super::parse_parameters;

/// Arguments for the count command
#[derive(Debug, Args)]
pub struct CountArgs {
    /// SQL count query with `:name` parameters
    pub sql: String,

    /// Named parameter as name=value; repeatable
    #[arg(short, long = "param")]
    pub params: Vec<String>,
}

/// Execute the count command
pub async fn execute(
    args: &CountArgs,
    pool: &DatabasePool,
    format: OutputFormat,
) -> Result<(), AppError> {
    let parameters = parse_parameters(&args.params)?;
    let count = BaseDao::<JsonRow>::new()
        .get_count_by_sql(&pool.session(), &args.sql, parameters.as_ref())
        .await?;

    match format {
        OutputFormat::Table => output::print_kv("count", &count.to_string()),
        OutputFormat::Json => output::print_json(&serde_json::json!({ "count": count })),
    }
    Ok(())
}
