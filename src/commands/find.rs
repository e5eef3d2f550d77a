//! Paged native SQL queries.

use clap::Args;

use crate::output::{self, OutputFormat};
use pagedao_core::config::AppConfig;
use pagedao_core::error::AppError;
use pagedao_database::{BaseDao, DatabasePool, JsonRow};

use super::{PageArgs, parse_parameters};

/// Arguments for the find command
#[derive(Debug, Args)]
pub struct FindArgs {
    /// SQL query with `:name` parameters
    pub sql: String,

    /// Named parameter as name=value; repeatable
    #[arg(short, long = "param")]
    pub params: Vec<String>,

    #[command(flatten)]
    pub paging: PageArgs,
}

/// Execute the find command
pub async fn execute(
    args: &FindArgs,
    pool: &DatabasePool,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let parameters = parse_parameters(&args.params)?;
    let page = args.paging.to_page(config);

    let page = BaseDao::<JsonRow>::new()
        .find_page_by_sql(&pool.session(), page, &args.sql, parameters.as_ref())
        .await?;

    output::print_page(&page, format);
    Ok(())
}
