//! Full-text index rebuilds.

use clap::Args;

use crate::output;
use pagedao_core::config::AppConfig;
use pagedao_core::error::AppError;
use pagedao_database::{BaseDao, DatabasePool, JsonRow, PgFullTextIndex};

/// Arguments for the reindex command
#[derive(Debug, Args)]
pub struct ReindexArgs {
    /// Table to reindex
    #[arg(short, long)]
    pub table: String,

    /// Searchable fields that get a text-search index, comma separated
    #[arg(long, value_delimiter = ',')]
    pub fields: Vec<String>,

    /// Fail when the rebuild is interrupted instead of logging it
    #[arg(long)]
    pub strict: bool,
}

/// Execute the reindex command
pub async fn execute(
    args: &ReindexArgs,
    pool: &DatabasePool,
    config: &AppConfig,
) -> Result<(), AppError> {
    let index = PgFullTextIndex::<JsonRow>::new(
        pool.pool().clone(),
        &args.table,
        args.fields.iter().cloned(),
        &config.search,
    )?;
    let dao = BaseDao::<JsonRow>::new();

    if args.strict {
        dao.rebuild_index(&index).await?;
    } else {
        dao.create_index(&index).await?;
    }
    output::print_success(&format!("Reindexed table '{}'", args.table));
    Ok(())
}
