//! Paged full-text search.

use clap::Args;

use crate::output::{self, OutputFormat};
use pagedao_core::config::AppConfig;
use pagedao_core::error::AppError;
use pagedao_core::types::search::{Occur, SearchClause, SearchQuery};
use pagedao_database::{BaseDao, DatabasePool, JsonRow, PgFullTextIndex};

use super::PageArgs;

/// Arguments for the search command
#[derive(Debug, Args)]
pub struct SearchArgs {
    /// Table to search
    #[arg(short, long)]
    pub table: String,

    /// Keywords that must match, as field=text; repeatable
    #[arg(long)]
    pub must: Vec<String>,

    /// Keywords that should match, as field=text; repeatable
    #[arg(long)]
    pub should: Vec<String>,

    /// Keywords that must not match, as field=text; repeatable
    #[arg(long)]
    pub must_not: Vec<String>,

    /// Filter that must match without affecting rank, as field=text; repeatable
    #[arg(long)]
    pub filter: Vec<String>,

    #[command(flatten)]
    pub paging: PageArgs,
}

impl SearchArgs {
    fn query(&self) -> Result<SearchQuery, AppError> {
        let groups = [
            (&self.must, Occur::Must),
            (&self.should, Occur::Should),
            (&self.must_not, Occur::MustNot),
        ];
        let clauses = groups
            .into_iter()
            .flat_map(|(pairs, occur)| pairs.iter().map(move |pair| clause(pair, occur)))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(SearchQuery::new(clauses))
    }

    fn filter(&self) -> Result<Option<SearchQuery>, AppError> {
        if self.filter.is_empty() {
            return Ok(None);
        }
        let clauses = self
            .filter
            .iter()
            .map(|pair| clause(pair, Occur::Must))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Some(SearchQuery::new(clauses)))
    }
}

fn clause(pair: &str, occur: Occur) -> Result<SearchClause, AppError> {
    let (field, text) = pair.split_once('=').ok_or_else(|| {
        AppError::validation(format!("search clause must look like field=text: {pair}"))
    })?;
    Ok(SearchClause::new(field.trim(), text, occur))
}

/// Execute the search command
pub async fn execute(
    args: &SearchArgs,
    pool: &DatabasePool,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let query = args.query()?;
    let filter = args.filter()?;
    let page = args.paging.to_page(config);
    let sort = page.order_by().to_vec();

    let index = PgFullTextIndex::<JsonRow>::new(
        pool.pool().clone(),
        &args.table,
        Vec::<String>::new(),
        &config.search,
    )?;
    let page = BaseDao::<JsonRow>::new()
        .search(&index, page, query, filter, &sort)
        .await?;

    output::print_page(&page, format);
    Ok(())
}
