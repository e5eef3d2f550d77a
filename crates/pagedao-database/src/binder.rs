//! Parameter binding.

use pagedao_core::result::AppResult;
use pagedao_core::traits::BoundQuery;
use pagedao_core::types::parameter::{ParamValue, Parameter};

/// Bind every entry of `parameters` to `query`.
///
/// List values become multi-valued binds, everything else a single bind.
/// The first binding error stops the loop and is returned unchanged.
pub fn bind_parameters<Q: BoundQuery>(query: &mut Q, parameters: Option<&Parameter>) -> AppResult<()> {
    let Some(parameters) = parameters else {
        return Ok(());
    };
    for (name, value) in parameters.iter() {
        match value {
            ParamValue::List(values) => query.bind_list(name, values)?,
            scalar => query.bind(name, scalar)?,
        }
    }
    Ok(())
}
