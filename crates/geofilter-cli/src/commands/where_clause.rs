//! Where command implementation

use crate::cli::WhereArgs;
use crate::output::OutputWriter;
use anyhow::Result;
use geofilter_normalize::{combine_object_ids_and_where, WhereClauseParams};
use serde::Serialize;

#[derive(Debug, Serialize)]
struct WhereOutput {
    #[serde(rename = "where")]
    where_clause: String,
}

pub fn execute(args: &WhereArgs, output: &OutputWriter) -> Result<()> {
    let mut params = WhereClauseParams::new();
    if let Some(ids) = &args.object_ids {
        params = params.with_object_ids(ids.as_str());
    }
    if let Some(clause) = &args.where_clause {
        params = params.with_where(clause.as_str());
    }
    if let Some(field) = &args.id_field {
        params = params.with_id_field(field.as_str());
    }

    let where_clause = combine_object_ids_and_where(&params);
    tracing::debug!(%where_clause, "Combined object ids and where clause");

    if output.is_json() {
        return output.result(WhereOutput { where_clause });
    }
    println!("{}", where_clause);
    Ok(())
}
