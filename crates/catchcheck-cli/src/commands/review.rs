//! Review command implementation

use anyhow::{Context, Result};
use catchcheck_core::models::CatchId;
use catchcheck_store::review_catch;
use std::path::Path;

use crate::cli::ReviewArgs;
use crate::output::{status_label, OutputWriter};
use crate::output_types::CatchSummary;
use crate::services;

pub async fn execute(args: ReviewArgs, store_path: &Path, output: &OutputWriter) -> Result<()> {
    let id: CatchId = args.id.parse().with_context(|| format!("'{}' is not a catch id", args.id))?;
    let store = services::store(store_path);

    let updated = review_catch(&store, id, args.approve).await?;

    if output.is_json() {
        return output.result(CatchSummary::from(&updated));
    }

    output.success(format!(
        "Catch {} is now {}",
        updated.id,
        status_label(updated.verification_status)
    ));
    Ok(())
}
