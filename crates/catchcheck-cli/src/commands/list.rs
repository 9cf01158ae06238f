//! List command implementation

use anyhow::Result;
use catchcheck_core::models::VerificationStatus;
use catchcheck_store::CatchStore;
use std::path::Path;
use tabled::Tabled;

use crate::cli::ListArgs;
use crate::output::{status_label, OutputWriter};
use crate::output_types::{CatchSummary, ListOutput};
use crate::services;

pub async fn execute(args: ListArgs, store_path: &Path, output: &OutputWriter) -> Result<()> {
    let store = services::store(store_path);
    let status = args.status.map(VerificationStatus::from);

    let catches: Vec<_> = store
        .list()
        .await?
        .into_iter()
        .filter(|c| status.map_or(true, |s| c.verification_status == s))
        .filter(|c| args.user.as_deref().map_or(true, |u| c.submitter.id == u))
        .collect();

    if output.is_json() {
        let catches = catches.iter().map(CatchSummary::from).collect();
        return output.result(ListOutput { catches });
    }

    if catches.is_empty() {
        output.info("No catches stored");
        return Ok(());
    }

    output.section(format!("Catches ({})", catches.len()));

    #[derive(Tabled)]
    struct CatchRow {
        #[tabled(rename = "ID")]
        id: String,
        #[tabled(rename = "Date")]
        date: String,
        #[tabled(rename = "Species")]
        species: String,
        #[tabled(rename = "Size")]
        size: String,
        #[tabled(rename = "Location")]
        location: String,
        #[tabled(rename = "Angler")]
        angler: String,
        #[tabled(rename = "Status")]
        status: String,
        #[tabled(rename = "Flag")]
        flag: String,
    }

    let rows: Vec<CatchRow> = catches
        .iter()
        .map(|c| CatchRow {
            id: c.id.to_string(),
            date: format!("{} {}", c.date, c.time.format("%H:%M")),
            species: c.species.clone(),
            size: format!("{:.0} cm / {:.2} kg", c.length, c.weight),
            location: c.location_name.clone(),
            angler: c.submitter.name.clone(),
            status: status_label(c.verification_status),
            flag: match (&c.suspicion_reason, c.is_suspicious) {
                (Some(reason), true) => reason.clone(),
                (None, true) => "suspicious".to_string(),
                _ => String::new(),
            },
        })
        .collect();
    output.table(rows);

    Ok(())
}
