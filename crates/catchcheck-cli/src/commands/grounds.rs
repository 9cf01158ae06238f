//! Grounds command implementation

use anyhow::Result;
use catchcheck_core::config::LayeredConfig;
use catchcheck_core::models::catch::DEFAULT_DRAFT_POSITION;
use tabled::Tabled;

use crate::cli::GroundsArgs;
use crate::output::OutputWriter;
use crate::output_types::GroundsOutput;
use crate::services;

pub async fn execute(
    args: GroundsArgs,
    config: &LayeredConfig,
    output: &OutputWriter,
) -> Result<()> {
    let catalog = services::catalog(&args.catalog)?;
    let origin = services::position(&args.position)?.unwrap_or(DEFAULT_DRAFT_POSITION);
    let resolver = services::resolver(catalog, services::oracle(config), config);

    let grounds = resolver.search(origin, &args.query);
    let suggestion = if args.suggest { resolver.resolve_nearest(origin).await } else { None };

    if output.is_json() {
        return output.result(GroundsOutput { origin, query: args.query, grounds, suggestion });
    }

    output.section(format!("Grounds near {}", origin));

    #[derive(Tabled)]
    struct GroundRow {
        #[tabled(rename = "#")]
        rank: usize,
        #[tabled(rename = "ID")]
        id: String,
        #[tabled(rename = "Name")]
        name: String,
        #[tabled(rename = "Region")]
        region: String,
        #[tabled(rename = "Distance")]
        distance: String,
    }

    let rows: Vec<GroundRow> = grounds
        .iter()
        .enumerate()
        .map(|(i, r)| GroundRow {
            rank: i + 1,
            id: r.ground.id.clone(),
            name: r.ground.name.clone(),
            region: r.ground.region.clone(),
            distance: format!("{:.1} km", r.distance_km),
        })
        .collect();
    output.table(rows);

    if args.suggest {
        match suggestion {
            Some(s) => output.success(format!(
                "Nearest ground: {}{}",
                s.name,
                s.id.map(|id| format!(" ({})", id)).unwrap_or_default()
            )),
            None => output.warning("No ground suggestion available, pick one from the list"),
        }
    }

    Ok(())
}
