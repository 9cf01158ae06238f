//! Submit command implementation

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use catchcheck_core::config::LayeredConfig;
use catchcheck_core::error::CatchError;
use catchcheck_core::models::Submitter;
use catchcheck_geo::FixedPosition;
use catchcheck_store::CatchStore;
use catchcheck_submit::{
    run_analysis, run_location, FlowServices, FlowSettings, SessionContext, SubmissionFlow,
};

use crate::cli::SubmitArgs;
use crate::output::{status_label, OutputWriter};
use crate::output_types::{CatchSummary, SubmitOutput};
use crate::services;

pub async fn execute(
    args: SubmitArgs,
    store_path: &Path,
    config: &LayeredConfig,
    output: &OutputWriter,
) -> Result<()> {
    let catalog = services::catalog(&args.catalog)?;
    let oracle = services::oracle(config);
    let store = Arc::new(services::store(store_path));
    let position = services::position(&args.position)?;

    let flow_services = FlowServices {
        resolver: services::resolver(catalog, Arc::clone(&oracle), config),
        oracle,
        locator: Arc::new(FixedPosition(position)),
        store: store.clone(),
    };
    let session = SessionContext::new(Submitter {
        id: args.user_id.clone(),
        name: args.user_name.clone(),
        avatar: String::new(),
    });
    let mut flow = SubmissionFlow::open(session, flow_services, FlowSettings::from_config(config));

    // Location and photo analysis run side by side
    let location = if flow.should_auto_locate() { Some(flow.begin_location()?) } else { None };
    let analysis = match &args.image {
        Some(path) => {
            let raw = tokio::fs::read(path)
                .await
                .with_context(|| format!("Failed to read {}", path.display()))?;
            Some(flow.begin_capture(&raw)?)
        }
        None => None,
    };

    let (located, analyzed) = tokio::join!(
        async move {
            match location {
                Some(ticket) => Some(run_location(ticket).await),
                None => None,
            }
        },
        async move {
            match analysis {
                Some(ticket) => Some(run_analysis(ticket).await),
                None => None,
            }
        }
    );

    let analysis_degraded = analyzed.as_ref().is_some_and(|done| done.outcome.degraded);
    if let Some(done) = analyzed {
        flow.apply_analysis(done);
    }
    let location_outcome = located.as_ref().map(|done| done.outcome);
    if let Some(done) = located {
        flow.apply_location(done);
    }

    // Explicit flags win over values recognized from the photo
    {
        let draft = flow.draft_mut()?;
        if let Some(species) = &args.species {
            draft.species = species.trim().to_string();
        }
        if args.length.is_some() {
            draft.length = args.length;
        }
        if args.weight.is_some() {
            draft.weight = args.weight;
        }
        draft.is_location_private = args.private;
        draft.bait = args.bait.clone();
        draft.method = args.method;
        draft.water_clarity = args.clarity;
        if let Some(temperature) = args.temperature {
            draft.temperature = temperature;
        }
        if let Some(pressure) = args.pressure {
            draft.pressure = pressure;
        }
        if let Some(wind) = &args.wind {
            draft.wind_speed = wind.clone();
        }
        draft.competition_id = args.competition.clone();
    }

    if let Some(id) = &args.ground {
        flow.select_ground(id)?;
    } else if let Some(name) = &args.location {
        flow.set_custom_location(name)?;
    }

    if flow.draft().is_some_and(|d| d.location_name().is_none()) {
        if let Some(e @ CatchError::LocationUnavailable { .. }) = flow.last_error() {
            output.warning(e);
        }
        if let Some(nearest) = flow.search_grounds("").first().filter(|_| !output.is_json()) {
            output.info(format!(
                "Nearest catalog ground: {} ({}), pass it with --ground",
                nearest.ground.name, nearest.ground.id
            ));
        }
    }
    if analysis_degraded {
        output.warning("Photo analysis unavailable, the catch will be queued for manual review");
    }

    let record = flow.submit().await?;
    let verified_catches = store.verified_count(&record.submitter.id).await?;

    if output.is_json() {
        return output.result(SubmitOutput {
            catch: CatchSummary::from(&record),
            location: location_outcome,
            analysis_degraded,
            verified_catches,
        });
    }

    output.success(format!("Catch {} stored", record.id));
    output.kv("Species", &record.species);
    output.kv("Location", &record.location_name);
    output.kv("Status", status_label(record.verification_status));
    if let Some(reason) = &record.suspicion_reason {
        output.kv("Flagged", reason);
    }
    output.kv("Verified catches", verified_catches);
    Ok(())
}
