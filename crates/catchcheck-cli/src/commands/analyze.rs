//! Analyze command implementation

use anyhow::{Context, Result};
use catchcheck_core::config::LayeredConfig;
use catchcheck_core::verification::{compute_status, Decision};
use catchcheck_oracle::{analyze_fail_closed, ImageOracle};
use catchcheck_submit::{compress_image, CompressionSettings};

use crate::cli::AnalyzeArgs;
use crate::output::{status_label, OutputWriter};
use crate::output_types::{AnalyzeOutput, HealthOutput};
use crate::services;

pub async fn execute(
    args: AnalyzeArgs,
    config: &LayeredConfig,
    output: &OutputWriter,
) -> Result<()> {
    let raw = tokio::fs::read(&args.image)
        .await
        .with_context(|| format!("Failed to read {}", args.image.display()))?;
    let image = compress_image(&raw, CompressionSettings::from_config(config))?;
    let oracle = services::require_oracle(config)?;

    if args.health {
        let report = oracle.diagnose(&image.bytes, &image.mime_type).await?;
        if output.is_json() {
            return output.result(HealthOutput { model: oracle.model_name().to_string(), report });
        }
        output.section("Health diagnostic");
        output.kv("Species", &report.species);
        output.kv("Status", format!("{:?}", report.health_status).to_lowercase());
        output.kv("Diagnostic", &report.diagnostic);
        output.kv("Recommendation", &report.recommendation);
        return Ok(());
    }

    let outcome = analyze_fail_closed(&oracle, &image.bytes, &image.mime_type).await;
    let decision = compute_status(Some(&outcome.verdict), args.competition);

    if output.is_json() {
        return output.result(AnalyzeOutput {
            model: oracle.model_name().to_string(),
            width: image.width,
            height: image.height,
            compressed_bytes: image.bytes.len(),
            verdict: outcome.verdict,
            degraded: outcome.degraded,
            decision,
        });
    }

    let verdict = &outcome.verdict;
    output.section("Photo analysis");
    output.kv("Image", format!("{}x{} ({} bytes)", image.width, image.height, image.bytes.len()));
    output.kv("Fish", verdict.is_fish);
    if let Some(species) = &verdict.species {
        output.kv("Species", species);
    }
    if let Some(length) = verdict.estimated_length {
        output.kv("Estimated length", format!("{:.0} cm", length));
    }
    if let Some(weight) = verdict.estimated_weight {
        output.kv("Estimated weight", format!("{:.2} kg", weight));
    }
    output.kv("Suspicious", verdict.is_suspicious);
    if let Some(reason) = &verdict.suspicion_reason {
        output.kv("Reason", reason);
    }
    if outcome.degraded {
        output.warning("Analysis service unavailable, the verdict is the manual-review fallback");
    }

    match decision {
        Decision::Blocked { detected_object } => {
            output.error(format!("Submission would be rejected: detected \"{}\"", detected_object))
        }
        Decision::Record(status) => {
            output.info(format!("Submission would be {}", status_label(status)))
        }
    }
    Ok(())
}
