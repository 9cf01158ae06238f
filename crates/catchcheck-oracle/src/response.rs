//! Validation of raw oracle responses
//!
//! The service answers with free-form text that should contain a JSON
//! object. Anything that does not carry the required fields is treated as an
//! unavailable oracle rather than guessed at.

use catchcheck_core::error::{CatchError, Result};
use catchcheck_core::models::{GroundSuggestion, HealthReport, OracleVerdict};
use serde_json::Value;

/// Parse a species-check response into a verdict
///
/// `isFish` and `isSuspicious` must be booleans. A positive `isFish` must
/// also name the species.
pub fn parse_verdict(text: &str) -> Result<OracleVerdict> {
    let value = parse_object(text)?;

    for key in ["isFish", "isSuspicious"] {
        if !value.get(key).is_some_and(Value::is_boolean) {
            return Err(malformed(format!("missing boolean field '{}'", key)));
        }
    }

    let verdict: OracleVerdict = serde_json::from_value(value)
        .map_err(|e| malformed(format!("unexpected verdict shape: {}", e)))?;

    if verdict.is_fish && verdict.species.as_deref().map_or(true, |s| s.trim().is_empty()) {
        return Err(malformed("fish verdict without species".to_string()));
    }

    Ok(verdict)
}

/// Parse a health-diagnostic response
pub fn parse_health(text: &str) -> Result<HealthReport> {
    let value = parse_object(text)?;
    serde_json::from_value(value).map_err(|e| malformed(format!("unexpected health report: {}", e)))
}

/// Parse a proximity-lookup response
///
/// An empty object or a blank name means the service found nothing.
pub fn parse_suggestion(text: &str) -> Result<Option<GroundSuggestion>> {
    let value = parse_object(text)?;

    let name = match value.get("name").and_then(Value::as_str).map(str::trim) {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => return Ok(None),
    };

    let id = match value.get("id") {
        Some(Value::String(id)) if !id.trim().is_empty() => Some(id.trim().to_string()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    };

    Ok(Some(GroundSuggestion { id, name }))
}

/// Extract the JSON object from model output, tolerating markdown fences
fn parse_object(text: &str) -> Result<Value> {
    let body = strip_code_fence(text.trim());
    if body.is_empty() {
        return Err(malformed("empty response".to_string()));
    }

    let value: Value =
        serde_json::from_str(body).map_err(|e| malformed(format!("invalid JSON: {}", e)))?;

    if value.is_object() {
        Ok(value)
    } else {
        Err(malformed("expected a JSON object".to_string()))
    }
}

fn strip_code_fence(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    // Drop the optional language tag on the opening fence
    let rest = rest.split_once('\n').map_or("", |(_, body)| body);
    rest.trim_end().strip_suffix("```").unwrap_or(rest).trim()
}

fn malformed(reason: String) -> CatchError {
    CatchError::OracleUnavailable { reason: format!("malformed response: {}", reason) }
}
