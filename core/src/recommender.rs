//! Blocking HTTP client for the ML training recommender.
//!
//! One POST per employee, one fixed timeout, no retry. Every failure maps
//! to a SourceError; the engine degrades it to "no recommendations".

use crate::{
    catalog::parse_content_id,
    config::RecommenderConfig,
    error::SimResult,
    recommendation::Recommendation,
    source::{RecommendationSource, SourceError, SourceResult},
    types::EmployeeId,
};
use anyhow::Context;
use reqwest::blocking::Client;
use reqwest::StatusCode;
use serde_json::{json, Value};
use std::time::Duration;

pub struct HttpRecommender {
    client: Client,
    url: String,
}

impl HttpRecommender {
    pub fn new(config: &RecommenderConfig) -> SimResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .build()
            .context("failed to build recommender HTTP client")?;
        let url = format!(
            "{}{}",
            config.base_url.trim_end_matches('/'),
            config.endpoint
        );
        log::debug!("recommender: posting to {url}");
        Ok(Self { client, url })
    }
}

impl RecommendationSource for HttpRecommender {
    fn recommendations(&self, employee_id: EmployeeId) -> SourceResult<Vec<Recommendation>> {
        let payload = json!({ "data": { "ba_id": employee_id } });
        let resp = self
            .client
            .post(&self.url)
            .json(&payload)
            .send()
            .map_err(|e| SourceError::Transport(e.to_string()))?;

        let status = resp.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(SourceError::Auth(status.to_string()));
        }
        if !status.is_success() {
            return Err(SourceError::Transport(format!("HTTP {status}")));
        }

        let body: Value = resp
            .json()
            .map_err(|e| SourceError::MalformedResponse(e.to_string()))?;
        let recs = parse_recommendations(employee_id, &body)?;

        if recs.is_empty() {
            log::info!("recommender: no ML recommendations for employee {employee_id}");
        } else {
            let ids: Vec<String> = recs.iter().map(|r| r.content_id.to_string()).collect();
            log::info!(
                "recommender: {} ML recommendation(s) for employee {employee_id}: {}",
                recs.len(),
                ids.join(", ")
            );
        }
        Ok(recs)
    }
}

/// Accepts `{"response": {"ml_recommendations": [..]}}` and
/// `{"response": [..]}`. Items without a usable content id are skipped
/// with a warning; the rest are kept.
pub fn parse_recommendations(employee_id: EmployeeId, body: &Value) -> SourceResult<Vec<Recommendation>> {
    let response = body
        .get("response")
        .ok_or_else(|| SourceError::MalformedResponse("missing 'response'".into()))?;

    let items: &[Value] = match response {
        Value::Object(map) => match map.get("ml_recommendations") {
            Some(Value::Array(items)) => items.as_slice(),
            Some(Value::Null) | None => &[],
            Some(_) => {
                return Err(SourceError::MalformedResponse(
                    "'ml_recommendations' is not a list".into(),
                ))
            }
        },
        Value::Array(items) => items.as_slice(),
        _ => &[],
    };

    let mut recs = Vec::with_capacity(items.len());
    for (idx, item) in items.iter().enumerate() {
        let content_id = match item.get("recommended_content_id") {
            Some(Value::Number(n)) => n.as_u64(),
            Some(Value::String(s)) => parse_content_id(s),
            _ => None,
        };
        let Some(content_id) = content_id else {
            log::warn!(
                "recommender: skipping item {idx} for employee {employee_id}: no usable 'recommended_content_id'"
            );
            continue;
        };
        let name = item
            .get("recommended_content")
            .and_then(Value::as_str)
            .unwrap_or("Unknown");
        recs.push(Recommendation::new(employee_id, content_id, name));
    }
    Ok(recs)
}
