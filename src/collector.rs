//! Metrics-backend HTTP client.
//!
//! Peripheral plumbing: produces a `SampleSeries` for the pipeline but is
//! not part of the core's correctness surface. Grounded on
//! `examples/original_source/src/python/collectors/prometheus_collector.py`.

use anyhow::{anyhow, bail, Context, Result};
use serde::Deserialize;
use std::time::Duration as StdDuration;
use tracing::{debug, warn};

use crate::duration::parse_duration;
use crate::model::SampleSeries;

const DEFAULT_STEP_SECONDS: f64 = 60.0;

#[derive(Debug, Deserialize)]
struct QueryRangeResponse {
    status: String,
    data: Option<QueryRangeData>,
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct QueryRangeData {
    result: Vec<QueryRangeResult>,
}

#[derive(Debug, Deserialize)]
struct QueryRangeResult {
    values: Vec<(f64, String)>,
}

#[derive(Debug, Deserialize)]
struct InstantQueryResponse {
    status: String,
}

/// A thin client for a Prometheus-compatible `query_range` API.
pub struct PrometheusCollector {
    base_url: String,
    client: reqwest::blocking::Client,
}

impl PrometheusCollector {
    pub fn new(base_url: impl Into<String>, timeout: StdDuration) -> Result<Self> {
        let client = reqwest::blocking::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            base_url: base_url.into(),
            client,
        })
    }

    /// Checks reachability with a trivial `up` query.
    pub fn test_connection(&self) -> bool {
        let url = format!("{}/api/v1/query", self.base_url);
        let response = self.client.get(&url).query(&[("query", "up")]).send();
        match response {
            Ok(resp) => resp
                .json::<InstantQueryResponse>()
                .map(|body| body.status == "success")
                .unwrap_or(false),
            Err(e) => {
                warn!(error = %e, "connection test failed");
                false
            }
        }
    }

    /// Fetches `duration` worth of history for `query`, sampled every `step`
    /// seconds. Queries that look like counters (`_total`/`_count` suffix)
    /// are wrapped in `rate(...)` over the step window.
    pub fn fetch_metrics(&self, query: &str, duration: &str, step: f64) -> Result<SampleSeries> {
        let duration_seconds = parse_duration(duration).map_err(|e| anyhow!(e))?;
        let step = if step > 0.0 { step } else { DEFAULT_STEP_SECONDS };

        let now = chrono::Utc::now();
        let start = now - chrono::Duration::seconds(duration_seconds as i64);

        let effective_query = if query.contains("_total") || query.contains("_count") {
            format!("rate({query}[{}s])", step as u64)
        } else {
            query.to_string()
        };

        let url = format!("{}/api/v1/query_range", self.base_url);
        debug!(url, effective_query, "fetching metrics");

        let response = self
            .client
            .get(&url)
            .query(&[
                ("query", effective_query.as_str()),
                ("start", &start.timestamp().to_string()),
                ("end", &now.timestamp().to_string()),
                ("step", &step.to_string()),
            ])
            .send()
            .context("metrics-backend request failed")?;

        let body: QueryRangeResponse = response.json().context("invalid metrics-backend response body")?;
        if body.status != "success" {
            bail!("metrics-backend query failed: {}", body.error.unwrap_or_default());
        }

        let data = body.data.ok_or_else(|| anyhow!("metrics-backend response missing data"))?;
        let series = data
            .result
            .into_iter()
            .next()
            .ok_or_else(|| anyhow!("metrics-backend query returned no series"))?;

        let mut timestamps_ms = Vec::with_capacity(series.values.len());
        let mut values = Vec::with_capacity(series.values.len());
        for (ts, raw_value) in series.values {
            let value: f64 = raw_value
                .parse()
                .with_context(|| format!("non-numeric sample value {raw_value:?}"))?;
            timestamps_ms.push(ts * 1000.0);
            values.push(value);
        }

        Ok(SampleSeries {
            metric: query.to_string(),
            duration: duration.to_string(),
            step_seconds: step,
            timestamps_ms,
            values,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counter_like_queries_get_wrapped_in_rate() {
        assert!("http_requests_total".contains("_total"));
        assert!("connection_count".contains("_count"));
        assert!(!"cpu_usage_ratio".contains("_total") && !"cpu_usage_ratio".contains("_count"));
    }

    #[test]
    fn builds_without_network_access() {
        let collector = PrometheusCollector::new("http://localhost:9090", StdDuration::from_secs(30));
        assert!(collector.is_ok());
    }
}
