// Prometheus metrics for the relay API

use lazy_static::lazy_static;
use prometheus::{
    register_histogram_vec, register_int_counter_vec, Encoder, HistogramVec, IntCounterVec,
    TextEncoder,
};

lazy_static! {
    pub static ref REQUESTS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "judge_relay_requests_total",
        "Requests received, by route",
        &["route"]
    )
    .expect("requests counter can be registered");
    pub static ref BACKEND_FAILURES_TOTAL: IntCounterVec = register_int_counter_vec!(
        "judge_relay_backend_failures_total",
        "Failed backend operations, by error kind",
        &["kind"]
    )
    .expect("failure counter can be registered");
    pub static ref BACKEND_LATENCY_SECONDS: HistogramVec = register_histogram_vec!(
        "judge_relay_backend_latency_seconds",
        "Backend round-trip latency, by route",
        &["route"]
    )
    .expect("latency histogram can be registered");
}

pub fn track_request(route: &str) {
    REQUESTS_TOTAL.with_label_values(&[route]).inc();
}

pub fn track_failure(kind: &str) {
    BACKEND_FAILURES_TOTAL.with_label_values(&[kind]).inc();
}

/// Text exposition of every registered metric
pub fn render() -> Result<(String, String), prometheus::Error> {
    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();
    encoder.encode(&prometheus::gather(), &mut buffer)?;
    let body = String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))?;
    Ok((encoder.format_type().to_string(), body))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_includes_tracked_metrics() {
        track_request("metrics_test");
        track_failure("BACKEND_ERROR");
        BACKEND_LATENCY_SECONDS
            .with_label_values(&["metrics_test"])
            .observe(0.25);

        let (content_type, body) = render().unwrap();

        assert!(content_type.starts_with("text/plain"));
        assert!(body.contains("judge_relay_requests_total{route=\"metrics_test\"}"));
        assert!(body.contains("judge_relay_backend_failures_total{kind=\"BACKEND_ERROR\"}"));
        assert!(body.contains("judge_relay_backend_latency_seconds_bucket"));
    }
}
