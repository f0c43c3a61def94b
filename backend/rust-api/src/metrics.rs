use lazy_static::lazy_static;
use prometheus::{
    register_histogram_vec, register_int_counter_vec, register_int_gauge, Encoder, HistogramVec,
    IntCounterVec, IntGauge, TextEncoder,
};

lazy_static! {
    // HTTP Metrics
    pub static ref HTTP_REQUESTS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "http_requests_total",
        "Total number of HTTP requests",
        &["method", "path", "status"]
    )
    .unwrap();

    pub static ref HTTP_REQUEST_DURATION_SECONDS: HistogramVec = register_histogram_vec!(
        "http_request_duration_seconds",
        "HTTP request duration in seconds",
        &["method", "path"],
        vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]
    )
    .unwrap();

    // Learning Metrics
    pub static ref RESPONSES_RECORDED_TOTAL: IntCounterVec = register_int_counter_vec!(
        "responses_recorded_total",
        "Total number of answer submissions recorded",
        &["correct"]
    )
    .unwrap();

    pub static ref LEARNING_STATE_TRANSITIONS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "learning_state_transitions_total",
        "Skill learning-state changes",
        &["from", "to"]
    )
    .unwrap();

    pub static ref DISTRACTOR_MATCHES_TOTAL: IntCounterVec = register_int_counter_vec!(
        "distractor_matches_total",
        "Wrong answers classified by distractor pattern",
        &["pattern"]
    )
    .unwrap();

    pub static ref CATALOG_QUESTIONS: IntGauge = register_int_gauge!(
        "catalog_questions",
        "Number of questions loaded in the catalog"
    )
    .unwrap();
}

/// Renders all metrics in Prometheus text format
pub fn render_metrics() -> Result<String, prometheus::Error> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    String::from_utf8(buffer)
        .map_err(|e| prometheus::Error::Msg(format!("Failed to convert metrics to UTF-8: {}", e)))
}
