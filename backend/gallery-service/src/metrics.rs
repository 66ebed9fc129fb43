//! Prometheus metrics for the gallery feed and engagement endpoints

use actix_web::HttpResponse;
use prometheus::{
    register_histogram, register_histogram_vec, register_int_counter_vec, Encoder, Histogram,
    HistogramVec, IntCounterVec, TextEncoder,
};
use std::time::Duration;

lazy_static::lazy_static! {
    /// Feed requests by sort mode and outcome (success/error)
    pub static ref FEED_REQUESTS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "gallery_feed_requests_total",
        "Total feed requests",
        &["sort_mode", "status"]
    ).expect("Prometheus metrics registration should succeed at startup");

    /// Time spent filtering, sorting and paging candidates
    pub static ref FEED_RANKING_DURATION: HistogramVec = register_histogram_vec!(
        "gallery_feed_ranking_duration_seconds",
        "Feed ranking latency",
        &["sort_mode"],
        vec![0.0005, 0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5]
    ).expect("Prometheus metrics registration should succeed at startup");

    /// Candidates loaded per feed request
    pub static ref FEED_CANDIDATES: Histogram = register_histogram!(
        "gallery_feed_candidates",
        "Number of candidate images ranked per feed request",
        vec![0.0, 10.0, 50.0, 100.0, 500.0, 1000.0, 2500.0, 5000.0]
    ).expect("Prometheus metrics registration should succeed at startup");

    /// Likes and comments written, by action (like/unlike/comment)
    pub static ref ENGAGEMENT_EVENTS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "gallery_engagement_events_total",
        "Engagement writes by action",
        &["action"]
    ).expect("Prometheus metrics registration should succeed at startup");
}

pub fn record_feed_request(sort_mode: &str, success: bool) {
    let status = if success { "success" } else { "error" };
    FEED_REQUESTS_TOTAL
        .with_label_values(&[sort_mode, status])
        .inc();
}

pub fn record_ranking(sort_mode: &str, candidates: usize, elapsed: Duration) {
    FEED_RANKING_DURATION
        .with_label_values(&[sort_mode])
        .observe(elapsed.as_secs_f64());
    FEED_CANDIDATES.observe(candidates as f64);
}

pub fn record_engagement(action: &str) {
    ENGAGEMENT_EVENTS_TOTAL.with_label_values(&[action]).inc();
}

/// Serialise the default registry in Prometheus text format
pub fn metrics_response() -> HttpResponse {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();

    let mut buffer = Vec::new();
    match encoder.encode(&metric_families, &mut buffer) {
        Ok(_) => HttpResponse::Ok()
            .content_type(encoder.format_type())
            .body(buffer),
        Err(err) => {
            tracing::error!("Failed to encode metrics: {}", err);
            HttpResponse::InternalServerError().body(err.to_string())
        }
    }
}
