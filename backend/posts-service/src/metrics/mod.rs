//! Prometheus metrics for posts-service.
//!
//! Counters for the write paths and the index page cache, plus the handler
//! behind `/metrics`.

use actix_web::HttpResponse;
use lazy_static::lazy_static;
use prometheus::{
    register_histogram_vec, register_int_counter, register_int_counter_vec, Encoder,
    HistogramVec, IntCounter, IntCounterVec, TextEncoder,
};

lazy_static! {
    pub static ref POSTS_CREATED_TOTAL: IntCounter = register_int_counter!(
        "posts_created_total",
        "Total posts published"
    )
    .expect("failed to register posts_created_total");

    /// Edit attempts by outcome (updated, invalid, not_author).
    pub static ref POST_EDITS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "post_edits_total",
        "Post edit attempts segmented by outcome",
        &["result"]
    )
    .expect("failed to register post_edits_total");

    /// Comment submissions by outcome (created, invalid).
    pub static ref COMMENTS_CREATED_TOTAL: IntCounterVec = register_int_counter_vec!(
        "comments_created_total",
        "Comment submissions segmented by outcome",
        &["result"]
    )
    .expect("failed to register comments_created_total");

    /// Follow graph changes (follow, unfollow, noop).
    pub static ref FOLLOW_EVENTS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "follow_events_total",
        "Follow graph events segmented by action",
        &["action"]
    )
    .expect("failed to register follow_events_total");

    /// Index page cache events (hit, miss, store).
    pub static ref PAGE_CACHE_EVENTS: IntCounterVec = register_int_counter_vec!(
        "page_cache_events_total",
        "Page cache events segmented by outcome",
        &["event"]
    )
    .expect("failed to register page_cache_events_total");

    /// Listing page assembly time by listing kind.
    pub static ref LISTING_DURATION_SECONDS: HistogramVec = register_histogram_vec!(
        "listing_duration_seconds",
        "Time spent assembling a listing page",
        &["listing"]
    )
    .expect("failed to register listing_duration_seconds");
}

/// Actix handler that renders Prometheus metrics in text format.
pub async fn serve_metrics() -> HttpResponse {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();

    let mut buffer = Vec::new();
    if let Err(err) = encoder.encode(&metric_families, &mut buffer) {
        return HttpResponse::InternalServerError().body(err.to_string());
    }

    HttpResponse::Ok()
        .content_type(encoder.format_type())
        .body(buffer)
}
