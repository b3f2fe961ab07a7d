use lazy_static::lazy_static;
use prometheus::{
    CounterVec, Encoder, Gauge, Histogram, HistogramOpts, HistogramVec, Opts, Registry,
    TextEncoder,
};
use std::sync::Once;
use std::time::Duration;

/// Metric name prefix for all engine metrics
const PREFIX: &str = "art_discovery";

lazy_static! {
    pub static ref REGISTRY: Registry = Registry::new();

    // Interactions
    pub static ref INTERACTIONS_RECORDED_TOTAL: CounterVec = CounterVec::new(
        Opts::new(format!("{PREFIX}_interactions_recorded_total"), "Interactions recorded by action type"),
        &["action"]
    ).expect("Failed to create interactions_recorded_total metric");

    pub static ref AFFINITY_UPDATES_TOTAL: CounterVec = CounterVec::new(
        Opts::new(format!("{PREFIX}_affinity_updates_total"), "Affinity updates applied"),
        &["kind"]
    ).expect("Failed to create affinity_updates_total metric");

    // Recommendations
    pub static ref RECOMMENDATIONS_SERVED_TOTAL: CounterVec = CounterVec::new(
        Opts::new(format!("{PREFIX}_recommendations_served_total"), "Recommendations returned by strategy"),
        &["strategy"]
    ).expect("Failed to create recommendations_served_total metric");

    pub static ref RECOMMENDATION_DURATION_SECONDS: Histogram = Histogram::with_opts(
        HistogramOpts::new(
            format!("{PREFIX}_recommendation_duration_seconds"),
            "Time to blend and re-rank one recommendation request"
        )
        .buckets(vec![0.005, 0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5])
    ).expect("Failed to create recommendation_duration_seconds metric");

    // Classification
    pub static ref CLASSIFICATIONS_TOTAL: CounterVec = CounterVec::new(
        Opts::new(format!("{PREFIX}_classifications_total"), "Artwork classifications by outcome"),
        &["outcome"]
    ).expect("Failed to create classifications_total metric");

    pub static ref CLASSIFICATION_DURATION_SECONDS: HistogramVec = HistogramVec::new(
        HistogramOpts::new(
            format!("{PREFIX}_classification_duration_seconds"),
            "Feature extraction duration in seconds"
        )
        .buckets(vec![0.01, 0.05, 0.1, 0.5, 1.0, 5.0]),
        &["source"]
    ).expect("Failed to create classification_duration_seconds metric");

    // Background jobs
    pub static ref BACKGROUND_JOB_EXECUTIONS_TOTAL: CounterVec = CounterVec::new(
        Opts::new(format!("{PREFIX}_background_job_executions_total"), "Background job runs by status"),
        &["job_id", "status"]
    ).expect("Failed to create background_job_executions_total metric");

    pub static ref CATALOG_ARTWORKS: Gauge = Gauge::new(
        format!("{PREFIX}_catalog_artworks"),
        "Number of artworks in the catalog"
    ).expect("Failed to create catalog_artworks metric");
}

static INIT: Once = Once::new();

/// Registers every metric with [`REGISTRY`]. Safe to call more than once.
pub fn init_metrics() {
    INIT.call_once(|| {
        let _ = REGISTRY.register(Box::new(INTERACTIONS_RECORDED_TOTAL.clone()));
        let _ = REGISTRY.register(Box::new(AFFINITY_UPDATES_TOTAL.clone()));
        let _ = REGISTRY.register(Box::new(RECOMMENDATIONS_SERVED_TOTAL.clone()));
        let _ = REGISTRY.register(Box::new(RECOMMENDATION_DURATION_SECONDS.clone()));
        let _ = REGISTRY.register(Box::new(CLASSIFICATIONS_TOTAL.clone()));
        let _ = REGISTRY.register(Box::new(CLASSIFICATION_DURATION_SECONDS.clone()));
        let _ = REGISTRY.register(Box::new(BACKGROUND_JOB_EXECUTIONS_TOTAL.clone()));
        let _ = REGISTRY.register(Box::new(CATALOG_ARTWORKS.clone()));
        tracing::debug!("Metrics registered");
    });
}

pub fn record_interaction(action: &str, direct_updates: usize, inferred_updates: usize) {
    INTERACTIONS_RECORDED_TOTAL.with_label_values(&[action]).inc();
    AFFINITY_UPDATES_TOTAL
        .with_label_values(&["direct"])
        .inc_by(direct_updates as f64);
    AFFINITY_UPDATES_TOTAL
        .with_label_values(&["inferred"])
        .inc_by(inferred_updates as f64);
}

pub fn record_recommendations(per_strategy: &[(&str, usize)], duration: Duration) {
    for (strategy, count) in per_strategy {
        RECOMMENDATIONS_SERVED_TOTAL
            .with_label_values(&[strategy])
            .inc_by(*count as f64);
    }
    RECOMMENDATION_DURATION_SECONDS.observe(duration.as_secs_f64());
}

/// `outcome` is one of "success", "image_error" or "store_error".
pub fn record_classification(source: &str, outcome: &str, duration: Duration) {
    CLASSIFICATIONS_TOTAL.with_label_values(&[outcome]).inc();
    CLASSIFICATION_DURATION_SECONDS
        .with_label_values(&[source])
        .observe(duration.as_secs_f64());
}

pub fn record_job_execution(job_id: &str, status: &str) {
    BACKGROUND_JOB_EXECUTIONS_TOTAL
        .with_label_values(&[job_id, status])
        .inc();
}

pub fn set_catalog_artworks(count: usize) {
    CATALOG_ARTWORKS.set(count as f64);
}

/// Text exposition of everything registered.
pub fn gather_text() -> String {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = vec![];
    match encoder.encode(&metric_families, &mut buffer) {
        Ok(()) => String::from_utf8(buffer).unwrap_or_default(),
        Err(e) => {
            tracing::error!("Failed to encode metrics: {}", e);
            String::new()
        }
    }
}
