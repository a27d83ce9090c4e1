use prometheus::{
    Encoder, Histogram, HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry, TextEncoder,
};

#[derive(Clone)]
pub struct Metrics {
    registry: Registry,
    pub verifications_total: IntCounterVec,
    pub verification_latency_seconds: HistogramVec,
    pub segments_total: IntCounterVec,
    pub verified_km: Histogram,
}

impl Metrics {
    pub fn new() -> Self {
        let registry = Registry::new();

        let verifications_total = IntCounterVec::new(
            Opts::new("verifications_total", "Total distance verifications by outcome"),
            &["outcome"],
        )
        .expect("valid verifications_total metric");

        let verification_latency_seconds = HistogramVec::new(
            HistogramOpts::new(
                "verification_latency_seconds",
                "Latency of fetch, estimate and persist in seconds",
            ),
            &["outcome"],
        )
        .expect("valid verification_latency_seconds metric");

        let segments_total = IntCounterVec::new(
            Opts::new("segments_total", "GPS segments judged by the estimator"),
            &["decision"],
        )
        .expect("valid segments_total metric");

        let verified_km = Histogram::with_opts(
            HistogramOpts::new("verified_km", "Verified distance per session in kilometres")
                .buckets(vec![0.5, 1.0, 5.0, 10.0, 25.0, 50.0, 100.0, 200.0, 400.0]),
        )
        .expect("valid verified_km metric");

        registry
            .register(Box::new(verifications_total.clone()))
            .expect("register verifications_total");
        registry
            .register(Box::new(verification_latency_seconds.clone()))
            .expect("register verification_latency_seconds");
        registry
            .register(Box::new(segments_total.clone()))
            .expect("register segments_total");
        registry
            .register(Box::new(verified_km.clone()))
            .expect("register verified_km");

        Self {
            registry,
            verifications_total,
            verification_latency_seconds,
            segments_total,
            verified_km,
        }
    }

    pub fn observe_verification(&self, outcome: &str, elapsed_secs: f64) {
        self.verifications_total.with_label_values(&[outcome]).inc();
        self.verification_latency_seconds
            .with_label_values(&[outcome])
            .observe(elapsed_secs);
    }

    pub fn encode(&self) -> Result<String, String> {
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();

        TextEncoder::new()
            .encode(&metric_families, &mut buffer)
            .map_err(|err| format!("failed to encode metrics: {err}"))?;

        String::from_utf8(buffer).map_err(|err| format!("metrics are not valid utf8: {err}"))
    }
}
