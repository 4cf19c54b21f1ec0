#![allow(dead_code)]

pub mod logging;

use std::sync::Arc;

use privateattribution::{
    clock::MockClock,
    config::AttributionConfig,
    impressions::{
        hashmap_impression_storage::HashMapImpressionStorage,
        traits::InteractionType,
    },
    queries::conversion_request::{ConversionConfig, ConversionRequest},
    service::AttributionService,
    telemetry::CounterTelemetry,
    util::mocks::MockMeasurementSink,
};

pub const TASK_ID: &str = "DSZGMFh26hBYXNaKvhL_N4AHA3P5lDn19on1vFPBxJM";
pub const LOOKBACK_DAYS: u32 = 1;
pub const HISTOGRAM_SIZE: usize = 5;

pub type MockService = AttributionService<
    HashMapImpressionStorage,
    Arc<MockClock>,
    Arc<MockMeasurementSink>,
    Arc<CounterTelemetry>,
>;

/// Service wired to mock collaborators, with handles kept for assertions.
pub struct Harness {
    pub service: MockService,
    pub clock: Arc<MockClock>,
    pub sink: Arc<MockMeasurementSink>,
    pub telemetry: Arc<CounterTelemetry>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_config(AttributionConfig {
            test_force_enabled: true,
            ..Default::default()
        })
    }

    pub fn with_config(config: AttributionConfig) -> Self {
        let clock = Arc::new(MockClock::new());
        let sink = Arc::new(MockMeasurementSink::new());
        let telemetry = Arc::new(CounterTelemetry::new());
        let service = AttributionService::new(
            config,
            HashMapImpressionStorage::new(),
            clock.clone(),
            sink.clone(),
            telemetry.clone(),
        );
        Self {
            service,
            clock,
            sink,
            telemetry,
        }
    }

    /// Measures a conversion and returns the submitted histogram.
    pub fn convert(
        &self,
        target_site: &str,
        interaction_type: InteractionType,
        ads: &[&str],
        sources: &[&str],
    ) -> Result<Vec<u8>, anyhow::Error> {
        let request = conversion(target_site, interaction_type, ads, sources)?;
        self.service.record_conversion(&request);

        let received = self
            .sink
            .pop()
            .ok_or_else(|| anyhow::anyhow!("no measurement was submitted"))?;
        Ok(received.measurement)
    }
}

pub fn conversion(
    target_site: &str,
    interaction_type: InteractionType,
    ads: &[&str],
    sources: &[&str],
) -> Result<ConversionRequest, anyhow::Error> {
    let config = ConversionConfig {
        target_site: target_site.to_string(),
        task_id: TASK_ID.to_string(),
        histogram_size: HISTOGRAM_SIZE,
        lookback_days: LOOKBACK_DAYS,
        interaction_type: Some(interaction_type),
    };
    let request = ConversionRequest::new(
        config,
        ads.iter().map(|ad| ad.to_string()).collect(),
        Some(sources.iter().map(|source| source.to_string()).collect()),
    )?;
    Ok(request)
}
