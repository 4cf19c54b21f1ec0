use std::{
    sync::{Mutex, PoisonError},
    time::Duration,
};

use crate::{
    budget::{conversion_filter::ConversionBudgetFilter, traits::Filter as _},
    config::MAX_CONVERSIONS,
    dap::{DapTask, MeasurementSink},
    impressions::{
        record::ImpressionRecord,
        traits::{ImpressionKey, InteractionType},
    },
    queries::conversion_request::ConversionConfig,
};

// Sample mock values to reduce boilerplate in tests.

impl ImpressionKey {
    /// Sample key for testing.
    pub fn mock() -> Self {
        Self::new("blog.example", "shoes.example", "ad_identifier")
    }
}

impl ImpressionRecord {
    /// Sample view at index 1, recorded at `recorded_at`.
    pub fn mock(recorded_at: u64) -> Self {
        Self {
            key: ImpressionKey::mock(),
            interaction_type: InteractionType::View,
            ad_index: 1,
            recorded_at,
            budget: ConversionBudgetFilter::new(MAX_CONVERSIONS),
        }
    }
}

impl ConversionConfig {
    /// Sample view conversion on a 5-bucket histogram, one day lookback.
    pub fn mock() -> Self {
        Self {
            target_site: "shoes.example".to_string(),
            task_id: "DSZGMFh26hBYXNaKvhL_N4AHA3P5lDn19on1vFPBxJM".to_string(),
            histogram_size: 5,
            lookback_days: 1,
            interaction_type: Some(InteractionType::View),
        }
    }
}

/// A measurement as handed to the aggregation client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceivedMeasurement {
    pub task: DapTask,
    pub measurement: Vec<u8>,
    pub timeout: Duration,
    pub reason: String,
}

/// Aggregation client double that records every submission it receives.
#[derive(Debug, Default)]
pub struct MockMeasurementSink {
    received: Mutex<Vec<ReceivedMeasurement>>,
    fail: bool,
}

impl MockMeasurementSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records submissions like `new`, then reports each one as failed.
    pub fn failing() -> Self {
        Self {
            received: Mutex::default(),
            fail: true,
        }
    }

    /// Removes and returns the most recent submission.
    pub fn pop(&self) -> Option<ReceivedMeasurement> {
        self.received
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop()
    }

    /// Removes and returns every submission, oldest first.
    pub fn take(&self) -> Vec<ReceivedMeasurement> {
        std::mem::take(
            &mut *self.received.lock().unwrap_or_else(PoisonError::into_inner),
        )
    }

    pub fn len(&self) -> usize {
        self.received
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl MeasurementSink for MockMeasurementSink {
    type Error = anyhow::Error;

    fn send_measurement(
        &self,
        task: &DapTask,
        measurement: Vec<u8>,
        timeout: Duration,
        reason: &str,
    ) -> Result<(), Self::Error> {
        self.received
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(ReceivedMeasurement {
                task: task.clone(),
                measurement,
                timeout,
                reason: reason.to_string(),
            });

        if self.fail {
            anyhow::bail!("mock upload to the leader failed");
        }
        Ok(())
    }
}
