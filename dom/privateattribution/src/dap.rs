//! Hand-off of measurements to the aggregation protocol client.
//!
//! The client owns HPKE key retrieval from the leader and helper, report
//! encryption and delivery. This side only produces the plaintext task
//! descriptor and histogram.

use std::{fmt::Display, sync::Arc, time::Duration};

use log::debug;
use serde::Serialize;

/// Time precision of conversion tasks, in seconds.
pub const TIME_PRECISION_SECS: u64 = 60;

/// Deadline given to the aggregation client for every submission.
pub const DAP_TIMEOUT: Duration = Duration::from_millis(30_000);

/// Reason attached to conversion submissions.
pub const CONVERSION_REASON: &str = "conversion";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MeasurementType {
    /// Vector of unsigned 8-bit integers.
    #[serde(rename = "vecu8")]
    VecU8,
}

/// Task descriptor sent alongside each measurement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DapTask {
    pub id: String,
    pub time_precision: u64,
    pub measurement_type: MeasurementType,
}

impl DapTask {
    pub fn conversion(task_id: impl Into<String>) -> Self {
        Self {
            id: task_id.into(),
            time_precision: TIME_PRECISION_SECS,
            measurement_type: MeasurementType::VecU8,
        }
    }
}

/// Aggregation protocol client. Implementations may deliver asynchronously;
/// the engine does not wait for or retry a submission.
pub trait MeasurementSink {
    type Error: Display;

    fn send_measurement(
        &self,
        task: &DapTask,
        measurement: Vec<u8>,
        timeout: Duration,
        reason: &str,
    ) -> Result<(), Self::Error>;
}

impl<M: MeasurementSink + ?Sized> MeasurementSink for Arc<M> {
    type Error = M::Error;

    fn send_measurement(
        &self,
        task: &DapTask,
        measurement: Vec<u8>,
        timeout: Duration,
        reason: &str,
    ) -> Result<(), Self::Error> {
        (**self).send_measurement(task, measurement, timeout, reason)
    }
}

/// Wraps a histogram into a conversion submission.
#[derive(Debug)]
pub struct MeasurementSubmitter<M> {
    sink: M,
}

impl<M: MeasurementSink> MeasurementSubmitter<M> {
    pub fn new(sink: M) -> Self {
        Self { sink }
    }

    pub fn sink(&self) -> &M {
        &self.sink
    }

    pub fn submit(
        &self,
        task_id: &str,
        measurement: Vec<u8>,
    ) -> Result<(), M::Error> {
        let task = DapTask::conversion(task_id);
        debug!("Submitting {measurement:?} for task {task:?}");
        self.sink
            .send_measurement(&task, measurement, DAP_TIMEOUT, CONVERSION_REASON)
    }
}
