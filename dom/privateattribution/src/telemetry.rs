use std::{
    collections::HashMap,
    fmt,
    sync::{Arc, Mutex, PoisonError},
};

use crate::impressions::traits::InteractionType;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    SaveImpression,
    MeasureConversion,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::SaveImpression => "save_impression",
            Operation::MeasureConversion => "measure_conversion",
        }
    }
}

/// Counter labels within an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Label {
    Success,
    Error,
    LastImpression,
    LastView,
    LastClick,
}

impl Label {
    /// Attribution model label of an interaction type; `None` is the untyped
    /// last-impression model.
    pub fn model(interaction_type: Option<InteractionType>) -> Self {
        match interaction_type {
            None => Label::LastImpression,
            Some(InteractionType::View) => Label::LastView,
            Some(InteractionType::Click) => Label::LastClick,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Label::Success => "success",
            Label::Error => "error",
            Label::LastImpression => "last_impression",
            Label::LastView => "last_view",
            Label::LastClick => "last_click",
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Observational counters. Must never influence attribution.
pub trait TelemetrySink {
    fn add(&self, operation: Operation, label: Label, amount: u64);
}

impl<T: TelemetrySink + ?Sized> TelemetrySink for Arc<T> {
    fn add(&self, operation: Operation, label: Label, amount: u64) {
        (**self).add(operation, label, amount)
    }
}

/// Drops every sample.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopTelemetry;

impl TelemetrySink for NoopTelemetry {
    fn add(&self, _operation: Operation, _label: Label, _amount: u64) {}
}

/// In-memory counters, for tests and local inspection.
#[derive(Debug, Default)]
pub struct CounterTelemetry {
    counters: Mutex<HashMap<(Operation, Label), u64>>,
}

impl CounterTelemetry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn value(&self, operation: Operation, label: Label) -> u64 {
        let counters =
            self.counters.lock().unwrap_or_else(PoisonError::into_inner);
        counters.get(&(operation, label)).copied().unwrap_or_default()
    }
}

impl TelemetrySink for CounterTelemetry {
    fn add(&self, operation: Operation, label: Label, amount: u64) {
        let mut counters =
            self.counters.lock().unwrap_or_else(PoisonError::into_inner);
        *counters.entry((operation, label)).or_default() += amount;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counter_telemetry() {
        let telemetry = CounterTelemetry::new();
        telemetry.add(Operation::SaveImpression, Label::Success, 1);
        telemetry.add(Operation::SaveImpression, Label::Success, 2);
        telemetry.add(Operation::MeasureConversion, Label::LastView, 1);

        assert_eq!(telemetry.value(Operation::SaveImpression, Label::Success), 3);
        assert_eq!(telemetry.value(Operation::SaveImpression, Label::Error), 0);
        assert_eq!(
            telemetry.value(Operation::MeasureConversion, Label::LastView),
            1
        );
    }

    #[test]
    fn test_model_labels() {
        assert_eq!(Label::model(None).as_str(), "last_impression");
        assert_eq!(
            Label::model(Some(InteractionType::View)).as_str(),
            "last_view"
        );
        assert_eq!(
            Label::model(Some(InteractionType::Click)).to_string(),
            "last_click"
        );
        assert_eq!(Operation::MeasureConversion.as_str(), "measure_conversion");
    }
}
