use std::sync::{Mutex, MutexGuard, PoisonError};

use log::{debug, error, info, warn};

use crate::{
    budget::ledger::BudgetLedger,
    clock::Clock,
    config::AttributionConfig,
    dap::{MeasurementSink, MeasurementSubmitter},
    error::AttributionError,
    impressions::{
        record::ImpressionRecord,
        traits::{ImpressionKey, ImpressionStorage, InteractionType},
    },
    queries::{
        conversion_request::ConversionRequest, histogram,
        last_interaction::find_impression,
    },
    telemetry::{Label, NoopTelemetry, Operation, TelemetrySink},
};

/// Entry points called by the host when an ad interaction is observed or a
/// conversion is reported.
///
/// All calls are serialized through the storage mutex, so matching a record
/// and charging its budget happen as one step. Neither entry point reports
/// failure to the caller: absent, expired or exhausted impressions all
/// produce an all-zero measurement, and internal failures are only logged and
/// counted.
pub struct AttributionService<IS, C, M, T = NoopTelemetry> {
    config: AttributionConfig,
    storage: Mutex<IS>,
    clock: C,
    submitter: MeasurementSubmitter<M>,
    telemetry: T,
}

impl<IS, C, M, T> AttributionService<IS, C, M, T>
where
    IS: ImpressionStorage,
    AttributionError: From<IS::Error>,
    C: Clock,
    M: MeasurementSink,
    T: TelemetrySink,
{
    pub fn new(
        config: AttributionConfig,
        storage: IS,
        clock: C,
        sink: M,
        telemetry: T,
    ) -> Self {
        Self {
            config,
            storage: Mutex::new(storage),
            clock,
            submitter: MeasurementSubmitter::new(sink),
            telemetry,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.config.is_enabled()
    }

    /// Records a view or click of the ad `ad_identifier`, shown at
    /// `ad_index` on `source_site` and pointing to `target_site`.
    pub fn record_event(
        &self,
        source_site: &str,
        interaction_type: InteractionType,
        ad_index: u32,
        ad_identifier: &str,
        target_site: &str,
    ) {
        if !self.is_enabled() {
            warn!("Private attribution disabled, ignoring event");
            return;
        }

        info!("recordEvent(source_site={source_site}, interaction_type={interaction_type}, ad_index={ad_index}, ad_identifier={ad_identifier}, target_site={target_site})");

        let key = ImpressionKey::new(source_site, target_site, ad_identifier);
        match self.try_record_event(key, interaction_type, ad_index) {
            Ok(()) => self.count(Operation::SaveImpression, Label::Success),
            Err(err) => {
                error!("Failed to save impression: {err}");
                self.count(Operation::SaveImpression, Label::Error);
            }
        }
    }

    /// Attributes a conversion and submits the resulting histogram, all-zero
    /// when nothing can be attributed.
    pub fn record_conversion(&self, request: &ConversionRequest) {
        if !self.is_enabled() {
            warn!("Private attribution disabled, ignoring conversion");
            return;
        }

        info!(
            "recordConversion(target_site={}, task_id={}, histogram_size={}, lookback_days={}, interaction_type={:?}, ad_identifiers={:?}, source_sites={:?})",
            request.target_site(),
            request.task_id(),
            request.histogram_size(),
            request.lookback_days(),
            request.interaction_type(),
            request.ad_identifiers(),
            request.source_sites(),
        );

        match self.try_record_conversion(request) {
            Ok(()) => self.count(Operation::MeasureConversion, Label::Success),
            Err(err) => {
                error!("Failed to measure conversion: {err}");
                self.count(Operation::MeasureConversion, Label::Error);
            }
        }
    }

    /// Gets the stored record for `key`, for local inspection.
    pub fn impression(
        &self,
        key: &ImpressionKey,
    ) -> Result<Option<ImpressionRecord>, AttributionError> {
        Ok(self.storage().get(key)?)
    }

    /// Gets the remaining conversion budget of the record under `key`.
    /// WARNING: this method is for testing and local visualization only.
    pub fn remaining_budget(
        &self,
        key: &ImpressionKey,
    ) -> Result<Option<u32>, AttributionError> {
        let mut storage = self.storage();
        Ok(BudgetLedger::new(&mut *storage).remaining_budget(key)?)
    }

    /// Drops every impression and its budget, e.g. when the profile's
    /// history is cleared.
    pub fn clear(&self) -> Result<(), AttributionError> {
        info!("clear()");
        self.storage().clear()?;
        info!("Successfully cleared impressions");
        Ok(())
    }

    fn try_record_event(
        &self,
        key: ImpressionKey,
        interaction_type: InteractionType,
        ad_index: u32,
    ) -> Result<(), AttributionError> {
        let now = self.clock.now();
        let mut storage = self.storage();

        self.count(Operation::SaveImpression, Label::model(Some(interaction_type)));
        let record = storage.upsert(
            key,
            interaction_type,
            ad_index,
            now,
            self.config.max_conversions,
        )?;

        debug!("Saved impression {record:?}");
        Ok(())
    }

    fn try_record_conversion(
        &self,
        request: &ConversionRequest,
    ) -> Result<(), AttributionError> {
        let now = self.clock.now();

        let measurement = {
            let mut storage = self.storage();
            self.count(
                Operation::MeasureConversion,
                Label::model(request.interaction_type()),
            );

            let ad_index = match find_impression(&*storage, request, now)? {
                Some(found) => {
                    let status = BudgetLedger::new(&mut *storage)
                        .try_consume(&found.record.key)?;
                    status.is_continue().then(|| found.ad_index())
                }
                None => None,
            };
            histogram::encode(request.histogram_size(), ad_index)
        };

        // The budget stays spent even if the submission fails.
        self.submitter
            .submit(request.task_id(), measurement)
            .map_err(|err| AttributionError::Submission(err.to_string()))
    }

    fn storage(&self) -> MutexGuard<'_, IS> {
        self.storage.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn count(&self, operation: Operation, label: Label) {
        self.telemetry.add(operation, label, 1);
    }
}
