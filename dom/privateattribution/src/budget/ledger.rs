use log::debug;

use crate::{
    budget::traits::{Filter as _, FilterStatus},
    impressions::traits::{ImpressionKey, ImpressionStorage},
};

/// Conversion credits consumed by a single attribution.
pub const CONVERSION_COST: u32 = 1;

/// Spends conversion budget on the records held by an impression storage.
///
/// The ledger borrows the storage mutably, so a lookup and the following
/// decrement cannot interleave with another writer.
pub struct BudgetLedger<'a, IS: ImpressionStorage> {
    storage: &'a mut IS,
}

impl<'a, IS: ImpressionStorage> BudgetLedger<'a, IS> {
    pub fn new(storage: &'a mut IS) -> Self {
        Self { storage }
    }

    /// Spends one conversion from the record under `key`. Exhausted or missing
    /// records report `OutOfBudget` and are left untouched.
    pub fn try_consume(
        &mut self,
        key: &ImpressionKey,
    ) -> Result<FilterStatus, IS::Error> {
        let Some(mut record) = self.storage.get(key)? else {
            debug!("No impression record to charge for {key}");
            return Ok(FilterStatus::OutOfBudget);
        };

        let status = record.budget.try_consume(&CONVERSION_COST);
        if status.is_continue() {
            debug!(
                "Charged one conversion to {key}, {} left",
                record.remaining_budget()
            );
            self.storage.put(record)?;
        } else {
            debug!("Impression {key} is out of conversion budget");
        }
        Ok(status)
    }

    /// Gets the remaining budget for a record.
    /// WARNING: this method is for testing and local visualization only.
    pub fn remaining_budget(
        &self,
        key: &ImpressionKey,
    ) -> Result<Option<u32>, IS::Error> {
        let record = self.storage.get(key)?;
        Ok(record.map(|record| record.remaining_budget()))
    }
}
