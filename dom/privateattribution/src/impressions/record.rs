use serde::{Deserialize, Serialize};

use crate::{
    budget::{conversion_filter::ConversionBudgetFilter, traits::Filter as _},
    clock::days_to_millis,
    impressions::traits::{ImpressionKey, InteractionType},
};

/// Most recent interaction for one (source site, target site, ad) key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImpressionRecord {
    pub key: ImpressionKey,

    pub interaction_type: InteractionType,

    /// Histogram bucket of the ad. Not validated against any histogram size
    /// when recorded.
    pub ad_index: u32,

    /// Timestamp of the interaction, in milliseconds.
    pub recorded_at: u64,

    /// Conversions this record can still be attributed to.
    pub budget: ConversionBudgetFilter,
}

impl ImpressionRecord {
    pub fn remaining_budget(&self) -> u32 {
        self.budget.remaining_budget()
    }

    /// An interaction exactly `lookback_days` old is still eligible; one
    /// millisecond later it is not.
    pub fn is_expired(&self, now: u64, lookback_days: u32) -> bool {
        now.saturating_sub(self.recorded_at) > days_to_millis(lookback_days)
    }
}
