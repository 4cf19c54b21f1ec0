use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{
    budget::{conversion_filter::ConversionBudgetFilter, traits::Filter as _},
    error::AttributionError,
    impressions::record::ImpressionRecord,
};

/// Kind of ad interaction observed on a source site.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum InteractionType {
    View,
    Click,
}

impl InteractionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            InteractionType::View => "view",
            InteractionType::Click => "click",
        }
    }
}

impl fmt::Display for InteractionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InteractionType {
    type Err = AttributionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "view" => Ok(InteractionType::View),
            "click" => Ok(InteractionType::Click),
            other => {
                Err(AttributionError::UnknownInteractionType(other.to_string()))
            }
        }
    }
}

/// Identity of an impression record. At most one record exists per key.
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct ImpressionKey {
    /// Publisher site where the ad was shown.
    pub source_site: String,

    /// Advertiser site the ad points to.
    pub target_site: String,

    pub ad_identifier: String,
}

impl ImpressionKey {
    pub fn new(
        source_site: impl Into<String>,
        target_site: impl Into<String>,
        ad_identifier: impl Into<String>,
    ) -> Self {
        Self {
            source_site: source_site.into(),
            target_site: target_site.into(),
            ad_identifier: ad_identifier.into(),
        }
    }
}

impl fmt::Display for ImpressionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} -> {} [{}]",
            self.source_site, self.target_site, self.ad_identifier
        )
    }
}

/// Interface to store impression records by key.
pub trait ImpressionStorage {
    type Error;

    /// Get the record with the given key.
    /// Returns None if no event was ever recorded for it.
    fn get(
        &self,
        key: &ImpressionKey,
    ) -> Result<Option<ImpressionRecord>, Self::Error>;

    /// Store the record under its key, replacing any previous record.
    fn put(&mut self, record: ImpressionRecord) -> Result<(), Self::Error>;

    /// All records attributed to `target_site`, sorted by key.
    fn records_for_target(
        &self,
        target_site: &str,
    ) -> Result<Vec<ImpressionRecord>, Self::Error>;

    /// Forget every record, budgets included.
    fn clear(&mut self) -> Result<(), Self::Error>;

    /// Records an interaction. A new key gets a fresh budget of `capacity`
    /// conversions; an existing key has its interaction type, ad index and
    /// timestamp overwritten while its budget carries over.
    fn upsert(
        &mut self,
        key: ImpressionKey,
        interaction_type: InteractionType,
        ad_index: u32,
        now: u64,
        capacity: u32,
    ) -> Result<ImpressionRecord, Self::Error> {
        let record = match self.get(&key)? {
            Some(mut record) => {
                record.interaction_type = interaction_type;
                record.ad_index = ad_index;
                record.recorded_at = now;
                record
            }
            None => ImpressionRecord {
                key,
                interaction_type,
                ad_index,
                recorded_at: now,
                budget: ConversionBudgetFilter::new(capacity),
            },
        };
        self.put(record.clone())?;
        Ok(record)
    }
}
