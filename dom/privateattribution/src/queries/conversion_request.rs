use crate::{
    error::AttributionError, impressions::traits::InteractionType,
};

#[derive(Debug, Clone)]
pub struct ConversionConfig {
    /// Advertiser site reporting the conversion.
    pub target_site: String,

    /// Aggregation task the measurement is submitted to.
    pub task_id: String,

    pub histogram_size: usize,
    pub lookback_days: u32,

    /// Preferred interaction type. `None` accepts any type.
    pub interaction_type: Option<InteractionType>,
}

/// A conversion to attribute. Never stored.
#[derive(Debug, Clone)]
pub struct ConversionRequest {
    target_site: String,
    task_id: String,
    histogram_size: usize,
    lookback_days: u32,
    interaction_type: Option<InteractionType>,
    ad_identifiers: Vec<String>,
    source_sites: Option<Vec<String>>,
}

impl ConversionRequest {
    /// Constructs a new `ConversionRequest`, validating that
    /// `histogram_size` is > 0.
    ///
    /// An empty `ad_identifiers` list accepts every ad stored for the target
    /// site. `source_sites` of `None` accepts every source site, while an
    /// empty list accepts none.
    /// Duplicate ad identifiers are dropped, keeping the first occurrence.
    pub fn new(
        config: ConversionConfig,
        ad_identifiers: Vec<String>,
        source_sites: Option<Vec<String>>,
    ) -> Result<Self, AttributionError> {
        if config.histogram_size == 0 {
            return Err(AttributionError::InvalidRequest(
                "histogram_size must be greater than 0",
            ));
        }

        let mut unique_ads: Vec<String> =
            Vec::with_capacity(ad_identifiers.len());
        for ad in ad_identifiers {
            if !unique_ads.contains(&ad) {
                unique_ads.push(ad);
            }
        }

        Ok(Self {
            target_site: config.target_site,
            task_id: config.task_id,
            histogram_size: config.histogram_size,
            lookback_days: config.lookback_days,
            interaction_type: config.interaction_type,
            ad_identifiers: unique_ads,
            source_sites,
        })
    }

    pub fn target_site(&self) -> &str {
        &self.target_site
    }

    pub fn task_id(&self) -> &str {
        &self.task_id
    }

    pub fn histogram_size(&self) -> usize {
        self.histogram_size
    }

    pub fn lookback_days(&self) -> u32 {
        self.lookback_days
    }

    pub fn interaction_type(&self) -> Option<InteractionType> {
        self.interaction_type
    }

    pub fn ad_identifiers(&self) -> &[String] {
        &self.ad_identifiers
    }

    pub fn source_sites(&self) -> Option<&[String]> {
        self.source_sites.as_deref()
    }
}
