//! Last-interaction attribution: picks the single impression a conversion is
//! attributed to.
//!
//! Selection runs in two passes over the live candidates (present, within
//! the lookback window, budget left):
//!
//! 1. Type-preferred: the most recent candidate whose interaction type equals
//!    the requested one.
//! 2. Fallback: if no candidate has the requested type, the most recent
//!    candidate of any type.
//!
//! A click conversion is therefore never attributed to another site's view
//! while a matching click exists, but a lone signal of the "wrong" type still
//! counts. Among candidates recorded at the same millisecond the first one in
//! iteration order wins: source sites in request order, then ad identifiers in
//! request order.

use log::{debug, trace};

use crate::{
    impressions::{
        record::ImpressionRecord,
        traits::{ImpressionKey, ImpressionStorage},
    },
    queries::conversion_request::ConversionRequest,
};

/// Which pass produced a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchPass {
    TypePreferred,
    Fallback,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImpressionMatch {
    pub record: ImpressionRecord,
    pub pass: MatchPass,
}

impl ImpressionMatch {
    pub fn ad_index(&self) -> u32 {
        self.record.ad_index
    }
}

/// Finds the impression `request` should be attributed to at time `now`.
pub fn find_impression<IS: ImpressionStorage>(
    storage: &IS,
    request: &ConversionRequest,
    now: u64,
) -> Result<Option<ImpressionMatch>, IS::Error> {
    let candidates: Vec<ImpressionRecord> = candidates(storage, request)?
        .into_iter()
        .filter(|record| is_live(record, request, now))
        .collect();

    let preferred = most_recent(candidates.iter().filter(|record| {
        request
            .interaction_type()
            .map_or(true, |ty| record.interaction_type == ty)
    }));
    if let Some(record) = preferred {
        debug!("Type-preferred match for {}: {record:?}", request.task_id());
        return Ok(Some(ImpressionMatch {
            record: record.clone(),
            pass: MatchPass::TypePreferred,
        }));
    }

    let fallback = most_recent(candidates.iter());
    if let Some(record) = fallback {
        debug!("Fallback match for {}: {record:?}", request.task_id());
        return Ok(Some(ImpressionMatch {
            record: record.clone(),
            pass: MatchPass::Fallback,
        }));
    }

    debug!("No impression matches conversion for {}", request.task_id());
    Ok(None)
}

/// Gathers the stored records named by the request, in tie-break order.
fn candidates<IS: ImpressionStorage>(
    storage: &IS,
    request: &ConversionRequest,
) -> Result<Vec<ImpressionRecord>, IS::Error> {
    let ads = request.ad_identifiers();

    let sources = match request.source_sites() {
        Some(sources) if !ads.is_empty() => {
            return lookup_each(storage, request, sources, ads);
        }
        sources => sources,
    };

    // wildcard lookup, in storage key order
    let matching: Vec<ImpressionRecord> = storage
        .records_for_target(request.target_site())?
        .into_iter()
        .filter(|record| {
            ads.is_empty() || ads.contains(&record.key.ad_identifier)
        })
        .collect();
    let Some(sources) = sources else {
        return Ok(matching);
    };

    // keep request order on the source site axis
    let ordered = sources
        .iter()
        .flat_map(|source| {
            matching
                .iter()
                .filter(move |record| &record.key.source_site == source)
                .cloned()
        })
        .collect();
    Ok(ordered)
}

/// Looks up every (source site, ad) pair of the request. An empty source list
/// names no impression at all.
fn lookup_each<IS: ImpressionStorage>(
    storage: &IS,
    request: &ConversionRequest,
    sources: &[String],
    ads: &[String],
) -> Result<Vec<ImpressionRecord>, IS::Error> {
    let mut records = vec![];
    for source in sources {
        for ad in ads {
            let key = ImpressionKey::new(
                source.as_str(),
                request.target_site(),
                ad.as_str(),
            );
            match storage.get(&key)? {
                Some(record) => records.push(record),
                None => trace!("No impression stored for {key}"),
            }
        }
    }
    Ok(records)
}

fn is_live(
    record: &ImpressionRecord,
    request: &ConversionRequest,
    now: u64,
) -> bool {
    if record.is_expired(now, request.lookback_days()) {
        trace!(
            "Skipping {}: recorded at {}, outside the {} day window",
            record.key,
            record.recorded_at,
            request.lookback_days()
        );
        return false;
    }
    if record.budget.is_exhausted() {
        trace!("Skipping {}: conversion budget exhausted", record.key);
        return false;
    }
    true
}

/// Latest record, keeping the earliest one in iteration order on ties.
fn most_recent<'a>(
    records: impl Iterator<Item = &'a ImpressionRecord>,
) -> Option<&'a ImpressionRecord> {
    records.fold(None, |best, record| match best {
        Some(best) if best.recorded_at >= record.recorded_at => Some(best),
        _ => Some(record),
    })
}
