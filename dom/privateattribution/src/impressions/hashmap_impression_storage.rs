use std::collections::HashMap;

use log::trace;

use crate::impressions::{
    record::ImpressionRecord,
    traits::{ImpressionKey, ImpressionStorage},
};

/// A simple in-memory impression storage, living as long as the profile
/// session that owns it.
#[derive(Debug, Default)]
pub struct HashMapImpressionStorage {
    records: HashMap<ImpressionKey, ImpressionRecord>,
}

impl HashMapImpressionStorage {
    pub fn new() -> Self {
        Self {
            records: HashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl ImpressionStorage for HashMapImpressionStorage {
    type Error = anyhow::Error;

    fn get(
        &self,
        key: &ImpressionKey,
    ) -> Result<Option<ImpressionRecord>, Self::Error> {
        Ok(self.records.get(key).cloned())
    }

    fn put(&mut self, record: ImpressionRecord) -> Result<(), Self::Error> {
        trace!("Storing impression record {record:?}");
        self.records.insert(record.key.clone(), record);
        Ok(())
    }

    fn records_for_target(
        &self,
        target_site: &str,
    ) -> Result<Vec<ImpressionRecord>, Self::Error> {
        let mut records: Vec<_> = self
            .records
            .values()
            .filter(|record| record.key.target_site == target_site)
            .cloned()
            .collect();
        records.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(records)
    }

    fn clear(&mut self) -> Result<(), Self::Error> {
        trace!("Dropping {} impression records", self.records.len());
        self.records.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        budget::traits::Filter as _, impressions::traits::InteractionType,
    };

    #[test]
    fn test_upsert_overwrites_in_place() -> Result<(), anyhow::Error> {
        let mut storage = HashMapImpressionStorage::new();
        let key = ImpressionKey::mock();

        let record =
            storage.upsert(key.clone(), InteractionType::View, 2, 100, 2)?;
        assert_eq!(record.remaining_budget(), 2);

        // spend one conversion, then overwrite with a click
        let mut spent = storage.get(&key)?.unwrap();
        spent.budget.try_consume(&1);
        storage.put(spent)?;

        storage.upsert(key.clone(), InteractionType::Click, 3, 200, 2)?;
        assert_eq!(storage.len(), 1);

        let stored = storage.get(&key)?.unwrap();
        assert_eq!(stored.interaction_type, InteractionType::Click);
        assert_eq!(stored.ad_index, 3);
        assert_eq!(stored.recorded_at, 200);
        assert_eq!(stored.remaining_budget(), 1, "budget survives overwrite");

        Ok(())
    }

    #[test]
    fn test_records_for_target_sorted_by_key() -> Result<(), anyhow::Error> {
        let mut storage = HashMapImpressionStorage::new();
        for (source, target, ad) in [
            ("z.example", "shop.example", "b"),
            ("a.example", "shop.example", "b"),
            ("a.example", "shop.example", "a"),
            ("a.example", "other.example", "a"),
        ] {
            storage.upsert(
                ImpressionKey::new(source, target, ad),
                InteractionType::View,
                0,
                1,
                2,
            )?;
        }

        let keys: Vec<_> = storage
            .records_for_target("shop.example")?
            .into_iter()
            .map(|record| record.key)
            .collect();
        assert_eq!(
            keys,
            vec![
                ImpressionKey::new("a.example", "shop.example", "a"),
                ImpressionKey::new("a.example", "shop.example", "b"),
                ImpressionKey::new("z.example", "shop.example", "b"),
            ]
        );

        storage.clear()?;
        assert!(storage.is_empty());
        assert!(storage.get(&ImpressionKey::mock())?.is_none());

        Ok(())
    }
}
