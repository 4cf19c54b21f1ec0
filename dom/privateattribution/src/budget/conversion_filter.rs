use serde::{Deserialize, Serialize};

use crate::budget::traits::{Filter, FilterStatus};

/// Counts the conversions an impression has been attributed to, up to a fixed
/// capacity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionBudgetFilter {
    pub consumed: u32,
    pub capacity: u32,
}

impl Filter for ConversionBudgetFilter {
    type Budget = u32;

    fn new(capacity: u32) -> Self {
        Self {
            consumed: 0,
            capacity,
        }
    }

    fn can_consume(&self, budget: &u32) -> FilterStatus {
        match self.consumed.checked_add(*budget) {
            Some(total) if total <= self.capacity => FilterStatus::Continue,
            _ => FilterStatus::OutOfBudget,
        }
    }

    fn try_consume(&mut self, budget: &u32) -> FilterStatus {
        let status = self.can_consume(budget);
        if status == FilterStatus::Continue {
            self.consumed += budget;
        }
        status
    }

    fn remaining_budget(&self) -> u32 {
        self.capacity.saturating_sub(self.consumed)
    }
}

impl ConversionBudgetFilter {
    pub fn is_exhausted(&self) -> bool {
        self.remaining_budget() == 0
    }
}
