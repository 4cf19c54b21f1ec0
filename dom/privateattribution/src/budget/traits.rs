use std::fmt::Debug;

/// Trait for a conversion budget filter.
pub trait Filter {
    type Budget: Clone + Debug;

    /// Initializes a new filter with a given capacity.
    fn new(capacity: Self::Budget) -> Self
    where
        Self: Sized;

    /// Checks if the filter has enough budget without consuming.
    fn can_consume(&self, budget: &Self::Budget) -> FilterStatus;

    /// Consumes `budget` if sufficient, otherwise leaves the filter untouched.
    /// Continue corresponds to CONTINUE, and OutOfBudget corresponds to HALT.
    fn try_consume(&mut self, budget: &Self::Budget) -> FilterStatus;

    /// Gets the remaining budget for this filter.
    /// WARNING: this method is for local visualization only.
    /// Its output should not be shared outside the device.
    fn remaining_budget(&self) -> Self::Budget;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterStatus {
    Continue,
    OutOfBudget,
}

impl FilterStatus {
    pub fn is_continue(&self) -> bool {
        *self == FilterStatus::Continue
    }
}
