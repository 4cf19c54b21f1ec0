pub mod conversion_filter;
pub mod ledger;
pub mod traits;
