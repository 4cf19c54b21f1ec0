pub mod conversion_request;
pub mod histogram;
pub mod last_interaction;
