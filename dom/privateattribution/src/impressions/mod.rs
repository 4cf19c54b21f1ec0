pub mod hashmap_impression_storage;
pub mod record;
pub mod traits;
