pub mod multiget;
pub mod sync_collection;
