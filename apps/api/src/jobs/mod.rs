// Job interaction tracking: fingerprinting listings and the favorite/applied
// record lifecycle. Storage goes through the JobRepository trait only.

pub mod cache;
pub mod handlers;
pub mod identity;
#[cfg(test)]
pub mod memory;
pub mod repository;
pub mod store;
