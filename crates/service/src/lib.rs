//! Service layer for the counter and info resources.
//! - Every operation runs inside one lock scope and one database transaction.
//! - Missing records are seeded from the configured defaults, never reported.
//! - Validation and entity definitions live in the `models` crate.

pub mod errors;
pub mod locks;
pub mod counter_service;
pub mod info_service;
#[cfg(test)]
pub mod test_support;

pub use counter_service::CounterService;
pub use info_service::InfoService;
