//! Record store for the service: sea-orm entities for the `info` and
//! `statistic` tables, the typed `/setinfo` payload and the validation rules
//! that turn it into a new info record.

pub mod errors;
pub mod db;
pub mod info;
pub mod statistic;

#[cfg(test)]
mod tests;
