//! Data models: raw records, invoice results and configuration.

pub mod config;
pub mod invoice;
pub mod record;
