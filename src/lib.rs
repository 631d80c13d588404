//! SDOH Map CLI Library
//!
//! Data access layer for social-determinants-of-health metrics: a static
//! metric registry, a Census ACS client, a TTL'd flat-file cache, and the
//! manager that decides when to serve cached data and when to refetch.

pub mod cache;
pub mod cli;
pub mod data;
pub mod export;
pub mod manager;
pub mod metrics;
