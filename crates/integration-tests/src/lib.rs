//! Shared fixtures for the service-level and API-level test suites.

pub mod fixtures;
