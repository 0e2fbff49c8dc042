//! Service Module
//!
//! Business logic between the HTTP handlers and the build pipeline.

pub mod site;

pub use site as site_service;
