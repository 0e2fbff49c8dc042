//! Data Transfer Objects for the SiteForge HTTP API
//!
//! Request and response bodies exchanged between the CLI (or any other
//! caller) and the server.

pub mod site;
