//! SiteForge Core
//!
//! Core types shared by the SiteForge services.
//!
//! This crate contains:
//! - Domain types: business profiles, file sets, deployment results, pipeline stages
//! - DTOs: request/response bodies exchanged between the CLI and the server

pub mod domain;
pub mod dto;
