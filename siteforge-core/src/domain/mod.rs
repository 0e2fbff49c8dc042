//! Core domain types
//!
//! These types describe a single site build: the business it is built for,
//! the files going in and coming out, and how the run ended. They are shared
//! between the server (which receives them) and the builder (which acts on them).

pub mod business;
pub mod deployment;
pub mod pipeline;
pub mod site;
