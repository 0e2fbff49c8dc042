//! SiteForge Builder
//!
//! Turns a generated source file set into a deployed static site.
//!
//! Stages, each in its own module:
//! - `workspace`: per-invocation build directory with guaranteed removal
//! - `materialize`: writes sources into the workspace
//! - `executor`: runs the install and build commands under timeouts
//! - `harvest`: collects the text files of the build output
//! - `deploy`: uploads the harvest to the hosting API
//!
//! `pipeline::SitePipeline` runs them in order.

pub mod config;
pub mod deploy;
pub mod error;
pub mod executor;
pub mod harvest;
pub mod materialize;
pub mod pipeline;
pub mod workspace;

pub use config::{BuildConfig, CommandSpec};
pub use deploy::{Deployer, HostingDeployer};
pub use error::PipelineError;
pub use pipeline::SitePipeline;
