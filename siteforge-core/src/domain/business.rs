//! Business profile domain types

use serde::{Deserialize, Serialize};

/// Description of the business a site is generated for
///
/// Produced by the wizard and stored by the profile service. The build
/// pipeline only reads the name (for workspace naming); the rest is handed
/// to the site generator untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BusinessProfile {
    pub name: String,
    #[serde(default)]
    pub tagline: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub services: Vec<String>,
}

impl BusinessProfile {
    /// Creates a profile with only a name set
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}
