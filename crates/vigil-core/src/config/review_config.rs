use serde::{Deserialize, Serialize};

use super::defaults;

/// Review queue configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReviewConfig {
    /// Whether administrators may release items claimed by someone else.
    pub admin_override_enabled: bool,
    /// Identities allowed to act as administrators.
    pub admin_ids: Vec<String>,
}

impl Default for ReviewConfig {
    fn default() -> Self {
        Self {
            admin_override_enabled: defaults::DEFAULT_ADMIN_OVERRIDE_ENABLED,
            admin_ids: Vec::new(),
        }
    }
}
