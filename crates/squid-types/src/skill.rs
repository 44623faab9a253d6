//! Installed skill inventory.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A skill the agent advertises in its system preamble.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Skill {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub file_path: String,
    /// Whether the skill is listed on the marketplace.
    #[serde(default)]
    pub marketplace_listed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for installing a skill.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewSkill {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub file_path: String,
}
