//! SkillRepository trait definition.

use squid_types::error::RepositoryError;
use squid_types::skill::{NewSkill, Skill};

/// Inventory of installed skills, advertised in the system preamble.
pub trait SkillRepository: Send + Sync {
    /// All skills, most recently installed first.
    fn list(&self) -> impl std::future::Future<Output = Result<Vec<Skill>, RepositoryError>> + Send;

    fn add(
        &self,
        skill: &NewSkill,
    ) -> impl std::future::Future<Output = Result<Skill, RepositoryError>> + Send;
}
