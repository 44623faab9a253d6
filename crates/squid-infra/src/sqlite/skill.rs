//! SQLite skill inventory.

use chrono::Utc;
use sqlx::Row;
use squid_core::skill::SkillRepository;
use squid_types::error::RepositoryError;
use squid_types::skill::{NewSkill, Skill};

use super::pool::DatabasePool;
use super::{format_datetime, parse_datetime, query_err};

#[derive(Clone)]
pub struct SqliteSkillRepository {
    pool: DatabasePool,
}

impl SqliteSkillRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

struct SkillRow {
    id: String,
    name: String,
    description: String,
    file_path: String,
    marketplace_listed: i64,
    created_at: String,
    updated_at: String,
}

impl SkillRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            description: row.try_get("description")?,
            file_path: row.try_get("file_path")?,
            marketplace_listed: row.try_get("marketplace_listed")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }

    fn into_skill(self) -> Result<Skill, RepositoryError> {
        Ok(Skill {
            id: self.id,
            name: self.name,
            description: self.description,
            file_path: self.file_path,
            marketplace_listed: self.marketplace_listed != 0,
            created_at: parse_datetime(&self.created_at)?,
            updated_at: parse_datetime(&self.updated_at)?,
        })
    }
}

impl SkillRepository for SqliteSkillRepository {
    async fn list(&self) -> Result<Vec<Skill>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT id, name, description, file_path, marketplace_listed, created_at, updated_at \
             FROM skills ORDER BY created_at DESC, rowid DESC",
        )
        .fetch_all(&self.pool.reader)
        .await
        .map_err(query_err)?;

        rows.iter()
            .map(|row| SkillRow::from_row(row).map_err(query_err)?.into_skill())
            .collect()
    }

    async fn add(&self, skill: &NewSkill) -> Result<Skill, RepositoryError> {
        if skill.name.trim().is_empty() {
            return Err(RepositoryError::InvalidInput(
                "skill name must not be empty".into(),
            ));
        }
        let stamp = format_datetime(&Utc::now());

        sqlx::query(
            r#"INSERT INTO skills (id, name, description, file_path, marketplace_listed, created_at, updated_at)
               VALUES (?, ?, ?, ?, 0, ?, ?)
               ON CONFLICT (id) DO UPDATE SET
                   name = excluded.name,
                   description = excluded.description,
                   file_path = excluded.file_path,
                   updated_at = excluded.updated_at"#,
        )
        .bind(&skill.id)
        .bind(&skill.name)
        .bind(&skill.description)
        .bind(&skill.file_path)
        .bind(&stamp)
        .bind(&stamp)
        .execute(&self.pool.writer)
        .await
        .map_err(query_err)?;

        let row = sqlx::query(
            "SELECT id, name, description, file_path, marketplace_listed, created_at, updated_at \
             FROM skills WHERE id = ?",
        )
        .bind(&skill.id)
        .fetch_one(&self.pool.writer)
        .await
        .map_err(query_err)?;

        SkillRow::from_row(&row).map_err(query_err)?.into_skill()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sqlite::test_pool;

    fn new_skill(id: &str, name: &str) -> NewSkill {
        NewSkill {
            id: id.into(),
            name: name.into(),
            description: format!("{name} things"),
            file_path: format!("skills/{id}.md"),
        }
    }

    #[tokio::test]
    async fn test_add_and_list() {
        let repo = SqliteSkillRepository::new(test_pool().await);
        assert!(repo.list().await.unwrap().is_empty());

        let added = repo.add(&new_skill("s1", "summarize")).await.unwrap();
        assert_eq!(added.name, "summarize");
        assert!(!added.marketplace_listed);

        repo.add(&new_skill("s2", "translate")).await.unwrap();
        let names: Vec<String> = repo.list().await.unwrap().into_iter().map(|s| s.name).collect();
        assert_eq!(names, vec!["translate", "summarize"]);
    }

    #[tokio::test]
    async fn test_add_existing_id_updates_in_place() {
        let repo = SqliteSkillRepository::new(test_pool().await);
        let first = repo.add(&new_skill("s1", "summarize")).await.unwrap();

        let mut changed = new_skill("s1", "summarize");
        changed.description = "Shorter".into();
        let second = repo.add(&changed).await.unwrap();

        assert_eq!(second.description, "Shorter");
        assert_eq!(second.created_at, first.created_at);
        assert_eq!(repo.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_blank_name_rejected() {
        let repo = SqliteSkillRepository::new(test_pool().await);
        let err = repo.add(&new_skill("s1", "  ")).await.unwrap_err();
        assert!(matches!(err, RepositoryError::InvalidInput(_)));
    }
}
