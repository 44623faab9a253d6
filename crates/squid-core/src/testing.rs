//! In-memory implementations of the core ports, shared by unit tests.

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex};

use chrono::{Duration, Utc};
use squid_types::error::{RepositoryError, ScanError};
use squid_types::llm::{
    CompletionRequest, CompletionResponse, LlmError, StopReason, Usage,
};
use squid_types::memory::{ChannelCount, MemoryRecord, MemoryStats, NewMemoryRecord};
use squid_types::post::{NewPostLogEntry, PostLogEntry};
use squid_types::scan::{NewScan, ScanRecord, TriggerType};
use squid_types::skill::{NewSkill, Skill};

use crate::llm::provider::LlmProvider;
use crate::memory::store::MemoryRepository;
use crate::notify::Notifier;
use crate::post::PostLogRepository;
use crate::scan::repository::ScanRepository;
use crate::scan::scanner::{ScanRequest, Scanner};
use crate::skill::SkillRepository;

// ---------------------------------------------------------------------------
// Memory
// ---------------------------------------------------------------------------

#[derive(Clone, Default)]
pub struct InMemoryMemoryRepository {
    records: Arc<Mutex<Vec<MemoryRecord>>>,
    // Never reset by purge, like AUTOINCREMENT.
    last_id: Arc<AtomicI64>,
}

impl InMemoryMemoryRepository {
    pub fn all(&self) -> Vec<MemoryRecord> {
        self.records.lock().unwrap().clone()
    }

    fn newest_first<F: Fn(&MemoryRecord) -> bool>(&self, keep: F, limit: u32) -> Vec<MemoryRecord> {
        self.records
            .lock()
            .unwrap()
            .iter()
            .rev()
            .filter(|r| keep(r))
            .take(limit as usize)
            .cloned()
            .collect()
    }
}

impl MemoryRepository for InMemoryMemoryRepository {
    async fn append(&self, record: &NewMemoryRecord) -> Result<MemoryRecord, RepositoryError> {
        let mut records = self.records.lock().unwrap();
        let id = self.last_id.fetch_add(1, Ordering::SeqCst) + 1;
        let stored = MemoryRecord {
            id,
            channel: record.channel.clone(),
            role: record.role,
            content: record.content.clone(),
            metadata: record.metadata.clone(),
            created_at: Utc::now() + Duration::microseconds(id),
        };
        records.push(stored.clone());
        Ok(stored)
    }

    async fn recent(&self, channel: &str, limit: u32) -> Result<Vec<MemoryRecord>, RepositoryError> {
        let mut out = self.newest_first(|r| r.channel == channel, limit);
        out.reverse();
        Ok(out)
    }

    async fn recent_across_channels(&self, limit: u32) -> Result<Vec<MemoryRecord>, RepositoryError> {
        let mut out = self.newest_first(|_| true, limit);
        out.reverse();
        Ok(out)
    }

    async fn search(&self, query: &str, limit: u32) -> Result<Vec<MemoryRecord>, RepositoryError> {
        let needle = query.to_ascii_lowercase();
        Ok(self.newest_first(|r| r.content.to_ascii_lowercase().contains(&needle), limit))
    }

    async fn purge(&self, channel: Option<&str>) -> Result<u64, RepositoryError> {
        let mut records = self.records.lock().unwrap();
        let before = records.len();
        match channel {
            Some(ch) => records.retain(|r| r.channel != ch),
            None => records.clear(),
        }
        Ok((before - records.len()) as u64)
    }

    async fn stats(&self) -> Result<MemoryStats, RepositoryError> {
        let records = self.records.lock().unwrap();
        let mut channels: Vec<ChannelCount> = Vec::new();
        for r in records.iter() {
            match channels.iter_mut().find(|c| c.channel == r.channel) {
                Some(c) => c.count += 1,
                None => channels.push(ChannelCount {
                    channel: r.channel.clone(),
                    count: 1,
                }),
            }
        }
        channels.sort_by(|a, b| a.channel.cmp(&b.channel));
        Ok(MemoryStats {
            total: records.len() as u64,
            channels,
        })
    }
}

// ---------------------------------------------------------------------------
// Scans
// ---------------------------------------------------------------------------

#[derive(Clone, Default)]
pub struct InMemoryScanRepository {
    scans: Arc<Mutex<Vec<ScanRecord>>>,
}

impl ScanRepository for InMemoryScanRepository {
    async fn insert(&self, scan: &ScanRecord) -> Result<(), RepositoryError> {
        let mut scans = self.scans.lock().unwrap();
        if scans.iter().any(|s| s.id == scan.id) {
            return Err(RepositoryError::InvalidInput(format!("duplicate scan id {}", scan.id)));
        }
        scans.push(scan.clone());
        Ok(())
    }

    async fn latest(&self) -> Result<Option<ScanRecord>, RepositoryError> {
        Ok(self.history(1).await?.into_iter().next())
    }

    async fn history(&self, limit: u32) -> Result<Vec<ScanRecord>, RepositoryError> {
        let scans = self.scans.lock().unwrap();
        let mut indexed: Vec<(usize, &ScanRecord)> = scans.iter().enumerate().collect();
        indexed.sort_by(|a, b| b.1.scanned_at.cmp(&a.1.scanned_at).then(b.0.cmp(&a.0)));
        Ok(indexed
            .into_iter()
            .take(limit as usize)
            .map(|(_, s)| s.clone())
            .collect())
    }

    async fn count_by_trigger(&self, trigger: TriggerType) -> Result<u32, RepositoryError> {
        let scans = self.scans.lock().unwrap();
        Ok(scans.iter().filter(|s| s.trigger_type == trigger).count() as u32)
    }
}

// ---------------------------------------------------------------------------
// Posts and skills
// ---------------------------------------------------------------------------

#[derive(Clone, Default)]
pub struct InMemoryPostLog {
    entries: Arc<Mutex<Vec<PostLogEntry>>>,
}

impl PostLogRepository for InMemoryPostLog {
    async fn log(&self, entry: &NewPostLogEntry) -> Result<PostLogEntry, RepositoryError> {
        let mut entries = self.entries.lock().unwrap();
        let stored = PostLogEntry {
            id: entries.len() as i64 + 1,
            channel: entry.channel.clone(),
            content: entry.content.clone(),
            post_id: entry.post_id.clone(),
            status: entry.status,
            created_at: Utc::now(),
        };
        entries.push(stored.clone());
        Ok(stored)
    }

    async fn recent(
        &self,
        channel: Option<&str>,
        limit: u32,
    ) -> Result<Vec<PostLogEntry>, RepositoryError> {
        let entries = self.entries.lock().unwrap();
        Ok(entries
            .iter()
            .rev()
            .filter(|e| channel.is_none_or(|ch| e.channel == ch))
            .take(limit as usize)
            .cloned()
            .collect())
    }
}

#[derive(Clone, Default)]
pub struct InMemorySkillRepository {
    skills: Arc<Mutex<Vec<Skill>>>,
}

impl SkillRepository for InMemorySkillRepository {
    async fn list(&self) -> Result<Vec<Skill>, RepositoryError> {
        Ok(self.skills.lock().unwrap().iter().rev().cloned().collect())
    }

    async fn add(&self, skill: &NewSkill) -> Result<Skill, RepositoryError> {
        let now = Utc::now();
        let stored = Skill {
            id: skill.id.clone(),
            name: skill.name.clone(),
            description: skill.description.clone(),
            file_path: skill.file_path.clone(),
            marketplace_listed: false,
            created_at: now,
            updated_at: now,
        };
        self.skills.lock().unwrap().push(stored.clone());
        Ok(stored)
    }
}

// ---------------------------------------------------------------------------
// Collaborators
// ---------------------------------------------------------------------------

/// Provider that echoes the last user turn, or fails with a scripted error.
#[derive(Clone, Default)]
pub struct ScriptedProvider {
    pub fail_with: Option<fn() -> LlmError>,
    pub seen: Arc<Mutex<Vec<CompletionRequest>>>,
}

impl LlmProvider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse, LlmError> {
        self.seen.lock().unwrap().push(request.clone());
        if let Some(make_err) = self.fail_with {
            return Err(make_err());
        }
        let last = request
            .messages
            .last()
            .map(|m| m.content.clone())
            .unwrap_or_default();
        Ok(CompletionResponse {
            id: "msg_test".to_string(),
            content: format!("echo: {last}"),
            model: request.model.clone(),
            stop_reason: StopReason::EndTurn,
            usage: Usage {
                input_tokens: 11,
                output_tokens: 7,
            },
        })
    }
}

/// Scanner returning a fixed risk score, optionally after a delay.
#[derive(Clone, Default)]
pub struct FixedScanner {
    pub risk_score: i64,
    pub delay: std::time::Duration,
    pub requests: Arc<Mutex<Vec<ScanRequest>>>,
}

impl Scanner for FixedScanner {
    async fn scan(&self, request: &ScanRequest) -> Result<NewScan, ScanError> {
        self.requests.lock().unwrap().push(request.clone());
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        Ok(NewScan {
            risk_score: self.risk_score,
            scanner_version: "test-1".to_string(),
            findings: vec![serde_json::json!({"rule": "demo"})],
            ..NewScan::default()
        })
    }
}

#[derive(Clone, Default)]
pub struct RecordingNotifier {
    pub sent: Arc<Mutex<Vec<String>>>,
}

impl Notifier for RecordingNotifier {
    fn name(&self) -> &str {
        "recording"
    }

    async fn notify(&self, message: &str) {
        self.sent.lock().unwrap().push(message.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use squid_types::memory::MessageRole;

    #[tokio::test]
    async fn test_memory_ids_keep_increasing_after_purge() {
        let repo = InMemoryMemoryRepository::default();
        let first = repo
            .append(&NewMemoryRecord::new("chat", MessageRole::User, "one"))
            .await
            .unwrap();
        repo.purge(None).await.unwrap();

        let second = repo
            .append(&NewMemoryRecord::new("chat", MessageRole::User, "two"))
            .await
            .unwrap();

        assert!(second.id > first.id);
    }
}
