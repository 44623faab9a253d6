//! Application state wiring all services together.
//!
//! AppState holds the concrete service instances used by both CLI and REST API.
//! Services are generic over repository/provider traits, but AppState pins
//! them to the concrete infra implementations.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Context;
use secrecy::SecretString;
use squid_core::chat::service::{ChatOptions, ChatService};
use squid_core::llm::box_provider::BoxLlmProvider;
use squid_core::memory::context::{ContextAssembler, ContextConfig};
use squid_core::memory::usage::UsageAccountant;
use squid_core::notify::{BoxNotifier, LogNotifier};
use squid_core::post::PostRecorder;
use squid_core::scan::ledger::{LedgerPolicy, ScanLedger};
use squid_core::scan::service::{ScanIdentity, ScanService};
use squid_infra::config::{ChannelStatus, Secrets};
use squid_infra::llm::create_provider;
use squid_infra::scanner::HttpScanner;
use squid_infra::sqlite::kv::SqliteKvStore;
use squid_infra::sqlite::memory::SqliteMemoryRepository;
use squid_infra::sqlite::pool::DatabasePool;
use squid_infra::sqlite::post_log::SqlitePostLogRepository;
use squid_infra::sqlite::scan::SqliteScanRepository;
use squid_infra::sqlite::skill::SqliteSkillRepository;
use squid_infra::twilio::{TwilioConfig, TwilioNotifier};
use squid_types::config::AgentSettings;
use tracing::{info, warn};

/// Concrete type aliases for the service generics pinned to infra implementations.
pub type ConcreteChatService = ChatService<SqliteMemoryRepository, SqliteSkillRepository>;

pub type ConcreteScanService = ScanService<SqliteScanRepository, HttpScanner>;

pub type ConcretePostRecorder = PostRecorder<SqlitePostLogRepository, SqliteMemoryRepository>;

pub type ConcreteUsageAccountant = UsageAccountant<SqliteMemoryRepository>;

/// Shared application state holding all services.
///
/// Used by both CLI commands and REST API handlers.
#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<AgentSettings>,
    pub channels: ChannelStatus,
    pub chat_service: Arc<ConcreteChatService>,
    pub scan_service: Arc<ConcreteScanService>,
    pub post_recorder: Arc<ConcretePostRecorder>,
    pub usage: Arc<ConcreteUsageAccountant>,
    pub memory: SqliteMemoryRepository,
    pub kv: SqliteKvStore,
    pub skills: SqliteSkillRepository,
    pub data_dir: PathBuf,
    pub db_pool: DatabasePool,
    pub started_at: Instant,
}

/// The collaborators that talk to the outside world.
pub struct Collaborators {
    pub provider: BoxLlmProvider,
    pub scanner: HttpScanner,
    pub notifier: BoxNotifier,
}

impl AppState {
    /// Initialize the application state: connect to DB, read secrets, wire services.
    pub async fn init(data_dir: PathBuf, settings: AgentSettings) -> anyhow::Result<Self> {
        let mut secrets = Secrets::from_env();
        warn_on_missing_config(&settings, &secrets);

        let db_pool = DatabasePool::open_in(&data_dir)
            .await
            .context("failed to open agent database")?;

        let channels = ChannelStatus::detect(&settings, &secrets);
        let collaborators = Collaborators {
            provider: create_provider(secrets.anthropic_api_key.take())?,
            scanner: HttpScanner::new(
                settings.squidbay.api_base.clone(),
                settings.squidbay.agent_id.clone(),
                secrets.squidbay_api_key.take(),
                Duration::from_secs(settings.scan.timeout_secs),
            )?,
            notifier: build_notifier(&settings, secrets.twilio_auth_token.take())?,
        };

        Ok(Self::assemble(data_dir, db_pool, settings, channels, collaborators))
    }

    /// Wire services over an open pool. Used by `init` and by tests.
    pub fn assemble(
        data_dir: PathBuf,
        db_pool: DatabasePool,
        settings: AgentSettings,
        channels: ChannelStatus,
        collaborators: Collaborators,
    ) -> Self {
        let memory = SqliteMemoryRepository::new(db_pool.clone());
        let skills = SqliteSkillRepository::new(db_pool.clone());

        let chat_service = ChatService::new(
            ContextAssembler::new(memory.clone(), ContextConfig::from(&settings.memory)),
            skills.clone(),
            collaborators.provider,
            ChatOptions {
                agent_name: settings.agent_name.clone(),
                model: settings.claude.model.clone(),
                max_tokens: settings.claude.max_tokens,
                free_scans: settings.scan.free_scans,
            },
        );

        let scan_service = ScanService::new(
            ScanLedger::new(
                SqliteScanRepository::new(db_pool.clone()),
                LedgerPolicy::from(&settings.scan),
            ),
            collaborators.scanner,
            collaborators.notifier,
            ScanIdentity {
                agent_name: settings.agent_name.clone(),
                agent_id: settings.squidbay.agent_id.clone(),
                default_repo: settings.github_repo.clone(),
            },
        );

        let post_recorder =
            PostRecorder::new(SqlitePostLogRepository::new(db_pool.clone()), memory.clone());
        let usage = UsageAccountant::new(memory.clone(), settings.memory.usage_window);

        Self {
            settings: Arc::new(settings),
            channels,
            chat_service: Arc::new(chat_service),
            scan_service: Arc::new(scan_service),
            post_recorder: Arc::new(post_recorder),
            usage: Arc::new(usage),
            memory,
            kv: SqliteKvStore::new(db_pool.clone()),
            skills,
            data_dir,
            db_pool,
            started_at: Instant::now(),
        }
    }

    /// Seconds since this state was built.
    pub fn uptime_secs(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }
}

/// SMS when Twilio is fully configured, otherwise log-only.
fn build_notifier(
    settings: &AgentSettings,
    auth_token: Option<SecretString>,
) -> anyhow::Result<BoxNotifier> {
    let twilio = &settings.twilio;
    match (
        &twilio.account_sid,
        &twilio.phone_number,
        &twilio.owner_phone,
        auth_token,
    ) {
        (Some(sid), Some(from), Some(to), Some(token)) => {
            info!("Twilio SMS enabled for owner alerts");
            let notifier = TwilioNotifier::new(
                TwilioConfig {
                    account_sid: sid.clone(),
                    auth_token: token,
                    from: from.clone(),
                    to: to.clone(),
                },
                settings.agent_name.clone(),
            )
            .context("failed to build Twilio client")?;
            Ok(BoxNotifier::new(notifier))
        }
        _ => Ok(BoxNotifier::new(LogNotifier)),
    }
}

fn warn_on_missing_config(settings: &AgentSettings, secrets: &Secrets) {
    if secrets.anthropic_api_key.is_none() {
        warn!("ANTHROPIC_API_KEY not set; chat replies will report an invalid key");
    }
    if settings.agent_name == AgentSettings::default().agent_name {
        warn!("AGENT_NAME not set; your agent needs a name");
    }
    if settings.squidbay.agent_id.is_none() {
        warn!("SQUIDBAY_AGENT_ID not set; register at squidbay.io to get one");
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use squid_core::llm::provider::LlmProvider;
    use squid_types::llm::{CompletionRequest, CompletionResponse, LlmError, StopReason, Usage};

    /// Replies with "echo: {last message}" or fails with a fixed error.
    pub struct EchoProvider {
        pub fail: Option<fn() -> LlmError>,
    }

    impl LlmProvider for EchoProvider {
        fn name(&self) -> &str {
            "echo"
        }

        async fn complete(
            &self,
            request: &CompletionRequest,
        ) -> Result<CompletionResponse, LlmError> {
            if let Some(fail) = self.fail {
                return Err(fail());
            }
            let last = request
                .messages
                .last()
                .map(|m| m.content.clone())
                .unwrap_or_default();
            Ok(CompletionResponse {
                id: "msg_test".into(),
                content: format!("echo: {last}"),
                model: request.model.clone(),
                stop_reason: StopReason::EndTurn,
                usage: Usage {
                    input_tokens: 12,
                    output_tokens: 5,
                },
            })
        }
    }

    /// State over a throwaway database with an unreachable scanner.
    pub async fn test_state(settings: AgentSettings, fail: Option<fn() -> LlmError>) -> AppState {
        let dir = tempfile::tempdir().unwrap();
        let data_dir = dir.path().to_path_buf();
        std::mem::forget(dir);
        let pool = DatabasePool::open_in(&data_dir).await.unwrap();

        let collaborators = Collaborators {
            provider: BoxLlmProvider::new(EchoProvider { fail }),
            scanner: HttpScanner::new("http://127.0.0.1:9", None, None, Duration::from_secs(2))
                .unwrap(),
            notifier: BoxNotifier::new(LogNotifier),
        };
        AppState::assemble(data_dir, pool, settings, ChannelStatus::default(), collaborators)
    }
}
