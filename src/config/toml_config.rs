use crate::adapters::notifier::{LogNotifier, WebhookNotifier};
use crate::adapters::template::MessageTemplate;
use crate::core::dispatch::{DispatchConfig, RetryPolicy, DEFAULT_CONCURRENCY, DEFAULT_QUEUE_CAPACITY};
use crate::core::engine::ExchangeSetup;
use crate::domain::model::{ExclusionGroup, Participant, Registry};
use crate::domain::ports::Notifier;
use crate::utils::error::{ExchangeError, Result};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub exchange: ExchangeConfig,
    #[serde(default)]
    pub participants: Vec<ParticipantConfig>,
    pub exclusions: Option<ExclusionConfig>,
    pub notifier: NotifierConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExchangeConfig {
    pub name: Option<String>,
    pub seed: Option<i64>,
    pub concurrency: Option<usize>,
    pub queue_capacity: Option<usize>,
    pub retry_delay_ms: Option<u64>,
    pub max_attempts: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParticipantConfig {
    pub name: String,
    pub contact: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExclusionConfig {
    #[serde(default)]
    pub groups: Vec<Vec<String>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum NotifierKind {
    Webhook,
    #[default]
    Log,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotifierConfig {
    #[serde(default)]
    pub kind: NotifierKind,
    pub endpoint: Option<String>,
    pub from: Option<String>,
    #[serde(default = "default_subject")]
    pub subject: String,
    pub message: String,
    pub headers: Option<HashMap<String, String>>,
    pub timeout_seconds: Option<u64>,
    pub dry_run: Option<bool>,
}

fn default_subject() -> String {
    "Your gift exchange match".to_string()
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(ExchangeError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| ExchangeError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${SANTA_TOKEN})，未設定的變數保持原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| ExchangeError::ConfigError {
            message: format!("invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    /// 驗證配置的合理性
    pub fn validate_config(&self) -> Result<()> {
        validation::validate_required_field("exchange.seed", &self.exchange.seed)?;

        if let Some(concurrency) = self.exchange.concurrency {
            validation::validate_positive_number("exchange.concurrency", concurrency, 1)?;
        }
        if let Some(capacity) = self.exchange.queue_capacity {
            validation::validate_positive_number("exchange.queue_capacity", capacity, 1)?;
        }
        if let Some(max_attempts) = self.exchange.max_attempts {
            validation::validate_positive_number("exchange.max_attempts", max_attempts as usize, 1)?;
        }

        validation::validate_positive_number("participants", self.participants.len(), 2)?;
        for participant in &self.participants {
            validation::validate_non_empty_string("participants.name", &participant.name)?;
            validation::validate_non_empty_string("participants.contact", &participant.contact)?;
        }
        validation::validate_unique_names(
            "participants.name",
            self.participants.iter().map(|p| p.name.trim()),
        )?;

        // 排除群組中的名稱必須能對應到參與者
        self.canonical_groups()?;

        validation::validate_non_empty_string("notifier.message", &self.notifier.message)?;
        if self.notifier.kind == NotifierKind::Webhook {
            let endpoint =
                validation::validate_required_field("notifier.endpoint", &self.notifier.endpoint)?;
            validation::validate_url("notifier.endpoint", endpoint)?;
            let from = validation::validate_required_field("notifier.from", &self.notifier.from)?;
            validation::validate_non_empty_string("notifier.from", from)?;
        }

        Ok(())
    }

    pub fn seed(&self) -> Result<i64> {
        validation::validate_required_field("exchange.seed", &self.exchange.seed).copied()
    }

    pub fn dispatch_config(&self) -> DispatchConfig {
        DispatchConfig {
            concurrency: self.exchange.concurrency.unwrap_or(DEFAULT_CONCURRENCY),
            queue_capacity: self.exchange.queue_capacity.unwrap_or(DEFAULT_QUEUE_CAPACITY),
            retry_delay: self
                .exchange
                .retry_delay_ms
                .map(Duration::from_millis)
                .unwrap_or(crate::core::dispatch::DEFAULT_RETRY_DELAY),
            retry: match self.exchange.max_attempts {
                Some(max_attempts) => RetryPolicy::Limited { max_attempts },
                None => RetryPolicy::Forever,
            },
        }
    }

    pub fn is_dry_run(&self) -> bool {
        self.notifier.dry_run.unwrap_or(false)
    }

    /// Exclusion groups with every name replaced by the participant's
    /// canonical spelling. Matching here is case-insensitive; the core only
    /// accepts exact names.
    pub fn canonical_groups(&self) -> Result<Vec<Vec<String>>> {
        let by_lower: HashMap<String, &str> = self
            .participants
            .iter()
            .map(|p| (p.name.trim().to_lowercase(), p.name.trim()))
            .collect();

        let groups = self
            .exclusions
            .as_ref()
            .map(|e| e.groups.as_slice())
            .unwrap_or_default();

        groups
            .iter()
            .enumerate()
            .map(|(index, group)| {
                group
                    .iter()
                    .map(|raw| {
                        by_lower
                            .get(&raw.trim().to_lowercase())
                            .map(|name| name.to_string())
                            .ok_or_else(|| ExchangeError::UnknownParticipant {
                                group: index,
                                name: raw.clone(),
                            })
                    })
                    .collect::<Result<Vec<String>>>()
            })
            .collect()
    }

    /// Builds the validated input of the engine.
    pub fn to_setup(&self) -> Result<ExchangeSetup> {
        let registry = Registry::new(
            self.participants
                .iter()
                .map(|p| Participant::new(p.name.trim(), p.contact.trim()))
                .collect(),
        )?;

        let groups = self
            .canonical_groups()?
            .iter()
            .enumerate()
            .map(|(index, names)| ExclusionGroup::from_names(&registry, index, names.as_slice()))
            .collect::<Result<Vec<_>>>()?;

        Ok(ExchangeSetup {
            registry,
            groups,
            seed: self.seed()?,
            dispatch: self.dispatch_config(),
        })
    }

    pub fn template(&self) -> MessageTemplate {
        MessageTemplate::new(&self.notifier.subject, &self.notifier.message)
    }

    /// 依設定建立通知傳送器
    pub fn notifier(&self) -> Result<Arc<dyn Notifier>> {
        match self.notifier.kind {
            NotifierKind::Log => Ok(Arc::new(LogNotifier::new(self.template()))),
            NotifierKind::Webhook => {
                let endpoint =
                    validation::validate_required_field("notifier.endpoint", &self.notifier.endpoint)?;
                let from = validation::validate_required_field("notifier.from", &self.notifier.from)?;

                let mut notifier = WebhookNotifier::new(endpoint, from, self.template())
                    .with_dry_run(self.is_dry_run());
                if let Some(headers) = &self.notifier.headers {
                    notifier = notifier.with_headers(headers.clone());
                }
                if let Some(timeout) = self.notifier.timeout_seconds {
                    notifier = notifier.with_timeout(Duration::from_secs(timeout));
                }
                Ok(Arc::new(notifier))
            }
        }
    }

    pub fn exchange_name(&self) -> &str {
        self.exchange.name.as_deref().unwrap_or("gift exchange")
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
