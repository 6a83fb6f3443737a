pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use crate::config::toml_config::TomlConfig;
pub use crate::core::dispatch::{DispatchConfig, DispatchPool, DispatchSummary, RetryPolicy};
pub use crate::core::engine::{ExchangeEngine, ExchangePlan, ExchangeSetup};
pub use crate::domain::model::{Assignment, ExclusionGroup, Matching, Participant, ParticipantId, Registry};
pub use crate::domain::ports::{Confirmation, Notifier};
pub use crate::utils::error::{ExchangeError, Result};
