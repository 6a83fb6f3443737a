use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExchangeError {
    #[error("Notification request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration error in '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration field: {field}")]
    MissingConfigError { field: String },

    #[error("Duplicate participant name: {name}")]
    DuplicateParticipant { name: String },

    #[error("Exclusion group {group} references unknown participant '{name}'")]
    UnknownParticipant { group: usize, name: String },

    #[error("No valid matching exists for {participants} participants with the given exclusions")]
    Infeasible { participants: usize },

    #[error("Matching invariant violated: {message}")]
    InvalidMatching { message: String },

    #[error("Delivery to {recipient} failed: {message}")]
    DeliveryError { recipient: String, message: String },

    #[error("Dispatch error: {message}")]
    DispatchError { message: String },

    #[error("Run aborted by operator")]
    Aborted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Matching,
    Delivery,
    Io,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl ExchangeError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            ExchangeError::ConfigError { .. }
            | ExchangeError::ConfigValidationError { .. }
            | ExchangeError::InvalidConfigValueError { .. }
            | ExchangeError::MissingConfigError { .. }
            | ExchangeError::DuplicateParticipant { .. }
            | ExchangeError::UnknownParticipant { .. } => ErrorCategory::Configuration,
            ExchangeError::Infeasible { .. } | ExchangeError::InvalidMatching { .. } => {
                ErrorCategory::Matching
            }
            ExchangeError::ApiError(_) | ExchangeError::DeliveryError { .. } => {
                ErrorCategory::Delivery
            }
            ExchangeError::IoError(_) => ErrorCategory::Io,
            ExchangeError::DispatchError { .. } | ExchangeError::Aborted => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            ExchangeError::Aborted => ErrorSeverity::Low,
            // 傳送失敗會在工作者內重試，只有在逐項回報時才會出現
            ExchangeError::ApiError(_) | ExchangeError::DeliveryError { .. } => {
                ErrorSeverity::Medium
            }
            ExchangeError::InvalidMatching { .. } | ExchangeError::DispatchError { .. } => {
                ErrorSeverity::Critical
            }
            _ => ErrorSeverity::High,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            ExchangeError::DuplicateParticipant { .. } => {
                "Give every participant a unique name in the configuration file"
            }
            ExchangeError::UnknownParticipant { .. } => {
                "Check the spelling of names in [exclusions]; they must match a participant"
            }
            ExchangeError::MissingConfigError { .. }
            | ExchangeError::ConfigError { .. }
            | ExchangeError::ConfigValidationError { .. }
            | ExchangeError::InvalidConfigValueError { .. } => {
                "Fix the configuration file and run again"
            }
            ExchangeError::Infeasible { .. } => {
                "Relax the exclusion groups or try a different seed"
            }
            ExchangeError::ApiError(_) | ExchangeError::DeliveryError { .. } => {
                "Check the notifier endpoint and credentials"
            }
            ExchangeError::IoError(_) => "Check file paths and permissions",
            ExchangeError::InvalidMatching { .. } | ExchangeError::DispatchError { .. } => {
                "This is a bug; rerun with --verbose and report the log"
            }
            ExchangeError::Aborted => "Run again and press Enter when ready to send",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            ExchangeError::Infeasible { participants } => format!(
                "Could not find a valid matching for {} participants with the given exclusions",
                participants
            ),
            ExchangeError::Aborted => "Cancelled, no messages were sent".to_string(),
            other => match other.category() {
                ErrorCategory::Configuration => format!("Configuration problem: {}", other),
                ErrorCategory::Delivery => format!("Delivery problem: {}", other),
                _ => other.to_string(),
            },
        }
    }

    /// 對應 CLI 結束代碼
    pub fn exit_code(&self) -> i32 {
        match self.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }
}

pub type Result<T> = std::result::Result<T, ExchangeError>;
