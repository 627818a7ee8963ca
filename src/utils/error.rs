use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("API returned HTTP {status} for {url}")]
    HttpStatus { url: String, status: u16 },

    #[error("Failed to decode response from {url}: {source}")]
    DecodeError {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Missing {resource} id")]
    MissingId { resource: &'static str },

    #[error("Document error: {0}")]
    DomError(#[from] crate::dom::DomError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration validation failed for '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Data,
    Document,
    System,
    Configuration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl AppError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            AppError::ApiError(_) | AppError::HttpStatus { .. } => ErrorCategory::Network,
            AppError::DecodeError { .. } | AppError::MissingId { .. } => ErrorCategory::Data,
            AppError::DomError(_) => ErrorCategory::Document,
            AppError::IoError(_) => ErrorCategory::System,
            AppError::ConfigValidationError { .. } | AppError::InvalidConfigValueError { .. } => {
                ErrorCategory::Configuration
            }
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            AppError::MissingId { .. } => ErrorSeverity::Low,
            // 網路錯誤通常可以重試
            AppError::ApiError(_) | AppError::HttpStatus { .. } => ErrorSeverity::Medium,
            AppError::DecodeError { .. } | AppError::DomError(_) => ErrorSeverity::High,
            AppError::IoError(_)
            | AppError::ConfigValidationError { .. }
            | AppError::InvalidConfigValueError { .. } => ErrorSeverity::Critical,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            AppError::ApiError(e) if e.is_timeout() => {
                "The employee directory did not answer in time".to_string()
            }
            AppError::ApiError(_) => "Could not reach the employee directory".to_string(),
            AppError::HttpStatus { status, .. } => {
                format!("The employee directory answered with HTTP {}", status)
            }
            AppError::DecodeError { .. } => {
                "The employee directory returned data in an unexpected format".to_string()
            }
            AppError::MissingId { resource } => format!("No {} was selected", resource),
            AppError::DomError(e) => format!("The page could not be rendered: {}", e),
            AppError::IoError(e) => format!("Could not write the page: {}", e),
            AppError::ConfigValidationError { field, message } => {
                format!("Configuration field '{}' is invalid: {}", field, message)
            }
            AppError::InvalidConfigValueError { field, reason, .. } => {
                format!("Configuration field '{}' is invalid: {}", field, reason)
            }
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Network => "Check the --api-base URL and your network connection, then retry",
            ErrorCategory::Data => "Verify that --api-base points to a JSONPlaceholder-compatible API",
            ErrorCategory::Document => "Report this as a bug together with the verbose log",
            ErrorCategory::System => "Check that the output directory exists and is writable",
            ErrorCategory::Configuration => "Fix the configuration value and run again",
        }
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
