use fhub_kernel::config::ConfigError;
use fhub_logger::LoggerError;
use fhub_storage::StorageError;
use std::borrow::Cow;

/// Errors raised while assembling the service.
#[fhub_derive::fhub_error]
pub enum FilesError {
    #[error("Configuration loading failed{}: {source}", format_context(.context))]
    Config { source: ConfigError, context: Option<Cow<'static, str>> },

    #[error("Storage initialization failed{}: {source}", format_context(.context))]
    Storage { source: StorageError, context: Option<Cow<'static, str>> },

    #[error("Logger initialization failed{}: {source}", format_context(.context))]
    Logger { source: LoggerError, context: Option<Cow<'static, str>> },

    #[error("Invalid configuration{}: {message}", format_context(.context))]
    InvalidConfiguration { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}
