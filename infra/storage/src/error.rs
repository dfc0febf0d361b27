use std::borrow::Cow;
use std::io;
use std::path::Path;

/// A specialized [`StorageError`] enum of this crate.
///
/// Every variant is a distinct, flat failure kind so the boundary layer can map each one to
/// its own response. Filesystem failures keep the underlying [`io::Error`] for diagnostics.
#[fhub_derive::fhub_error]
pub enum StorageError {
    #[error("Not found{}: {message}", format_context(.context))]
    NotFound { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Already exists{}: {message}", format_context(.context))]
    AlreadyExists { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Maximum file size of {limit} bytes exceeded{}: {message}", format_context(.context))]
    SizeExceeded { message: Cow<'static, str>, limit: u64, context: Option<Cow<'static, str>> },

    #[error("Directory is not empty{}: {message}", format_context(.context))]
    DirNotEmpty { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Not a directory{}: {message}", format_context(.context))]
    NotDirectory { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Not a file{}: {message}", format_context(.context))]
    NotFile { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Segment is not a category{}: {message}", format_context(.context))]
    NotCategory { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Path contains non-category segments{}: {message}", format_context(.context))]
    NotCategoryPath { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Path does not point to a collection{}: {message}", format_context(.context))]
    NotCollection { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Invalid name{}: {message}", format_context(.context))]
    InvalidName { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Path traversal security violation{}: {message}", format_context(.context))]
    PathTraversalAttempt { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Stat failed{}: {message}: {error}", format_context(.context))]
    Stat { message: Cow<'static, str>, error: io::Error, context: Option<Cow<'static, str>> },

    #[error("Create failed{}: {message}: {error}", format_context(.context))]
    Create { message: Cow<'static, str>, error: io::Error, context: Option<Cow<'static, str>> },

    #[error("Read failed{}: {message}: {error}", format_context(.context))]
    Read { message: Cow<'static, str>, error: io::Error, context: Option<Cow<'static, str>> },

    #[error("Write failed{}: {message}: {error}", format_context(.context))]
    Write { message: Cow<'static, str>, error: io::Error, context: Option<Cow<'static, str>> },

    #[error("Rename failed{}: {message}: {error}", format_context(.context))]
    Rename { message: Cow<'static, str>, error: io::Error, context: Option<Cow<'static, str>> },

    #[error("Delete failed{}: {message}: {error}", format_context(.context))]
    Delete { message: Cow<'static, str>, error: io::Error, context: Option<Cow<'static, str>> },

    #[error("Hardware I/O failure{}: {source}", format_context(.context))]
    Io { source: io::Error, context: Option<Cow<'static, str>> },
}

fn display(path: &Path) -> Cow<'static, str> {
    path.display().to_string().into()
}

impl StorageError {
    pub(crate) fn not_found(path: &Path) -> Self {
        Self::NotFound { message: display(path), context: None }
    }

    pub(crate) fn already_exists(path: &Path) -> Self {
        Self::AlreadyExists { message: display(path), context: None }
    }

    pub(crate) fn size_exceeded(path: &Path, limit: u64) -> Self {
        Self::SizeExceeded { message: display(path), limit, context: None }
    }

    pub(crate) fn dir_not_empty(path: &Path) -> Self {
        Self::DirNotEmpty { message: display(path), context: None }
    }

    pub(crate) fn not_directory(path: &Path) -> Self {
        Self::NotDirectory { message: display(path), context: None }
    }

    pub(crate) fn not_file(path: &Path) -> Self {
        Self::NotFile { message: display(path), context: None }
    }

    pub(crate) fn traversal(path: &Path, reason: &'static str) -> Self {
        Self::PathTraversalAttempt { message: display(path), context: Some(reason.into()) }
    }

    pub(crate) fn stat(path: &Path, error: io::Error) -> Self {
        Self::Stat { message: display(path), error, context: None }
    }

    pub(crate) fn create(path: &Path, error: io::Error) -> Self {
        Self::Create { message: display(path), error, context: None }
    }

    pub(crate) fn read(path: &Path, error: io::Error) -> Self {
        Self::Read { message: display(path), error, context: None }
    }

    pub(crate) fn write(path: &Path, error: io::Error) -> Self {
        Self::Write { message: display(path), error, context: None }
    }

    pub(crate) fn rename(from: &Path, to: &Path, error: io::Error) -> Self {
        Self::Rename {
            message: format!("{} -> {}", from.display(), to.display()).into(),
            error,
            context: None,
        }
    }

    pub(crate) fn delete(path: &Path, error: io::Error) -> Self {
        Self::Delete { message: display(path), error, context: None }
    }

    pub(crate) fn invalid_name(name: &str, reason: &'static str) -> Self {
        Self::InvalidName { message: name.to_owned().into(), context: Some(reason.into()) }
    }
}
