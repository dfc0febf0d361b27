#![allow(unreachable_pub)]
#![allow(clippy::needless_pass_by_value)]

//! # Macros
//!
//! Procedural macros shared by the fhub infrastructure crates.
//!
//! ## Usage
//! ```toml
//! [dependencies]
//! fhub-derive.workspace = true
//! thiserror.workspace = true
//! ```

mod error;

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

/// Attribute macro for defining flat, domain-specific error enums.
///
/// # Features
///
/// * **Automatic Derives**: Injects `#[derive(Debug, thiserror::Error)]` unless already present.
/// * **Context Support**: Generates a companion `<Name>Ext` trait that adds `.context()`
///   to `Result<T, Name>` and to results of every wrapped source error.
/// * **Standard Conversions**: Implements `From<T>` for variants holding a `source: T` field
///   (or a field marked `#[source]`/`#[from]`), so `?` works on upstream errors.
/// * **Kind Names**: Generates `kind(&self) -> &'static str` returning the variant name, which
///   boundary layers use for response mapping and structured logging.
/// * **Internal Fallback**: Provides `From<&'static str>` and `From<String>` when an
///   `Internal` variant is present.
///
/// # Requirements
///
/// 1. The macro must be applied to an **enum** with named-field variants only.
/// 2. A `context` field, when present, must be `Option<Cow<'static, str>>`.
/// 3. Variants with a source must also carry a `context` field.
///
/// # Example
///
/// ```rust,ignore
/// use fhub_derive::fhub_error;
/// use std::borrow::Cow;
///
/// #[fhub_error]
/// pub enum StoreError {
///     #[error("Not found{}: {message}", format_context(.context))]
///     NotFound { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
///
///     #[error("I/O failure{}: {source}", format_context(.context))]
///     Io { source: std::io::Error, context: Option<Cow<'static, str>> },
/// }
///
/// fn open() -> Result<std::fs::File, StoreError> {
///     std::fs::File::open("missing").context("Opening the index")
/// }
/// ```
#[proc_macro_attribute]
pub fn fhub_error(_args: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as DeriveInput);
    error::expand(input).into()
}
