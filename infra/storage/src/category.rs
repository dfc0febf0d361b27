//! Category/collection path codec.
//!
//! Categories and collections are both plain directories. A category directory carries the
//! [`CATEGORY_MARKER`] prefix on its name while a collection directory does not, so the
//! filesystem alone tells the two tiers apart. All encoding and decoding goes through this
//! module; callers never prepend the marker themselves.

use crate::error::StorageError;
use std::fmt;

/// Reserved prefix marking a directory as a category.
pub const CATEGORY_MARKER: char = '_';

const SEPARATOR: char = '/';

/// Encodes a single category name into its directory form.
#[must_use]
pub fn encode_segment(name: &str) -> String {
    let mut encoded = String::with_capacity(name.len() + 1);
    encoded.push(CATEGORY_MARKER);
    encoded.push_str(name);
    encoded
}

/// Strips the category marker from a directory name.
///
/// # Errors
/// Returns [`StorageError::NotCategory`] if the marker is absent.
pub fn decode_segment(encoded: &str) -> Result<&str, StorageError> {
    encoded.strip_prefix(CATEGORY_MARKER).ok_or_else(|| StorageError::NotCategory {
        message: encoded.to_owned().into(),
        context: None,
    })
}

/// Encodes every slash-delimited segment of a logical category path.
#[must_use]
pub fn encode_path(path: &str) -> String {
    path.split(SEPARATOR).map(encode_segment).collect::<Vec<_>>().join("/")
}

/// Decodes an on-disk category path back to its logical form.
///
/// # Errors
/// Returns [`StorageError::NotCategoryPath`] if any segment lacks the marker, which rejects
/// paths mixing category and collection segments.
pub fn decode_path(path: &str) -> Result<String, StorageError> {
    path.split(SEPARATOR)
        .map(decode_segment)
        .collect::<Result<Vec<_>, _>>()
        .map(|segments| segments.join("/"))
        .map_err(|_| StorageError::NotCategoryPath { message: path.to_owned().into(), context: None })
}

/// Returns `true` if the final segment of an on-disk path is a collection (unmarked).
#[must_use]
pub fn is_collection_path(path: &str) -> bool {
    path.trim_end_matches(SEPARATOR)
        .rsplit(SEPARATOR)
        .next()
        .is_some_and(|last| !last.is_empty() && !last.starts_with(CATEGORY_MARKER))
}

/// Returns `true` if every segment of an on-disk path is a category.
#[must_use]
pub fn is_category_path(path: &str) -> bool {
    path.split(SEPARATOR).all(|segment| segment.len() > 1 && segment.starts_with(CATEGORY_MARKER))
}

/// Checks a single category or collection name.
fn validate_name(name: &str) -> Result<(), StorageError> {
    if name.is_empty() {
        return Err(StorageError::invalid_name(name, "Name cannot be empty"));
    }
    if name == "." || name == ".." {
        return Err(StorageError::invalid_name(name, "Relative segments are not names"));
    }
    if name.contains(CATEGORY_MARKER) {
        return Err(StorageError::invalid_name(name, "Name contains the reserved category marker"));
    }
    if name.chars().any(|c| c == '/' || c == '\\' || c.is_control()) {
        return Err(StorageError::invalid_name(name, "Name contains illegal characters"));
    }
    Ok(())
}

/// A validated logical category path such as `apparel/shoes`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CategoryPath(String);

impl CategoryPath {
    /// Returns the on-disk form, e.g. `_apparel/_shoes`.
    #[must_use]
    pub fn encoded(&self) -> String {
        encode_path(&self.0)
    }

    /// Returns the parent category, or `None` for a top-level category.
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        self.0.rsplit_once(SEPARATOR).map(|(parent, _)| Self(parent.to_owned()))
    }

    /// Returns the last segment of the path.
    #[must_use]
    pub fn name(&self) -> &str {
        self.0.rsplit(SEPARATOR).next().unwrap_or(&self.0)
    }

    /// Returns a child category path.
    ///
    /// # Errors
    /// Returns [`StorageError::InvalidName`] if `name` is not a valid segment.
    pub fn child(&self, name: &str) -> Result<Self, StorageError> {
        validate_name(name)?;
        Ok(Self(format!("{}{SEPARATOR}{name}", self.0)))
    }

    /// Rebuilds a category path from its on-disk form.
    ///
    /// # Errors
    /// Returns [`StorageError::NotCategoryPath`] if any segment is unmarked.
    pub fn from_encoded(encoded: &str) -> Result<Self, StorageError> {
        Self::try_from(decode_path(encoded)?)
    }
}

impl TryFrom<&str> for CategoryPath {
    type Error = StorageError;

    fn try_from(value: &str) -> Result<Self, StorageError> {
        let trimmed = value.trim_matches(SEPARATOR);
        trimmed.split(SEPARATOR).try_for_each(validate_name)?;
        Ok(Self(trimmed.to_owned()))
    }
}

impl TryFrom<String> for CategoryPath {
    type Error = StorageError;

    fn try_from(value: String) -> Result<Self, StorageError> {
        Self::try_from(value.as_str())
    }
}

impl AsRef<str> for CategoryPath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CategoryPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A validated collection identifier, stored unmarked under its category.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CollectionId(String);

impl TryFrom<&str> for CollectionId {
    type Error = StorageError;

    fn try_from(value: &str) -> Result<Self, StorageError> {
        validate_name(value)?;
        Ok(Self(value.to_owned()))
    }
}

impl TryFrom<String> for CollectionId {
    type Error = StorageError;

    fn try_from(value: String) -> Result<Self, StorageError> {
        validate_name(&value)?;
        Ok(Self(value))
    }
}

impl AsRef<str> for CollectionId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CollectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn encodes_each_segment() {
        assert_eq!(encode_segment("shoes"), "_shoes");
        assert_eq!(encode_path("apparel/shoes"), "_apparel/_shoes");
    }

    #[test]
    fn decode_segment_requires_marker() {
        assert_eq!(decode_segment("_shoes").unwrap(), "shoes");
        assert!(matches!(decode_segment("shoes"), Err(StorageError::NotCategory { .. })));
    }

    #[test]
    fn decode_path_rejects_mixed_tiers() {
        assert_eq!(decode_path("_apparel/_shoes").unwrap(), "apparel/shoes");
        assert!(matches!(
            decode_path("_apparel/sku123"),
            Err(StorageError::NotCategoryPath { .. })
        ));
        assert!(matches!(
            decode_path("apparel/_shoes"),
            Err(StorageError::NotCategoryPath { .. })
        ));
    }

    #[test]
    fn collection_paths_end_unmarked() {
        assert!(is_collection_path("_apparel/_shoes/sku123"));
        assert!(is_collection_path("_apparel/_shoes/sku123/"));
        assert!(!is_collection_path("_apparel/_shoes"));
        assert!(!is_collection_path(""));
        assert!(is_category_path("_apparel/_shoes"));
        assert!(!is_category_path("_apparel/sku123"));
    }

    #[test]
    fn category_path_validation() {
        let path = CategoryPath::try_from("/apparel/shoes/").unwrap();
        assert_eq!(path.as_ref(), "apparel/shoes");
        assert_eq!(path.encoded(), "_apparel/_shoes");
        assert_eq!(path.name(), "shoes");
        assert_eq!(path.parent().unwrap().as_ref(), "apparel");
        assert!(CategoryPath::try_from("apparel").unwrap().parent().is_none());

        assert!(CategoryPath::try_from("").is_err());
        assert!(CategoryPath::try_from("apparel//shoes").is_err());
        assert!(CategoryPath::try_from("apparel/../etc").is_err());
        assert!(CategoryPath::try_from("_apparel").is_err());
        assert!(CollectionId::try_from("sku_123").is_err());
        assert!(CollectionId::try_from("a/b").is_err());
    }

    #[test]
    fn from_encoded_round_trips() {
        let path = CategoryPath::from_encoded("_apparel/_shoes").unwrap();
        assert_eq!(path, CategoryPath::try_from("apparel/shoes").unwrap());
        assert!(CategoryPath::from_encoded("_apparel/shoes").is_err());
    }

    proptest! {
        #[test]
        fn decode_inverts_encode(segments in proptest::collection::vec("[a-zA-Z0-9.-]{1,12}", 1..6)) {
            let path = segments.join("/");
            prop_assert_eq!(decode_path(&encode_path(&path)).unwrap(), path);
        }
    }
}
