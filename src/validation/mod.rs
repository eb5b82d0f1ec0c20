/// Input validation for identifiers and pagination
///
/// Everything here runs before any storage access; a failure is always a
/// `FeedError::Validation`.
use crate::error::{FeedError, FeedResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const MAX_ID_LENGTH: usize = 64;

fn check_id(kind: &str, raw: &str) -> FeedResult<String> {
    let trimmed = raw.trim();

    if trimmed.is_empty() {
        return Err(FeedError::Validation(format!("{} is required", kind)));
    }

    if trimmed.len() > MAX_ID_LENGTH {
        return Err(FeedError::Validation(format!(
            "{} exceeds {} characters",
            kind, MAX_ID_LENGTH
        )));
    }

    if !trimmed
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(FeedError::Validation(format!(
            "Invalid {} format: {}",
            kind, trimmed
        )));
    }

    Ok(trimmed.to_string())
}

macro_rules! identifier {
    ($(#[$meta:meta])* $name:ident, $kind:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl FromStr for $name {
            type Err = FeedError;

            fn from_str(s: &str) -> FeedResult<Self> {
                check_id($kind, s).map(Self)
            }
        }

        impl TryFrom<String> for $name {
            type Error = FeedError;

            fn try_from(s: String) -> FeedResult<Self> {
                s.parse()
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> String {
                id.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

identifier!(
    /// Identifier of a content item
    ContentId,
    "mediaId"
);

identifier!(
    /// Identifier of a user (viewer, actor)
    UserId,
    "userId"
);

/// A validated page request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub num: u32,
    pub size: u32,
}

impl Page {
    /// Build a page from already-typed values
    pub fn new(num: i64, size: i64, max_size: u32) -> FeedResult<Self> {
        if num < 1 {
            return Err(FeedError::Validation(format!(
                "pageNum must be a positive integer, got {}",
                num
            )));
        }
        if size < 1 {
            return Err(FeedError::Validation(format!(
                "pageSize must be a positive integer, got {}",
                size
            )));
        }
        if size > i64::from(max_size) {
            return Err(FeedError::Validation(format!(
                "pageSize must not exceed {}, got {}",
                max_size, size
            )));
        }
        let num = u32::try_from(num)
            .map_err(|_| FeedError::Validation(format!("pageNum {} is out of range", num)))?;

        Ok(Self {
            num,
            size: size as u32,
        })
    }

    /// Parse raw query-string values, applying defaults for absent ones
    pub fn parse(
        num: Option<&str>,
        size: Option<&str>,
        default_size: u32,
        max_size: u32,
    ) -> FeedResult<Self> {
        let num = parse_integer("pageNum", num, 1)?;
        let size = parse_integer("pageSize", size, i64::from(default_size))?;
        Self::new(num, size, max_size)
    }

    pub fn offset(&self) -> i64 {
        (i64::from(self.num) - 1) * i64::from(self.size)
    }

    pub fn limit(&self) -> i64 {
        i64::from(self.size)
    }
}

fn parse_integer(name: &str, raw: Option<&str>, default: i64) -> FeedResult<i64> {
    match raw.map(str::trim) {
        None | Some("") => Ok(default),
        Some(value) => value.parse::<i64>().map_err(|_| {
            FeedError::Validation(format!("{} must be an integer, got '{}'", name, value))
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_accept_object_ids_and_short_keys() {
        assert!("60d5ecb8b3b3a3001f3e1234".parse::<ContentId>().is_ok());
        assert_eq!("m1".parse::<ContentId>().unwrap().as_str(), "m1");
        assert_eq!(" u1 ".parse::<UserId>().unwrap().as_str(), "u1");
    }

    #[test]
    fn test_ids_reject_malformed() {
        assert!("".parse::<ContentId>().is_err());
        assert!("   ".parse::<UserId>().is_err());
        assert!("m1; DROP TABLE media".parse::<ContentId>().is_err());
        assert!("x".repeat(65).parse::<UserId>().is_err());
    }

    #[test]
    fn test_id_deserialization_validates() {
        let ok: Result<ContentId, _> = serde_json::from_str("\"abc\"");
        assert!(ok.is_ok());
        let bad: Result<ContentId, _> = serde_json::from_str("\"a b\"");
        assert!(bad.is_err());
    }

    #[test]
    fn test_page_defaults() {
        let page = Page::parse(None, None, 10, 100).unwrap();
        assert_eq!(page, Page { num: 1, size: 10 });
        assert_eq!(page.offset(), 0);
        assert_eq!(page.limit(), 10);
    }

    #[test]
    fn test_page_offset() {
        let page = Page::parse(Some("3"), Some("25"), 10, 100).unwrap();
        assert_eq!(page.offset(), 50);
        assert_eq!(page.limit(), 25);
    }

    #[test]
    fn test_page_rejects_non_positive() {
        assert!(matches!(Page::new(0, 10, 100), Err(FeedError::Validation(_))));
        assert!(matches!(Page::new(1, -5, 100), Err(FeedError::Validation(_))));
        assert!(matches!(Page::new(-2, 5, 100), Err(FeedError::Validation(_))));
    }

    #[test]
    fn test_page_rejects_non_numeric_and_oversized() {
        assert!(Page::parse(Some("two"), None, 10, 100).is_err());
        assert!(Page::parse(None, Some("1.5"), 10, 100).is_err());
        assert!(Page::parse(None, Some("101"), 10, 100).is_err());
    }
}
