//! Resource identifier parsing and validation
//!
//! A resource is a Scratch studio, addressed by its numeric id. The parser also
//! accepts a pasted studio URL such as `https://scratch.mit.edu/studios/51358686/`.

use std::fmt;

/// Numeric id of the studio whose comment feed is polled
///
/// # Examples
///
/// ```
/// use studio_activity::identifier::ResourceId;
///
/// let id = ResourceId::parse("51358686").unwrap();
/// assert_eq!(id.as_str(), "51358686");
///
/// let from_url = ResourceId::parse("https://scratch.mit.edu/studios/51358686/comments").unwrap();
/// assert_eq!(from_url, id);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceId(String);

impl ResourceId {
    /// Parse a resource id from a bare id or a studio URL
    ///
    /// # Errors
    ///
    /// Returns an error if the input is empty or the id contains anything but ASCII digits.
    pub fn parse(s: &str) -> Result<Self, IdentifierError> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(IdentifierError::InvalidFormat(
                "resource id cannot be empty".to_string(),
            ));
        }

        let candidate = match trimmed.find("/studios/") {
            Some(pos) => trimmed[pos + "/studios/".len()..]
                .split('/')
                .next()
                .unwrap_or_default(),
            None => trimmed,
        };

        if candidate.is_empty() {
            return Err(IdentifierError::InvalidFormat(format!(
                "no studio id found in '{trimmed}'"
            )));
        }

        if !candidate.chars().all(|c| c.is_ascii_digit()) {
            return Err(IdentifierError::InvalidFormat(format!(
                "resource id must be numeric, got '{candidate}'"
            )));
        }

        Ok(Self(candidate.to_string()))
    }

    /// Borrow the id as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for ResourceId {
    type Err = IdentifierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Errors that can occur during identifier parsing
#[derive(Debug, thiserror::Error)]
pub enum IdentifierError {
    /// Invalid identifier format
    #[error("identifier error: {0}")]
    InvalidFormat(String),
}
