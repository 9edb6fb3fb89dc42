//! Build revision identifier.

use std::fmt;

/// Placeholder shown when no revision was supplied at build time.
pub const NOT_SET: &str = "not-set";

/// Opaque build identifier, fixed for the life of the process.
///
/// Set at compile time with `GATEWAY_REVISION=$(git rev-parse --short HEAD) cargo build`.
/// Only ever displayed; nothing branches on it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Revision(String);

impl Revision {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// The revision baked into this binary, or empty.
    pub fn from_build() -> Self {
        Self::new(option_env!("GATEWAY_REVISION").unwrap_or_default())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Revision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            f.write_str(NOT_SET)
        } else {
            f.write_str(&self.0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(Revision::default().to_string(), "not-set");
        assert_eq!(Revision::new("a1b2c3d").to_string(), "a1b2c3d");
    }
}
