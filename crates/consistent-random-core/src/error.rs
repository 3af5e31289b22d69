//! Error types for scope entry, value generation and test overrides.

use std::fmt;

use thiserror::Error;

/// The three kinds of value a test override can substitute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OverrideKind {
    /// Base value for `rand`, in `[0, 1)`.
    Float,
    /// Byte pattern for `bytes`.
    Bytes,
    /// 64-bit value for `seed`.
    Seed,
}

impl fmt::Display for OverrideKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Float => "float",
            Self::Bytes => "bytes",
            Self::Seed => "seed",
        };
        f.write_str(name)
    }
}

/// Usage errors. None are transient and none leave scope or override state
/// modified.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConsistentRandomError {
    /// Scope entry was given a seed of an unsupported shape.
    #[error("invalid seed value: {0}")]
    InvalidSeedKind(String),

    /// A ranged request had an unbounded endpoint.
    #[error("cannot generate random value for infinite range")]
    InvalidRange,

    /// A test override value was outside its domain.
    #[error("invalid {kind} override value")]
    InvalidOverrideValue {
        /// The override kind that was rejected.
        kind: OverrideKind,
    },

    /// A JSON override fixture was not an object of known override kinds.
    #[error("invalid override fixture: {0}")]
    InvalidOverrideFixture(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_override_error_names_the_kind() {
        let err = ConsistentRandomError::InvalidOverrideValue {
            kind: OverrideKind::Float,
        };
        assert_eq!(err.to_string(), "invalid float override value");
    }

    #[test]
    fn test_seed_kind_error_includes_description() {
        let err = ConsistentRandomError::InvalidSeedKind("1.5".into());
        assert_eq!(err.to_string(), "invalid seed value: 1.5");
    }

    #[test]
    fn test_fixture_error_includes_description() {
        let err = ConsistentRandomError::InvalidOverrideFixture("expected an object".into());
        assert_eq!(err.to_string(), "invalid override fixture: expected an object");
    }
}
