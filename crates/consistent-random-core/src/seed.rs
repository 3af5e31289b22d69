//! Scope seed input and its canonical form.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::error::ConsistentRandomError;
use crate::hasher::SEPARATOR;

/// Canonical seed string governing a scope. Immutable for the scope's
/// lifetime.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScopeSeed(String);

impl ScopeSeed {
    /// Wraps an already canonical seed string.
    #[must_use]
    pub fn new(seed: impl Into<String>) -> Self {
        Self(seed.into())
    }

    /// Generates an unpredictable seed: 32 lowercase hex characters backed
    /// by the OS random source.
    #[must_use]
    pub fn fresh() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }

    /// Returns the seed as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the seed bytes fed to the hasher.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl AsRef<str> for ScopeSeed {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ScopeSeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Seed supplied on scope entry, before canonicalization.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SeedInput {
    /// Reuse the enclosing scope's seed, or generate a fresh one.
    #[default]
    Absent,
    /// A single stringified scalar.
    Scalar(String),
    /// An ordered list of stringified scalars.
    List(Vec<String>),
}

impl SeedInput {
    /// Resolves the input into a canonical seed. `parent` is the seed of the
    /// enclosing scope, if any.
    #[must_use]
    pub fn resolve(self, parent: Option<&ScopeSeed>) -> ScopeSeed {
        match self {
            Self::Absent => parent.cloned().unwrap_or_else(ScopeSeed::fresh),
            Self::Scalar(value) => ScopeSeed(value),
            Self::List(values) => {
                let separator = char::from(SEPARATOR).to_string();
                ScopeSeed(values.join(&separator))
            }
        }
    }
}

impl From<ScopeSeed> for SeedInput {
    fn from(seed: ScopeSeed) -> Self {
        Self::Scalar(seed.0)
    }
}

impl From<&ScopeSeed> for SeedInput {
    fn from(seed: &ScopeSeed) -> Self {
        Self::Scalar(seed.0.clone())
    }
}

impl From<&String> for SeedInput {
    fn from(value: &String) -> Self {
        Self::Scalar(value.clone())
    }
}

impl From<()> for SeedInput {
    fn from((): ()) -> Self {
        Self::Absent
    }
}

impl<T: Into<Self>> From<Option<T>> for SeedInput {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Absent, Into::into)
    }
}

macro_rules! scalar_seed {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for SeedInput {
                fn from(value: $ty) -> Self {
                    Self::Scalar(value.to_string())
                }
            }

            impl From<Vec<$ty>> for SeedInput {
                fn from(values: Vec<$ty>) -> Self {
                    Self::List(values.iter().map(ToString::to_string).collect())
                }
            }

            impl<const N: usize> From<[$ty; N]> for SeedInput {
                fn from(values: [$ty; N]) -> Self {
                    Self::List(values.iter().map(ToString::to_string).collect())
                }
            }
        )*
    };
}

scalar_seed!(
    &str, String, char, i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize,
);

impl TryFrom<&Value> for SeedInput {
    type Error = ConsistentRandomError;

    /// Accepts `null`, strings, integers and arrays of strings or integers.
    /// Floats, booleans, objects and nested arrays are rejected.
    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        match value {
            Value::Null => Ok(Self::Absent),
            Value::Array(items) => items
                .iter()
                .map(scalar_to_string)
                .collect::<Result<Vec<_>, _>>()
                .map(Self::List),
            other => scalar_to_string(other).map(Self::Scalar),
        }
    }
}

impl TryFrom<Value> for SeedInput {
    type Error = ConsistentRandomError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        Self::try_from(&value)
    }
}

fn scalar_to_string(value: &Value) -> Result<String, ConsistentRandomError> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) if n.is_i64() || n.is_u64() => Ok(n.to_string()),
        other => Err(ConsistentRandomError::InvalidSeedKind(other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_scalar_inputs_are_stringified() {
        assert_eq!(SeedInput::from(123), SeedInput::Scalar("123".into()));
        assert_eq!(SeedInput::from("abc"), SeedInput::Scalar("abc".into()));
        assert_eq!(SeedInput::from(-7_i64), SeedInput::Scalar("-7".into()));
    }

    #[test]
    fn test_list_input_joins_with_separator() {
        let seed = SeedInput::from([1, 2, 3]).resolve(None);
        assert_eq!(seed.as_str(), "1\u{1c}2\u{1c}3");
    }

    #[test]
    fn test_absent_input_reuses_parent_seed() {
        let parent = ScopeSeed::new("parent");
        let seed = SeedInput::Absent.resolve(Some(&parent));
        assert_eq!(seed, parent);
    }

    #[test]
    fn test_absent_input_without_parent_is_fresh() {
        let first = SeedInput::Absent.resolve(None);
        let second = SeedInput::Absent.resolve(None);
        assert_eq!(first.as_str().len(), 32);
        assert!(first.as_str().chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(first, second);
    }

    #[test]
    fn test_none_maps_to_absent() {
        assert_eq!(SeedInput::from(None::<&str>), SeedInput::Absent);
        assert_eq!(SeedInput::from(Some(5_u32)), SeedInput::Scalar("5".into()));
    }

    #[test]
    fn test_json_scalars_and_lists_are_accepted() {
        assert_eq!(SeedInput::try_from(&json!(null)), Ok(SeedInput::Absent));
        assert_eq!(
            SeedInput::try_from(&json!("foo")),
            Ok(SeedInput::Scalar("foo".into()))
        );
        assert_eq!(
            SeedInput::try_from(&json!(["a", 2])),
            Ok(SeedInput::List(vec!["a".into(), "2".into()]))
        );
    }

    #[test]
    fn test_json_float_is_rejected() {
        let result = SeedInput::try_from(&json!(1.5));
        assert!(matches!(
            result,
            Err(ConsistentRandomError::InvalidSeedKind(_))
        ));
    }

    #[test]
    fn test_json_nested_container_is_rejected() {
        assert!(SeedInput::try_from(&json!([["a"]])).is_err());
        assert!(SeedInput::try_from(&json!({"a": 1})).is_err());
        assert!(SeedInput::try_from(&json!(true)).is_err());
    }

    #[test]
    fn test_scope_seed_serializes_as_plain_string() {
        let seed = ScopeSeed::new("abc");
        assert_eq!(serde_json::to_value(&seed).unwrap(), json!("abc"));
    }
}
