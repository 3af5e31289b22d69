//! Test override table.
//!
//! Substitutes fixed outputs for chosen names while a test body runs. Each
//! override kind holds per-name values plus an optional default for every
//! other name. Overrides are consulted before real generation and fall
//! through to it when no entry matches. Async tests carry overrides across
//! `.await` points with [`OverrideFutureExt::with_overrides`].
//!
//! ```
//! use consistent_random_core::{ConsistentRandom, testing};
//!
//! # fn main() -> Result<(), consistent_random_core::ConsistentRandomError> {
//! testing()
//!     .with_floats([("foo", 0.5)])?
//!     .with_bytes([("foo", "bar")])
//!     .with_seeds(123_u64)
//!     .apply(|| {
//!         let foo = ConsistentRandom::new("foo");
//!         assert_eq!(foo.rand(), 0.5);
//!         assert_eq!(foo.bytes(7), b"barbarb".to_vec());
//!         assert_eq!(ConsistentRandom::new("other").seed(), 123);
//!     });
//! # Ok(())
//! # }
//! ```

use std::cell::RefCell;
use std::collections::HashMap;
use std::future::Future;
use std::marker::PhantomData;
use std::pin::Pin;
use std::rc::Rc;
use std::sync::Arc;
use std::task::{Context, Poll};

use serde_json::Value;
use tracing::trace;

use crate::error::{ConsistentRandomError, OverrideKind};
use crate::frames::{self, Frame, FrameStack};
use crate::scope::Carried;

thread_local! {
    static OVERRIDES: RefCell<FrameStack<Arc<OverrideTable>>> =
        const { RefCell::new(FrameStack::new()) };
}

/// Override values for one kind: either a default for every name, or values
/// for specific names.
#[derive(Debug, Clone, PartialEq)]
pub enum OverrideSpec<T> {
    /// Applies to every name without a per-name entry.
    All(T),
    /// Applies to the listed names only.
    PerName(Vec<(String, T)>),
}

impl<T> OverrideSpec<T> {
    /// Builds a default override.
    pub fn all(value: T) -> Self {
        Self::All(value)
    }

    /// Builds a per-name override from `(name, value)` pairs.
    pub fn per_name<K, I>(entries: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, T)>,
    {
        Self::PerName(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    fn values(&self) -> Box<dyn Iterator<Item = &T> + '_> {
        match self {
            Self::All(value) => Box::new(std::iter::once(value)),
            Self::PerName(entries) => Box::new(entries.iter().map(|(_, v)| v)),
        }
    }
}

impl From<f64> for OverrideSpec<f64> {
    fn from(value: f64) -> Self {
        Self::All(value)
    }
}

impl From<u64> for OverrideSpec<u64> {
    fn from(value: u64) -> Self {
        Self::All(value)
    }
}

/// Negative seeds keep their two's complement bits.
#[allow(clippy::cast_sign_loss)]
impl From<i64> for OverrideSpec<u64> {
    fn from(value: i64) -> Self {
        Self::All(value as u64)
    }
}

impl From<&str> for OverrideSpec<Vec<u8>> {
    fn from(value: &str) -> Self {
        Self::All(value.as_bytes().to_vec())
    }
}

impl From<String> for OverrideSpec<Vec<u8>> {
    fn from(value: String) -> Self {
        Self::All(value.into_bytes())
    }
}

impl From<&[u8]> for OverrideSpec<Vec<u8>> {
    fn from(value: &[u8]) -> Self {
        Self::All(value.to_vec())
    }
}

impl From<Vec<u8>> for OverrideSpec<Vec<u8>> {
    fn from(value: Vec<u8>) -> Self {
        Self::All(value)
    }
}

impl<T, K, V, const N: usize> From<[(K, V); N]> for OverrideSpec<T>
where
    K: Into<String>,
    V: Into<T>,
{
    fn from(entries: [(K, V); N]) -> Self {
        Self::per_name(entries.into_iter().map(|(k, v)| (k, v.into())))
    }
}

impl<T, K, V> From<HashMap<K, V>> for OverrideSpec<T>
where
    K: Into<String>,
    V: Into<T>,
{
    fn from(entries: HashMap<K, V>) -> Self {
        Self::per_name(entries.into_iter().map(|(k, v)| (k, v.into())))
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Overrides<T> {
    per_name: HashMap<String, T>,
    default: Option<T>,
}

impl<T> Default for Overrides<T> {
    fn default() -> Self {
        Self {
            per_name: HashMap::new(),
            default: None,
        }
    }
}

impl<T: Clone> Overrides<T> {
    fn lookup(&self, name: &str) -> Option<&T> {
        self.per_name.get(name).or(self.default.as_ref())
    }

    /// A new default replaces the old default and keeps per-name entries;
    /// new per-name entries replace entries with the same name.
    fn set(&mut self, spec: OverrideSpec<T>) {
        match spec {
            OverrideSpec::All(value) => self.default = Some(value),
            OverrideSpec::PerName(entries) => self.per_name.extend(entries),
        }
    }

    fn layered_on(mut self, outer: &Self) -> Self {
        for (name, value) in &outer.per_name {
            self.per_name
                .entry(name.clone())
                .or_insert_with(|| value.clone());
        }
        if self.default.is_none() {
            self.default.clone_from(&outer.default);
        }
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct OverrideTable {
    floats: Overrides<f64>,
    bytes: Overrides<Vec<u8>>,
    seeds: Overrides<u64>,
}

impl OverrideTable {
    fn layered_on(self, outer: &Self) -> Self {
        Self {
            floats: self.floats.layered_on(&outer.floats),
            bytes: self.bytes.layered_on(&outer.bytes),
            seeds: self.seeds.layered_on(&outer.seeds),
        }
    }
}

fn with_active<R>(lookup: impl FnOnce(&OverrideTable) -> Option<R>) -> Option<R> {
    OVERRIDES.with(|stack| stack.borrow().top().and_then(|table| lookup(table.as_ref())))
}

fn active() -> Option<Arc<OverrideTable>> {
    OVERRIDES.with(|stack| stack.borrow().top().cloned())
}

/// The active table as a frame a future can carry, if any overrides are on.
pub(crate) fn capture() -> Vec<Frame<Arc<OverrideTable>>> {
    active().map(Frame::new).into_iter().collect()
}

pub(crate) fn install(carried: Vec<Frame<Arc<OverrideTable>>>) -> usize {
    frames::install(&OVERRIDES, carried)
}

pub(crate) fn take_above(base: usize) -> Vec<Frame<Arc<OverrideTable>>> {
    frames::take_above(&OVERRIDES, base)
}

pub(crate) fn truncate(base: usize) {
    frames::truncate(&OVERRIDES, base);
}

pub(crate) fn float_for(name: &str) -> Option<f64> {
    with_active(|table| table.floats.lookup(name).copied())
}

pub(crate) fn bytes_for(name: &str) -> Option<Vec<u8>> {
    with_active(|table| table.bytes.lookup(name).cloned())
}

pub(crate) fn seed_for(name: &str) -> Option<u64> {
    with_active(|table| table.seeds.lookup(name).copied())
}

/// Starts an empty override builder.
#[must_use]
pub fn testing() -> Testing {
    Testing::default()
}

/// Accumulates overrides and activates them around a body.
#[derive(Debug, Clone, Default)]
#[must_use]
pub struct Testing {
    table: OverrideTable,
}

impl Testing {
    /// Sets base values for `rand`. Every value must lie in `[0, 1)`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidOverrideValue` for the float kind if any value is out
    /// of range or NaN.
    pub fn with_floats(
        mut self,
        spec: impl Into<OverrideSpec<f64>>,
    ) -> Result<Self, ConsistentRandomError> {
        let spec = spec.into();
        if !spec.values().all(|value| (0.0..1.0).contains(value)) {
            return Err(ConsistentRandomError::InvalidOverrideValue {
                kind: OverrideKind::Float,
            });
        }
        self.table.floats.set(spec);
        Ok(self)
    }

    /// Sets byte patterns for `bytes`. Patterns are tiled to the requested
    /// length; an empty pattern falls through to real generation.
    pub fn with_bytes(mut self, spec: impl Into<OverrideSpec<Vec<u8>>>) -> Self {
        self.table.bytes.set(spec.into());
        self
    }

    /// Sets values returned by `seed`.
    pub fn with_seeds(mut self, spec: impl Into<OverrideSpec<u64>>) -> Self {
        self.table.seeds.set(spec.into());
        self
    }

    /// Builds overrides from a JSON fixture of the form
    /// `{"floats": 0.5 | {name: 0.5}, "bytes": "ab" | {name: "ab"}, "seeds": 1 | {name: 1}}`.
    ///
    /// Seeds may be negative; they keep their two's complement bits.
    ///
    /// # Errors
    ///
    /// Returns `InvalidOverrideFixture` if the fixture is not an object or
    /// has a key other than the three kinds, and `InvalidOverrideValue`
    /// naming the first kind whose value has the wrong type or domain.
    pub fn from_json(fixture: &Value) -> Result<Self, ConsistentRandomError> {
        let fields = fixture.as_object().ok_or_else(|| {
            ConsistentRandomError::InvalidOverrideFixture(format!(
                "expected an object, got {fixture}"
            ))
        })?;
        let mut testing = Self::default();
        for (key, value) in fields {
            testing = match key.as_str() {
                "floats" => testing.with_floats(parse_spec(value, OverrideKind::Float, |v| {
                    v.as_f64()
                })?)?,
                "bytes" => testing.with_bytes(parse_spec(value, OverrideKind::Bytes, |v| {
                    v.as_str().map(|s| s.as_bytes().to_vec())
                })?),
                "seeds" => testing.with_seeds(parse_spec(value, OverrideKind::Seed, seed_value)?),
                other => {
                    return Err(ConsistentRandomError::InvalidOverrideFixture(format!(
                        "unknown key {other:?}"
                    )));
                }
            };
        }
        Ok(testing)
    }

    /// This builder's table layered over whatever overrides are active now.
    fn layered_on_active(self) -> OverrideTable {
        match active() {
            Some(outer) => self.table.layered_on(&outer),
            None => self.table,
        }
    }

    /// Activates the overrides until the returned guard is dropped.
    pub fn enter(self) -> OverrideGuard {
        let frame = Frame::new(Arc::new(self.layered_on_active()));
        let id = frame.id();
        let depth = OVERRIDES.with(|stack| {
            let mut stack = stack.borrow_mut();
            stack.push(frame);
            stack.len()
        });
        trace!(depth, "activated test overrides");
        OverrideGuard {
            id,
            _not_send: PhantomData,
        }
    }

    /// Runs `body` with the overrides active and returns its result.
    pub fn apply<R>(self, body: impl FnOnce() -> R) -> R {
        let _guard = self.enter();
        body()
    }

    /// Runs `future` with the overrides active on every poll, whichever
    /// thread polls it. Layers over the overrides active right now.
    pub fn apply_async<F: Future>(self, future: F) -> WithOverrides<F> {
        let table = Arc::new(self.layered_on_active());
        WithOverrides {
            carried: Carried::new(Vec::new(), vec![Frame::new(table)]),
            inner: Box::pin(future),
        }
    }
}

#[allow(clippy::cast_sign_loss)]
fn seed_value(value: &Value) -> Option<u64> {
    value
        .as_u64()
        .or_else(|| value.as_i64().map(|signed| signed as u64))
}

fn parse_spec<T>(
    value: &Value,
    kind: OverrideKind,
    parse: impl Fn(&Value) -> Option<T>,
) -> Result<OverrideSpec<T>, ConsistentRandomError> {
    let invalid = || ConsistentRandomError::InvalidOverrideValue { kind };
    match value {
        Value::Object(entries) => entries
            .iter()
            .map(|(name, v)| parse(v).map(|parsed| (name.clone(), parsed)).ok_or_else(invalid))
            .collect::<Result<Vec<_>, _>>()
            .map(OverrideSpec::PerName),
        other => parse(other).map(OverrideSpec::All).ok_or_else(invalid),
    }
}

/// Restores the previous override table when dropped.
#[must_use = "overrides are deactivated as soon as the guard is dropped"]
#[derive(Debug)]
pub struct OverrideGuard {
    id: u64,
    _not_send: PhantomData<Rc<()>>,
}

impl Drop for OverrideGuard {
    fn drop(&mut self) {
        let _ = OVERRIDES.try_with(|stack| stack.borrow_mut().pop_to(self.id));
        trace!(frame = self.id, "deactivated test overrides");
    }
}

/// A future that runs with a fixed override table on whichever thread polls
/// it.
#[derive(Debug)]
#[must_use = "futures do nothing unless polled"]
pub struct WithOverrides<F> {
    carried: Carried,
    inner: Pin<Box<F>>,
}

impl<F: Future> Future for WithOverrides<F> {
    type Output = F::Output;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        this.carried.poll(this.inner.as_mut(), cx)
    }
}

/// Extension trait for running a future with test overrides.
pub trait OverrideFutureExt: Future + Sized {
    /// Runs this future with `overrides` active.
    fn with_overrides(self, overrides: Testing) -> WithOverrides<Self> {
        overrides.apply_async(self)
    }
}

impl<F: Future> OverrideFutureExt for F {}
