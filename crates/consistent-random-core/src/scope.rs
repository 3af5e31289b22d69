//! Scope stack.
//!
//! Each thread owns a stack of scope seeds; the top of the stack is the
//! current scope and an empty stack means "no scope". Entry pushes, and the
//! returned guard pops its own frame and anything above it when dropped,
//! including during unwinding. Async bodies carry their seed in a [`Scoped`]
//! future that re-enters the scope around every poll and keeps any scopes
//! the body entered alive between polls.

use std::cell::RefCell;
use std::future::Future;
use std::marker::PhantomData;
use std::mem;
use std::pin::Pin;
use std::rc::Rc;
use std::sync::Arc;
use std::task::{Context, Poll};

use tracing::trace;

use crate::frames::{self, Frame, FrameStack};
use crate::seed::{ScopeSeed, SeedInput};
use crate::testing::{self, OverrideTable};

thread_local! {
    static SCOPES: RefCell<FrameStack<ScopeSeed>> = const { RefCell::new(FrameStack::new()) };
}

/// Returns the seed of the innermost active scope on this thread.
#[must_use]
pub fn current_seed() -> Option<ScopeSeed> {
    SCOPES.with(|scopes| scopes.borrow().top().cloned())
}

/// Enters a scope and returns a guard that exits it on drop.
///
/// An absent seed reuses the enclosing scope's seed, or a fresh random one at
/// the top level.
pub fn enter(seed: impl Into<SeedInput>) -> ScopeGuard {
    let seed = seed.into().resolve(current_seed().as_ref());
    let frame = Frame::new(seed);
    let id = frame.id();
    let depth = SCOPES.with(|scopes| {
        let mut scopes = scopes.borrow_mut();
        scopes.push(frame);
        scopes.len()
    });
    trace!(depth, "entered consistent random scope");
    ScopeGuard {
        id,
        _not_send: PhantomData,
    }
}

/// Runs `body` inside a scope and returns its result.
pub fn scope<R>(seed: impl Into<SeedInput>, body: impl FnOnce() -> R) -> R {
    let _guard = enter(seed);
    body()
}

/// Restores the previous scope when dropped.
///
/// The guard is tied to the thread that created it.
#[must_use = "the scope is exited as soon as the guard is dropped"]
#[derive(Debug)]
pub struct ScopeGuard {
    id: u64,
    _not_send: PhantomData<Rc<()>>,
}

impl Drop for ScopeGuard {
    fn drop(&mut self) {
        // The thread-local may already be gone during thread teardown.
        let _ = SCOPES.try_with(|scopes| scopes.borrow_mut().pop_to(self.id));
        trace!(frame = self.id, "exited consistent random scope");
    }
}

/// Scope and override frames a future owns while it is not being polled.
#[derive(Debug)]
pub(crate) struct Carried {
    scopes: Vec<Frame<ScopeSeed>>,
    overrides: Vec<Frame<Arc<OverrideTable>>>,
}

impl Carried {
    pub(crate) fn new(
        scopes: Vec<Frame<ScopeSeed>>,
        overrides: Vec<Frame<Arc<OverrideTable>>>,
    ) -> Self {
        Self { scopes, overrides }
    }

    /// Installs the carried frames, polls `inner`, then takes back every frame
    /// left above the polling thread's own stacks.
    pub(crate) fn poll<F: Future + ?Sized>(
        &mut self,
        inner: Pin<&mut F>,
        cx: &mut Context<'_>,
    ) -> Poll<F::Output> {
        let reset = Reset {
            scope_base: frames::install(&SCOPES, mem::take(&mut self.scopes)),
            override_base: testing::install(mem::take(&mut self.overrides)),
        };
        let poll = inner.poll(cx);
        self.scopes = frames::take_above(&SCOPES, reset.scope_base);
        self.overrides = testing::take_above(reset.override_base);
        poll
    }
}

/// Leaves the polling thread's stacks as it found them, even if the inner
/// poll panics.
struct Reset {
    scope_base: usize,
    override_base: usize,
}

impl Drop for Reset {
    fn drop(&mut self) {
        frames::truncate(&SCOPES, self.scope_base);
        testing::truncate(self.override_base);
    }
}

/// A future that runs inside a fixed scope on whichever thread polls it.
///
/// Test overrides active when the future is created stay active for it too.
#[derive(Debug)]
#[must_use = "futures do nothing unless polled"]
pub struct Scoped<F> {
    seed: ScopeSeed,
    carried: Carried,
    inner: Pin<Box<F>>,
}

impl<F: Future> Scoped<F> {
    /// Wraps `future`, resolving `seed` against the scope active right now.
    pub fn new(seed: impl Into<SeedInput>, future: F) -> Self {
        let seed = seed.into().resolve(current_seed().as_ref());
        Self {
            carried: Carried::new(vec![Frame::new(seed.clone())], testing::capture()),
            seed,
            inner: Box::pin(future),
        }
    }

    /// The seed this future runs under.
    #[must_use]
    pub fn seed(&self) -> &ScopeSeed {
        &self.seed
    }
}

impl<F: Future> Future for Scoped<F> {
    type Output = F::Output;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        this.carried.poll(this.inner.as_mut(), cx)
    }
}

/// Extension trait for running a future inside a scope.
pub trait ScopeFutureExt: Future + Sized {
    /// Runs this future inside a scope seeded by `seed`.
    fn in_scope(self, seed: impl Into<SeedInput>) -> Scoped<Self> {
        Scoped::new(seed, self)
    }
}

impl<F: Future> ScopeFutureExt for F {}
