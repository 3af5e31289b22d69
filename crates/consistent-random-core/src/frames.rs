//! Frame stacks shared by scopes and test overrides.
//!
//! Every pushed frame gets a process-unique id. Guards pop by id rather than
//! by depth, so a frame that a future carried away and later restored on a
//! different thread, at a different depth, is still removed correctly.

use std::cell::RefCell;
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread::LocalKey;

static NEXT_FRAME_ID: AtomicU64 = AtomicU64::new(1);

/// One stack entry.
#[derive(Debug, Clone)]
pub(crate) struct Frame<T> {
    id: u64,
    value: T,
}

impl<T> Frame<T> {
    pub(crate) fn new(value: T) -> Self {
        Self {
            id: NEXT_FRAME_ID.fetch_add(1, Ordering::Relaxed),
            value,
        }
    }

    pub(crate) fn id(&self) -> u64 {
        self.id
    }
}

#[derive(Debug)]
pub(crate) struct FrameStack<T> {
    frames: Vec<Frame<T>>,
}

impl<T> FrameStack<T> {
    pub(crate) const fn new() -> Self {
        Self { frames: Vec::new() }
    }

    pub(crate) fn top(&self) -> Option<&T> {
        self.frames.last().map(|frame| &frame.value)
    }

    pub(crate) fn len(&self) -> usize {
        self.frames.len()
    }

    pub(crate) fn push(&mut self, frame: Frame<T>) {
        self.frames.push(frame);
    }

    /// Removes the frame with `id` and everything above it. Does nothing if
    /// the frame is no longer on this stack.
    pub(crate) fn pop_to(&mut self, id: u64) {
        if let Some(position) = self.frames.iter().rposition(|frame| frame.id == id) {
            self.frames.truncate(position);
        }
    }
}

/// Pushes `frames` onto the thread's stack and returns the previous length.
pub(crate) fn install<T: 'static>(
    key: &'static LocalKey<RefCell<FrameStack<T>>>,
    frames: Vec<Frame<T>>,
) -> usize {
    key.with(|stack| {
        let mut stack = stack.borrow_mut();
        let base = stack.len();
        stack.frames.extend(frames);
        base
    })
}

/// Removes and returns every frame above `base`.
pub(crate) fn take_above<T: 'static>(
    key: &'static LocalKey<RefCell<FrameStack<T>>>,
    base: usize,
) -> Vec<Frame<T>> {
    key.with(|stack| {
        let mut stack = stack.borrow_mut();
        if base >= stack.len() {
            Vec::new()
        } else {
            stack.frames.split_off(base)
        }
    })
}

/// Cuts the thread's stack back to `base` frames, tolerating teardown.
pub(crate) fn truncate<T: 'static>(
    key: &'static LocalKey<RefCell<FrameStack<T>>>,
    base: usize,
) {
    let _ = key.try_with(|stack| stack.borrow_mut().frames.truncate(base));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pop_to_removes_frame_and_everything_above() {
        let mut stack = FrameStack::new();
        let a = Frame::new("a");
        let b = Frame::new("b");
        let b_id = b.id();
        stack.push(a);
        stack.push(b);
        stack.push(Frame::new("c"));
        stack.pop_to(b_id);
        assert_eq!(stack.top(), Some(&"a"));
        assert_eq!(stack.len(), 1);
    }

    #[test]
    fn test_pop_to_missing_frame_is_a_no_op() {
        let mut stack = FrameStack::new();
        stack.push(Frame::new(1));
        stack.pop_to(u64::MAX);
        assert_eq!(stack.len(), 1);
    }

    #[test]
    fn test_frame_ids_are_unique() {
        assert_ne!(Frame::new(()).id(), Frame::new(()).id());
    }
}
