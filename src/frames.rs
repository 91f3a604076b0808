//! Core data structures for image sequences.

use std::cell::RefCell;
use std::rc::Rc;

use crate::error::{Result, SequenceError};

/// A decoded image with known pixel dimensions.
pub trait Frame {
    /// Natural (intrinsic) size as `(width, height)` in pixels.
    fn natural_size(&self) -> (u32, u32);
}

/// Fixed-length, write-once frame slots shared between a loader and a canvas.
///
/// Cloning is cheap and yields another handle to the same slots. The slot
/// count is fixed at construction and a filled slot is never cleared or
/// replaced.
///
/// ## Example
///
/// ```rust
/// use scroll_sequence::{Frame, FrameSequence};
///
/// struct Still;
/// impl Frame for Still {
///     fn natural_size(&self) -> (u32, u32) { (640, 360) }
/// }
///
/// let frames = FrameSequence::new(3);
/// let view = frames.clone();
///
/// frames.fill(1, Still).unwrap();
/// assert!(view.is_filled(1));
/// assert_eq!(view.filled_count(), 1);
/// assert!(frames.fill(1, Still).is_err());
/// ```
pub struct FrameSequence<F> {
    slots: Rc<RefCell<Vec<Option<F>>>>,
}

impl<F> Clone for FrameSequence<F> {
    fn clone(&self) -> Self {
        Self {
            slots: Rc::clone(&self.slots),
        }
    }
}

impl<F> std::fmt::Debug for FrameSequence<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameSequence")
            .field("len", &self.len())
            .field("filled", &self.filled_count())
            .finish()
    }
}

impl<F> FrameSequence<F> {
    /// Create `len` empty slots.
    pub fn new(len: usize) -> Self {
        let mut slots = Vec::with_capacity(len);
        slots.resize_with(len, || None);
        Self {
            slots: Rc::new(RefCell::new(slots)),
        }
    }

    /// Number of slots.
    #[inline]
    pub fn len(&self) -> usize {
        self.slots.borrow().len()
    }

    /// Returns `true` when the sequence has no slots at all.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns `true` when slot `index` holds a frame.
    pub fn is_filled(&self, index: usize) -> bool {
        self.slots
            .borrow()
            .get(index)
            .map(|s| s.is_some())
            .unwrap_or(false)
    }

    /// Number of filled slots.
    pub fn filled_count(&self) -> usize {
        self.slots.borrow().iter().filter(|s| s.is_some()).count()
    }

    /// Store a frame in an empty slot.
    pub fn fill(&self, index: usize, frame: F) -> Result<()> {
        let mut slots = self.slots.borrow_mut();
        let len = slots.len();
        match slots.get_mut(index) {
            None => Err(SequenceError::IndexOutOfRange { index, len }),
            Some(Some(_)) => Err(SequenceError::SlotAlreadyFilled { index }),
            Some(slot) => {
                *slot = Some(frame);
                Ok(())
            }
        }
    }

    /// Run `f` against the frame in slot `index`, if any.
    ///
    /// The slots stay borrowed while `f` runs, so `f` must not fill this
    /// sequence.
    pub fn with_frame<R>(&self, index: usize, f: impl FnOnce(&F) -> R) -> Option<R> {
        self.slots.borrow().get(index).and_then(|s| s.as_ref()).map(f)
    }

    /// Pick the slot to display for a requested index.
    ///
    /// Returns `index` itself when filled. Otherwise the nearest filled slot
    /// below it wins; only when there is none is the nearest filled slot
    /// above it used. Returns `None` when nothing is filled or `index` is out
    /// of range.
    pub fn nearest_filled(&self, index: usize) -> Option<usize> {
        let slots = self.slots.borrow();
        if index >= slots.len() {
            return None;
        }
        if slots[index].is_some() {
            return Some(index);
        }
        // Prefer the last frame already shown on the way here.
        let backward = (0..index).rev().find(|&i| slots[i].is_some());
        backward.or_else(|| (index + 1..slots.len()).find(|&i| slots[i].is_some()))
    }
}
