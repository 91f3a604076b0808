//! Sequential image loading and lifecycle events.
//!
//! A [`SequenceLoader`] requests one image at a time, strictly in index
//! order, and stores each result in the shared [`FrameSequence`]. Two events
//! are published on its emitter:
//! - [`FIRST_IMAGE_LOADED`] once slot 0 has been filled
//! - [`IMAGES_LOADED`] once the cursor has passed the last slot

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use crate::emitter::EventEmitter;
use crate::error::Result;
use crate::frames::{Frame, FrameSequence};

/// Emitted once, right after slot 0 is filled.
pub const FIRST_IMAGE_LOADED: &str = "FIRST_IMAGE_LOADED";
/// Emitted once, after every identifier has been processed.
pub const IMAGES_LOADED: &str = "IMAGES_LOADED";

/// Completion callback handed to an [`ImageSource`].
pub type LoadCallback<F> = Box<dyn FnOnce(Result<F>)>;

/// Something that can turn a locator into a decoded frame.
///
/// Implement this trait for your specific I/O mechanism (`<img>` elements,
/// fetch, filesystem, ...). The callback may run synchronously inside `load`
/// or later from the event loop; it must run at most once.
///
/// No `Send` bounds: sources live on the single WASM thread.
pub trait ImageSource {
    type Frame: Frame;

    /// Start loading `locator` and report the outcome through `on_complete`.
    fn load(&self, locator: &str, on_complete: LoadCallback<Self::Frame>);
}

impl<S: ImageSource + ?Sized> ImageSource for Rc<S> {
    type Frame = S::Frame;

    fn load(&self, locator: &str, on_complete: LoadCallback<Self::Frame>) {
        (**self).load(locator, on_complete)
    }
}

/// What to do when a single image fails to load.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum FailurePolicy {
    /// Stop at the failed slot; later frames never load and
    /// `IMAGES_LOADED` never fires.
    #[default]
    Stall,
    /// Leave the failed slot empty and continue with the next one.
    Skip,
}

/// Progress information for a loading sequence.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LoadProgress {
    /// Number of filled slots
    pub loaded: usize,
    /// Total number of slots
    pub total: usize,
}

impl LoadProgress {
    /// Get loading percentage (0-100)
    pub fn percent(&self) -> u8 {
        if self.total == 0 {
            0
        } else {
            ((self.loaded as f32 / self.total as f32) * 100.0) as u8
        }
    }

    /// Format a loading message
    pub fn message(&self) -> String {
        format!("Loading frames... {} / {} ({}%)", self.loaded, self.total, self.percent())
    }
}

/// Loads a list of identifiers into a [`FrameSequence`], one at a time.
///
/// Loading starts inside [`SequenceLoader::new`]. Slots that are already
/// filled are skipped. The loader keeps itself alive while a request is in
/// flight, so dropping the returned handle does not cancel loading.
pub struct SequenceLoader<S: ImageSource> {
    source: S,
    names: Vec<String>,
    images_root: String,
    frames: FrameSequence<S::Frame>,
    policy: FailurePolicy,
    load_index: Cell<usize>,
    complete: Cell<bool>,
    advancing: Cell<bool>,
    advance_requested: Cell<bool>,
    failed: RefCell<Vec<usize>>,
    events: EventEmitter,
    this: Weak<Self>,
}

impl<S: ImageSource + 'static> SequenceLoader<S> {
    /// Create a loader and request the first image.
    ///
    /// `images_root` is prepended verbatim to every name.
    pub fn new(
        names: Vec<String>,
        frames: FrameSequence<S::Frame>,
        source: S,
        images_root: &str,
        policy: FailurePolicy,
    ) -> Rc<Self> {
        if names.len() != frames.len() {
            log::warn!(
                "{} image names for a sequence of {} frames",
                names.len(),
                frames.len()
            );
        }
        let loader = Rc::new_cyclic(|this| Self {
            source,
            names,
            images_root: images_root.to_string(),
            frames,
            policy,
            load_index: Cell::new(0),
            complete: Cell::new(false),
            advancing: Cell::new(false),
            advance_requested: Cell::new(false),
            failed: RefCell::new(Vec::new()),
            events: EventEmitter::new(),
            this: this.clone(),
        });
        loader.load_next_image();
        loader
    }

    /// Lifecycle events ([`FIRST_IMAGE_LOADED`], [`IMAGES_LOADED`]).
    pub fn events(&self) -> &EventEmitter {
        &self.events
    }

    /// Index of the next identifier to request.
    #[inline]
    pub fn load_index(&self) -> usize {
        self.load_index.get()
    }

    /// Returns `true` once every identifier has been processed.
    #[inline]
    pub fn is_complete(&self) -> bool {
        self.complete.get()
    }

    /// Slots skipped after a failed load (only with [`FailurePolicy::Skip`]).
    pub fn failed(&self) -> Vec<usize> {
        self.failed.borrow().clone()
    }

    /// Filled slots out of the sequence length.
    pub fn progress(&self) -> LoadProgress {
        LoadProgress {
            loaded: self.frames.filled_count(),
            total: self.frames.len(),
        }
    }

    /// Slots this loader writes into.
    pub fn frames(&self) -> &FrameSequence<S::Frame> {
        &self.frames
    }

    /// Full locator for slot `index`, root prefix included.
    pub fn locator(&self, index: usize) -> Option<String> {
        self.names
            .get(index)
            .map(|name| format!("{}{}", self.images_root, name))
    }

    /// Advance the cursor and request the next empty slot.
    ///
    /// A source that completes inside `load` calls back into this method;
    /// the nested call only flags the request and the outer loop picks it
    /// up, so the stack stays flat however long the sequence is.
    fn load_next_image(&self) {
        if self.advancing.replace(true) {
            self.advance_requested.set(true);
            return;
        }
        loop {
            self.advance_requested.set(false);
            self.request_next();
            if !self.advance_requested.get() {
                break;
            }
        }
        self.advancing.set(false);
    }

    fn request_next(&self) {
        let total = self.names.len().min(self.frames.len());
        loop {
            let index = self.load_index.get();
            if index >= total {
                self.finish();
                return;
            }
            self.load_index.set(index + 1);
            if !self.frames.is_filled(index) {
                self.load_image(index);
                return;
            }
        }
    }

    fn load_image(&self, index: usize) {
        let Some(loader) = self.this.upgrade() else {
            return;
        };
        let Some(locator) = self.locator(index) else {
            return;
        };
        log::debug!("requesting frame {} from {}", index, locator);
        self.source.load(
            &locator,
            Box::new(move |result| loader.on_image_loaded(index, result)),
        );
    }

    fn on_image_loaded(&self, index: usize, result: Result<S::Frame>) {
        match result {
            Ok(frame) => {
                if let Err(err) = self.frames.fill(index, frame) {
                    log::warn!("discarding frame {}: {}", index, err);
                }
                log::debug!("frame {} loaded", index);
                if index == 0 {
                    self.events.emit(FIRST_IMAGE_LOADED, &());
                }
                self.load_next_image();
            }
            Err(err) => match self.policy {
                FailurePolicy::Stall => {
                    log::warn!("frame {} failed, sequence stalled: {}", index, err);
                }
                FailurePolicy::Skip => {
                    log::warn!("frame {} failed, skipping: {}", index, err);
                    self.failed.borrow_mut().push(index);
                    self.load_next_image();
                }
            },
        }
    }

    fn finish(&self) {
        if self.complete.replace(true) {
            return;
        }
        log::debug!("all {} frames processed", self.names.len());
        self.events.emit(IMAGES_LOADED, &());
    }
}

impl<S: ImageSource> std::fmt::Debug for SequenceLoader<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SequenceLoader")
            .field("images_root", &self.images_root)
            .field("len", &self.names.len())
            .field("load_index", &self.load_index.get())
            .field("complete", &self.complete.get())
            .field("policy", &self.policy)
            .finish()
    }
}

/// `<img>`-backed image source.
#[cfg(feature = "web")]
pub mod web {
    use super::*;
    use crate::error::SequenceError;
    use js_sys::Function;
    use wasm_bindgen::closure::Closure;
    use wasm_bindgen::JsCast;
    use web_sys::HtmlImageElement;

    impl Frame for HtmlImageElement {
        fn natural_size(&self) -> (u32, u32) {
            (self.natural_width(), self.natural_height())
        }
    }

    /// Loads frames through `HtmlImageElement`s.
    #[derive(Clone, Copy, Debug, Default)]
    pub struct ImageElementSource;

    impl ImageSource for ImageElementSource {
        type Frame = HtmlImageElement;

        fn load(&self, locator: &str, on_complete: LoadCallback<HtmlImageElement>) {
            let img = match HtmlImageElement::new() {
                Ok(img) => img,
                Err(err) => {
                    on_complete(Err(err.into()));
                    return;
                }
            };

            // onload and onerror race for the same callback; whichever fires first takes it.
            let pending = Rc::new(RefCell::new(Some(on_complete)));

            let onload = {
                let img = img.clone();
                let pending = Rc::clone(&pending);
                Closure::once_into_js(move || {
                    img.set_onload(None);
                    img.set_onerror(None);
                    let callback = pending.borrow_mut().take();
                    if let Some(callback) = callback {
                        callback(Ok(img));
                    }
                })
            };
            let onerror = {
                let img = img.clone();
                let locator = locator.to_string();
                Closure::once_into_js(move || {
                    img.set_onload(None);
                    img.set_onerror(None);
                    let callback = pending.borrow_mut().take();
                    if let Some(callback) = callback {
                        callback(Err(SequenceError::Load {
                            locator,
                            reason: "image failed to load".into(),
                        }));
                    }
                })
            };

            img.set_onload(Some(onload.unchecked_ref::<Function>()));
            img.set_onerror(Some(onerror.unchecked_ref::<Function>()));
            img.set_src(locator);
        }
    }
}
