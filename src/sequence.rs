//! One named image sequence: a loader and a canvas sharing frame slots.

use std::rc::Rc;

use crate::canvas::{Container, FrameOf, SequenceCanvas};
use crate::config::SequenceOptions;
use crate::emitter::EventEmitter;
use crate::error::Result;
use crate::frames::FrameSequence;
use crate::loader::{ImageSource, SequenceLoader, FIRST_IMAGE_LOADED, IMAGES_LOADED};

/// Map a scroll progress in `[0, 1]` to a frame index of a sequence of `len`.
///
/// Out-of-range and NaN progress values are clamped. Returns `None` for an
/// empty sequence.
///
/// ## Example
///
/// ```rust
/// use scroll_sequence::frame_for_progress;
///
/// assert_eq!(frame_for_progress(0.0, 111), Some(0));
/// assert_eq!(frame_for_progress(0.5, 111), Some(55));
/// assert_eq!(frame_for_progress(1.5, 111), Some(110));
/// assert_eq!(frame_for_progress(0.5, 0), None);
/// ```
pub fn frame_for_progress(progress: f64, len: usize) -> Option<usize> {
    if len == 0 {
        return None;
    }
    let progress = if progress.is_nan() { 0.0 } else { progress.clamp(0.0, 1.0) };
    let max_idx = (len - 1) as f64;
    Some(((progress * max_idx).round() as usize).min(len - 1))
}

/// Loader and canvas for one image sequence.
///
/// Loading starts on construction; the first frame is drawn as soon as it
/// arrives. Scroll handlers drive the display with
/// [`render_index`](Self::render_index) or
/// [`render_progress`](Self::render_progress), and may subscribe to
/// [`FIRST_IMAGE_LOADED`] and [`IMAGES_LOADED`] through
/// [`events`](Self::events).
///
/// Loading and resize handling keep running after this handle is dropped;
/// the sequence lives as long as the page.
pub struct ScrollSequence<C, S>
where
    C: Container,
    S: ImageSource<Frame = FrameOf<C>>,
{
    frames: FrameSequence<FrameOf<C>>,
    loader: Rc<SequenceLoader<S>>,
    canvas: Rc<SequenceCanvas<C>>,
}

impl<C, S> ScrollSequence<C, S>
where
    C: Container + 'static,
    S: ImageSource<Frame = FrameOf<C>> + 'static,
{
    /// Start loading `names` and attach a canvas to `container`.
    pub fn new(names: Vec<String>, container: C, source: S, options: SequenceOptions) -> Result<Self> {
        let frames = FrameSequence::new(names.len());
        let loader = SequenceLoader::new(
            names,
            frames.clone(),
            source,
            &options.images_root,
            options.failure_policy,
        );
        let canvas = Rc::new(SequenceCanvas::new(frames.clone(), container, options.cover));
        canvas.setup()?;

        let first = Rc::clone(&canvas);
        loader.events().once(FIRST_IMAGE_LOADED, move |_| {
            if let Err(err) = first.render_index(0) {
                log::warn!("failed to draw first frame: {}", err);
            }
        });
        loader.events().once(IMAGES_LOADED, |_| log::info!("Sequence loaded"));

        // A synchronous source can pass both milestones inside `SequenceLoader::new`.
        if frames.is_filled(0) {
            canvas.render_index(0)?;
        }
        if loader.is_complete() {
            log::info!("Sequence loaded");
        }

        Ok(Self {
            frames,
            loader,
            canvas,
        })
    }

    /// Draw the frame nearest to `index`; see [`SequenceCanvas::render_index`].
    pub fn render_index(&self, index: usize) -> Result<Option<usize>> {
        self.canvas.render_index(index)
    }

    /// Draw the frame matching a scroll progress in `[0, 1]`.
    pub fn render_progress(&self, progress: f64) -> Result<Option<usize>> {
        match frame_for_progress(progress, self.frames.len()) {
            Some(index) => self.render_index(index),
            None => Ok(None),
        }
    }

    /// Lifecycle events of the underlying loader.
    pub fn events(&self) -> &EventEmitter {
        self.loader.events()
    }

    /// Slots shared by the loader and the canvas.
    pub fn frames(&self) -> &FrameSequence<FrameOf<C>> {
        &self.frames
    }

    /// Loader filling the slots.
    pub fn loader(&self) -> &Rc<SequenceLoader<S>> {
        &self.loader
    }

    /// Canvas drawing the slots.
    pub fn canvas(&self) -> &Rc<SequenceCanvas<C>> {
        &self.canvas
    }

    /// Number of frames in the sequence.
    #[inline]
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Returns `true` for a sequence without frames.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

/// Browser entry points.
#[cfg(feature = "web")]
pub mod web {
    use super::*;
    use crate::canvas::web::DomContainer;
    use crate::loader::web::ImageElementSource;

    /// A sequence drawn into a DOM element from `<img>` loads.
    pub type WebScrollSequence = ScrollSequence<DomContainer, ImageElementSource>;

    /// Route `log` records to the browser console.
    pub fn init_logging(level: log::Level) {
        wasm_logger::init(wasm_logger::Config::new(level));
    }

    /// Mount a sequence into the element matching `selector`.
    ///
    /// ## Example
    ///
    /// ```rust,ignore
    /// use scroll_sequence::{FramePattern, SequenceOptions};
    /// use scroll_sequence::sequence::web::mount;
    ///
    /// let apple = mount(
    ///     ".apple-sequence",
    ///     FramePattern::range(0, 110).names(),
    ///     SequenceOptions::default().with_images_root("./images/apple/"),
    /// )?;
    /// ```
    pub fn mount(selector: &str, names: Vec<String>, options: SequenceOptions) -> Result<WebScrollSequence> {
        let container = DomContainer::from_selector(selector)?;
        ScrollSequence::new(names, container, ImageElementSource, options)
    }
}
