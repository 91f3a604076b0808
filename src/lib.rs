//! # scroll-sequence
//!
//! Image sequence preloading and nearest-frame canvas rendering for
//! scroll-driven pages.
//!
//! This crate provides platform-agnostic data structures and logic for:
//! - Loading an ordered list of images one at a time, with lifecycle events
//! - Rendering the nearest already-loaded frame while the rest stream in
//! - Keeping the drawing surface sized to its container across resizes
//! - Small page widgets (a slide carousel and a tab switcher)
//!
//! ## Features
//!
//! - `serde` - Enable serialization/deserialization for configuration
//! - `toml` - Parse configuration from TOML
//! - `web` - Enable web/WASM canvas, `<img>` loading and DOM wiring
//!
//! ## Example
//!
//! ```rust,ignore
//! use scroll_sequence::{FramePattern, ScrollSequence, SequenceOptions};
//! use scroll_sequence::canvas::web::DomContainer;
//! use scroll_sequence::loader::web::ImageElementSource;
//!
//! // 0000.png ..= 0110.png
//! let names = FramePattern::range(0, 110).names();
//!
//! let sequence = ScrollSequence::new(
//!     names,
//!     DomContainer::from_selector(".apple-sequence")?,
//!     ImageElementSource,
//!     SequenceOptions::default().with_images_root("./images/apple/"),
//! )?;
//!
//! // From a scroll handler:
//! sequence.render_progress(scroll_fraction)?;
//! ```

pub mod canvas;
mod config;
mod emitter;
mod error;
mod frames;
pub mod loader;
pub mod sequence;
mod widgets;

#[cfg(test)]
mod mock;

pub use canvas::{Container, SequenceCanvas, Surface};
pub use config::{FramePattern, SequenceOptions};
pub use emitter::{EventEmitter, ListenerId};
pub use error::{Result, SequenceError};
pub use frames::{Frame, FrameSequence};
pub use loader::{FailurePolicy, ImageSource, LoadProgress, SequenceLoader, FIRST_IMAGE_LOADED, IMAGES_LOADED};
pub use sequence::{frame_for_progress, ScrollSequence};
pub use widgets::{Carousel, TabSwitcher, DEFAULT_SLIDE_INTERVAL_MS};

#[cfg(feature = "web")]
pub use sequence::web::{init_logging, mount};
#[cfg(feature = "web")]
pub use widgets::web::{start_carousel, wire_carousel, wire_tabs};
