//! Nearest-frame rendering onto a surface sized to its container.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::error::{Result, SequenceError};
use crate::frames::{Frame, FrameSequence};

/// A drawing surface owned by a [`SequenceCanvas`].
pub trait Surface {
    /// Frame type this surface can draw.
    type Frame: Frame;

    /// Backing size as `(width, height)` in pixels.
    fn size(&self) -> (u32, u32);

    /// Resize both the backing store and the displayed size.
    fn set_size(&mut self, width: u32, height: u32) -> Result<()>;

    /// Clear the whole surface.
    fn clear(&mut self);

    /// Draw `frame` unscaled with its top-left corner at `(x, y)`.
    fn draw(&mut self, frame: &Self::Frame, x: i32, y: i32) -> Result<()>;
}

/// The element hosting a canvas surface.
pub trait Container {
    type Surface: Surface;

    /// Create a surface and attach it inside this container.
    fn attach_surface(&self) -> Result<Self::Surface>;

    /// Current content-box size as `(width, height)` in pixels.
    fn content_size(&self) -> (u32, u32);

    /// Call `listener` whenever the layout may have changed size.
    fn on_resize(&self, listener: Box<dyn FnMut()>) -> Result<()>;
}

/// Frame type drawn by the surface of container `C`.
pub type FrameOf<C> = <<C as Container>::Surface as Surface>::Frame;

/// Top-left position that centers a frame of `natural` size on a surface.
///
/// Coordinates are floored and go negative when the frame is larger than
/// the surface; the overflow is clipped, never scaled.
///
/// ## Example
///
/// ```rust
/// use scroll_sequence::canvas::draw_position;
///
/// assert_eq!(draw_position((800, 600), (400, 300)), (200, 150));
/// assert_eq!(draw_position((100, 100), (201, 100)), (-51, 0));
/// ```
pub fn draw_position(surface: (u32, u32), natural: (u32, u32)) -> (i32, i32) {
    let center = |outer: u32, inner: u32| (i64::from(outer) - i64::from(inner)).div_euclid(2) as i32;
    (center(surface.0, natural.0), center(surface.1, natural.1))
}

/// Renders the best available frame of a sequence into a container.
///
/// Frames are read from a [`FrameSequence`] shared with the loader; the
/// canvas never writes to it.
pub struct SequenceCanvas<C: Container> {
    frames: FrameSequence<FrameOf<C>>,
    container: C,
    /// Reserved. Frames are always centered at natural size.
    cover: bool,
    display_index: Cell<usize>,
    surface: RefCell<Option<C::Surface>>,
}

impl<C: Container + 'static> SequenceCanvas<C> {
    /// Create a canvas that is not yet attached to its container.
    pub fn new(frames: FrameSequence<FrameOf<C>>, container: C, cover: bool) -> Self {
        Self {
            frames,
            container,
            cover,
            display_index: Cell::new(0),
            surface: RefCell::new(None),
        }
    }

    /// Attach the surface, listen for resizes and do the initial render.
    pub fn setup(self: &Rc<Self>) -> Result<()> {
        let surface = self.container.attach_surface()?;
        *self.surface.borrow_mut() = Some(surface);

        // The listener owns the canvas; it stays live for the page's lifetime.
        let canvas = Rc::clone(self);
        self.container.on_resize(Box::new(move || {
            if let Err(err) = canvas.resize() {
                log::warn!("resize failed: {}", err);
            }
        }))?;

        self.resize()
    }

    /// Draw the frame nearest to `index`.
    ///
    /// Returns the slot that was drawn, or `None` when no frame is loaded
    /// yet. An `index` outside the sequence is rejected.
    pub fn render_index(&self, index: usize) -> Result<Option<usize>> {
        let len = self.frames.len();
        if index >= len {
            log::warn!("render_index({}) out of range for {} frames", index, len);
            return Err(SequenceError::IndexOutOfRange { index, len });
        }
        match self.frames.nearest_filled(index) {
            Some(slot) => {
                self.draw_image(slot)?;
                Ok(Some(slot))
            }
            None => Ok(None),
        }
    }

    /// Clear the surface and draw slot `index` centered at natural size.
    ///
    /// Returns `false` without touching the surface when the slot is empty.
    pub fn draw_image(&self, index: usize) -> Result<bool> {
        let len = self.frames.len();
        if index >= len {
            return Err(SequenceError::IndexOutOfRange { index, len });
        }

        let mut surface = self.surface.borrow_mut();
        let surface = surface.as_mut().ok_or(SequenceError::NotAttached)?;
        let drawn = self.frames.with_frame(index, |frame| {
            surface.clear();
            let (x, y) = draw_position(surface.size(), frame.natural_size());
            surface.draw(frame, x, y)
        });

        match drawn {
            Some(result) => {
                result?;
                self.display_index.set(index);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Match the surface to the container and redraw the current frame.
    pub fn resize(&self) -> Result<()> {
        let (width, height) = self.container.content_size();
        {
            let mut surface = self.surface.borrow_mut();
            let surface = surface.as_mut().ok_or(SequenceError::NotAttached)?;
            surface.set_size(width, height)?;
        }
        if self.frames.is_empty() {
            return Ok(());
        }
        self.render_index(self.display_index.get()).map(|_| ())
    }

    /// Index of the frame drawn most recently.
    #[inline]
    pub fn display_index(&self) -> usize {
        self.display_index.get()
    }

    /// Reserved cover flag as passed at construction.
    #[inline]
    pub fn cover(&self) -> bool {
        self.cover
    }

    /// Returns `true` once `setup()` has attached a surface.
    pub fn is_attached(&self) -> bool {
        self.surface.borrow().is_some()
    }

    /// Element hosting the surface.
    pub fn container(&self) -> &C {
        &self.container
    }

    /// Slots read by this canvas.
    pub fn frames(&self) -> &FrameSequence<FrameOf<C>> {
        &self.frames
    }
}

/// Web-specific container and surface.
#[cfg(feature = "web")]
pub mod web {
    use super::*;
    use js_sys::Function;
    use wasm_bindgen::closure::Closure;
    use wasm_bindgen::JsCast;
    use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, HtmlElement, HtmlImageElement};

    /// An HTML element hosting a `<canvas>`.
    #[derive(Clone, Debug)]
    pub struct DomContainer {
        element: HtmlElement,
    }

    impl DomContainer {
        /// Wrap an existing element.
        pub fn new(element: HtmlElement) -> Self {
            Self { element }
        }

        /// Look up the container with a CSS selector.
        pub fn from_selector(selector: &str) -> Result<Self> {
            let document = web_sys::window()
                .and_then(|w| w.document())
                .ok_or_else(|| SequenceError::Dom("No document available".into()))?;
            let element = document
                .query_selector(selector)?
                .ok_or_else(|| SequenceError::ContainerNotFound {
                    selector: selector.to_string(),
                })?
                .dyn_into::<HtmlElement>()
                .map_err(|_| SequenceError::Dom(format!("`{}` is not an HTML element", selector)))?;
            Ok(Self::new(element))
        }

        /// The hosting element.
        pub fn element(&self) -> &HtmlElement {
            &self.element
        }
    }

    impl Container for DomContainer {
        type Surface = CanvasSurface;

        fn attach_surface(&self) -> Result<CanvasSurface> {
            let document = self
                .element
                .owner_document()
                .ok_or_else(|| SequenceError::Dom("Container has no document".into()))?;
            let canvas = document
                .create_element("canvas")?
                .dyn_into::<HtmlCanvasElement>()
                .map_err(|_| SequenceError::Dom("Failed to cast element to HtmlCanvasElement".into()))?;
            self.element.append_child(&canvas)?;
            CanvasSurface::new(canvas)
        }

        fn content_size(&self) -> (u32, u32) {
            (
                self.element.client_width().max(0) as u32,
                self.element.client_height().max(0) as u32,
            )
        }

        fn on_resize(&self, listener: Box<dyn FnMut()>) -> Result<()> {
            let window = web_sys::window().ok_or_else(|| SequenceError::Dom("No window available".into()))?;
            let closure = Closure::wrap(listener);
            window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref::<Function>())?;
            // The page keeps listening for as long as it lives.
            closure.forget();
            Ok(())
        }
    }

    /// A `<canvas>` element and its 2D context.
    #[derive(Clone, Debug)]
    pub struct CanvasSurface {
        canvas: HtmlCanvasElement,
        ctx: CanvasRenderingContext2d,
    }

    impl CanvasSurface {
        /// Take over `canvas` and its 2D context.
        pub fn new(canvas: HtmlCanvasElement) -> Result<Self> {
            let ctx = canvas
                .get_context("2d")
                .map_err(|_| SequenceError::Dom("Failed to get 2d context".into()))?
                .ok_or_else(|| SequenceError::Dom("No 2d context available".into()))?
                .dyn_into::<CanvasRenderingContext2d>()
                .map_err(|_| SequenceError::Dom("Failed to cast to CanvasRenderingContext2d".into()))?;
            Ok(Self { canvas, ctx })
        }

        /// The underlying `<canvas>` element.
        pub fn canvas(&self) -> &HtmlCanvasElement {
            &self.canvas
        }
    }

    impl Surface for CanvasSurface {
        type Frame = HtmlImageElement;

        fn size(&self) -> (u32, u32) {
            (self.canvas.width(), self.canvas.height())
        }

        fn set_size(&mut self, width: u32, height: u32) -> Result<()> {
            let style = self.canvas.style();
            style.set_property("height", &format!("{}px", height))?;
            style.set_property("width", &format!("{}px", width))?;
            self.canvas.set_height(height);
            self.canvas.set_width(width);
            Ok(())
        }

        fn clear(&mut self) {
            let (width, height) = self.size();
            self.ctx.clear_rect(0.0, 0.0, f64::from(width), f64::from(height));
        }

        fn draw(&mut self, frame: &HtmlImageElement, x: i32, y: i32) -> Result<()> {
            self.ctx
                .draw_image_with_html_image_element(frame, f64::from(x), f64::from(y))?;
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{Draw, MockContainer, MockFrame};

    fn canvas_with(len: usize, filled: &[usize]) -> (Rc<SequenceCanvas<MockContainer>>, MockContainer) {
        let frames = FrameSequence::new(len);
        for &i in filled {
            frames.fill(i, MockFrame::new(i, 100, 50)).unwrap();
        }
        let container = MockContainer::new(300, 200);
        let canvas = Rc::new(SequenceCanvas::new(frames, container.clone(), false));
        canvas.setup().unwrap();
        (canvas, container)
    }

    #[test]
    fn test_draw_position_centers() {
        assert_eq!(draw_position((300, 200), (100, 50)), (100, 75));
        assert_eq!(draw_position((301, 201), (100, 50)), (100, 75));
    }

    #[test]
    fn test_draw_position_negative_floors() {
        assert_eq!(draw_position((100, 100), (200, 300)), (-50, -100));
        assert_eq!(draw_position((0, 0), (3, 1)), (-2, -1));
    }

    #[test]
    fn test_setup_attaches_and_sizes() {
        let (canvas, container) = canvas_with(3, &[]);
        assert!(canvas.is_attached());
        assert_eq!(container.attached(), 1);
        assert_eq!(container.surface_size(), (300, 200));
        assert!(container.draws().is_empty());
    }

    #[test]
    fn test_render_exact_slot() {
        let (canvas, container) = canvas_with(3, &[0, 1, 2]);
        container.clear_log();
        for i in 0..3 {
            assert_eq!(canvas.render_index(i), Ok(Some(i)));
            assert_eq!(canvas.display_index(), i);
        }
        let drawn: Vec<usize> = container.draws().iter().map(|d| d.frame).collect();
        assert_eq!(drawn, vec![0, 1, 2]);
    }

    #[test]
    fn test_render_falls_back_backward_then_forward() {
        let (canvas, container) = canvas_with(6, &[1, 4]);
        container.clear_log();

        assert_eq!(canvas.render_index(3), Ok(Some(1)));
        assert_eq!(canvas.render_index(5), Ok(Some(4)));
        assert_eq!(canvas.render_index(0), Ok(Some(1)));
        assert_eq!(canvas.display_index(), 1);
    }

    #[test]
    fn test_render_nothing_loaded() {
        let (canvas, container) = canvas_with(3, &[]);
        container.clear_log();
        assert_eq!(canvas.render_index(2), Ok(None));
        assert!(container.draws().is_empty());
        assert_eq!(container.clears(), 0);
    }

    #[test]
    fn test_render_out_of_range_rejected() {
        let (canvas, container) = canvas_with(3, &[0]);
        container.clear_log();
        assert_eq!(
            canvas.render_index(3),
            Err(SequenceError::IndexOutOfRange { index: 3, len: 3 })
        );
        assert!(container.draws().is_empty());
        assert_eq!(canvas.display_index(), 0);
    }

    #[test]
    fn test_draw_clears_then_centers() {
        let (canvas, container) = canvas_with(1, &[0]);
        container.clear_log();
        assert_eq!(canvas.draw_image(0), Ok(true));
        assert_eq!(container.clears(), 1);
        assert_eq!(container.draws(), vec![Draw { frame: 0, x: 100, y: 75 }]);
    }

    #[test]
    fn test_draw_empty_slot() {
        let (canvas, container) = canvas_with(2, &[0]);
        container.clear_log();
        assert_eq!(canvas.draw_image(1), Ok(false));
        assert!(container.draws().is_empty());
    }

    #[test]
    fn test_resize_redraws_display_index() {
        let (canvas, container) = canvas_with(3, &[0, 1, 2]);
        canvas.render_index(2).unwrap();
        container.clear_log();

        container.resize_to(500, 400);
        assert_eq!(container.surface_size(), (500, 400));
        assert_eq!(container.draws(), vec![Draw { frame: 2, x: 200, y: 175 }]);
        assert_eq!(canvas.display_index(), 2);
    }

    #[test]
    fn test_resize_after_handle_dropped() {
        let container = MockContainer::new(300, 200);
        {
            let frames = FrameSequence::new(1);
            frames.fill(0, MockFrame::new(0, 100, 50)).unwrap();
            let canvas = Rc::new(SequenceCanvas::new(frames, container.clone(), false));
            canvas.setup().unwrap();
        }
        container.clear_log();

        container.resize_to(500, 400);
        assert_eq!(container.surface_size(), (500, 400));
        assert_eq!(container.draws(), vec![Draw { frame: 0, x: 200, y: 175 }]);
    }

    #[test]
    fn test_zero_size_container() {
        let frames = FrameSequence::new(1);
        frames.fill(0, MockFrame::new(0, 10, 10)).unwrap();
        let container = MockContainer::new(0, 0);
        let canvas = Rc::new(SequenceCanvas::new(frames, container.clone(), true));
        canvas.setup().unwrap();

        assert!(canvas.cover());
        assert_eq!(container.surface_size(), (0, 0));
        assert_eq!(container.draws(), vec![Draw { frame: 0, x: -5, y: -5 }]);
    }

    #[test]
    fn test_draw_before_setup() {
        let frames = FrameSequence::new(1);
        frames.fill(0, MockFrame::new(0, 10, 10)).unwrap();
        let canvas = SequenceCanvas::new(frames, MockContainer::new(10, 10), false);
        assert_eq!(canvas.render_index(0), Err(SequenceError::NotAttached));
    }
}
