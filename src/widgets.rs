//! Slide carousel and tab switcher controllers.
//!
//! Both are platform-agnostic state machines; the `web` module binds them to
//! page elements.

/// Default autoplay interval for [`Carousel`].
pub const DEFAULT_SLIDE_INTERVAL_MS: u32 = 5000;

/// Wrapping slide index for a horizontal carousel.
///
/// The controller does not handle timing. The caller calls `tick()` every
/// `interval_ms()` to autoplay.
///
/// ## Example
///
/// ```rust
/// use scroll_sequence::Carousel;
///
/// let mut carousel = Carousel::new(3);
/// carousel.tick();
/// carousel.tick();
/// assert_eq!(carousel.transform(), "translateX(-200%)");
/// carousel.tick();
/// assert_eq!(carousel.current(), 0);
/// ```
#[derive(Clone, Debug)]
pub struct Carousel {
    current: usize,
    count: usize,
    interval_ms: u32,
}

impl Carousel {
    /// Create a carousel over `count` slides, showing the first.
    pub fn new(count: usize) -> Self {
        Self {
            current: 0,
            count,
            interval_ms: DEFAULT_SLIDE_INTERVAL_MS,
        }
    }

    /// Set the autoplay interval in milliseconds (at least 1).
    pub fn with_interval(mut self, interval_ms: u32) -> Self {
        self.interval_ms = interval_ms.max(1);
        self
    }

    /// Show slide `index`, wrapping past either end.
    ///
    /// Anything at or past the last slide goes back to the first; anything
    /// negative goes to the last.
    pub fn show(&mut self, index: isize) -> usize {
        self.current = if self.count == 0 || index >= self.count as isize {
            0
        } else if index < 0 {
            self.count - 1
        } else {
            index as usize
        };
        self.current
    }

    /// Show the following slide, wrapping to the first.
    pub fn next(&mut self) -> usize {
        self.show(self.current as isize + 1)
    }

    /// Show the preceding slide, wrapping to the last.
    pub fn previous(&mut self) -> usize {
        self.show(self.current as isize - 1)
    }

    /// Advance one slide (autoplay step).
    #[inline]
    pub fn tick(&mut self) -> usize {
        self.next()
    }

    /// Index of the visible slide.
    #[inline]
    pub fn current(&self) -> usize {
        self.current
    }

    /// Number of slides.
    #[inline]
    pub fn count(&self) -> usize {
        self.count
    }

    /// Autoplay interval in milliseconds.
    #[inline]
    pub fn interval_ms(&self) -> u32 {
        self.interval_ms
    }

    /// CSS transform placing the current slide in view.
    pub fn transform(&self) -> String {
        format!("translateX(-{}%)", self.current * 100)
    }
}

/// Exactly one visible tab among a fixed set.
#[derive(Clone, Debug, Default)]
pub struct TabSwitcher {
    tabs: Vec<String>,
    active: Option<usize>,
}

impl TabSwitcher {
    /// Create a switcher with no tab selected.
    pub fn new<I, T>(tabs: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        Self {
            tabs: tabs.into_iter().map(Into::into).collect(),
            active: None,
        }
    }

    /// Make `tab` the only visible tab.
    ///
    /// Unknown ids are ignored and return `false`.
    pub fn select(&mut self, tab: &str) -> bool {
        match self.tabs.iter().position(|t| t == tab) {
            Some(pos) => {
                self.active = Some(pos);
                true
            }
            None => false,
        }
    }

    /// The selected tab, if any.
    pub fn active(&self) -> Option<&str> {
        self.active.map(|i| self.tabs[i].as_str())
    }

    /// Returns `true` when `tab` is the selected tab.
    pub fn is_visible(&self, tab: &str) -> bool {
        self.active() == Some(tab)
    }

    /// Known tab ids in order.
    pub fn tabs(&self) -> &[String] {
        &self.tabs
    }

    /// Element id holding the content of `tab`.
    pub fn content_id(tab: &str) -> String {
        format!("tab{}", tab)
    }
}

/// DOM wiring for the carousel and tabs.
#[cfg(feature = "web")]
pub mod web {
    use super::*;
    use crate::error::{Result, SequenceError};
    use js_sys::Function;
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::closure::Closure;
    use wasm_bindgen::JsCast;
    use web_sys::{Document, Element, HtmlElement};

    fn html_elements(document: &Document, selector: &str) -> Result<Vec<HtmlElement>> {
        let nodes = document.query_selector_all(selector)?;
        Ok((0..nodes.length())
            .filter_map(|i| nodes.item(i))
            .filter_map(|node| node.dyn_into::<HtmlElement>().ok())
            .collect())
    }

    /// Autoplay `carousel` by translating `track` on every tick.
    ///
    /// Returns the interval handle.
    pub fn start_carousel(track: HtmlElement, mut carousel: Carousel) -> Result<i32> {
        let window = web_sys::window().ok_or_else(|| SequenceError::Dom("No window available".into()))?;
        let interval_ms = carousel.interval_ms();
        let closure = Closure::wrap(Box::new(move || {
            carousel.tick();
            if let Err(err) = track.style().set_property("transform", &carousel.transform()) {
                log::warn!("failed to move carousel: {:?}", err);
            }
        }) as Box<dyn FnMut()>);
        let handle = window.set_interval_with_callback_and_timeout_and_arguments_0(
            closure.as_ref().unchecked_ref::<Function>(),
            interval_ms.min(i32::MAX as u32) as i32,
        )?;
        closure.forget();
        Ok(handle)
    }

    /// Autoplay the `.slides` track over its `.slide` children.
    pub fn wire_carousel(document: &Document, interval_ms: u32) -> Result<i32> {
        let track = html_elements(document, ".slides")?
            .into_iter()
            .next()
            .ok_or_else(|| SequenceError::ContainerNotFound {
                selector: ".slides".into(),
            })?;
        let count = document.query_selector_all(".slide")?.length() as usize;
        start_carousel(track, Carousel::new(count).with_interval(interval_ms))
    }

    fn apply_tabs(document: &Document, switcher: &TabSwitcher) -> Result<()> {
        for content in html_elements(document, ".tab-content")? {
            content.style().set_property("display", "none")?;
        }
        if let Some(active) = switcher.active() {
            let id = TabSwitcher::content_id(active);
            let element = document
                .get_element_by_id(&id)
                .and_then(|e| e.dyn_into::<HtmlElement>().ok())
                .ok_or(SequenceError::ContainerNotFound { selector: format!("#{}", id) })?;
            element.style().set_property("display", "block")?;
        }
        Ok(())
    }

    /// Show `#tab{id}` when a `.tab-button[data-tab=id]` is clicked.
    pub fn wire_tabs(document: &Document) -> Result<()> {
        let nodes = document.query_selector_all(".tab-button")?;
        let buttons: Vec<(Element, String)> = (0..nodes.length())
            .filter_map(|i| nodes.item(i))
            .filter_map(|node| node.dyn_into::<Element>().ok())
            .filter_map(|button| button.get_attribute("data-tab").map(|tab| (button, tab)))
            .collect();

        let switcher = Rc::new(RefCell::new(TabSwitcher::new(
            buttons.iter().map(|(_, tab)| tab.clone()),
        )));

        for (button, tab) in buttons {
            let document = document.clone();
            let switcher = Rc::clone(&switcher);
            let closure = Closure::wrap(Box::new(move || {
                let mut switcher = switcher.borrow_mut();
                if switcher.select(&tab) {
                    if let Err(err) = apply_tabs(&document, &switcher) {
                        log::warn!("failed to switch to tab {}: {}", tab, err);
                    }
                }
            }) as Box<dyn FnMut()>);
            button.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref::<Function>())?;
            closure.forget();
        }
        Ok(())
    }
}
