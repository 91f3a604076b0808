//! In-memory fakes for unit tests.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

use crate::canvas::{Container, Surface};
use crate::error::{Result, SequenceError};
use crate::frames::Frame;
use crate::loader::{ImageSource, LoadCallback};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MockFrame {
    pub id: usize,
    pub width: u32,
    pub height: u32,
}

impl MockFrame {
    pub fn new(id: usize, width: u32, height: u32) -> Self {
        Self { id, width, height }
    }
}

impl Frame for MockFrame {
    fn natural_size(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

/// Image source completed by hand, or synchronously when `immediate`.
#[derive(Default)]
pub struct MockSource {
    requested: RefCell<Vec<String>>,
    pending: RefCell<VecDeque<(usize, LoadCallback<MockFrame>)>>,
    immediate: Option<(u32, u32)>,
}

impl MockSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn immediate(width: u32, height: u32) -> Self {
        Self {
            immediate: Some((width, height)),
            ..Self::default()
        }
    }

    pub fn requested(&self) -> Vec<String> {
        self.requested.borrow().clone()
    }

    pub fn pending(&self) -> usize {
        self.pending.borrow().len()
    }

    /// Complete the oldest request; the frame id is its request number.
    pub fn complete_next(&self, width: u32, height: u32) {
        let next = self.pending.borrow_mut().pop_front();
        if let Some((id, callback)) = next {
            callback(Ok(MockFrame::new(id, width, height)));
        }
    }

    pub fn fail_next(&self, reason: &str) {
        let next = self.pending.borrow_mut().pop_front();
        if let Some((id, callback)) = next {
            let locator = self.requested.borrow()[id].clone();
            callback(Err(SequenceError::Load {
                locator,
                reason: reason.to_string(),
            }));
        }
    }
}

impl ImageSource for MockSource {
    type Frame = MockFrame;

    fn load(&self, locator: &str, on_complete: LoadCallback<MockFrame>) {
        let id = {
            let mut requested = self.requested.borrow_mut();
            requested.push(locator.to_string());
            requested.len() - 1
        };
        match self.immediate {
            Some((width, height)) => on_complete(Ok(MockFrame::new(id, width, height))),
            None => self.pending.borrow_mut().push_back((id, on_complete)),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Draw {
    pub frame: usize,
    pub x: i32,
    pub y: i32,
}

#[derive(Default)]
struct SurfaceLog {
    size: (u32, u32),
    clears: usize,
    draws: Vec<Draw>,
}

/// Surface recording into a log shared with its container.
pub struct MockSurface {
    log: Rc<RefCell<SurfaceLog>>,
}

impl Surface for MockSurface {
    type Frame = MockFrame;

    fn size(&self) -> (u32, u32) {
        self.log.borrow().size
    }

    fn set_size(&mut self, width: u32, height: u32) -> Result<()> {
        self.log.borrow_mut().size = (width, height);
        Ok(())
    }

    fn clear(&mut self) {
        self.log.borrow_mut().clears += 1;
    }

    fn draw(&mut self, frame: &MockFrame, x: i32, y: i32) -> Result<()> {
        self.log.borrow_mut().draws.push(Draw { frame: frame.id, x, y });
        Ok(())
    }
}

#[derive(Clone)]
pub struct MockContainer {
    size: Rc<Cell<(u32, u32)>>,
    attached: Rc<Cell<usize>>,
    log: Rc<RefCell<SurfaceLog>>,
    on_resize: Rc<RefCell<Vec<Box<dyn FnMut()>>>>,
}

impl MockContainer {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            size: Rc::new(Cell::new((width, height))),
            attached: Rc::new(Cell::new(0)),
            log: Rc::new(RefCell::new(SurfaceLog::default())),
            on_resize: Rc::new(RefCell::new(Vec::new())),
        }
    }

    /// Change the layout size and fire the resize listeners.
    pub fn resize_to(&self, width: u32, height: u32) {
        self.size.set((width, height));
        let mut listeners = std::mem::take(&mut *self.on_resize.borrow_mut());
        for listener in &mut listeners {
            listener();
        }
        self.on_resize.borrow_mut().extend(listeners);
    }

    pub fn attached(&self) -> usize {
        self.attached.get()
    }

    pub fn surface_size(&self) -> (u32, u32) {
        self.log.borrow().size
    }

    pub fn draws(&self) -> Vec<Draw> {
        self.log.borrow().draws.clone()
    }

    pub fn clears(&self) -> usize {
        self.log.borrow().clears
    }

    pub fn clear_log(&self) {
        let mut log = self.log.borrow_mut();
        log.clears = 0;
        log.draws.clear();
    }
}

impl Container for MockContainer {
    type Surface = MockSurface;

    fn attach_surface(&self) -> Result<MockSurface> {
        self.attached.set(self.attached.get() + 1);
        Ok(MockSurface {
            log: Rc::clone(&self.log),
        })
    }

    fn content_size(&self) -> (u32, u32) {
        self.size.get()
    }

    fn on_resize(&self, listener: Box<dyn FnMut()>) -> Result<()> {
        self.on_resize.borrow_mut().push(listener);
        Ok(())
    }
}
