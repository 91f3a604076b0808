//! Minimal synchronous publish/subscribe.
//!
//! Listeners are keyed by event name and invoked in registration order on the
//! calling thread. All methods take `&self` so that a listener can subscribe,
//! unsubscribe or emit on the same emitter while it is being invoked.
//!
//! ## Re-entrancy
//!
//! Each `emit` works on a snapshot of the listeners registered when it
//! started. A listener added during an emission is not called by it; a
//! listener removed during an emission may still be called by it. A listener
//! that re-emits the event currently invoking it is skipped for the nested
//! emission. Ordering in these cases is not guaranteed.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

/// Handle returned by [`EventEmitter::on`] and [`EventEmitter::once`],
/// used to unregister the listener with [`EventEmitter::off`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Callback<A> = Rc<RefCell<dyn FnMut(&A)>>;

struct Entry<A> {
    id: ListenerId,
    once: bool,
    callback: Callback<A>,
}

/// Named event listeners receiving an argument of type `A`.
///
/// ## Example
///
/// ```rust
/// use std::cell::Cell;
/// use std::rc::Rc;
/// use scroll_sequence::EventEmitter;
///
/// let emitter: EventEmitter<u32> = EventEmitter::new();
/// let total = Rc::new(Cell::new(0));
///
/// let sink = Rc::clone(&total);
/// emitter.on("tick", move |n| sink.set(sink.get() + n));
///
/// assert!(emitter.emit("tick", &2));
/// assert!(emitter.emit("tick", &3));
/// assert!(!emitter.emit("other", &1));
/// assert_eq!(total.get(), 5);
/// ```
pub struct EventEmitter<A = ()> {
    listeners: RefCell<HashMap<String, Vec<Entry<A>>>>,
    next_id: Cell<u64>,
}

impl<A> Default for EventEmitter<A> {
    fn default() -> Self {
        Self {
            listeners: RefCell::new(HashMap::new()),
            next_id: Cell::new(0),
        }
    }
}

impl<A> fmt::Debug for EventEmitter<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let counts: HashMap<String, usize> = self
            .listeners
            .borrow()
            .iter()
            .map(|(name, entries)| (name.clone(), entries.len()))
            .collect();
        f.debug_struct("EventEmitter").field("listeners", &counts).finish()
    }
}

impl<A: 'static> EventEmitter<A> {
    /// Create an emitter with no listeners.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener that stays registered until removed with `off`.
    pub fn on<F>(&self, name: &str, listener: F) -> ListenerId
    where
        F: FnMut(&A) + 'static,
    {
        self.register(name, false, Rc::new(RefCell::new(listener)))
    }

    /// Register a listener that is unregistered after its first invocation.
    pub fn once<F>(&self, name: &str, listener: F) -> ListenerId
    where
        F: FnOnce(&A) + 'static,
    {
        let mut slot = Some(listener);
        let callback = move |args: &A| {
            if let Some(listener) = slot.take() {
                listener(args);
            }
        };
        self.register(name, true, Rc::new(RefCell::new(callback)))
    }

    /// Remove a listener.
    ///
    /// Returns `false` and leaves the emitter untouched when `name` has no
    /// listeners or `id` is not registered under it.
    pub fn off(&self, name: &str, id: ListenerId) -> bool {
        let mut listeners = self.listeners.borrow_mut();
        let Some(entries) = listeners.get_mut(name) else {
            return false;
        };
        let Some(pos) = entries.iter().position(|e| e.id == id) else {
            return false;
        };
        entries.remove(pos);
        if entries.is_empty() {
            listeners.remove(name);
        }
        true
    }

    /// Invoke every listener registered for `name`, in registration order.
    ///
    /// Returns whether any listener was registered. Emitting an event nobody
    /// listens to is not an error.
    pub fn emit(&self, name: &str, args: &A) -> bool {
        let snapshot: Vec<Callback<A>> = {
            let mut listeners = self.listeners.borrow_mut();
            let Some(entries) = listeners.get_mut(name) else {
                return false;
            };
            let snapshot = entries.iter().map(|e| Rc::clone(&e.callback)).collect();
            // One-shot listeners leave before running so a nested emit can't reach them.
            entries.retain(|e| !e.once);
            if entries.is_empty() {
                listeners.remove(name);
            }
            snapshot
        };

        for callback in &snapshot {
            match callback.try_borrow_mut() {
                Ok(mut listener) => (&mut *listener)(args),
                Err(_) => log::warn!("skipping re-entrant listener for event `{}`", name),
            }
        }
        !snapshot.is_empty()
    }

    /// Number of listeners currently registered for `name`.
    pub fn listener_count(&self, name: &str) -> usize {
        self.listeners.borrow().get(name).map_or(0, Vec::len)
    }

    fn register(&self, name: &str, once: bool, callback: Callback<A>) -> ListenerId {
        let id = ListenerId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        self.listeners
            .borrow_mut()
            .entry(name.to_string())
            .or_default()
            .push(Entry { id, once, callback });
        id
    }
}
