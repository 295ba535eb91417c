//! Shared test helpers for integration tests
//!
//! Note: Functions may appear unused because each test file compiles separately.

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::{Duration, Instant};

use keybind::keymap::{callback, BindingRegistry, Callback, HostProfile, KeyEvent, RawInput};

/// Counts callback invocations
#[derive(Clone, Default)]
pub struct Recorder {
    hits: Rc<Cell<usize>>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn callback(&self) -> Option<Callback> {
        let hits = Rc::clone(&self.hits);
        Some(callback(move || hits.set(hits.get() + 1)))
    }

    pub fn count(&self) -> usize {
        self.hits.get()
    }
}

/// Records the order in which labelled callbacks fire
#[derive(Clone, Default)]
pub struct Journal {
    entries: Rc<RefCell<Vec<String>>>,
}

impl Journal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn callback(&self, label: &str) -> Option<Callback> {
        let entries = Rc::clone(&self.entries);
        let label = label.to_string();
        Some(callback(move || entries.borrow_mut().push(label.clone())))
    }

    pub fn entries(&self) -> Vec<String> {
        self.entries.borrow().clone()
    }
}

/// Drives a mounted registry with key events on a virtual clock
pub struct Keyboard {
    pub registry: BindingRegistry,
    start: Instant,
    now: Duration,
}

impl Keyboard {
    pub fn new() -> Self {
        Self::with_registry(BindingRegistry::new())
    }

    pub fn with_host(host: HostProfile) -> Self {
        Self::with_registry(BindingRegistry::with_host(host))
    }

    fn with_registry(mut registry: BindingRegistry) -> Self {
        registry.mount();
        Self {
            registry,
            start: Instant::now(),
            now: Duration::ZERO,
        }
    }

    /// Current virtual time
    pub fn now(&self) -> Instant {
        self.start + self.now
    }

    /// Advance the clock without running timers
    pub fn advance(&mut self, ms: u64) {
        self.now += Duration::from_millis(ms);
    }

    /// Advance the clock and run any deferred fires that became due
    pub fn wait(&mut self, ms: u64) -> usize {
        self.advance(ms);
        let now = self.now();
        self.registry.poll_timers(now)
    }

    pub fn event(&self, name: &str) -> KeyEvent {
        let entry = self
            .registry
            .key_table()
            .entry(name)
            .unwrap_or_else(|| panic!("no key named {name:?}"));
        KeyEvent::from_entry(entry, self.now())
    }

    pub fn down(&mut self, name: &str) -> usize {
        let event = self.event(name);
        self.registry.dispatch(&RawInput::KeyDown(event))
    }

    /// OS auto-repeat of a held key
    pub fn repeat(&mut self, name: &str) -> usize {
        let event = self.event(name).with_repeat(true);
        self.registry.dispatch(&RawInput::KeyDown(event))
    }

    pub fn up(&mut self, name: &str) -> usize {
        let event = self.event(name);
        self.registry.dispatch(&RawInput::KeyUp(event))
    }

    /// Press and release one key
    pub fn tap(&mut self, name: &str) -> usize {
        let fired = self.down(name);
        self.advance(10);
        fired + self.up(name)
    }

    /// Tap each key in turn, `gap_ms` apart
    pub fn type_keys(&mut self, names: &[&str], gap_ms: u64) -> usize {
        let mut fired = 0;
        for (i, name) in names.iter().enumerate() {
            if i > 0 {
                self.advance(gap_ms);
            }
            fired += self.tap(name);
        }
        fired
    }

    pub fn blur(&mut self) {
        self.registry.dispatch(&RawInput::Blur);
    }
}
