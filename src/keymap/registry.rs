//! BindingRegistry: owns listeners and routes raw input to them
//!
//! Every keystroke first updates the [`InputTracker`], then is offered to
//! each listener active in the current context. Key-ups go the other way
//! round: listeners see the release while the key still counts as held.

use std::time::{Duration, Instant};

use indexmap::IndexSet;

use super::error::BindError;
use super::event::{EventType, KeyEvent, KeyRepr, RawInput};
use super::key_table::{HostProfile, KeyTable};
use super::listener::{
    Callback, Listener, ListenerId, TriggeredRecord, Verdict, MUST_RELEASE_FIRE_DELAY,
};
use super::options::BindOptions;
use super::pattern::{parse_bind_keys, PatternKind};
use super::tracker::{InputTracker, SequenceRecord};

/// A must-release sequence fire waiting for its delay to pass
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct DeferredFire {
    listener: ListenerId,
    due: Instant,
}

/// Owns the key table, the input tracker and all bound listeners
#[derive(Debug)]
pub struct BindingRegistry {
    table: KeyTable,
    tracker: InputTracker,
    triggered: TriggeredRecord,
    listeners: Vec<Listener>,
    /// Indices into `listeners` that match the current context
    active: Vec<usize>,
    context: Option<String>,
    mounted: bool,
    next_id: u64,
    deferred: Vec<DeferredFire>,
}

impl BindingRegistry {
    /// Registry using the key table of the compile-target platform
    pub fn new() -> Self {
        Self::with_table(KeyTable::native())
    }

    pub fn with_host(host: HostProfile) -> Self {
        Self::with_table(KeyTable::new(host))
    }

    pub fn with_table(table: KeyTable) -> Self {
        Self {
            table,
            tracker: InputTracker::new(),
            triggered: TriggeredRecord::default(),
            listeners: Vec::new(),
            active: Vec::new(),
            context: None,
            mounted: false,
            next_id: 1,
            deferred: Vec::new(),
        }
    }

    pub fn key_table(&self) -> &KeyTable {
        &self.table
    }

    /// Bind one or more patterns to the given callbacks
    ///
    /// Invalid patterns (unknown key names, mixed separators) and sequences
    /// without a press-down callback are dropped; the call only fails when
    /// nothing could be bound.
    pub fn bind(
        &mut self,
        options: impl Into<BindOptions>,
        on_press_down: Option<Callback>,
        on_press_up: Option<Callback>,
    ) -> Result<Vec<ListenerId>, BindError> {
        if on_press_down.is_none() && on_press_up.is_none() {
            return Err(BindError::MissingCallback);
        }

        let options = options.into();
        let mut ids = Vec::new();

        for pattern in parse_bind_keys(&options.bind_keys, &self.table) {
            let id = ListenerId(self.next_id);
            let built = Listener::builder(pattern)
                .config(options.config.clone())
                .on_press_down(on_press_down.clone())
                .on_press_up(on_press_up.clone())
                .build(id, &self.table);

            match built {
                Ok(listener) => {
                    self.next_id += 1;
                    tracing::debug!("Bound {:?}: {}", id, listener.display_string());
                    ids.push(id);
                    self.listeners.push(listener);
                }
                Err(e) => tracing::debug!("Dropping listener: {}", e),
            }
        }

        if ids.is_empty() {
            return Err(BindError::NoValidPattern(options.bind_keys.to_string()));
        }

        self.refresh_active();
        Ok(ids)
    }

    /// Remove the given listeners; true if at least one was bound
    ///
    /// Pending must-release fires of removed listeners are cancelled.
    pub fn unbind(&mut self, ids: &[ListenerId]) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|listener| !ids.contains(&listener.id()));
        self.deferred.retain(|fire| !ids.contains(&fire.listener));

        let removed = self.listeners.len() != before;
        if removed {
            tracing::debug!("Unbound {} listener(s)", before - self.listeners.len());
        }
        self.refresh_active();
        removed
    }

    pub fn unbind_one(&mut self, id: ListenerId) -> bool {
        self.unbind(&[id])
    }

    /// Set the active context; `None` or an empty name clears it
    pub fn set_context(&mut self, context: Option<&str>) {
        self.context = context
            .filter(|name| !name.is_empty())
            .map(str::to_string);
        tracing::debug!("Context set to {:?}", self.context);
        self.refresh_active();
    }

    pub fn current_context(&self) -> Option<&str> {
        self.context.as_deref()
    }

    /// Distinct contexts named by bound listeners, in bind order
    pub fn contexts(&self) -> Vec<&str> {
        let mut contexts: Vec<&str> = Vec::new();
        for context in self.listeners.iter().filter_map(Listener::context) {
            if !context.is_empty() && !contexts.contains(&context) {
                contexts.push(context);
            }
        }
        contexts
    }

    pub fn listeners(&self) -> &[Listener] {
        &self.listeners
    }

    pub fn listener(&self, id: ListenerId) -> Option<&Listener> {
        self.listeners.iter().find(|listener| listener.id() == id)
    }

    /// Listeners that participate in matching under the current context
    pub fn active_listeners(&self) -> impl Iterator<Item = &Listener> {
        self.active.iter().map(|&idx| &self.listeners[idx])
    }

    /// Drop every listener and the active context
    pub fn reset(&mut self) {
        self.context = None;
        self.listeners.clear();
        self.active.clear();
        self.deferred.clear();
        tracing::debug!("Registry reset");
    }

    pub fn set_sequence_interval(&mut self, interval: Duration) {
        self.tracker.set_sequence_interval(interval);
    }

    pub fn set_sequence_must_release_last_press(&mut self, enabled: bool) {
        self.tracker.set_must_release_last_press(enabled);
    }

    /// Start receiving raw input; no-op when already mounted
    pub fn mount(&mut self) {
        if self.mounted {
            return;
        }
        self.mounted = true;
        tracing::debug!("Registry mounted");
    }

    /// Stop receiving raw input; no-op when not mounted
    ///
    /// Pending must-release fires are dropped.
    pub fn unmount(&mut self) {
        if !self.mounted {
            return;
        }
        self.mounted = false;
        self.deferred.clear();
        tracing::debug!("Registry unmounted");
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    /// Live held-key and sequence state
    pub fn tracker(&self) -> &InputTracker {
        &self.tracker
    }

    /// Keys currently held, in press order
    pub fn pressed_records(&self, event_type: EventType) -> &IndexSet<KeyRepr> {
        self.tracker.pressed(event_type)
    }

    pub fn sequence_records(&self, event_type: EventType) -> &SequenceRecord {
        self.tracker.sequence(event_type)
    }

    pub fn triggered_record(&self) -> &TriggeredRecord {
        &self.triggered
    }

    /// Route one raw input; returns how many callbacks ran
    ///
    /// Ignored while unmounted.
    pub fn dispatch(&mut self, input: &RawInput) -> usize {
        if !self.mounted {
            return 0;
        }

        #[cfg(feature = "profile-tracing")]
        let _span = tracing::trace_span!("dispatch").entered();

        match input {
            RawInput::KeyDown(event) => self.handle_key_down(event),
            RawInput::KeyUp(event) => self.handle_key_up(event),
            RawInput::Blur => {
                self.handle_blur();
                0
            }
        }
    }

    /// Run must-release sequence fires that are due at `now`
    ///
    /// A fire is dropped when more than one key is held at that point.
    pub fn poll_timers(&mut self, now: Instant) -> usize {
        if !self.mounted || self.deferred.is_empty() {
            return 0;
        }

        let (due, pending): (Vec<DeferredFire>, Vec<DeferredFire>) =
            std::mem::take(&mut self.deferred)
                .into_iter()
                .partition(|fire| fire.due <= now);
        self.deferred = pending;

        let mut fired = 0;
        for fire in due {
            let Some(listener) = self.listeners.iter().find(|l| l.id() == fire.listener) else {
                continue;
            };
            if !listener.deferred_fire_allowed(&self.tracker) {
                tracing::trace!("Deferred fire for {:?} aborted: keys still held", fire.listener);
                continue;
            }
            if listener.fire_press_down() {
                fired += 1;
            }
        }
        fired
    }

    /// When the next deferred fire is due, for hosts that sleep between events
    pub fn next_deadline(&self) -> Option<Instant> {
        self.deferred.iter().map(|fire| fire.due).min()
    }

    fn handle_key_down(&mut self, event: &KeyEvent) -> usize {
        if !event.repeat {
            self.tracker.record_press(event);
        }

        let mut fired = 0;
        let mut marks = Vec::new();

        for &idx in &self.active {
            let listener = &self.listeners[idx];
            match listener.on_press_down(event, &self.tracker, &self.triggered) {
                Verdict::Skip => {}
                Verdict::Fire => {
                    if listener.fire_press_down() {
                        fired += 1;
                    }
                    if listener.kind() == PatternKind::Combination {
                        marks.push(idx);
                    }
                }
                Verdict::Defer => self.deferred.push(DeferredFire {
                    listener: listener.id(),
                    due: event.time + MUST_RELEASE_FIRE_DELAY,
                }),
            }
        }

        // Marks apply after the pass so listeners sharing a trigger all see the same state
        for idx in marks {
            let listener = &self.listeners[idx];
            self.triggered
                .mark(listener.event_type(), listener.trigger_key());
        }

        fired
    }

    fn handle_key_up(&mut self, event: &KeyEvent) -> usize {
        let mut fired = 0;
        let mut released = Vec::new();

        for &idx in &self.active {
            let listener = &self.listeners[idx];
            if listener.on_press_up(event, &self.tracker) {
                if listener.fire_press_up() {
                    fired += 1;
                }
                released.push(idx);
            }
        }

        for idx in released {
            let listener = &self.listeners[idx];
            self.triggered
                .unmark(listener.event_type(), listener.trigger_key());
        }

        self.tracker.record_release(event);
        fired
    }

    fn handle_blur(&mut self) {
        self.tracker.clear_all();
        self.triggered.clear();
        tracing::debug!("Focus lost, input state cleared");
    }

    fn refresh_active(&mut self) {
        let context = self.context.as_deref();
        self.active = self
            .listeners
            .iter()
            .enumerate()
            .filter(|(_, listener)| listener.is_active_in(context))
            .map(|(idx, _)| idx)
            .collect();
    }
}

impl Default for BindingRegistry {
    fn default() -> Self {
        Self::new()
    }
}
