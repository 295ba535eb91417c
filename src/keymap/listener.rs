//! Listener: one bound pattern, its options and its callbacks
//!
//! Listeners hold no mutable state. On every keystroke the registry lends
//! them the tracker and the triggered record, and they answer whether their
//! pattern has just been satisfied.

use std::collections::HashSet;
use std::fmt;
use std::rc::Rc;
use std::time::Duration;

use indexmap::IndexSet;

use super::error::ListenerError;
use super::event::{EventType, KeyEvent, KeyRepr};
use super::key_table::KeyTable;
use super::options::{ListenerConfig, StrictOrder};
use super::pattern::{BindingPattern, PatternKind};
use super::tracker::{InputTracker, SequenceRecord};

/// Delay before a sequence fires in must-release mode
pub const MUST_RELEASE_FIRE_DELAY: Duration = Duration::from_millis(100);

/// A trigger callback
pub type Callback = Rc<dyn Fn()>;

/// Wrap a closure as a [`Callback`]
pub fn callback(f: impl Fn() + 'static) -> Callback {
    Rc::new(f)
}

/// Identity of a bound listener, returned by `bind` and accepted by `unbind`
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(pub(crate) u64);

/// Combination trigger strings that have fired and not yet been released
#[derive(Debug, Clone, Default)]
pub struct TriggeredRecord {
    marked: HashSet<(EventType, String)>,
}

impl TriggeredRecord {
    pub fn is_marked(&self, event_type: EventType, trigger_key: &str) -> bool {
        self.marked
            .contains(&(event_type, trigger_key.to_string()))
    }

    pub fn len(&self) -> usize {
        self.marked.len()
    }

    pub fn is_empty(&self) -> bool {
        self.marked.is_empty()
    }

    pub(crate) fn mark(&mut self, event_type: EventType, trigger_key: &str) {
        self.marked.insert((event_type, trigger_key.to_string()));
    }

    pub(crate) fn unmark(&mut self, event_type: EventType, trigger_key: &str) {
        self.marked.remove(&(event_type, trigger_key.to_string()));
    }

    pub(crate) fn clear(&mut self) {
        self.marked.clear();
    }
}

/// Outcome of offering a key-down to a listener
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Verdict {
    Skip,
    Fire,
    /// Fire after [`MUST_RELEASE_FIRE_DELAY`] if at most one key is still held
    Defer,
}

/// A bound pattern with its matching configuration
pub struct Listener {
    id: ListenerId,
    pattern: BindingPattern,
    config: ListenerConfig,
    reprs: Vec<KeyRepr>,
    trigger_key: String,
    fold_case: bool,
    on_press_down: Option<Callback>,
    on_press_up: Option<Callback>,
}

impl Listener {
    pub(crate) fn builder(pattern: BindingPattern) -> ListenerBuilder {
        ListenerBuilder {
            pattern,
            config: ListenerConfig::default(),
            on_press_down: None,
            on_press_up: None,
        }
    }

    pub fn id(&self) -> ListenerId {
        self.id
    }

    pub fn pattern(&self) -> &BindingPattern {
        &self.pattern
    }

    pub fn config(&self) -> &ListenerConfig {
        &self.config
    }

    pub fn kind(&self) -> PatternKind {
        self.pattern.kind()
    }

    pub fn event_type(&self) -> EventType {
        self.config.event_type
    }

    pub fn context(&self) -> Option<&str> {
        self.config.context.as_deref()
    }

    /// Pattern keys resolved for the listener's event type, joined by the pattern separator
    pub fn trigger_key(&self) -> &str {
        &self.trigger_key
    }

    pub fn has_press_down(&self) -> bool {
        self.on_press_down.is_some()
    }

    pub fn has_press_up(&self) -> bool {
        self.on_press_up.is_some()
    }

    /// Whether this listener participates while `active` is the current context
    pub fn is_active_in(&self, active: Option<&str>) -> bool {
        match self.context() {
            None => true,
            Some(own) => Some(own) == active,
        }
    }

    /// Human-readable form, e.g. `"ctrl+s [editor]"`
    pub fn display_string(&self) -> String {
        match self.context() {
            Some(context) => format!("{} [{}]", self.pattern, context),
            None => self.pattern.to_string(),
        }
    }

    pub(crate) fn on_press_down(
        &self,
        event: &KeyEvent,
        tracker: &InputTracker,
        triggered: &TriggeredRecord,
    ) -> Verdict {
        match self.pattern.kind() {
            PatternKind::Combination => self.combination_press_down(event, tracker, triggered),
            PatternKind::Sequence => self.sequence_press_down(event, tracker),
        }
    }

    fn combination_press_down(
        &self,
        event: &KeyEvent,
        tracker: &InputTracker,
        triggered: &TriggeredRecord,
    ) -> Verdict {
        if self.config.prevent_repeat && event.repeat {
            return Verdict::Skip;
        }

        let pressed = tracker.pressed(self.config.event_type);
        if !self.all_keys_pressed(pressed) || !self.order_satisfied(pressed) {
            return Verdict::Skip;
        }

        if self.config.prevent_same && triggered.is_marked(self.config.event_type, &self.trigger_key) {
            return Verdict::Skip;
        }

        Verdict::Fire
    }

    fn sequence_press_down(&self, event: &KeyEvent, tracker: &InputTracker) -> Verdict {
        // Sequences never fire on auto-repeat
        if event.repeat {
            return Verdict::Skip;
        }

        let must_release = tracker.must_release_last_press();
        if must_release && tracker.pressed(self.config.event_type).len() > 1 {
            return Verdict::Skip;
        }

        if !self.sequence_satisfied(tracker.sequence(self.config.event_type)) {
            return Verdict::Skip;
        }

        if must_release {
            Verdict::Defer
        } else {
            Verdict::Fire
        }
    }

    /// Combination press-up: the released key belongs to the pattern and the
    /// pattern was still fully held
    ///
    /// Must be evaluated before the tracker forgets the released key.
    pub(crate) fn on_press_up(&self, event: &KeyEvent, tracker: &InputTracker) -> bool {
        if self.pattern.kind() != PatternKind::Combination {
            return false;
        }

        let pressed = tracker.pressed(self.config.event_type);
        if !self.all_keys_pressed(pressed) {
            return false;
        }

        let released = event.repr(self.config.event_type);
        self.reprs
            .iter()
            .any(|repr| repr.matches(&released, self.fold_case))
    }

    /// Whether a deferred fire may still run given the current tracker state
    pub(crate) fn deferred_fire_allowed(&self, tracker: &InputTracker) -> bool {
        tracker.pressed(self.config.event_type).len() <= 1
    }

    /// Run the press-down callback; false when there is none
    pub(crate) fn fire_press_down(&self) -> bool {
        tracing::trace!("Listener {:?} fired on press-down: {}", self.id, self.trigger_key);
        match &self.on_press_down {
            Some(callback) => {
                callback();
                true
            }
            None => false,
        }
    }

    /// Run the press-up callback; false when there is none
    pub(crate) fn fire_press_up(&self) -> bool {
        tracing::trace!("Listener {:?} fired on press-up: {}", self.id, self.trigger_key);
        match &self.on_press_up {
            Some(callback) => {
                callback();
                true
            }
            None => false,
        }
    }

    fn all_keys_pressed(&self, pressed: &IndexSet<KeyRepr>) -> bool {
        self.reprs
            .iter()
            .all(|repr| pressed.iter().any(|held| held.matches(repr, self.fold_case)))
    }

    fn order_satisfied(&self, pressed: &IndexSet<KeyRepr>) -> bool {
        let held: Vec<&KeyRepr> = pressed.iter().collect();
        let same_run = |window: &[&KeyRepr]| {
            window
                .iter()
                .zip(&self.reprs)
                .all(|(seen, want)| seen.matches(want, self.fold_case))
        };

        match self.config.strict_order {
            StrictOrder::Off => true,
            StrictOrder::Equal => held.len() == self.reprs.len() && same_run(held.as_slice()),
            StrictOrder::Contains => held.windows(self.reprs.len()).any(same_run),
        }
    }

    /// The running sequence ends with this pattern, on a press boundary
    fn sequence_satisfied(&self, record: &SequenceRecord) -> bool {
        let tokens = record.tokens();
        if tokens.len() < self.reprs.len() {
            return false;
        }
        tokens[tokens.len() - self.reprs.len()..]
            .iter()
            .zip(&self.reprs)
            .all(|(seen, want)| seen.matches(want, self.fold_case))
    }
}

impl fmt::Debug for Listener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listener")
            .field("id", &self.id)
            .field("pattern", &self.pattern)
            .field("config", &self.config)
            .field("trigger_key", &self.trigger_key)
            .field("on_press_down", &self.on_press_down.is_some())
            .field("on_press_up", &self.on_press_up.is_some())
            .finish()
    }
}

/// Validating constructor for [`Listener`]
pub(crate) struct ListenerBuilder {
    pattern: BindingPattern,
    config: ListenerConfig,
    on_press_down: Option<Callback>,
    on_press_up: Option<Callback>,
}

impl ListenerBuilder {
    pub(crate) fn config(mut self, config: ListenerConfig) -> Self {
        self.config = config;
        self
    }

    pub(crate) fn on_press_down(mut self, callback: Option<Callback>) -> Self {
        self.on_press_down = callback;
        self
    }

    pub(crate) fn on_press_up(mut self, callback: Option<Callback>) -> Self {
        self.on_press_up = callback;
        self
    }

    /// Resolve the pattern through the table and check the callbacks
    ///
    /// Sequences silently drop a press-up callback; they have no release phase.
    pub(crate) fn build(
        self,
        id: ListenerId,
        table: &KeyTable,
    ) -> Result<Listener, ListenerError> {
        let kind = self.pattern.kind();
        let mut on_press_up = self.on_press_up;

        if kind == PatternKind::Sequence {
            if self.on_press_down.is_none() {
                return Err(ListenerError::SequenceWithoutPressDown(
                    self.pattern.to_string(),
                ));
            }
            on_press_up = None;
        } else if self.on_press_down.is_none() && on_press_up.is_none() {
            return Err(ListenerError::MissingCallback);
        }

        let event_type = self.config.event_type;
        let reprs = self
            .pattern
            .keys()
            .iter()
            .map(|key| table.lookup(key, event_type))
            .collect::<Result<Vec<_>, _>>()?;

        let trigger_key = reprs
            .iter()
            .map(|repr| repr.to_string())
            .collect::<Vec<_>>()
            .join(kind.separator());

        let fold_case = event_type == EventType::Key && !self.config.case_sensitive;

        Ok(Listener {
            id,
            pattern: self.pattern,
            config: self.config,
            reprs,
            trigger_key,
            fold_case,
            on_press_down: self.on_press_down,
            on_press_up,
        })
    }
}
