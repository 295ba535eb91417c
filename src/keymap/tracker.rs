//! Held-key and sequence state, tracked per event type
//!
//! The registry feeds every raw key event through the tracker before any
//! listener is evaluated, so listeners always see the state that includes
//! the current keystroke.

use std::time::{Duration, Instant};

use indexmap::IndexSet;
use serde::Serialize;

use super::event::{EventType, KeyEvent, KeyRepr};
use super::pattern::SEQUENCE_SEPARATOR;

/// Default gap after which a running sequence starts over
pub const DEFAULT_SEQUENCE_INTERVAL: Duration = Duration::from_millis(666);

/// Rolling log of recent key presses for one event type
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SequenceRecord {
    /// Presses joined with `->`, e.g. `"g->g"`
    pub trigger_key: String,
    /// When the latest press was recorded
    pub time: Option<Instant>,
    tokens: Vec<KeyRepr>,
}

impl SequenceRecord {
    /// Individual presses making up `trigger_key`
    pub fn tokens(&self) -> &[KeyRepr] {
        &self.tokens
    }

    fn restart(&mut self, repr: KeyRepr, time: Instant) {
        self.trigger_key = repr.to_string();
        self.tokens.clear();
        self.tokens.push(repr);
        self.time = Some(time);
    }

    fn extend(&mut self, repr: KeyRepr, time: Instant) {
        self.trigger_key.push_str(SEQUENCE_SEPARATOR);
        self.trigger_key.push_str(&repr.to_string());
        self.tokens.push(repr);
        self.time = Some(time);
    }

    fn clear(&mut self) {
        self.trigger_key.clear();
        self.tokens.clear();
        self.time = None;
    }
}

#[derive(Debug, Clone, Default)]
struct Track {
    pressed: IndexSet<KeyRepr>,
    sequence: SequenceRecord,
}

/// Serializable view of one event type's state, for "currently pressed" displays
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrackSnapshot {
    pub event_type: EventType,
    pub pressed: Vec<KeyRepr>,
    pub sequence: String,
}

/// Held keys and running sequences for every event type
#[derive(Debug, Clone)]
pub struct InputTracker {
    tracks: [Track; 3],
    sequence_interval: Duration,
    must_release_last_press: bool,
}

impl InputTracker {
    pub fn new() -> Self {
        Self {
            tracks: Default::default(),
            sequence_interval: DEFAULT_SEQUENCE_INTERVAL,
            must_release_last_press: false,
        }
    }

    pub fn sequence_interval(&self) -> Duration {
        self.sequence_interval
    }

    pub fn set_sequence_interval(&mut self, interval: Duration) {
        self.sequence_interval = interval;
    }

    /// Whether a sequence only advances while a single key is held
    ///
    /// For keyboards without reliable multi-key detection.
    pub fn must_release_last_press(&self) -> bool {
        self.must_release_last_press
    }

    pub fn set_must_release_last_press(&mut self, enabled: bool) {
        self.must_release_last_press = enabled;
    }

    /// Currently held representations, in press order
    pub fn pressed(&self, event_type: EventType) -> &IndexSet<KeyRepr> {
        &self.tracks[event_type.index()].pressed
    }

    pub fn sequence(&self, event_type: EventType) -> &SequenceRecord {
        &self.tracks[event_type.index()].sequence
    }

    /// Record a key-down for every event type
    pub fn record_press(&mut self, event: &KeyEvent) {
        for event_type in EventType::ALL {
            let repr = event.repr(event_type);
            let track = &mut self.tracks[event_type.index()];
            track.pressed.insert(repr.clone());

            if self.must_release_last_press && track.pressed.len() > 1 {
                continue;
            }

            let expired = match track.sequence.time {
                None => true,
                Some(last) => event.time.saturating_duration_since(last) > self.sequence_interval,
            };
            if expired {
                track.sequence.restart(repr, event.time);
            } else {
                track.sequence.extend(repr, event.time);
            }
        }
    }

    /// Record a key-up for every event type
    ///
    /// Releasing meta clears everything: hosts swallow the key-up of any key
    /// pressed while meta is held.
    pub fn record_release(&mut self, event: &KeyEvent) {
        if event.is_meta() {
            for track in &mut self.tracks {
                track.pressed.clear();
            }
            return;
        }

        for event_type in EventType::ALL {
            let repr = event.repr(event_type);
            let pressed = &mut self.tracks[event_type.index()].pressed;
            if event_type == EventType::Key && repr.letter().is_some() {
                pressed.retain(|held| !held.matches(&repr, true));
            } else {
                pressed.shift_remove(&repr);
            }
        }
    }

    /// Forget all held keys and sequences (focus lost)
    pub fn clear_all(&mut self) {
        for track in &mut self.tracks {
            track.pressed.clear();
            track.sequence.clear();
        }
    }

    pub fn snapshot(&self) -> Vec<TrackSnapshot> {
        EventType::ALL
            .iter()
            .map(|&event_type| TrackSnapshot {
                event_type,
                pressed: self.pressed(event_type).iter().cloned().collect(),
                sequence: self.sequence(event_type).trigger_key.clone(),
            })
            .collect()
    }
}

impl Default for InputTracker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keymap::key_table::KeyTable;

    struct Fixture {
        table: KeyTable,
        start: Instant,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                table: KeyTable::native(),
                start: Instant::now(),
            }
        }

        fn event(&self, name: &str, at_ms: u64) -> KeyEvent {
            KeyEvent::from_entry(
                self.table.entry(name).unwrap(),
                self.start + Duration::from_millis(at_ms),
            )
        }
    }

    fn keys(tracker: &InputTracker, event_type: EventType) -> Vec<String> {
        tracker
            .pressed(event_type)
            .iter()
            .map(|repr| repr.to_string())
            .collect()
    }

    #[test]
    fn test_press_and_release() {
        let fx = Fixture::new();
        let mut tracker = InputTracker::new();

        tracker.record_press(&fx.event("a", 0));
        tracker.record_press(&fx.event("shift", 10));
        assert_eq!(keys(&tracker, EventType::Key), vec!["a", "Shift"]);
        assert_eq!(keys(&tracker, EventType::NumericCode), vec!["65", "16"]);
        assert_eq!(keys(&tracker, EventType::PhysicalCode), vec!["KeyA", "ShiftLeft"]);

        tracker.record_release(&fx.event("a", 20));
        assert_eq!(keys(&tracker, EventType::Key), vec!["Shift"]);
        assert_eq!(keys(&tracker, EventType::PhysicalCode), vec!["ShiftLeft"]);
    }

    #[test]
    fn test_release_folds_letter_case() {
        let fx = Fixture::new();
        let mut tracker = InputTracker::new();

        tracker.record_press(&fx.event("a", 0));
        tracker.record_press(&fx.event("A", 10));
        tracker.record_release(&fx.event("a", 20));
        assert!(tracker.pressed(EventType::Key).is_empty());
    }

    #[test]
    fn test_meta_release_clears_all_kinds() {
        let fx = Fixture::new();
        let mut tracker = InputTracker::new();

        tracker.record_press(&fx.event("command", 0));
        tracker.record_press(&fx.event("c", 10));
        tracker.record_release(&fx.event("command", 20));
        for event_type in EventType::ALL {
            assert!(tracker.pressed(event_type).is_empty(), "{event_type} not cleared");
        }
    }

    #[test]
    fn test_plus_release_removes_alias() {
        let fx = Fixture::new();
        let mut tracker = InputTracker::new();

        tracker.record_press(&fx.event("equal", 0));
        assert_eq!(keys(&tracker, EventType::Key), vec!["equal"]);
        tracker.record_release(&fx.event("equal", 10));
        assert!(tracker.pressed(EventType::Key).is_empty());
    }

    #[test]
    fn test_sequence_extends_within_interval() {
        let fx = Fixture::new();
        let mut tracker = InputTracker::new();

        tracker.record_press(&fx.event("g", 0));
        tracker.record_release(&fx.event("g", 50));
        tracker.record_press(&fx.event("g", 300));
        assert_eq!(tracker.sequence(EventType::Key).trigger_key, "g->g");
        assert_eq!(tracker.sequence(EventType::NumericCode).trigger_key, "71->71");
    }

    #[test]
    fn test_sequence_restarts_after_interval() {
        let fx = Fixture::new();
        let mut tracker = InputTracker::new();

        tracker.record_press(&fx.event("a", 0));
        tracker.record_press(&fx.event("b", 700));
        assert_eq!(tracker.sequence(EventType::Key).trigger_key, "b");
        assert_eq!(tracker.sequence(EventType::Key).tokens().len(), 1);
    }

    #[test]
    fn test_custom_interval() {
        let fx = Fixture::new();
        let mut tracker = InputTracker::new();
        tracker.set_sequence_interval(Duration::from_millis(1000));

        tracker.record_press(&fx.event("a", 0));
        tracker.record_press(&fx.event("b", 900));
        assert_eq!(tracker.sequence(EventType::Key).trigger_key, "a->b");
    }

    #[test]
    fn test_must_release_skips_sequence_while_chording() {
        let fx = Fixture::new();
        let mut tracker = InputTracker::new();
        tracker.set_must_release_last_press(true);

        tracker.record_press(&fx.event("a", 0));
        tracker.record_press(&fx.event("b", 100));
        assert_eq!(keys(&tracker, EventType::Key), vec!["a", "b"]);
        assert_eq!(tracker.sequence(EventType::Key).trigger_key, "a");
    }

    #[test]
    fn test_clear_all() {
        let fx = Fixture::new();
        let mut tracker = InputTracker::new();

        tracker.record_press(&fx.event("a", 0));
        tracker.clear_all();
        for event_type in EventType::ALL {
            assert!(tracker.pressed(event_type).is_empty());
            assert_eq!(tracker.sequence(event_type), &SequenceRecord::default());
        }
    }

    #[test]
    fn test_snapshot_serializes() {
        let fx = Fixture::new();
        let mut tracker = InputTracker::new();
        tracker.record_press(&fx.event("a", 0));

        let json = serde_json::to_value(tracker.snapshot()).unwrap();
        assert_eq!(json[0]["event_type"], "key");
        assert_eq!(json[0]["pressed"][0], "a");
        assert_eq!(json[1]["pressed"][0], 65);
        assert_eq!(json[2]["sequence"], "KeyA");
    }
}
