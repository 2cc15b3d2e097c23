use tracing::debug;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Whether an event starts or stops a note.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteKind {
    NoteOn,
    NoteOff,
}

/// A single timestamped note instruction
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NoteEvent {
    pub kind: NoteKind,
    /// MIDI note number
    pub note: u8,
    /// Normalised velocity (0.0-1.0)
    pub velocity: f32,
    /// When this event occurs, in the owning sequence's time base
    pub timestamp: f64,
}

impl NoteEvent {
    pub fn note_on(timestamp: f64, note: u8, velocity: f32) -> Self {
        Self {
            kind: NoteKind::NoteOn,
            note,
            velocity,
            timestamp,
        }
    }

    pub fn note_off(timestamp: f64, note: u8, velocity: f32) -> Self {
        Self {
            kind: NoteKind::NoteOff,
            note,
            velocity,
            timestamp,
        }
    }
}

/// Unit of a sequence's timestamps.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimeBase {
    /// Timestamps are absolute sample positions.
    #[default]
    Samples,
    /// Timestamps are seconds, as produced by a tick-to-time converting loader.
    Seconds,
}

impl TimeBase {
    /// Convert a timestamp in this base to a sample position.
    #[inline]
    pub fn to_samples(self, timestamp: f64, sample_rate: f64) -> f64 {
        match self {
            TimeBase::Samples => timestamp,
            TimeBase::Seconds => timestamp * sample_rate,
        }
    }
}

/// Time-ordered note events
///
/// Events are kept sorted ascending by timestamp; events sharing a timestamp
/// keep their insertion order.
#[derive(Debug, Clone, Default)]
pub struct EventSequence {
    time_base: TimeBase,
    events: Vec<NoteEvent>,
}

impl EventSequence {
    /// An empty sequence in the given time base.
    pub fn new(time_base: TimeBase) -> Self {
        Self {
            time_base,
            events: Vec::new(),
        }
    }

    /// Start building a sequence in the given time base.
    pub fn builder(time_base: TimeBase) -> EventSequenceBuilder {
        EventSequenceBuilder::new(time_base)
    }

    /// Bulk load: validate every event, then sort once.
    pub fn from_events(
        time_base: TimeBase,
        events: impl IntoIterator<Item = NoteEvent>,
    ) -> Result<Self, SequenceError> {
        let mut events: Vec<NoteEvent> = events.into_iter().collect();
        for (index, event) in events.iter().enumerate() {
            validate(index, event)?;
        }

        // Stable, so simultaneous events keep their load order.
        events.sort_by(|a, b| a.timestamp.total_cmp(&b.timestamp));

        debug!(
            events = events.len(),
            ?time_base,
            "loaded event sequence"
        );

        Ok(Self { time_base, events })
    }

    /// Insert one event, after any events with the same timestamp.
    pub fn insert(&mut self, event: NoteEvent) -> Result<(), SequenceError> {
        validate(self.events.len(), &event)?;

        let idx = self
            .events
            .partition_point(|e| e.timestamp <= event.timestamp);
        self.events.insert(idx, event);
        Ok(())
    }

    pub fn time_base(&self) -> TimeBase {
        self.time_base
    }

    pub fn events(&self) -> &[NoteEvent] {
        &self.events
    }

    pub fn iter(&self) -> impl Iterator<Item = &NoteEvent> {
        self.events.iter()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Timestamp of the last event, in this sequence's time base.
    pub fn duration(&self) -> f64 {
        self.events.last().map_or(0.0, |e| e.timestamp)
    }
}

fn validate(index: usize, event: &NoteEvent) -> Result<(), SequenceError> {
    if !event.timestamp.is_finite() || event.timestamp < 0.0 {
        return Err(SequenceError::InvalidTimestamp {
            index,
            timestamp: event.timestamp,
        });
    }
    if !event.velocity.is_finite() {
        return Err(SequenceError::InvalidVelocity {
            index,
            velocity: event.velocity,
        });
    }
    Ok(())
}

/// Builder for constructing sequences with a fluent API
pub struct EventSequenceBuilder {
    time_base: TimeBase,
    events: Vec<NoteEvent>,
}

impl EventSequenceBuilder {
    fn new(time_base: TimeBase) -> Self {
        Self {
            time_base,
            events: Vec::new(),
        }
    }

    pub fn event(mut self, event: NoteEvent) -> Self {
        self.events.push(event);
        self
    }

    pub fn note_on(self, timestamp: f64, note: u8, velocity: f32) -> Self {
        self.event(NoteEvent::note_on(timestamp, note, velocity))
    }

    pub fn note_off(self, timestamp: f64, note: u8) -> Self {
        self.event(NoteEvent::note_off(timestamp, note, 0.0))
    }

    /// Add a note-on at `start` and its note-off `length` later.
    pub fn note(self, start: f64, length: f64, note: u8, velocity: f32) -> Self {
        self.note_on(start, note, velocity)
            .note_off(start + length, note)
    }

    /// Build the final sequence
    pub fn build(self) -> Result<EventSequence, SequenceError> {
        EventSequence::from_events(self.time_base, self.events)
    }
}

/// Errors that can occur when building a sequence
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SequenceError {
    #[error("event {index} has invalid timestamp {timestamp} (must be finite and non-negative)")]
    InvalidTimestamp { index: usize, timestamp: f64 },
    #[error("event {index} has non-finite velocity {velocity}")]
    InvalidVelocity { index: usize, velocity: f32 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_sorts_by_timestamp() {
        let sequence = EventSequence::builder(TimeBase::Samples)
            .note_off(300.0, 60)
            .note_on(100.0, 60, 1.0)
            .note_on(200.0, 64, 1.0)
            .build()
            .unwrap();

        let stamps: Vec<f64> = sequence.iter().map(|e| e.timestamp).collect();
        assert_eq!(stamps, vec![100.0, 200.0, 300.0]);
        assert_eq!(sequence.duration(), 300.0);
    }

    #[test]
    fn simultaneous_events_keep_load_order() {
        let sequence = EventSequence::builder(TimeBase::Samples)
            .note_off(100.0, 60)
            .note_on(100.0, 62, 1.0)
            .build()
            .unwrap();

        assert_eq!(sequence.events()[0].kind, NoteKind::NoteOff);
        assert_eq!(sequence.events()[1].kind, NoteKind::NoteOn);
    }

    #[test]
    fn insert_keeps_order() {
        let mut sequence = EventSequence::builder(TimeBase::Samples)
            .note(0.0, 100.0, 60, 1.0)
            .build()
            .unwrap();

        sequence.insert(NoteEvent::note_on(50.0, 64, 1.0)).unwrap();
        sequence.insert(NoteEvent::note_on(100.0, 67, 1.0)).unwrap();

        let notes: Vec<(f64, u8)> = sequence.iter().map(|e| (e.timestamp, e.note)).collect();
        assert_eq!(notes, vec![(0.0, 60), (50.0, 64), (100.0, 60), (100.0, 67)]);
    }

    #[test]
    fn rejects_bad_timestamps() {
        let err = EventSequence::builder(TimeBase::Seconds)
            .note_on(0.0, 60, 1.0)
            .note_on(f64::NAN, 60, 1.0)
            .build()
            .unwrap_err();
        assert!(matches!(err, SequenceError::InvalidTimestamp { index: 1, .. }));

        let mut sequence = EventSequence::new(TimeBase::Samples);
        assert!(sequence.insert(NoteEvent::note_on(-1.0, 60, 1.0)).is_err());
        assert!(sequence.is_empty());
    }

    #[test]
    fn rejects_non_finite_velocity() {
        let err = EventSequence::from_events(
            TimeBase::Samples,
            [NoteEvent::note_on(0.0, 60, f32::INFINITY)],
        )
        .unwrap_err();
        assert!(matches!(err, SequenceError::InvalidVelocity { index: 0, .. }));
    }

    #[test]
    fn finite_velocities_are_not_range_checked() {
        let sequence = EventSequence::builder(TimeBase::Samples)
            .note_on(0.0, 60, 2.0)
            .note_on(1.0, 62, -1.0)
            .build()
            .unwrap();
        assert_eq!(sequence.len(), 2);
        assert_eq!(sequence.events()[0].velocity, 2.0);
    }

    #[test]
    fn seconds_convert_to_samples() {
        assert_eq!(TimeBase::Seconds.to_samples(1.5, 44_100.0), 66_150.0);
        assert_eq!(TimeBase::Samples.to_samples(1.5, 44_100.0), 1.5);
    }
}
