use crate::sequencing::{EventSequence, NoteEvent};

/// Indexed access to an event sequence in sample time.
///
/// The renderer asks for "the next event at or after position" once per
/// block with a non-decreasing position, so the last answer is cached and
/// used as the starting point of the next forward scan. A query that goes
/// backwards falls back to a binary search.
pub struct Scheduler {
    sequence: EventSequence,
    sample_rate: f64,
    cursor: usize,
}

impl Scheduler {
    pub fn new(sequence: EventSequence) -> Self {
        Self {
            sequence,
            sample_rate: 0.0,
            cursor: 0,
        }
    }

    /// Sample rate used to convert seconds-based timestamps.
    pub fn prepare(&mut self, sample_rate: f64) {
        self.sample_rate = sample_rate;
    }

    pub fn sequence(&self) -> &EventSequence {
        &self.sequence
    }

    pub fn len(&self) -> usize {
        self.sequence.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }

    /// Forget the cached cursor (after a seek or a sequence swap).
    pub fn reset(&mut self) {
        self.cursor = 0;
    }

    /// Replace the sequence and reset the cursor.
    pub fn set_sequence(&mut self, sequence: EventSequence) {
        self.sequence = sequence;
        self.cursor = 0;
    }

    /// Timestamp of event `index` as a sample position.
    pub fn event_timestamp(&self, index: usize) -> f64 {
        let event = &self.sequence.events()[index];
        self.to_samples(event)
    }

    pub fn event_at(&self, index: usize) -> &NoteEvent {
        &self.sequence.events()[index]
    }

    #[inline]
    fn to_samples(&self, event: &NoteEvent) -> f64 {
        self.sequence
            .time_base()
            .to_samples(event.timestamp, self.sample_rate)
    }

    /// Index of the first event with timestamp >= `sample_position`, or
    /// `None` once every event lies before it.
    pub fn next_event_index_at_or_after(&mut self, sample_position: u64) -> Option<usize> {
        let position = sample_position as f64;
        let events = self.sequence.events();
        let len = events.len();
        let cursor = self.cursor.min(len);

        // The cursor is a valid lower bound only if everything before it is
        // strictly earlier than the query.
        let mut idx = if cursor == 0 || self.to_samples(&events[cursor - 1]) < position {
            cursor
        } else {
            events.partition_point(|e| self.to_samples(e) < position)
        };

        while idx < len && self.to_samples(&events[idx]) < position {
            idx += 1;
        }

        self.cursor = idx;
        (idx < len).then_some(idx)
    }

    /// The next event if it falls in `(position, position + num_samples]`.
    ///
    /// This is the window test of `DispatchPolicy::NextEventOnly`: an
    /// event exactly at `position` is not due, and only the first upcoming
    /// event is ever considered.
    pub fn due_in_window(&mut self, position: u64, num_samples: usize) -> Option<usize> {
        let idx = self.next_event_index_at_or_after(position)?;
        let timestamp = self.event_timestamp(idx);
        let window_end = (position + num_samples as u64) as f64;

        (timestamp > position as f64 && timestamp <= window_end).then_some(idx)
    }
}
