use tracing::{debug, info};

use crate::{
    config::{DispatchPolicy, SynthConfig},
    engine::{allocator::VoiceAllocator, scheduler::Scheduler},
    error::SynthError,
    io::{converter::velocity_from_midi, AudioBuffer},
    sequencing::{EventSequence, TimeBase},
    synth::{
        message::{MessageReceiver, NoInput, SynthMessage},
        poly::VoicePool,
        sine::SineVoice,
    },
};

/// Renders one block per call: dispatch due events, mix voices, advance the
/// sample clock.
///
/// The sample clock is owned here and only moves by whole blocks (or by an
/// explicit `seek`), so independent renderers never share playback state.
pub struct BlockRenderer<A: VoiceAllocator = VoicePool<SineVoice>> {
    allocator: A,
    scheduler: Scheduler,
    policy: DispatchPolicy,
    position: u64,
    sample_rate: f64,
}

impl BlockRenderer<VoicePool<SineVoice>> {
    /// Sine-voice renderer built from `config`, prepared at its sample rate
    /// with an empty sequence.
    pub fn new(config: &SynthConfig) -> Result<Self, SynthError> {
        config.validate()?;

        let params = config.voice_params();
        let pool = VoicePool::new(move || SineVoice::new(params), config.voices);

        info!(
            voices = config.voices,
            dispatch = ?config.dispatch,
            sample_rate = config.sample_rate,
            "created sine renderer"
        );

        let mut renderer = Self::with_allocator(
            pool,
            Scheduler::new(EventSequence::new(TimeBase::Samples)),
            config.dispatch,
        );
        renderer.prepare(config.sample_rate);
        Ok(renderer)
    }
}

impl<A: VoiceAllocator> BlockRenderer<A> {
    /// Renderer around any allocator. Call `prepare` before rendering.
    pub fn with_allocator(allocator: A, scheduler: Scheduler, policy: DispatchPolicy) -> Self {
        Self {
            allocator,
            scheduler,
            policy,
            position: 0,
            sample_rate: 0.0,
        }
    }

    /// Set the session sample rate. Must happen before the first note;
    /// notes already sounding keep their old pitch.
    pub fn prepare(&mut self, sample_rate: f64) {
        debug!(sample_rate, "preparing renderer");
        self.sample_rate = sample_rate;
        self.allocator.prepare(sample_rate);
        self.scheduler.prepare(sample_rate);
    }

    /// Replace the scheduled sequence. Not for the audio thread.
    pub fn load_sequence(&mut self, sequence: EventSequence) {
        info!(
            events = sequence.len(),
            time_base = ?sequence.time_base(),
            "loading sequence"
        );
        self.scheduler.set_sequence(sequence);
    }

    pub fn with_sequence(mut self, sequence: EventSequence) -> Self {
        self.load_sequence(sequence);
        self
    }

    pub fn allocator(&self) -> &A {
        &self.allocator
    }

    pub fn allocator_mut(&mut self) -> &mut A {
        &mut self.allocator
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    pub fn policy(&self) -> DispatchPolicy {
        self.policy
    }

    pub fn set_policy(&mut self, policy: DispatchPolicy) {
        self.policy = policy;
    }

    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    /// Current sample clock.
    pub fn position(&self) -> u64 {
        self.position
    }

    /// Move the sample clock, silencing every voice.
    pub fn seek(&mut self, position: u64) {
        debug!(from = self.position, to = position, "seek");
        self.allocator.all_notes_off(false);
        self.scheduler.reset();
        self.position = position;
    }

    pub fn reset(&mut self) {
        self.seek(0);
    }

    /// True once no scheduled event lies ahead and every voice is idle.
    pub fn is_finished(&mut self) -> bool {
        self.allocator.active_voice_count() == 0
            && self
                .scheduler
                .next_event_index_at_or_after(self.position)
                .is_none()
    }

    pub fn render_next_block(&mut self, buffer: &mut AudioBuffer, start: usize, num_samples: usize) {
        self.render_next_block_with_input(&mut NoInput, buffer, start, num_samples);
    }

    /// Render one block, first applying every pending live message.
    pub fn render_next_block_with_input<R>(
        &mut self,
        rx: &mut R,
        buffer: &mut AudioBuffer,
        start: usize,
        num_samples: usize,
    ) where
        R: MessageReceiver + ?Sized,
    {
        // Voices only add, so the block region starts from silence.
        buffer.clear_region(start, num_samples);

        while let Some(msg) = rx.pop() {
            self.apply_message(msg);
        }

        match self.policy {
            DispatchPolicy::NextEventOnly => self.render_next_event_only(buffer, start, num_samples),
            DispatchPolicy::SampleAccurate => self.render_sample_accurate(buffer, start, num_samples),
        }

        self.position += num_samples as u64;
    }

    fn apply_message(&mut self, msg: SynthMessage) {
        match msg {
            SynthMessage::NoteOn { note, velocity: 0 } => self.allocator.note_off(note, 0.0),
            SynthMessage::NoteOn { note, velocity } => {
                self.allocator.note_on(note, velocity_from_midi(velocity))
            }
            SynthMessage::NoteOff { note, velocity } => {
                self.allocator.note_off(note, velocity_from_midi(velocity))
            }
            SynthMessage::AllNotesOff { allow_tail_off } => {
                self.allocator.all_notes_off(allow_tail_off)
            }
        }
    }

    fn render_next_event_only(&mut self, buffer: &mut AudioBuffer, start: usize, num_samples: usize) {
        if let Some(idx) = self.scheduler.due_in_window(self.position, num_samples) {
            let event = *self.scheduler.event_at(idx);
            self.allocator.handle_event(&event);
        }

        self.allocator.render(buffer, start, num_samples);
    }

    fn render_sample_accurate(&mut self, buffer: &mut AudioBuffer, start: usize, num_samples: usize) {
        let block_start = self.position as f64;
        let block_end = block_start + num_samples as f64;
        let mut rendered = 0;

        let mut next = self.scheduler.next_event_index_at_or_after(self.position);
        while let Some(idx) = next {
            let timestamp = self.scheduler.event_timestamp(idx);
            if timestamp >= block_end {
                break;
            }

            let offset = ((timestamp - block_start) as usize).min(num_samples);
            if offset > rendered {
                self.allocator
                    .render(buffer, start + rendered, offset - rendered);
                rendered = offset;
            }

            let event = *self.scheduler.event_at(idx);
            self.allocator.handle_event(&event);

            next = (idx + 1 < self.scheduler.len()).then_some(idx + 1);
        }

        if rendered < num_samples {
            self.allocator
                .render(buffer, start + rendered, num_samples - rendered);
        }
    }
}
