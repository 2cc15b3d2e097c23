use crate::io::AudioBuffer;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Sounds a voice pool can be asked to play.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundKind {
    Sine,
}

/// Voice implementations known to the pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoiceKind {
    Sine,
}

impl VoiceKind {
    /// Compatibility table between voice and sound kinds.
    pub const fn can_play(self, sound: SoundKind) -> bool {
        match (self, sound) {
            (VoiceKind::Sine, SoundKind::Sine) => true,
        }
    }
}

/// One monophonic sound-generating unit, reused across notes.
///
/// All methods run on the audio thread and must not allocate or block.
pub trait SynthVoice: Send {
    fn kind(&self) -> VoiceKind;

    fn can_play(&self, sound: SoundKind) -> bool {
        self.kind().can_play(sound)
    }

    /// Store the playback sample rate. Called before any note starts.
    fn prepare(&mut self, sample_rate: f64);

    /// Begin sounding `note` at `velocity` (0.0..=1.0).
    fn start(&mut self, note: u8, velocity: f32);

    /// Release the note. With `allow_tail_off` the voice fades out and idles
    /// by itself; without it the voice goes silent immediately.
    fn stop(&mut self, allow_tail_off: bool);

    /// Add `num_samples` frames of output into `buffer` starting at `start`.
    fn render_into(&mut self, buffer: &mut AudioBuffer, start: usize, num_samples: usize);

    /// The note this voice is sounding, `None` while idle.
    fn current_note(&self) -> Option<u8>;

    fn is_active(&self) -> bool {
        self.current_note().is_some()
    }

    /// Whether a tail-off is in progress.
    fn is_releasing(&self) -> bool;
}

/// Allow boxed voices in a pool of mixed voice types.
impl SynthVoice for Box<dyn SynthVoice> {
    fn kind(&self) -> VoiceKind {
        (**self).kind()
    }

    fn can_play(&self, sound: SoundKind) -> bool {
        (**self).can_play(sound)
    }

    fn prepare(&mut self, sample_rate: f64) {
        (**self).prepare(sample_rate)
    }

    fn start(&mut self, note: u8, velocity: f32) {
        (**self).start(note, velocity)
    }

    fn stop(&mut self, allow_tail_off: bool) {
        (**self).stop(allow_tail_off)
    }

    fn render_into(&mut self, buffer: &mut AudioBuffer, start: usize, num_samples: usize) {
        (**self).render_into(buffer, start, num_samples)
    }

    fn current_note(&self) -> Option<u8> {
        (**self).current_note()
    }

    fn is_active(&self) -> bool {
        (**self).is_active()
    }

    fn is_releasing(&self) -> bool {
        (**self).is_releasing()
    }
}
