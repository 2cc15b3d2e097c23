use tracing::debug;

use crate::{
    engine::allocator::VoiceAllocator,
    io::AudioBuffer,
    synth::{
        factory::VoiceFactory,
        voice::{SoundKind, SynthVoice},
    },
};

/// One arena slot: a voice plus the stamp of its last note-on.
struct Slot<V> {
    voice: V,
    age: u64,
}

/// Fixed pool of voices with deterministic allocation.
///
/// Allocation policy:
/// - a note already sounding on some voice is released (with tail-off) first,
/// - the lowest-index idle voice that can play the sound is used,
/// - otherwise the voice with the oldest note-on is stolen and hard-stopped.
///
/// Note-on stamps come from a counter that increments on every start, so two
/// voices never share an age and the steal choice is always unique.
pub struct VoicePool<V: SynthVoice> {
    slots: Vec<Slot<V>>,
    sounds: Vec<SoundKind>,
    sample_rate: Option<f64>,
    next_age: u64,
}

impl<V: SynthVoice> VoicePool<V> {
    pub fn new<F>(factory: F, voice_count: usize) -> Self
    where
        F: VoiceFactory<Voice = V>,
    {
        Self::with_voices((0..voice_count).map(|_| factory.create_voice()).collect())
    }

    pub fn with_voices(voices: Vec<V>) -> Self {
        debug!(voices = voices.len(), "creating voice pool");

        Self {
            slots: voices.into_iter().map(|voice| Slot { voice, age: 0 }).collect(),
            sounds: vec![SoundKind::Sine],
            sample_rate: None,
            next_age: 0,
        }
    }

    pub fn add_sound(&mut self, sound: SoundKind) {
        if !self.sounds.contains(&sound) {
            self.sounds.push(sound);
        }
    }

    pub fn clear_sounds(&mut self) {
        self.sounds.clear();
    }

    pub fn sounds(&self) -> &[SoundKind] {
        &self.sounds
    }

    pub fn sample_rate(&self) -> Option<f64> {
        self.sample_rate
    }

    pub fn voices(&self) -> impl Iterator<Item = &V> {
        self.slots.iter().map(|slot| &slot.voice)
    }

    pub fn voice(&self, index: usize) -> Option<&V> {
        self.slots.get(index).map(|slot| &slot.voice)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Pool index of the voice to use for `sound`, if any voice can play it.
    fn allocate(&self, sound: SoundKind) -> Option<usize> {
        // First pass: lowest-index idle voice
        let free_idx = self
            .slots
            .iter()
            .position(|s| !s.voice.is_active() && s.voice.can_play(sound));
        if free_idx.is_some() {
            return free_idx;
        }

        // Second pass: steal the oldest note
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, s)| s.voice.can_play(sound))
            .min_by_key(|(_, s)| s.age)
            .map(|(idx, _)| idx)
    }
}

impl<V: SynthVoice> VoiceAllocator for VoicePool<V> {
    fn prepare(&mut self, sample_rate: f64) {
        assert!(
            sample_rate.is_finite() && sample_rate > 0.0,
            "sample rate must be positive, got {sample_rate}"
        );

        self.sample_rate = Some(sample_rate);
        for slot in &mut self.slots {
            slot.voice.prepare(sample_rate);
        }
    }

    fn note_on(&mut self, note: u8, velocity: f32) {
        assert!(self.sample_rate.is_some(), "note_on before prepare");

        if velocity == 0.0 {
            self.note_off(note, velocity);
            return;
        }

        // Retrigger: let the previous instance of this note fade out.
        for slot in &mut self.slots {
            if slot.voice.current_note() == Some(note) {
                slot.voice.stop(true);
            }
        }

        for i in 0..self.sounds.len() {
            let sound = self.sounds[i];
            let Some(idx) = self.allocate(sound) else {
                continue;
            };

            let age = self.next_age;
            self.next_age += 1;

            let slot = &mut self.slots[idx];
            if slot.voice.is_active() {
                slot.voice.stop(false);
            }
            slot.voice.start(note, velocity);
            slot.age = age;
        }
    }

    fn note_off(&mut self, note: u8, _velocity: f32) {
        for slot in &mut self.slots {
            if slot.voice.current_note() == Some(note) && !slot.voice.is_releasing() {
                slot.voice.stop(true);
            }
        }
    }

    fn all_notes_off(&mut self, allow_tail_off: bool) {
        for slot in &mut self.slots {
            if slot.voice.is_active() {
                slot.voice.stop(allow_tail_off);
            }
        }
    }

    fn render(&mut self, buffer: &mut AudioBuffer, start: usize, num_samples: usize) {
        for slot in &mut self.slots {
            slot.voice.render_into(buffer, start, num_samples);
        }
    }

    fn active_voice_count(&self) -> usize {
        self.slots.iter().filter(|s| s.voice.is_active()).count()
    }
}
