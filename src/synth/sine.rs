use std::f64::consts::TAU;

use crate::{
    io::{converter::midi_note_to_freq, AudioBuffer},
    synth::voice::{SynthVoice, VoiceKind},
};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/*
Sine Voice
==========

The simplest voice there is: a sine oscillator with a fixed level and a
release-only envelope.

  Level
    A ┐ ___________________
      │|                   ╲
      │|                    ╲_
      │|                      ╲__
    0 └┴─────────────────────────╲___──→ Time
       note_on             note_off   idle

There is no attack. The note jumps straight to `velocity × gain` and stays
there until it is stopped. Stopping with tail-off starts a geometric decay:

    tail_off = 1.0                     at note_off
    tail_off = tail_off × ratio        after every sample
    idle                               once tail_off <= floor

With ratio 0.99 and floor 0.005 the fade takes ln(0.005) / ln(0.99) ≈ 527.2,
so exactly 528 samples leave the voice before it idles. That is about 12 ms
at 44.1 kHz: short, but enough to avoid the click of cutting a sine mid-cycle.

Phase is kept in f64 radians and wrapped into [0, 2π) so long notes do not
lose precision.
*/

/// Level and release shape shared by every sine voice in a pool.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VoiceParams {
    /// Peak level at velocity 1.0.
    pub gain: f64,
    /// Per-sample multiplier applied to the tail-off level.
    pub release_ratio: f64,
    /// Tail-off level at or below which the voice idles.
    pub release_floor: f64,
}

impl Default for VoiceParams {
    fn default() -> Self {
        Self {
            gain: 0.15,
            release_ratio: 0.99,
            release_floor: 0.005,
        }
    }
}

pub struct SineVoice {
    params: VoiceParams,
    sample_rate: f64,

    // Per-note state
    note: Option<u8>,
    phase: f64,           // radians
    phase_increment: f64, // radians per sample, 0.0 exactly when idle
    amplitude: f64,       // velocity × gain, fixed for the life of the note
    tail_off: f64,        // 0.0 = not releasing, otherwise decaying toward 0
}

impl SineVoice {
    pub fn new(params: VoiceParams) -> Self {
        Self {
            params,
            sample_rate: 0.0,
            note: None,
            phase: 0.0,
            phase_increment: 0.0,
            amplitude: 0.0,
            tail_off: 0.0,
        }
    }

    /// Current tail-off multiplier (0.0 when not releasing).
    pub fn release_level(&self) -> f64 {
        self.tail_off
    }

    pub fn amplitude(&self) -> f64 {
        self.amplitude
    }

    pub fn phase_increment(&self) -> f64 {
        self.phase_increment
    }

    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    fn clear_current_note(&mut self) {
        self.note = None;
        self.phase_increment = 0.0;
        self.tail_off = 0.0;
    }

    #[inline]
    fn advance_phase(&mut self) {
        self.phase += self.phase_increment;
        if self.phase >= TAU {
            self.phase = self.phase.rem_euclid(TAU);
        }
    }
}

impl Default for SineVoice {
    fn default() -> Self {
        Self::new(VoiceParams::default())
    }
}

impl SynthVoice for SineVoice {
    fn kind(&self) -> VoiceKind {
        VoiceKind::Sine
    }

    fn prepare(&mut self, sample_rate: f64) {
        assert!(
            sample_rate.is_finite() && sample_rate > 0.0,
            "sample rate must be positive, got {sample_rate}"
        );
        self.sample_rate = sample_rate;
    }

    fn start(&mut self, note: u8, velocity: f32) {
        debug_assert!(self.sample_rate > 0.0, "voice started before prepare");

        self.phase = 0.0;
        self.amplitude = velocity as f64 * self.params.gain;
        self.tail_off = 0.0;

        let cycles_per_sample = midi_note_to_freq(note) / self.sample_rate;
        self.phase_increment = cycles_per_sample * TAU;
        self.note = Some(note);
    }

    fn stop(&mut self, allow_tail_off: bool) {
        if allow_tail_off {
            // A second stop must not restart the fade.
            if self.note.is_some() && self.tail_off == 0.0 {
                self.tail_off = 1.0;
            }
        } else {
            self.clear_current_note();
        }
    }

    fn render_into(&mut self, buffer: &mut AudioBuffer, start: usize, num_samples: usize) {
        if self.phase_increment == 0.0 {
            return;
        }

        for frame in start..start + num_samples {
            let envelope = if self.tail_off > 0.0 { self.tail_off } else { 1.0 };
            let sample = (self.phase.sin() * self.amplitude * envelope) as f32;
            buffer.add_to_all(frame, sample);

            self.advance_phase();

            if self.tail_off > 0.0 {
                self.tail_off *= self.params.release_ratio;

                if self.tail_off <= self.params.release_floor {
                    self.clear_current_note();
                    break;
                }
            }
        }
    }

    fn current_note(&self) -> Option<u8> {
        self.note
    }

    fn is_releasing(&self) -> bool {
        self.tail_off > 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_RATE: f64 = 44_100.0;

    fn prepared_voice() -> SineVoice {
        let mut voice = SineVoice::default();
        voice.prepare(SAMPLE_RATE);
        voice
    }

    #[test]
    fn phase_increment_follows_note_frequency() {
        let mut voice = prepared_voice();

        for note in [0u8, 21, 60, 69, 108, 127, 200] {
            voice.start(note, 1.0);
            let frequency = 440.0 * 2.0_f64.powf((note as f64 - 69.0) / 12.0);
            let expected = TAU * frequency / SAMPLE_RATE;
            assert!(
                (voice.phase_increment() - expected).abs() < 1e-12,
                "note {note}: expected {expected}, got {}",
                voice.phase_increment()
            );
        }
    }

    #[test]
    fn renders_sine_at_fixed_amplitude() {
        let mut voice = prepared_voice();
        voice.start(69, 1.0);

        let mut buffer = AudioBuffer::new(2, 256);
        voice.render_into(&mut buffer, 0, 256);

        let increment = TAU * 440.0 / SAMPLE_RATE;
        for (i, &actual) in buffer.channel(0).iter().enumerate() {
            let expected = ((increment * i as f64).sin() * 0.15) as f32;
            assert!(
                (actual - expected).abs() < 1e-6,
                "sample {i}: expected {expected}, got {actual}"
            );
        }
        assert_eq!(buffer.channel(0), buffer.channel(1));
    }

    #[test]
    fn amplitude_is_velocity_times_gain() {
        let mut voice = prepared_voice();
        voice.start(60, 100.0 / 127.0);
        assert!((voice.amplitude() - (100.0f32 / 127.0) as f64 * 0.15).abs() < 1e-12);
    }

    #[test]
    fn hard_stop_renders_silence() {
        let mut voice = prepared_voice();
        voice.start(60, 1.0);
        voice.stop(false);

        let mut buffer = AudioBuffer::new(1, 512);
        voice.render_into(&mut buffer, 0, 512);

        assert!(buffer.channel(0).iter().all(|&s| s == 0.0));
        assert!(!voice.is_active());
        assert_eq!(voice.phase_increment(), 0.0);
    }

    #[test]
    fn tail_off_decays_geometrically_and_idles() {
        let mut voice = prepared_voice();
        voice.start(60, 1.0);
        voice.stop(true);
        assert_eq!(voice.release_level(), 1.0);

        let mut buffer = AudioBuffer::new(1, 1);
        let mut previous = voice.release_level();
        let mut rendered = 0;

        while voice.is_active() {
            buffer.clear();
            voice.render_into(&mut buffer, 0, 1);
            rendered += 1;

            if voice.is_active() {
                let level = voice.release_level();
                assert!(level < previous, "release level must strictly decrease");
                assert!((level - previous * 0.99).abs() < 1e-12);
                previous = level;
            }
            assert!(rendered < 10_000, "tail-off never finished");
        }

        assert_eq!(rendered, 528);
        assert_eq!(voice.phase_increment(), 0.0);
    }

    #[test]
    fn tail_off_stops_mid_block() {
        let mut voice = prepared_voice();
        voice.start(69, 1.0);
        voice.stop(true);

        let mut buffer = AudioBuffer::new(1, 1024);
        voice.render_into(&mut buffer, 0, 1024);

        let samples = buffer.channel(0);
        assert!(samples[..528].iter().any(|&s| s != 0.0));
        assert!(samples[528..].iter().all(|&s| s == 0.0));
        assert!(!voice.is_active());
    }

    #[test]
    fn repeated_stop_does_not_restart_fade() {
        let mut voice = prepared_voice();
        voice.start(64, 1.0);
        voice.stop(true);

        let mut buffer = AudioBuffer::new(1, 100);
        voice.render_into(&mut buffer, 0, 100);
        let level = voice.release_level();
        assert!(level < 1.0);

        voice.stop(true);
        assert_eq!(voice.release_level(), level);
    }

    #[test]
    fn stop_on_idle_voice_is_ignored() {
        let mut voice = prepared_voice();
        voice.stop(true);

        assert!(!voice.is_active());
        assert!(!voice.is_releasing());
        assert_eq!(voice.release_level(), 0.0);
    }

    #[test]
    fn restart_resets_release() {
        let mut voice = prepared_voice();
        voice.start(64, 1.0);
        voice.stop(true);

        let mut buffer = AudioBuffer::new(1, 10);
        voice.render_into(&mut buffer, 0, 10);
        voice.start(65, 0.5);

        assert!(!voice.is_releasing());
        assert_eq!(voice.current_note(), Some(65));
    }

    #[test]
    fn renders_into_offset_region_only() {
        let mut voice = prepared_voice();
        voice.start(69, 1.0);

        let mut buffer = AudioBuffer::new(1, 64);
        voice.render_into(&mut buffer, 32, 32);

        assert!(buffer.channel(0)[..32].iter().all(|&s| s == 0.0));
        assert!(buffer.channel(0)[33..].iter().any(|&s| s != 0.0));
    }

    #[test]
    #[should_panic]
    fn prepare_rejects_zero_sample_rate() {
        let mut voice = SineVoice::default();
        voice.prepare(0.0);
    }
}
