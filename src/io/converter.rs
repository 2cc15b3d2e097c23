use crate::{
    io::midi::{MidiEvent, ALL_NOTES_OFF},
    sequencing::NoteEvent,
    synth::message::SynthMessage,
};

/// Map a decoded MIDI message on `channel_filter` to a live synth message.
///
/// A note-on with velocity 0 is a note-off, as the MIDI running-status
/// convention demands.
pub fn midi_to_synth(midi: MidiEvent, channel_filter: u8) -> Option<SynthMessage> {
    match midi {
        MidiEvent::NoteOn {
            channel,
            key,
            velocity: 0,
        } if channel == channel_filter => Some(SynthMessage::NoteOff {
            note: key,
            velocity: 0,
        }),
        MidiEvent::NoteOn {
            channel,
            key,
            velocity,
        } if channel == channel_filter => Some(SynthMessage::NoteOn {
            note: key,
            velocity,
        }),
        MidiEvent::NoteOff {
            channel,
            key,
            velocity,
        } if channel == channel_filter => Some(SynthMessage::NoteOff {
            note: key,
            velocity,
        }),
        MidiEvent::ControlChange {
            channel,
            controller: ALL_NOTES_OFF,
            ..
        } if channel == channel_filter => Some(SynthMessage::AllNotesOff {
            allow_tail_off: true,
        }),
        _ => None,
    }
}

/// Map a decoded MIDI message to a timestamped note event.
///
/// The timestamp is taken as-is, in whatever time base the caller's
/// sequence uses. Messages that are not note messages yield `None`.
pub fn midi_to_note_event(midi: MidiEvent, timestamp: f64) -> Option<NoteEvent> {
    match midi {
        MidiEvent::NoteOn { key, velocity: 0, .. } => Some(NoteEvent::note_off(timestamp, key, 0.0)),
        MidiEvent::NoteOn { key, velocity, .. } => Some(NoteEvent::note_on(
            timestamp,
            key,
            velocity_from_midi(velocity),
        )),
        MidiEvent::NoteOff { key, velocity, .. } => Some(NoteEvent::note_off(
            timestamp,
            key,
            velocity_from_midi(velocity),
        )),
        _ => None,
    }
}

/// Equal-tempered MIDI note to Hz, A4 (note 69) = 440 Hz.
#[inline]
pub fn midi_note_to_freq(note: u8) -> f64 {
    440.0 * 2.0_f64.powf((note as f64 - 69.0) / 12.0)
}

/// MIDI velocity 0..=127 to a 0.0..=1.0 gain factor.
#[inline]
pub fn velocity_from_midi(velocity: u8) -> f32 {
    velocity as f32 / 127.0
}
