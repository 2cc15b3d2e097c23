use midly::{live::LiveEvent, MidiMessage};

/// Decoded MIDI channel message, as handed over by an external MIDI
/// file loader or input device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MidiEvent {
    NoteOn { channel: u8, key: u8, velocity: u8 },
    NoteOff { channel: u8, key: u8, velocity: u8 },
    ControlChange { channel: u8, controller: u8, value: u8 },
    PitchBend { channel: u8, value: i16 },
    ProgramChange { channel: u8, program: u8 },
}

/// Controller number of the "All Notes Off" channel mode message.
pub const ALL_NOTES_OFF: u8 = 123;

impl MidiEvent {
    pub fn channel(&self) -> u8 {
        match *self {
            MidiEvent::NoteOn { channel, .. }
            | MidiEvent::NoteOff { channel, .. }
            | MidiEvent::ControlChange { channel, .. }
            | MidiEvent::PitchBend { channel, .. }
            | MidiEvent::ProgramChange { channel, .. } => channel,
        }
    }

    /// Decode a raw channel message (status byte plus data bytes).
    ///
    /// Returns `None` for malformed input, running status and any message
    /// the synth has no use for (system, aftertouch).
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        match LiveEvent::parse(bytes).ok()? {
            LiveEvent::Midi { channel, message } => Self::from_midly(channel.as_int(), message),
            _ => None,
        }
    }

    fn from_midly(channel: u8, message: MidiMessage) -> Option<Self> {
        match message {
            MidiMessage::NoteOff { key, vel } => Some(MidiEvent::NoteOff {
                channel,
                key: key.as_int(),
                velocity: vel.as_int(),
            }),
            MidiMessage::NoteOn { key, vel } => Some(MidiEvent::NoteOn {
                channel,
                key: key.as_int(),
                velocity: vel.as_int(),
            }),
            MidiMessage::Controller { controller, value } => Some(MidiEvent::ControlChange {
                channel,
                controller: controller.as_int(),
                value: value.as_int(),
            }),
            MidiMessage::ProgramChange { program } => Some(MidiEvent::ProgramChange {
                channel,
                program: program.as_int(),
            }),
            MidiMessage::PitchBend { bend } => Some(MidiEvent::PitchBend {
                channel,
                value: bend.as_int(),
            }),
            MidiMessage::Aftertouch { .. } | MidiMessage::ChannelAftertouch { .. } => None,
        }
    }
}
