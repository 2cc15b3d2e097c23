#[cfg(feature = "rtrb")]
use rtrb::Consumer;

/// Live control message, applied at the start of the next block.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum SynthMessage {
    NoteOn { note: u8, velocity: u8 },
    NoteOff { note: u8, velocity: u8 },
    AllNotesOff { allow_tail_off: bool },
}

/// Source of live messages drained by the block renderer.
///
/// Implementations must not block: the renderer calls `pop` from the audio
/// thread until it returns `None`.
pub trait MessageReceiver {
    fn pop(&mut self) -> Option<SynthMessage>;
}

#[cfg(feature = "rtrb")]
impl MessageReceiver for Consumer<SynthMessage> {
    fn pop(&mut self) -> Option<SynthMessage> {
        Consumer::pop(self).ok()
    }
}

/// A receiver that never yields anything.
pub struct NoInput;

impl MessageReceiver for NoInput {
    fn pop(&mut self) -> Option<SynthMessage> {
        None
    }
}
