pub mod sequence;

pub use sequence::{
    EventSequence, EventSequenceBuilder, NoteEvent, NoteKind, SequenceError, TimeBase,
};
