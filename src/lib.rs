pub mod analysis; // Offline spectrum helpers
pub mod config;
pub mod engine; // Block rendering and event scheduling
pub mod error;
pub mod io;
pub mod sequencing; // Timestamped note events
pub mod synth; // Voice management and polyphony

pub use config::{ConfigError, DispatchPolicy, SynthConfig};
pub use engine::{BlockRenderer, Scheduler, VoiceAllocator};
pub use error::SynthError;
pub use io::AudioBuffer;
pub use sequencing::{EventSequence, NoteEvent, NoteKind, TimeBase};

pub const MAX_BLOCK_SIZE: usize = 2048;
