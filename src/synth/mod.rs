// Purpose: Voice management, polyphony, live note input
// This layer sits below the block renderer and owns all per-voice state

pub mod factory;
pub mod message;
pub mod poly;
pub mod sine;
pub mod voice;
