//! Built-in demo material.

use sinepoly::{io::converter::velocity_from_midi, EventSequence, SynthError, TimeBase};

/// The twelve-note cell of Reich's Piano Phase.
const CELL: [u8; 12] = [64, 66, 71, 73, 74, 66, 64, 73, 71, 66, 74, 73];

/// Two players repeat the cell; the second one is a little faster and drifts
/// out of phase. Timestamps are in seconds, as a MIDI file loader would
/// produce them.
pub fn piano_phase() -> Result<EventSequence, SynthError> {
    let mut builder = EventSequence::builder(TimeBase::Seconds);

    for (step, velocity) in [(0.150, 96u8), (0.147, 80)] {
        let velocity = velocity_from_midi(velocity);
        for (i, &note) in CELL.iter().cycle().take(CELL.len() * 8).enumerate() {
            builder = builder.note(i as f64 * step, step * 0.9, note, velocity);
        }
    }

    Ok(builder.build()?)
}
