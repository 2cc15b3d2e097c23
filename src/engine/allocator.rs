use crate::{
    io::AudioBuffer,
    sequencing::{NoteEvent, NoteKind},
};

/// The note-handling and mixing surface the block renderer drives.
pub trait VoiceAllocator: Send {
    fn prepare(&mut self, sample_rate: f64);
    fn note_on(&mut self, note: u8, velocity: f32);
    fn note_off(&mut self, note: u8, velocity: f32);
    fn all_notes_off(&mut self, allow_tail_off: bool);

    /// Add `num_samples` frames from every voice into `buffer` at `start`.
    fn render(&mut self, buffer: &mut AudioBuffer, start: usize, num_samples: usize);

    fn active_voice_count(&self) -> usize;

    fn handle_event(&mut self, event: &NoteEvent) {
        match event.kind {
            NoteKind::NoteOn => self.note_on(event.note, event.velocity),
            NoteKind::NoteOff => self.note_off(event.note, event.velocity),
        }
    }
}
