use crate::synth::voice::SynthVoice;

/// Factory for creating the voices of a pool
///
/// The pool calls this once per slot at construction time, never on the
/// audio thread.
pub trait VoiceFactory {
    type Voice: SynthVoice;

    fn create_voice(&self) -> Self::Voice;
}

impl<F, T> VoiceFactory for F
where
    F: Fn() -> T,
    T: SynthVoice,
{
    type Voice = T;

    fn create_voice(&self) -> Self::Voice {
        self()
    }
}
