use std::f64::consts::TAU;

use sinepoly::{
    analysis::{dominant_frequency, peak},
    io::converter::{midi_note_to_freq, velocity_from_midi},
    AudioBuffer, BlockRenderer, DispatchPolicy, EventSequence, SynthConfig, TimeBase,
};

const SAMPLE_RATE: f64 = 44_100.0;
const BLOCK: usize = 512;
const NOTE_ON_AT: u64 = 44_100;
const NOTE_OFF_AT: u64 = 132_300;
const TAIL_SAMPLES: u64 = 528;

/// Render `blocks` blocks of the middle-C scenario and return channel 0.
fn render_scenario(policy: DispatchPolicy, blocks: usize) -> (Vec<f32>, BlockRenderer) {
    let config = SynthConfig {
        sample_rate: SAMPLE_RATE,
        dispatch: policy,
        ..Default::default()
    };
    let sequence = EventSequence::builder(TimeBase::Samples)
        .note_on(NOTE_ON_AT as f64, 60, velocity_from_midi(100))
        .note_off(NOTE_OFF_AT as f64, 60)
        .build()
        .unwrap();
    let mut renderer = BlockRenderer::new(&config).unwrap().with_sequence(sequence);

    let mut buffer = AudioBuffer::new(2, BLOCK);
    let mut out = Vec::with_capacity(blocks * BLOCK);
    for _ in 0..blocks {
        renderer.render_next_block(&mut buffer, 0, BLOCK);
        assert_eq!(buffer.channel(0), buffer.channel(1));
        out.extend_from_slice(buffer.channel(0));
    }
    (out, renderer)
}

fn block_start(sample: u64) -> u64 {
    sample / BLOCK as u64 * BLOCK as u64
}

fn amplitude() -> f64 {
    velocity_from_midi(100) as f64 * 0.15
}

fn assert_sustained_sine(samples: &[f32], onset: usize, release: usize) {
    let increment = TAU * midi_note_to_freq(60) / SAMPLE_RATE;
    let amp = amplitude();

    for (k, &actual) in samples[onset..release].iter().enumerate() {
        let expected = (increment * k as f64).sin() * amp;
        assert!(
            (actual as f64 - expected).abs() < 1e-4,
            "frame {}: expected {expected}, got {actual}",
            onset + k
        );
    }

    let sustained = &samples[onset..release];
    assert!((peak(sustained) as f64 - amp).abs() < 1e-3);

    let window = &sustained[..65_536];
    let frequency = dominant_frequency(window, SAMPLE_RATE).unwrap();
    assert!(
        (frequency - 261.63).abs() < 1.0,
        "expected middle C, measured {frequency} Hz"
    );
}

fn assert_tail_off(samples: &[f32], release: usize) {
    let amp = amplitude();
    let mut envelope = 1.0;
    for k in 0..TAIL_SAMPLES as usize {
        let actual = samples[release + k].abs() as f64;
        assert!(
            actual <= amp * envelope + 1e-6,
            "tail frame {k}: {actual} above envelope {}",
            amp * envelope
        );
        envelope *= 0.99;
    }

    let silent_from = release + TAIL_SAMPLES as usize;
    assert!(samples[release..silent_from].iter().any(|&s| s != 0.0));
    assert!(samples[silent_from..].iter().all(|&s| s == 0.0));
}

#[test]
fn next_event_only_middle_c_scenario() {
    let (samples, mut renderer) = render_scenario(DispatchPolicy::NextEventOnly, 260);

    // Both events snap to the start of the block containing them.
    let onset = block_start(NOTE_ON_AT) as usize;
    let release = block_start(NOTE_OFF_AT) as usize;
    assert_eq!(onset, 44_032);
    assert_eq!(release, 132_096);

    assert!(samples[..onset].iter().all(|&s| s == 0.0));
    assert_eq!(samples[onset], 0.0);
    assert!(samples[onset + 1] > 0.0);

    assert_sustained_sine(&samples, onset, release);
    assert_tail_off(&samples, release);

    assert_eq!(renderer.position(), 260 * BLOCK as u64);
    assert!(renderer.is_finished());
}

#[test]
fn sample_accurate_middle_c_scenario() {
    let (samples, mut renderer) = render_scenario(DispatchPolicy::SampleAccurate, 261);

    let onset = NOTE_ON_AT as usize;
    let release = NOTE_OFF_AT as usize;

    assert!(samples[..=onset].iter().all(|&s| s == 0.0));
    assert!(samples[onset + 1] > 0.0);

    assert_sustained_sine(&samples, onset, release);
    assert_tail_off(&samples, release);

    assert!(renderer.is_finished());
}

#[test]
fn seconds_sequence_matches_sample_sequence() {
    let config = SynthConfig::default();
    let seconds = EventSequence::builder(TimeBase::Seconds)
        .note(0.5, 0.25, 69, 1.0)
        .build()
        .unwrap();
    let samples = EventSequence::builder(TimeBase::Samples)
        .note(22_050.0, 11_025.0, 69, 1.0)
        .build()
        .unwrap();

    let mut a = BlockRenderer::new(&config).unwrap().with_sequence(seconds);
    let mut b = BlockRenderer::new(&config).unwrap().with_sequence(samples);
    let mut buf_a = AudioBuffer::new(1, BLOCK);
    let mut buf_b = AudioBuffer::new(1, BLOCK);

    for _ in 0..80 {
        a.render_next_block(&mut buf_a, 0, BLOCK);
        b.render_next_block(&mut buf_b, 0, BLOCK);
        assert_eq!(buf_a.channel(0), buf_b.channel(0));
    }
}

#[test]
fn polyphony_stays_bounded() {
    let config = SynthConfig::default();
    let mut builder = EventSequence::builder(TimeBase::Samples);
    for (i, note) in [60u8, 64, 67, 71, 74, 77].into_iter().enumerate() {
        builder = builder.note_on((i * 100) as f64, note, 1.0);
    }
    let mut renderer = BlockRenderer::new(&config)
        .unwrap()
        .with_sequence(builder.build().unwrap());

    let mut buffer = AudioBuffer::new(1, BLOCK);
    for _ in 0..4 {
        renderer.render_next_block(&mut buffer, 0, BLOCK);
        // Four voices at gain 0.15 can never exceed 0.6.
        assert!(peak(buffer.channel(0)) <= 0.6 + 1e-6);
    }

    assert_eq!(renderer.allocator().len(), 4);
    let notes: Vec<Option<u8>> = renderer
        .allocator()
        .voices()
        .map(|v| sinepoly::synth::voice::SynthVoice::current_note(v))
        .collect();
    assert_eq!(notes, vec![Some(74), Some(77), Some(67), Some(71)]);
}
