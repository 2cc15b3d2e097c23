/// Render a C major chord offline and report what came out.
use sinepoly::{
    analysis::{dominant_frequency, peak},
    AudioBuffer, BlockRenderer, EventSequence, SynthConfig, TimeBase,
};

fn main() {
    println!("=== Offline Bounce ===\n");

    let config = SynthConfig::default();
    let sequence = EventSequence::builder(TimeBase::Seconds)
        .note(0.0, 1.0, 60, 0.8)
        .note(0.0, 1.0, 64, 0.8)
        .note(0.0, 1.0, 67, 0.8)
        .note(1.5, 1.0, 69, 1.0)
        .build()
        .expect("demo sequence is valid");

    let mut renderer = BlockRenderer::new(&config)
        .expect("default config is valid")
        .with_sequence(sequence);
    let mut buffer = AudioBuffer::new(2, config.block_size);
    let mut rendered = Vec::new();

    while !renderer.is_finished() {
        renderer.render_next_block(&mut buffer, 0, config.block_size);
        rendered.extend_from_slice(buffer.channel(0));
    }

    println!("Rendered {} samples", rendered.len());
    println!("Peak amplitude: {:.3}", peak(&rendered));

    // The last note plays alone: A4 should show up at 440 Hz.
    let a4_start = (1.6 * config.sample_rate) as usize;
    let a4 = &rendered[a4_start..a4_start + 16_384];
    if let Some(freq) = dominant_frequency(a4, config.sample_rate) {
        println!("A4 measured at {:.2} Hz", freq);
    }
}
