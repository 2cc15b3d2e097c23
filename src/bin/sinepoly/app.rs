//! Playback through cpal and offline bounce.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use color_eyre::eyre::{eyre, Result as EyreResult, WrapErr};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use tracing::{error, info};

use sinepoly::{
    analysis::{dominant_frequency, peak, rms},
    AudioBuffer, BlockRenderer, EventSequence, SynthConfig, MAX_BLOCK_SIZE,
};

/// Play the sequence on the default output device until it has finished.
pub fn play(config: SynthConfig, sequence: EventSequence) -> EyreResult<()> {
    let host = cpal::default_host();
    let device = host
        .default_output_device()
        .ok_or_else(|| eyre!("no output device available"))?;
    let stream_config = device
        .default_output_config()
        .wrap_err("failed to fetch default output config")?;

    let sample_rate = stream_config.sample_rate().0 as f64;
    let channels = stream_config.channels() as usize;

    println!("=== sinepoly ===");
    println!("Sample rate: {} Hz", sample_rate);
    println!("Channels: {}", channels);
    println!("Voices: {}", config.voices);
    println!("Dispatch: {:?}", config.dispatch);
    println!("Events: {}", sequence.len());
    println!();
    println!("Playing... Press Ctrl+C to stop");

    let mut renderer = BlockRenderer::new(&config)?.with_sequence(sequence);
    renderer.prepare(sample_rate);

    let finished = Arc::new(AtomicBool::new(false));
    let finished_flag = finished.clone();
    let mut render_buf = AudioBuffer::new(channels, MAX_BLOCK_SIZE);

    let stream = device.build_output_stream(
        &stream_config.into(),
        move |data: &mut [f32], _| {
            let total_frames = data.len() / channels;
            let mut frames_written = 0;

            while frames_written < total_frames {
                let frames = (total_frames - frames_written).min(MAX_BLOCK_SIZE);

                renderer.render_next_block(&mut render_buf, 0, frames);

                let out_off = frames_written * channels;
                render_buf.write_interleaved(
                    0,
                    frames,
                    &mut data[out_off..out_off + frames * channels],
                );

                frames_written += frames;
            }

            if renderer.is_finished() {
                finished_flag.store(true, Ordering::Release);
            }
        },
        |err| error!(%err, "audio stream error"),
        None,
    )?;

    stream.play()?;

    while !finished.load(Ordering::Acquire) {
        std::thread::sleep(std::time::Duration::from_millis(100));
    }

    info!("playback finished");
    Ok(())
}

/// Render the sequence offline at the configured rate and report levels.
pub fn bounce(config: SynthConfig, sequence: EventSequence) -> EyreResult<()> {
    let block_size = config.block_size;
    let sample_rate = config.sample_rate;
    let mut renderer = BlockRenderer::new(&config)?.with_sequence(sequence);
    let mut buffer = AudioBuffer::new(1, block_size);
    let mut rendered = Vec::new();

    while !renderer.is_finished() {
        renderer.render_next_block(&mut buffer, 0, block_size);
        rendered.extend_from_slice(buffer.channel(0));
    }

    println!("=== sinepoly bounce ===");
    println!(
        "Rendered {} samples ({:.2} s) in blocks of {}",
        rendered.len(),
        rendered.len() as f64 / sample_rate,
        block_size
    );
    println!("Peak: {:.4}", peak(&rendered));
    println!("RMS:  {:.4}", rms(&rendered));
    match dominant_frequency(&rendered, sample_rate) {
        Some(freq) => println!("Dominant frequency: {:.2} Hz", freq),
        None => println!("Dominant frequency: (silence)"),
    }

    Ok(())
}
