// Purpose - external interfaces, format conversions

pub mod converter;
pub mod midi;

/// Planar multi-channel sample buffer for one render block.
///
/// The caller sizes it once; nothing in the render path resizes or
/// reallocates it. Voices only ever *add* into it, so several sources can
/// share one buffer as long as the region is cleared before a block.
#[derive(Debug, Default, Clone)]
pub struct AudioBuffer {
    channels: Vec<Vec<f32>>,
    frames: usize,
}

impl AudioBuffer {
    pub fn new(num_channels: usize, frames: usize) -> Self {
        Self {
            channels: vec![vec![0.0; frames]; num_channels],
            frames,
        }
    }

    pub fn num_channels(&self) -> usize {
        self.channels.len()
    }

    pub fn num_frames(&self) -> usize {
        self.frames
    }

    pub fn channel(&self, index: usize) -> &[f32] {
        &self.channels[index]
    }

    pub fn channel_mut(&mut self, index: usize) -> &mut [f32] {
        &mut self.channels[index]
    }

    /// Add `value` to one frame of one channel.
    #[inline]
    pub fn add_sample(&mut self, channel: usize, frame: usize, value: f32) {
        self.channels[channel][frame] += value;
    }

    /// Add `value` to one frame of every channel.
    #[inline]
    pub fn add_to_all(&mut self, frame: usize, value: f32) {
        for channel in &mut self.channels {
            channel[frame] += value;
        }
    }

    /// Zero `num_frames` frames starting at `start` on every channel.
    pub fn clear_region(&mut self, start: usize, num_frames: usize) {
        let end = start + num_frames;
        debug_assert!(end <= self.frames, "clear past the end of the buffer");
        for channel in &mut self.channels {
            channel[start..end].fill(0.0);
        }
    }

    pub fn clear(&mut self) {
        self.clear_region(0, self.frames);
    }

    /// Copy `num_frames` frames starting at `start` into an interleaved slice.
    ///
    /// Used by hosts such as cpal that hand out interleaved output.
    pub fn write_interleaved(&self, start: usize, num_frames: usize, out: &mut [f32]) {
        let channels = self.num_channels();
        for frame in 0..num_frames {
            for (ch, channel) in self.channels.iter().enumerate() {
                out[frame * channels + ch] = channel[start + frame];
            }
        }
    }
}
