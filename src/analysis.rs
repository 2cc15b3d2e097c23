//! Offline analysis of rendered audio.
//!
//! FFT-based pitch estimation used by the demo binary, the benches and the
//! regression tests. Allocates freely; never call it from the audio thread.

use rustfft::{num_complex::Complex, FftPlanner};

/// Largest absolute sample value.
pub fn peak(samples: &[f32]) -> f32 {
    samples.iter().fold(0.0f32, |acc, &x| acc.max(x.abs()))
}

/// Root-mean-square level.
pub fn rms(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum: f64 = samples.iter().map(|&s| (s as f64) * (s as f64)).sum();
    (sum / samples.len() as f64).sqrt() as f32
}

/// Frequency (Hz) of the strongest spectral peak, or `None` for silence or
/// fewer than four samples.
///
/// The signal is Hann-windowed and the peak bin refined by parabolic
/// interpolation over log magnitudes, which is good to a small fraction of a
/// bin for a steady sine.
pub fn dominant_frequency(samples: &[f32], sample_rate: f64) -> Option<f64> {
    let len = samples.len();
    if len < 4 || peak(samples) == 0.0 {
        return None;
    }

    let mut planner = FftPlanner::new();
    let fft = planner.plan_fft_forward(len);

    // Hann window - reduces spectral leakage
    let denom = (len - 1) as f64;
    let mut buffer: Vec<Complex<f64>> = samples
        .iter()
        .enumerate()
        .map(|(i, &s)| {
            let w = 0.5 * (1.0 - (std::f64::consts::TAU * i as f64 / denom).cos());
            Complex::new(s as f64 * w, 0.0)
        })
        .collect();
    fft.process(&mut buffer);

    let half = len / 2;
    let magnitudes: Vec<f64> = buffer[..half].iter().map(|c| c.norm()).collect();
    let (bin, _) = magnitudes
        .iter()
        .enumerate()
        .skip(1)
        .max_by(|a, b| a.1.total_cmp(b.1))?;

    let refined = if bin + 1 < half {
        let ln = |m: f64| m.max(f64::MIN_POSITIVE).ln();
        let (a, b, c) = (
            ln(magnitudes[bin - 1]),
            ln(magnitudes[bin]),
            ln(magnitudes[bin + 1]),
        );
        let denom = a - 2.0 * b + c;
        if denom.abs() > f64::EPSILON {
            bin as f64 + 0.5 * (a - c) / denom
        } else {
            bin as f64
        }
    } else {
        bin as f64
    };

    Some(refined * sample_rate / len as f64)
}
