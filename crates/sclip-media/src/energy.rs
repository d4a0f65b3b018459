//! Short-time energy analysis.
//!
//! The waveform is cut into fixed-duration windows and each window is
//! reduced to its RMS value. Silence detection thresholds this series.

/// RMS energy of one fixed-duration window.
///
/// Chunks are ordered, contiguous and non-overlapping; a trailing window
/// smaller than the chunk size is dropped, matching the integer-division
/// chunk count.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnergyChunk {
    pub index: usize,
    pub rms: f32,
}

/// Compute the energy series over a mono waveform.
pub fn compute_energy_chunks(
    samples: &[f32],
    sample_rate: u32,
    chunk_duration: f64,
) -> Vec<EnergyChunk> {
    let chunk_size = (chunk_duration * sample_rate as f64) as usize;
    if chunk_size == 0 {
        return Vec::new();
    }

    let num_chunks = samples.len() / chunk_size;
    (0..num_chunks)
        .map(|index| {
            let window = &samples[index * chunk_size..(index + 1) * chunk_size];
            EnergyChunk {
                index,
                rms: rms(window),
            }
        })
        .collect()
}

/// RMS over the chunked region of the waveform.
///
/// Computed from the chunk series rather than the raw samples so the
/// relative silence threshold sees exactly the same windowing as detection.
/// All chunks are equal-sized, so the mean of squared chunk RMS values
/// equals the RMS over their union.
pub fn global_rms(chunks: &[EnergyChunk]) -> f32 {
    if chunks.is_empty() {
        return 0.0;
    }
    let mean_sq: f32 =
        chunks.iter().map(|c| c.rms * c.rms).sum::<f32>() / chunks.len() as f32;
    mean_sq.sqrt()
}

fn rms(window: &[f32]) -> f32 {
    if window.is_empty() {
        return 0.0;
    }
    let mean_sq: f32 = window.iter().map(|s| s * s).sum::<f32>() / window.len() as f32;
    mean_sq.sqrt()
}
