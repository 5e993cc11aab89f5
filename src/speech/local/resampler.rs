use crate::{ChatError, Result};
use rubato::{
    Resampler, SincFixedIn, SincInterpolationParameters, SincInterpolationType, WindowFunction,
};
use tracing::debug;

const CHUNK_SIZE: usize = 1024;

/// Resample mono audio from `input_rate` to `output_rate`
pub fn resample_mono(input: &[f32], input_rate: u32, output_rate: u32) -> Result<Vec<f32>> {
    if input_rate == 0 || output_rate == 0 {
        return Err(ChatError::Config("Sample rates must be greater than 0".into()));
    }
    if input_rate == output_rate || input.is_empty() {
        return Ok(input.to_vec());
    }

    let ratio = output_rate as f64 / input_rate as f64;
    let params = SincInterpolationParameters {
        sinc_len: 256,
        f_cutoff: 0.95,
        interpolation: SincInterpolationType::Linear,
        oversampling_factor: 256,
        window: WindowFunction::BlackmanHarris2,
    };

    let mut resampler = SincFixedIn::<f32>::new(ratio, 2.0, params, CHUNK_SIZE, 1)
        .map_err(|e| ChatError::Speech(format!("Failed to create resampler: {}", e)))?;

    let expected = (input.len() as f64 * ratio).round() as usize;
    let mut output = Vec::with_capacity(expected + CHUNK_SIZE);

    for chunk in input.chunks(CHUNK_SIZE) {
        // SincFixedIn needs exactly CHUNK_SIZE frames per call
        let mut frames = vec![0.0f32; CHUNK_SIZE];
        frames[..chunk.len()].copy_from_slice(chunk);

        let processed = resampler
            .process(&[frames], None)
            .map_err(|e| ChatError::Speech(format!("Resampling failed: {}", e)))?;
        output.extend_from_slice(&processed[0]);
    }

    output.truncate(expected);
    debug!(
        "Resampled {} samples {} Hz -> {} samples {} Hz",
        input.len(),
        input_rate,
        output.len(),
        output_rate
    );
    Ok(output)
}
