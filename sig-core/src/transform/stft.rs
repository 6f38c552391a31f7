//! Short-time Fourier transform, its inverse, and the power spectrogram.

use ndarray::Array2;
use num_complex::Complex64;

use super::fft::RealFftEngine;
use crate::error::{Result, SigError};
use crate::stproc::{overlap_add, stana, Hop};
use crate::window::Window;

fn check_nfft(nfft: usize) -> Result<()> {
    if nfft < 2 {
        return Err(SigError::ShapeMismatch {
            what: "nfft",
            expected: 2,
            got: nfft,
        });
    }
    Ok(())
}

/// Short-time Fourier transform.
///
/// Frames the signal on the synthesis grid, zero-pads (or truncates) each
/// windowed frame to `nfft`, and applies a forward real FFT per frame.
///
/// # Returns
/// Complex spectrogram of shape `(n_frames, nfft/2 + 1)`.
pub fn stft(
    sig: &[f64],
    sample_rate: u32,
    wind: &Window,
    hop: Hop,
    nfft: usize,
) -> Result<Array2<Complex64>> {
    check_nfft(nfft)?;
    let frames = stana(sig, sample_rate, wind, hop, true, (None, None))?;
    let mut engine = RealFftEngine::new(nfft);

    let mut spec = Array2::zeros((frames.num_frames(), engine.num_bins()));
    for (k, frame) in frames.enumerate() {
        let row = engine.forward(&frame)?;
        for (j, v) in row.into_iter().enumerate() {
            spec[[k, j]] = v;
        }
    }
    Ok(spec)
}

/// Inverse short-time Fourier transform.
///
/// Requires a synthesis-validated window; each frame is inverse-transformed,
/// truncated to the window length, and overlap-added with envelope
/// normalization. Composed with [`stft`] the round trip reproduces the input
/// signal over its full length.
pub fn istft(
    spec: &Array2<Complex64>,
    _sample_rate: u32,
    wind: &Window,
    hop: Hop,
    nfft: usize,
) -> Result<Vec<f64>> {
    check_nfft(nfft)?;
    let wsize = wind.len();
    let hsize = hop.size(wsize)?;
    if !wind.is_synth() {
        return Err(SigError::InvalidWindowConfig {
            wsize,
            hsize,
            reason: "istft requires a synthesis-validated window",
        });
    }

    let nbins = nfft / 2 + 1;
    if spec.ncols() != nbins {
        return Err(SigError::ShapeMismatch {
            what: "spectrogram bins",
            expected: nbins,
            got: spec.ncols(),
        });
    }

    let mut engine = RealFftEngine::new(nfft);
    let mut frames = Vec::with_capacity(spec.nrows());
    for row in spec.rows() {
        let mut frame = engine.inverse(row.as_slice().ok_or(SigError::ShapeMismatch {
            what: "contiguous spectrogram row",
            expected: nbins,
            got: 0,
        })?)?;
        // Undo the zero-padding applied at analysis time.
        frame.truncate(wsize);
        frame.resize(wsize, 0.0);
        frames.push(frame);
    }

    overlap_add(frames, wind, hsize)
}

/// Short-time power spectrogram.
///
/// Squared magnitude of the forward FFT per analysis frame. With `synth` the
/// unit-magnitude phase spectrogram is returned alongside so a later stage
/// can resynthesize.
pub fn stpowspec(
    sig: &[f64],
    sample_rate: u32,
    wind: &Window,
    hop: Hop,
    nfft: usize,
    synth: bool,
) -> Result<(Array2<f64>, Option<Array2<Complex64>>)> {
    check_nfft(nfft)?;
    let frames = stana(sig, sample_rate, wind, hop, false, (None, None))?;
    let mut engine = RealFftEngine::new(nfft);

    let nbins = engine.num_bins();
    let mut power = Array2::zeros((frames.num_frames(), nbins));
    let mut phase = synth.then(|| Array2::zeros((power.nrows(), nbins)));

    for (k, frame) in frames.enumerate() {
        let row = engine.forward(&frame)?;
        for (j, v) in row.into_iter().enumerate() {
            power[[k, j]] = v.norm_sqr();
            if let Some(ph) = phase.as_mut() {
                let mag = v.norm();
                ph[[k, j]] = if mag > 0.0 {
                    v / mag
                } else {
                    Complex64::new(1.0, 0.0)
                };
            }
        }
    }
    Ok((power, phase))
}
