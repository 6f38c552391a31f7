//! Power-normalized cepstral coefficients (Kim & Stern).
//!
//! The processing chain over a gammatone power spectrogram is:
//! 1. Medium-time power (+-2 frame moving average)
//! 2. Asymmetric noise-floor tracking and floor subtraction
//! 3. Optional temporal masking against a decaying per-channel peak
//! 4. Spectral weight smoothing across neighboring channels
//! 5. Mean power normalization
//! 6. Power-law compression (exponent 1/15)
//! 7. DCT-II across channels, first 13 coefficients
//!
//! The input is taken by view and never written; every intermediate is
//! allocated here, so repeated calls with the same input produce
//! bit-identical output.

use ndarray::{Array2, ArrayView2};

use crate::error::{Result, SigError};

const LAMBDA_A: f64 = 0.999;
const LAMBDA_B: f64 = 0.5;
const LAMBDA_T: f64 = 0.85;
const MU_T: f64 = 0.2;
const LAMBDA_MU: f64 = 0.999;
const VAD_CONST: f64 = 2.0;
/// Frames on each side of the medium-time average.
const MED_TIME: usize = 2;
/// Channels on each side of the spectral weight smoothing.
const MED_FREQ: usize = 4;
const POWER_EXP: f64 = 1.0 / 15.0;
const NUM_CEPS: usize = 13;
const EPS: f64 = 1e-30;

/// Power-normalized cepstral coefficients of a gammatone power spectrogram.
///
/// # Arguments
/// * `gammaspec` - Power spectrogram of shape `(n_frames, n_channels)`
/// * `tempmask` - Apply temporal masking against the decaying channel peak
///
/// # Returns
/// Coefficients of shape `(n_frames, min(13, n_channels))`.
pub fn pncc(gammaspec: ArrayView2<'_, f64>, tempmask: bool) -> Result<Array2<f64>> {
    let (nframes, nchan) = gammaspec.dim();
    if nframes == 0 || nchan == 0 {
        return Err(SigError::ShapeMismatch {
            what: "gammatone spectrogram",
            expected: 1,
            got: 0,
        });
    }

    // 1. Medium-time power.
    let mut qtild = Array2::zeros((nframes, nchan));
    for m in 0..nframes {
        let lo = m.saturating_sub(MED_TIME);
        let hi = (m + MED_TIME).min(nframes - 1);
        let span = (hi - lo + 1) as f64;
        for l in 0..nchan {
            let mut acc = 0.0;
            for row in lo..=hi {
                acc += gammaspec[[row, l]];
            }
            qtild[[m, l]] = acc / span;
        }
    }

    // 2. Noise floor and floor-subtracted excitation power.
    let qle = asym_filter(&qtild);
    let mut q0 = Array2::zeros((nframes, nchan));
    for m in 0..nframes {
        for l in 0..nchan {
            q0[[m, l]] = (qtild[[m, l]] - qle[[m, l]]).max(0.0);
        }
    }
    let qf = asym_filter(&q0);

    // 3. Temporal masking: per-channel peak decaying at LAMBDA_T; values
    // falling under the decayed peak are pushed down to MU_T of it.
    let mut rsp = q0.clone();
    if tempmask {
        for l in 0..nchan {
            let mut peak = 0.0f64;
            for m in 0..nframes {
                let v = q0[[m, l]];
                rsp[[m, l]] = if v >= LAMBDA_T * peak {
                    v
                } else {
                    MU_T * peak
                };
                peak = (LAMBDA_T * peak).max(v);
            }
        }
    }

    // Excitation switch: noise-floor output in non-excitation segments.
    let mut rtild = Array2::zeros((nframes, nchan));
    for m in 0..nframes {
        for l in 0..nchan {
            rtild[[m, l]] = if qtild[[m, l]] >= VAD_CONST * qle[[m, l]] {
                rsp[[m, l]]
            } else {
                qf[[m, l]]
            };
        }
    }

    // 4. Spectral weight smoothing, applied back to the short-time power.
    let mut tspec = Array2::zeros((nframes, nchan));
    for m in 0..nframes {
        for l in 0..nchan {
            let lo = l.saturating_sub(MED_FREQ);
            let hi = (l + MED_FREQ).min(nchan - 1);
            let mut acc = 0.0;
            for chan in lo..=hi {
                acc += rtild[[m, chan]] / qtild[[m, chan]].max(EPS);
            }
            tspec[[m, l]] = gammaspec[[m, l]] * acc / (hi - lo + 1) as f64;
        }
    }

    // 5. Mean power normalization.
    let mut mu = 0.0;
    let mut unorm = Array2::zeros((nframes, nchan));
    for m in 0..nframes {
        let frame_mean = tspec.row(m).mean().unwrap_or(0.0);
        mu = if m == 0 {
            frame_mean
        } else {
            LAMBDA_MU * mu + (1.0 - LAMBDA_MU) * frame_mean
        };
        for l in 0..nchan {
            unorm[[m, l]] = (tspec[[m, l]] / mu.max(EPS)).max(0.0);
        }
    }

    // 6. Power-law compression.
    let compressed = unorm.mapv(|v| v.powf(POWER_EXP));

    // 7. DCT-II across channels.
    let nceps = NUM_CEPS.min(nchan);
    let mut coef = Array2::zeros((nframes, nceps));
    let dct = dct_matrix(nchan, nceps);
    for m in 0..nframes {
        for k in 0..nceps {
            let mut acc = 0.0;
            for l in 0..nchan {
                acc += compressed[[m, l]] * dct[[k, l]];
            }
            coef[[m, k]] = acc;
        }
    }
    Ok(coef)
}

/// Asymmetric lowpass: tracks rises slowly (LAMBDA_A) and falls quickly
/// (LAMBDA_B), which makes the output hug the lower envelope.
fn asym_filter(input: &Array2<f64>) -> Array2<f64> {
    let (nframes, nchan) = input.dim();
    let mut out = Array2::zeros((nframes, nchan));
    for l in 0..nchan {
        let mut prev = 0.9 * input[[0, l]];
        out[[0, l]] = prev;
        for m in 1..nframes {
            let v = input[[m, l]];
            let lambda = if v >= prev { LAMBDA_A } else { LAMBDA_B };
            prev = lambda * prev + (1.0 - lambda) * v;
            out[[m, l]] = prev;
        }
    }
    out
}

/// Orthonormal DCT-II basis, `nceps x nchan`.
fn dct_matrix(nchan: usize, nceps: usize) -> Array2<f64> {
    use std::f64::consts::PI;
    let mut dct = Array2::zeros((nceps, nchan));
    for k in 0..nceps {
        let alpha = if k == 0 {
            (1.0 / nchan as f64).sqrt()
        } else {
            (2.0 / nchan as f64).sqrt()
        };
        for l in 0..nchan {
            dct[[k, l]] = alpha * (PI * k as f64 * (2 * l + 1) as f64 / (2 * nchan) as f64).cos();
        }
    }
    dct
}
