//! Auditory filterbanks.
//!
//! The gammatone filterbank places channel center frequencies on the ERB
//! scale (Glasberg & Moore) and evaluates a fourth-order gammatone magnitude
//! response at the FFT bin frequencies, producing the frequency-domain
//! weight matrix that maps power-spectrogram bins to auditory channels.

use ndarray::{Array2, ArrayView2};

use crate::error::{Result, SigError};

const EAR_Q: f64 = 9.26449;
const MIN_BW: f64 = 24.7;
/// Lower bound of the analysis range; the upper bound is Nyquist.
const LOW_FREQ: f64 = 100.0;
/// Bandwidth scale of the fourth-order gammatone (Patterson/Holdsworth).
const BW_MULT: f64 = 1.019;

/// Equivalent rectangular bandwidth at center frequency `cf` in Hz.
pub fn erb(cf: f64) -> f64 {
    cf / EAR_Q + MIN_BW
}

/// `num` center frequencies equally spaced on the ERB scale in
/// `[low, high]`, ascending. The lowest channel lands exactly on `low`.
pub fn erb_space(low: f64, high: f64, num: usize) -> Vec<f64> {
    let c = EAR_Q * MIN_BW;
    let step = ((low + c) / (high + c)).ln() / num as f64;
    let mut cfs: Vec<f64> = (1..=num)
        .map(|i| -c + (i as f64 * step).exp() * (high + c))
        .collect();
    cfs.reverse();
    cfs
}

/// Gammatone filterbank over `[100 Hz, sample_rate/2]`.
#[derive(Debug, Clone)]
pub struct Gammatone {
    sample_rate: u32,
    cfs: Vec<f64>,
}

impl Gammatone {
    /// Construct a filterbank of `num_channels` channels.
    pub fn new(sample_rate: u32, num_channels: usize) -> Result<Self> {
        if num_channels == 0 {
            return Err(SigError::ShapeMismatch {
                what: "gammatone channels",
                expected: 1,
                got: 0,
            });
        }
        let nyquist = sample_rate as f64 / 2.0;
        if nyquist <= LOW_FREQ {
            return Err(SigError::ShapeMismatch {
                what: "sample rate (Hz)",
                expected: 2 * LOW_FREQ as usize + 1,
                got: sample_rate as usize,
            });
        }
        Ok(Self {
            sample_rate,
            cfs: erb_space(LOW_FREQ, nyquist, num_channels),
        })
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn num_channels(&self) -> usize {
        self.cfs.len()
    }

    /// Channel center frequencies in Hz, ascending.
    pub fn center_frequencies(&self) -> &[f64] {
        &self.cfs
    }

    /// Frequency-domain weight matrix of shape `(nfft/2 + 1, num_channels)`.
    ///
    /// Each column is the channel's gammatone response sampled at the FFT
    /// bin frequencies. `squared` returns the power (magnitude squared)
    /// response; `powernorm` rescales every column to unit sum so channel
    /// energies are directly comparable. Pure function of its arguments.
    pub fn gammawgt(&self, nfft: usize, powernorm: bool, squared: bool) -> Result<Array2<f64>> {
        if nfft < 2 {
            return Err(SigError::ShapeMismatch {
                what: "nfft",
                expected: 2,
                got: nfft,
            });
        }
        let nbins = nfft / 2 + 1;
        let binhz = self.sample_rate as f64 / nfft as f64;

        let mut wts = Array2::zeros((nbins, self.cfs.len()));
        for (c, &cf) in self.cfs.iter().enumerate() {
            let bw = BW_MULT * erb(cf);
            for k in 0..nbins {
                let detune = (k as f64 * binhz - cf) / bw;
                // Fourth-order gammatone magnitude, unit gain at cf.
                let mag = (1.0 + detune * detune).powi(-2);
                wts[[k, c]] = if squared { mag * mag } else { mag };
            }
            if powernorm {
                let total: f64 = wts.column(c).sum();
                for k in 0..nbins {
                    wts[[k, c]] /= total;
                }
            }
        }
        Ok(wts)
    }
}

/// Project a power spectrogram onto filterbank channels:
/// `(n_frames, nbins) x (nbins, n_channels)`.
pub fn fbank_power(powerspec: ArrayView2<f64>, wts: ArrayView2<f64>) -> Result<Array2<f64>> {
    if powerspec.ncols() != wts.nrows() {
        return Err(SigError::ShapeMismatch {
            what: "filterbank rows",
            expected: powerspec.ncols(),
            got: wts.nrows(),
        });
    }
    Ok(powerspec.dot(&wts))
}
