//! FFT kernels shared by the spectral and cepstral transforms.
//!
//! Real-input frames go through `realfft` (half-spectrum in, half-spectrum
//! out); the complex-log cepstrum and the Hilbert transform need the full
//! spectrum and use `rustfft` directly. Inverse transforms are normalized by
//! `1/nfft` so forward followed by inverse is the identity.

use std::sync::Arc;

use num_complex::Complex64;
use realfft::{ComplexToReal, RealFftPlanner, RealToComplex};
use rustfft::FftPlanner;

use crate::error::{Result, SigError};

/// Real-to-complex / complex-to-real FFT pair with reusable buffers.
pub(crate) struct RealFftEngine {
    nfft: usize,
    r2c: Arc<dyn RealToComplex<f64>>,
    c2r: Arc<dyn ComplexToReal<f64>>,
    real_buf: Vec<f64>,
    spec_buf: Vec<Complex64>,
}

impl RealFftEngine {
    pub fn new(nfft: usize) -> Self {
        let mut planner = RealFftPlanner::<f64>::new();
        Self {
            nfft,
            r2c: planner.plan_fft_forward(nfft),
            c2r: planner.plan_fft_inverse(nfft),
            real_buf: vec![0.0; nfft],
            spec_buf: vec![Complex64::new(0.0, 0.0); nfft / 2 + 1],
        }
    }

    pub fn nfft(&self) -> usize {
        self.nfft
    }

    /// Number of frequency bins (nfft/2 + 1).
    pub fn num_bins(&self) -> usize {
        self.nfft / 2 + 1
    }

    /// Forward real FFT; the input is zero-padded or truncated to `nfft`.
    pub fn forward(&mut self, frame: &[f64]) -> Result<Vec<Complex64>> {
        let copy_len = frame.len().min(self.nfft);
        self.real_buf[..copy_len].copy_from_slice(&frame[..copy_len]);
        self.real_buf[copy_len..].fill(0.0);

        self.r2c
            .process(&mut self.real_buf, &mut self.spec_buf)
            .map_err(|e| SigError::NumericInstability {
                context: "forward real FFT",
                reason: e.to_string(),
            })?;
        Ok(self.spec_buf.clone())
    }

    /// Inverse real FFT of a half spectrum, normalized by 1/nfft.
    pub fn inverse(&mut self, spectrum: &[Complex64]) -> Result<Vec<f64>> {
        if spectrum.len() != self.num_bins() {
            return Err(SigError::ShapeMismatch {
                what: "half-spectrum length",
                expected: self.num_bins(),
                got: spectrum.len(),
            });
        }
        self.spec_buf.copy_from_slice(spectrum);
        // realfft requires purely real DC and Nyquist bins.
        self.spec_buf[0].im = 0.0;
        if self.nfft % 2 == 0 {
            let last = self.num_bins() - 1;
            self.spec_buf[last].im = 0.0;
        }

        self.c2r
            .process(&mut self.spec_buf, &mut self.real_buf)
            .map_err(|e| SigError::NumericInstability {
                context: "inverse real FFT",
                reason: e.to_string(),
            })?;

        let scale = 1.0 / self.nfft as f64;
        Ok(self.real_buf.iter().map(|&v| v * scale).collect())
    }
}

/// Full complex FFT of a real signal, zero-padded to `nfft`.
pub(crate) fn fft(sig: &[f64], nfft: usize) -> Vec<Complex64> {
    let mut buf: Vec<Complex64> = sig
        .iter()
        .take(nfft)
        .map(|&v| Complex64::new(v, 0.0))
        .collect();
    buf.resize(nfft, Complex64::new(0.0, 0.0));

    FftPlanner::new().plan_fft_forward(nfft).process(&mut buf);
    buf
}

/// In-place inverse complex FFT, normalized by 1/n.
pub(crate) fn ifft(buf: &mut [Complex64]) {
    let n = buf.len();
    FftPlanner::new().plan_fft_inverse(n).process(buf);
    let scale = 1.0 / n as f64;
    for v in buf.iter_mut() {
        *v *= scale;
    }
}

/// Analytic signal via the Hilbert transform.
///
/// Doubles the positive-frequency bins, zeroes the negative ones, and
/// inverse-transforms; the imaginary part is the Hilbert transform of `x`.
pub(crate) fn hilbert(x: &[f64]) -> Vec<Complex64> {
    let n = x.len();
    let mut buf = fft(x, n);
    for v in buf.iter_mut().take(n.div_ceil(2)).skip(1) {
        *v *= 2.0;
    }
    for v in buf.iter_mut().skip(n / 2 + 1) {
        *v = Complex64::new(0.0, 0.0);
    }
    ifft(&mut buf);
    buf
}
