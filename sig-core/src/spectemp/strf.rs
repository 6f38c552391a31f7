//! Spectro-temporal receptive field filters (Chi, Ru & Shamma).
//!
//! A separable 2-D Gabor-like kernel built from a gamma-envelope temporal
//! impulse response and a second-derivative-of-Gaussian spectral impulse
//! response. The Hilbert-transform construction splits the product kernel
//! into downward- and upward-moving sub-filters.

use ndarray::Array2;
use num_complex::Complex64;
use std::f64::consts::PI;

use crate::error::{Result, SigError};
use crate::transform::fft::hilbert;

/// Parameters of one STRF kernel pair.
#[derive(Debug, Clone)]
pub struct StrfParams {
    /// Temporal support in seconds.
    pub time_support: f64,
    /// Spectral support in octaves (the kernel spans twice this, centered).
    pub freq_support: f64,
    /// Frame rate of the spectrogram the kernel will filter, in frames/s.
    pub frame_rate: f64,
    /// Frequency resolution in bins per octave.
    pub bins_per_octave: usize,
    /// Temporal modulation rate in Hz.
    pub rate: f64,
    /// Spectral modulation rate in cycles per octave.
    pub scale: f64,
    /// Spectral carrier phase in radians.
    pub phi: f64,
    /// Temporal carrier phase in radians.
    pub theta: f64,
}

/// Build the downward- and upward-moving STRF kernel pair.
///
/// # Returns
/// `(kdn, kup)` of shape `(time_support*frame_rate, 2*freq_support*bins_per_octave)`.
pub fn strf(params: &StrfParams) -> Result<(Array2<f64>, Array2<f64>)> {
    let nt = (params.time_support * params.frame_rate).round();
    let ns = (2.0 * params.freq_support * params.bins_per_octave as f64).round();
    if !(nt >= 1.0) || !(ns >= 1.0) {
        return Err(SigError::ShapeMismatch {
            what: "strf kernel extent",
            expected: 1,
            got: 0,
        });
    }
    let (nt, ns) = (nt as usize, ns as usize);

    // Gamma-envelope temporal impulse response at the modulation rate.
    let ht: Vec<f64> = linspace(0.0, params.time_support, nt)
        .map(|t| {
            let tr = params.rate * t;
            params.rate * tr * tr * (-3.5 * tr).exp() * (2.0 * PI * tr).sin()
        })
        .collect();

    // Second-derivative-of-Gaussian spectral impulse response.
    let hs: Vec<f64> = linspace(-params.freq_support, params.freq_support, ns)
        .map(|x| {
            let sx = 2.0 * PI * params.scale * x;
            params.scale * (1.0 - sx * sx) * (-sx * sx / 2.0).exp()
        })
        .collect();

    // Carrier phase shifts through the Hilbert transform, then the analytic
    // signals whose outer product separates the two sweep directions.
    let hirt = phase_shift(&ht, params.theta);
    let hirs = phase_shift(&hs, params.phi);
    let hta = hilbert(&hirt);
    let hsa = hilbert(&hirs);

    let mut kdn = Array2::zeros((nt, ns));
    let mut kup = Array2::zeros((nt, ns));
    for (m, &t) in hta.iter().enumerate() {
        for (i, &s) in hsa.iter().enumerate() {
            kdn[[m, i]] = (t * s).re;
            kup[[m, i]] = (t * s.conj()).re;
        }
    }

    if kdn.iter().chain(kup.iter()).any(|v| !v.is_finite()) {
        return Err(SigError::NumericInstability {
            context: "strf kernel",
            reason: "non-finite kernel entry".into(),
        });
    }
    Ok((kdn, kup))
}

/// Rotate the carrier of `h` by `angle` using its Hilbert transform.
fn phase_shift(h: &[f64], angle: f64) -> Vec<f64> {
    let analytic: Vec<Complex64> = hilbert(h);
    h.iter()
        .zip(analytic)
        .map(|(&v, a)| v * angle.cos() + a.im * angle.sin())
        .collect()
}

/// Inclusive linspace matching the sampling of the reference filters.
fn linspace(start: f64, end: f64, num: usize) -> impl Iterator<Item = f64> {
    let step = if num > 1 {
        (end - start) / (num - 1) as f64
    } else {
        0.0
    };
    (0..num).map(move |i| start + i as f64 * step)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference_params() -> StrfParams {
        StrfParams {
            time_support: 0.2,
            freq_support: 1.0,
            frame_rate: 100.0,
            bins_per_octave: 12,
            rate: 1.0,
            scale: 1.0,
            phi: 0.5 * PI,
            theta: 0.0,
        }
    }

    #[test]
    fn test_kernel_shapes() {
        let (kdn, kup) = strf(&reference_params()).unwrap();
        assert_eq!(kdn.dim(), (20, 24));
        assert_eq!(kup.dim(), (20, 24));
        assert!(kdn.iter().all(|v| v.is_finite()));
        assert!(kup.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_directions_differ() {
        let (kdn, kup) = strf(&reference_params()).unwrap();
        let diff: f64 = (&kdn - &kup).iter().map(|v| v.abs()).sum();
        assert!(diff > 1e-6);
    }

    #[test]
    fn test_zero_phase_kernels_sum_to_product() {
        // Re(a b) + Re(a conj(b)) = 2 Re(a) Re(b): at zero carrier phases
        // the two sweeps recombine into the separable real kernel.
        let mut params = reference_params();
        params.phi = 0.0;
        params.theta = 0.0;
        let (kdn, kup) = strf(&params).unwrap();

        let ht: Vec<f64> = linspace(0.0, 0.2, 20)
            .map(|t| t * t * (-3.5 * t).exp() * (2.0 * PI * t).sin())
            .collect();
        let hs: Vec<f64> = linspace(-1.0, 1.0, 24)
            .map(|x| {
                let sx = 2.0 * PI * x;
                (1.0 - sx * sx) * (-sx * sx / 2.0).exp()
            })
            .collect();

        for m in 0..20 {
            for i in 0..24 {
                let expect = 2.0 * ht[m] * hs[i];
                assert!((kdn[[m, i]] + kup[[m, i]] - expect).abs() < 1e-10);
            }
        }
    }

    #[test]
    fn test_degenerate_support_rejected() {
        let mut params = reference_params();
        params.time_support = 0.0;
        assert!(matches!(
            strf(&params).unwrap_err(),
            SigError::ShapeMismatch { .. }
        ));
    }
}
