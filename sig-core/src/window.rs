//! Analysis/synthesis window generation.
//!
//! A [`Window`] pairs the raw coefficients with the hop it was designed for
//! and, when requested, validates the constant overlap-add (COLA) condition
//! so that short-time analysis followed by overlap-add synthesis reconstructs
//! the original signal.

use std::f64::consts::PI;

use crate::error::{Result, SigError};
use crate::stproc::Hop;

/// Window function types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowType {
    /// Hann window: w[n] = 0.5 - 0.5*cos(2πn/(M-1))
    Hann,

    /// Hamming window: w[n] = 0.54 - 0.46*cos(2πn/(M-1))
    Hamming,

    /// Blackman window: w[n] = 0.42 - 0.5*cos(2πn/(M-1)) + 0.08*cos(4πn/(M-1))
    Blackman,

    /// Rectangular window (no tapering)
    Rectangular,
}

/// Generate raw window coefficients w[n] for n = 0..M-1.
pub fn generate_window(window_type: WindowType, length: usize) -> Vec<f64> {
    if length == 1 {
        return vec![1.0];
    }
    let m = length as f64;
    let mut window = Vec::with_capacity(length);

    match window_type {
        WindowType::Hann => {
            for n in 0..length {
                let angle = 2.0 * PI * n as f64 / (m - 1.0);
                window.push(0.5 - 0.5 * angle.cos());
            }
        }

        WindowType::Hamming => {
            for n in 0..length {
                let angle = 2.0 * PI * n as f64 / (m - 1.0);
                window.push(0.54 - 0.46 * angle.cos());
            }
        }

        WindowType::Blackman => {
            for n in 0..length {
                let angle1 = 2.0 * PI * n as f64 / (m - 1.0);
                let angle2 = 4.0 * PI * n as f64 / (m - 1.0);
                window.push(0.42 - 0.5 * angle1.cos() + 0.08 * angle2.cos());
            }
        }

        WindowType::Rectangular => {
            window.resize(length, 1.0);
        }
    }

    window
}

/// An analysis (and optionally synthesis) window.
///
/// Constructed once and reused across frames. When `synth` is requested the
/// coefficients are rescaled so the overlap-add gain at the given hop is
/// approximately one, and window/hop pairs whose overlap-add envelope touches
/// zero are rejected with [`SigError::InvalidWindowConfig`].
#[derive(Debug, Clone)]
pub struct Window {
    coeffs: Vec<f64>,
    hop: Option<Hop>,
    synth: bool,
}

impl Window {
    /// Build a window of `length` coefficients.
    ///
    /// # Arguments
    /// * `kind` - Window function type
    /// * `length` - Number of coefficients, must be positive
    /// * `hop` - Hop the window is intended for; required when `synth` is set
    /// * `synth` - Validate and normalize for overlap-add synthesis
    pub fn new(kind: WindowType, length: usize, hop: Option<Hop>, synth: bool) -> Result<Self> {
        if length == 0 {
            return Err(SigError::InvalidWindowConfig {
                wsize: 0,
                hsize: 0,
                reason: "window length must be positive",
            });
        }

        let mut coeffs = generate_window(kind, length);

        if synth {
            let hop = hop.ok_or(SigError::InvalidWindowConfig {
                wsize: length,
                hsize: 0,
                reason: "a synthesis window requires a hop",
            })?;
            let hsize = hop.size(length)?;

            let envelope = ola_envelope(&coeffs, hsize);
            let max = envelope.iter().cloned().fold(f64::MIN, f64::max);
            let min = envelope.iter().cloned().fold(f64::MAX, f64::min);
            if min <= 1e-6 * max {
                return Err(SigError::InvalidWindowConfig {
                    wsize: length,
                    hsize,
                    reason: "overlap-add envelope reaches zero at this hop",
                });
            }

            // Unit overlap-add gain; exact reconstruction divides by the
            // per-sample envelope during synthesis.
            let mean = envelope.iter().sum::<f64>() / hsize as f64;
            for w in coeffs.iter_mut() {
                *w /= mean;
            }
        }

        Ok(Self {
            coeffs,
            hop,
            synth,
        })
    }

    pub fn coeffs(&self) -> &[f64] {
        &self.coeffs
    }

    pub fn len(&self) -> usize {
        self.coeffs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coeffs.is_empty()
    }

    pub fn hop(&self) -> Option<Hop> {
        self.hop
    }

    /// Whether this window was validated for overlap-add synthesis.
    pub fn is_synth(&self) -> bool {
        self.synth
    }
}

impl AsRef<[f64]> for Window {
    fn as_ref(&self) -> &[f64] {
        &self.coeffs
    }
}

/// Hamming window constructor mirroring the common analysis entry point.
pub fn hamming(length: usize, hop: Option<Hop>, synth: bool) -> Result<Window> {
    Window::new(WindowType::Hamming, length, hop, synth)
}

/// Periodic overlap-add envelope p[r] = Σ_j w[r + j*hsize], r = 0..hsize-1.
///
/// Shifting the window by every multiple of `hsize` makes the infinite
/// overlap-add sum periodic with period `hsize`, so one period captures the
/// whole envelope.
fn ola_envelope(wind: &[f64], hsize: usize) -> Vec<f64> {
    let mut envelope = vec![0.0; hsize];
    for (n, &w) in wind.iter().enumerate() {
        envelope[n % hsize] += w;
    }
    envelope
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hamming_shape() {
        let length = 161;
        let wind = generate_window(WindowType::Hamming, length);

        assert_eq!(wind.len(), length);

        // Symmetric, unit peak, 0.08 endpoints
        for i in 0..length / 2 {
            assert!((wind[i] - wind[length - 1 - i]).abs() < 1e-12);
        }
        assert!((wind[length / 2] - 1.0).abs() < 1e-10);
        assert!(wind[0] > 0.07 && wind[0] < 0.09);
    }

    #[test]
    fn test_rectangular_window() {
        let wind = generate_window(WindowType::Rectangular, 100);
        assert!(wind.iter().all(|&w| w == 1.0));
    }

    #[test]
    fn test_synth_window_unit_gain() {
        let wind = hamming(512, Some(Hop::Fraction(0.25)), true).unwrap();
        assert!(wind.is_synth());

        // After normalization the overlap-add envelope averages to one.
        let envelope = ola_envelope(wind.coeffs(), 128);
        let mean = envelope.iter().sum::<f64>() / envelope.len() as f64;
        assert!((mean - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_hann_full_hop_rejected() {
        // Hann endpoints are zero, so hop == length leaves gaps in the
        // overlap-add envelope.
        let err = Window::new(WindowType::Hann, 256, Some(Hop::Fraction(1.0)), true).unwrap_err();
        assert!(matches!(err, SigError::InvalidWindowConfig { .. }));
    }

    #[test]
    fn test_zero_length_rejected() {
        let err = hamming(0, None, false).unwrap_err();
        assert!(matches!(err, SigError::InvalidWindowConfig { .. }));
    }

    #[test]
    fn test_analysis_window_needs_no_hop() {
        let wind = hamming(400, None, false).unwrap();
        assert_eq!(wind.len(), 400);
        assert!(!wind.is_synth());
    }
}
