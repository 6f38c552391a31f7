//! Real and complex cepstral analysis.
//!
//! The complex cepstrum is computed by two independent routes that must
//! agree numerically: factorizing the signal's z-transform through its roots
//! (exact for finite-length signals), or taking the complex logarithm of a
//! long FFT with unwrapped phase. The real cepstrum comes either straight
//! from the log-magnitude spectrum or by folding the complex cepstrum.

use nalgebra::{DMatrix, Schur};
use num_complex::Complex64;
use std::f64::consts::PI;

use super::fft::{fft, ifft, RealFftEngine};
use crate::error::{Result, SigError};

/// Numerical route for the complex cepstrum.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CepstrumMethod {
    /// Root-based factorization of the z-transform.
    ZTransform,
    /// Complex logarithm of a long FFT with phase unwrapping.
    DftLog,
}

/// Internal FFT length for cepstral analysis of a signal of `siglen` samples.
fn cep_nfft(siglen: usize) -> usize {
    let mut nfft = 1024;
    while nfft < 2 * siglen {
        nfft *= 2;
    }
    nfft
}

fn check_order(order: usize, nfft: usize) -> Result<()> {
    let bound = nfft / 2 - 1;
    if order > bound {
        return Err(SigError::Aliasing { order, bound, nfft });
    }
    Ok(())
}

/// Complex cepstrum of `sig` up to quefrency `order`.
///
/// # Returns
/// Length `2*order + 1` vector over quefrencies `-order..=order`; index
/// `order` is quefrency zero. For a real signal the causal part carries the
/// minimum-phase factor and the anticausal part the maximum-phase factor.
pub fn compcep(sig: &[f64], order: usize, method: CepstrumMethod) -> Result<Vec<f64>> {
    check_order(order, cep_nfft(sig.len()))?;
    match method {
        CepstrumMethod::ZTransform => compcep_ztrans(sig, order),
        CepstrumMethod::DftLog => compcep_dft(sig, order),
    }
}

/// Real cepstrum of `sig`, log-magnitude route.
///
/// # Returns
/// Length `order` vector over quefrencies `0..order`.
pub fn realcep(sig: &[f64], order: usize) -> Result<Vec<f64>> {
    let nfft = cep_nfft(sig.len());
    check_order(order.saturating_sub(1), nfft)?;

    let mut engine = RealFftEngine::new(nfft);
    let spec = engine.forward(sig)?;
    let logmag: Vec<Complex64> = spec
        .iter()
        .map(|c| {
            let mag = c.norm();
            if mag > 0.0 && mag.is_finite() {
                Ok(Complex64::new(mag.ln(), 0.0))
            } else {
                Err(SigError::NumericInstability {
                    context: "real cepstrum",
                    reason: format!("spectral magnitude {} has no logarithm", mag),
                })
            }
        })
        .collect::<Result<_>>()?;

    let mut cep = engine.inverse(&logmag)?;
    cep.truncate(order);
    Ok(cep)
}

/// Real cepstrum derived from the complex cepstrum.
///
/// The real cepstrum is the even part of the complex cepstrum, so folding
/// the anticausal quefrencies onto the causal ones halves back to it:
/// `0.5*(ccep[q] + ccep[-q])` for `q = 0..order`.
pub fn realcep_comp(sig: &[f64], order: usize, method: CepstrumMethod) -> Result<Vec<f64>> {
    if order == 0 {
        return Ok(Vec::new());
    }
    let half = order - 1;
    let ccep = compcep(sig, half, method)?;
    Ok((0..order)
        .map(|q| 0.5 * (ccep[half + q] + ccep[half - q]))
        .collect())
}

fn compcep_dft(sig: &[f64], order: usize) -> Result<Vec<f64>> {
    let nfft = cep_nfft(sig.len());
    let spec = fft(sig, nfft);

    let mut logmag = Vec::with_capacity(nfft);
    let mut phase = Vec::with_capacity(nfft);
    for c in &spec {
        let mag = c.norm();
        if !(mag > 0.0 && mag.is_finite()) {
            return Err(SigError::NumericInstability {
                context: "complex cepstrum (DFT route)",
                reason: format!("spectral magnitude {} has no logarithm", mag),
            });
        }
        logmag.push(mag.ln());
        phase.push(c.arg());
    }

    unwrap_phase(&mut phase);
    // Remove the linear-phase ramp from any pure delay; it would otherwise
    // alias into every quefrency.
    let half = nfft / 2;
    let turns = (phase[half] / PI).round();
    for (k, p) in phase.iter_mut().enumerate() {
        *p -= PI * turns * k as f64 / half as f64;
    }

    let mut logspec: Vec<Complex64> = logmag
        .into_iter()
        .zip(phase)
        .map(|(m, p)| Complex64::new(m, p))
        .collect();
    ifft(&mut logspec);

    Ok((0..=2 * order)
        .map(|i| {
            let q = i as isize - order as isize;
            logspec[q.rem_euclid(nfft as isize) as usize].re
        })
        .collect())
}

fn compcep_ztrans(sig: &[f64], order: usize) -> Result<Vec<f64>> {
    // Leading zeros are a pure delay (linear phase, dropped by convention)
    // and trailing zeros only add roots at the origin.
    let first = sig.iter().position(|&v| v != 0.0);
    let last = sig.iter().rposition(|&v| v != 0.0);
    let (first, last) = match (first, last) {
        (Some(f), Some(l)) => (f, l),
        _ => {
            return Err(SigError::NumericInstability {
                context: "complex cepstrum (z-transform route)",
                reason: "all-zero signal has no cepstrum".into(),
            })
        }
    };
    let coeffs = &sig[first..=last];

    let roots = poly_roots(coeffs)?;
    let mut minphase = Vec::new();
    let mut maxphase = Vec::new();
    let mut gain = coeffs[0].abs();
    for r in roots {
        if r.norm() < 1.0 {
            minphase.push(r);
        } else {
            // (1 - r z^-1) = (-r z^-1)(1 - z/r): fold |r| into the gain and
            // keep the reciprocal root on the anticausal side.
            gain *= r.norm();
            maxphase.push(r.finv());
        }
    }

    let mut cep = vec![0.0; 2 * order + 1];
    cep[order] = gain.ln();

    // log(1 - a z^-1) expands to -sum_m a^m z^-m / m; the power sums are
    // kept as running products instead of calling powi per quefrency.
    let mut minpow = minphase.clone();
    let mut maxpow = maxphase.clone();
    for m in 1..=order {
        let causal: Complex64 = minpow.iter().copied().sum();
        let anti: Complex64 = maxpow.iter().copied().sum();
        cep[order + m] = -causal.re / m as f64;
        cep[order - m] = -anti.re / m as f64;

        for (p, &base) in minpow.iter_mut().zip(minphase.iter()) {
            *p *= base;
        }
        for (p, &base) in maxpow.iter_mut().zip(maxphase.iter()) {
            *p *= base;
        }
    }

    Ok(cep)
}

/// Roots of the real polynomial `c[0] x^d + c[1] x^(d-1) + ... + c[d]` via
/// the eigenvalues of its companion matrix.
fn poly_roots(coeffs: &[f64]) -> Result<Vec<Complex64>> {
    let degree = coeffs.len() - 1;
    if degree == 0 {
        return Ok(Vec::new());
    }

    let c0 = coeffs[0];
    let mut companion = DMatrix::<f64>::zeros(degree, degree);
    for (j, &c) in coeffs[1..].iter().enumerate() {
        companion[(0, j)] = -c / c0;
    }
    for i in 1..degree {
        companion[(i, i - 1)] = 1.0;
    }

    let schur = Schur::try_new(companion, f64::EPSILON, 100_000).ok_or_else(|| {
        SigError::NumericInstability {
            context: "polynomial root finding",
            reason: "companion-matrix Schur decomposition did not converge".into(),
        }
    })?;
    let eig = schur.complex_eigenvalues();

    let roots: Vec<Complex64> = eig.iter().map(|&e| Complex64::new(e.re, e.im)).collect();
    if roots.iter().any(|r| !r.re.is_finite() || !r.im.is_finite()) {
        return Err(SigError::NumericInstability {
            context: "polynomial root finding",
            reason: "non-finite root".into(),
        });
    }
    Ok(roots)
}

/// Unwrap a phase sequence by removing 2π jumps between neighbors.
fn unwrap_phase(phase: &mut [f64]) {
    if phase.is_empty() {
        return;
    }
    let mut offset = 0.0;
    let mut prev_raw = phase[0];
    for p in phase.iter_mut().skip(1) {
        let raw = *p;
        let delta = raw - prev_raw;
        if delta > PI {
            offset -= 2.0 * PI * ((delta + PI) / (2.0 * PI)).floor();
        } else if delta < -PI {
            offset += 2.0 * PI * ((-delta + PI) / (2.0 * PI)).floor();
        }
        prev_raw = raw;
        *p = raw + offset;
    }
}
