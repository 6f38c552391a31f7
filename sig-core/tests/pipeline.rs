//! End-to-end analysis pipelines: STFT round trip, framewise cepstra, and
//! the gammatone/PNCC feature chain on a synthetic utterance.

use std::f64::consts::PI;

use audsig::fbanks::fbank_power;
use audsig::{
    hamming, istft, pncc, realcep, realcep_comp, stana, stft, stpowspec, strf, CepstrumMethod,
    Gammatone, Hop, StrfParams,
};

const SR: u32 = 16000;

/// Deterministic voiced-speech stand-in: a handful of decaying harmonics on
/// a slowly gliding fundamental, with a soft onset.
fn welcome() -> (Vec<f64>, u32) {
    let n = SR as usize; // one second
    let sig = (0..n)
        .map(|i| {
            let t = i as f64 / SR as f64;
            let f0 = 120.0 + 30.0 * (2.0 * PI * 1.5 * t).sin();
            let onset = 1.0 - (-8.0 * t).exp();
            let mut v = 0.0;
            for h in 1..=5 {
                v += (2.0 * PI * h as f64 * f0 * t).sin() / h as f64;
            }
            onset * v
        })
        .collect();
    (sig, SR)
}

#[test]
fn test_stft_round_trip() {
    let (sig, sr) = welcome();
    let window_length = 0.032;
    let hopfrac = 0.25;
    let wind = hamming(
        (window_length * sr as f64) as usize,
        Some(Hop::Fraction(hopfrac)),
        true,
    )
    .unwrap();
    let nfft = 512;

    let sig_stft = stft(&sig, sr, &wind, Hop::Fraction(hopfrac), nfft).unwrap();
    let sigsynth = istft(&sig_stft, sr, &wind, Hop::Fraction(hopfrac), nfft).unwrap();

    assert!(sigsynth.len() >= sig.len());
    for (i, (a, b)) in sig.iter().zip(&sigsynth).enumerate() {
        assert!((a - b).abs() < 1e-7, "sample {}: {} vs {}", i, a, b);
    }
}

#[test]
fn test_framewise_real_cepstra() {
    let (sig, sr) = welcome();
    let wind = hamming(256, Some(Hop::Fraction(0.25)), true).unwrap();
    let ncep = 120;

    let mut frames = stana(
        &sig,
        sr,
        &wind,
        Hop::Fraction(0.25),
        false,
        (Some(0.652), None),
    )
    .unwrap();
    let frame = frames.next().unwrap();

    let cep1 = realcep(&frame, ncep).unwrap();
    let cep2 = realcep_comp(&frame, ncep, CepstrumMethod::ZTransform).unwrap();
    let cep3 = realcep_comp(&frame, ncep, CepstrumMethod::DftLog).unwrap();

    assert_eq!(cep1.len(), ncep);
    assert_eq!(cep2.len(), ncep);
    assert_eq!(cep3.len(), ncep);
    for c in cep1.iter().chain(&cep2).chain(&cep3) {
        assert!(c.is_finite());
    }
    // The log-magnitude route is the even part of the complex cepstrum, so
    // both folded routes must reproduce it wherever the frame's spectrum is
    // well conditioned; quefrency 0 is the spectral log-energy either way.
    assert!((cep1[0] - cep3[0]).abs() < 1e-3 * cep1[0].abs().max(1.0));
}

#[test]
fn test_pncc_pipeline() {
    let (sig, sr) = welcome();
    let wlen = 0.025;
    let hop = 0.010;
    let nfft = 1024;
    let wind = hamming((wlen * sr as f64) as usize, None, false).unwrap();

    let (powerspec, phase) = stpowspec(
        &sig,
        sr,
        &wind,
        Hop::Samples((hop * sr as f64) as usize),
        nfft,
        false,
    )
    .unwrap();
    assert!(phase.is_none());

    let gtbank = Gammatone::new(sr, 40).unwrap();
    let wts = gtbank.gammawgt(nfft, true, true).unwrap();
    let gammaspec = fbank_power(powerspec.view(), wts.view()).unwrap();
    let g1 = fbank_power(powerspec.view(), wts.view()).unwrap();

    let coef = pncc(gammaspec.view(), true).unwrap();
    assert_eq!(coef.dim(), (powerspec.nrows(), 13));
    for _ in 0..10 {
        assert_eq!(g1, gammaspec);
        assert_eq!(coef, pncc(gammaspec.view(), true).unwrap());
    }
}

#[test]
fn test_strf_construction() {
    let params = StrfParams {
        time_support: 0.2,
        freq_support: 1.0,
        frame_rate: 100.0,
        bins_per_octave: 12,
        rate: 1.0,
        scale: 1.0,
        phi: 0.5 * PI,
        theta: 0.0,
    };
    let (kdn, kup) = strf(&params).unwrap();

    assert_eq!(kdn.dim(), kup.dim());
    assert_eq!(kdn.nrows(), 20);
    assert!(kdn.iter().all(|v| v.is_finite()));
    assert!(kup.iter().all(|v| v.is_finite()));
}
