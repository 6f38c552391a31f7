//! Short-time processing: framing a signal into overlapping windowed frames
//! and reassembling frames back into a signal by overlap-add.
//!
//! Frame extraction is lazy: [`Frames`] is a finite, restartable iterator
//! that owns no signal data and retains no state between restarts. Samples
//! outside the signal read as zero, so frames may legally start before the
//! first sample (synthesis mode) or run past the last one.

use crate::error::{Result, SigError};
use crate::window::Window;

/// Hop between consecutive frames, either as a fraction of the window length
/// or as an absolute sample count.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Hop {
    /// Fraction of the window length, in (0, 1].
    Fraction(f64),
    /// Absolute hop in samples, must be positive.
    Samples(usize),
}

impl Hop {
    /// Resolve to a hop size in samples for a window of `wsize` samples.
    pub fn size(&self, wsize: usize) -> Result<usize> {
        let hsize = match *self {
            Hop::Fraction(frac) => {
                if !(frac > 0.0 && frac <= 1.0) {
                    return Err(SigError::InvalidWindowConfig {
                        wsize,
                        hsize: 0,
                        reason: "hop fraction must lie in (0, 1]",
                    });
                }
                (wsize as f64 * frac) as usize
            }
            Hop::Samples(n) => n,
        };
        if hsize == 0 {
            return Err(SigError::InvalidWindowConfig {
                wsize,
                hsize,
                reason: "hop must be at least one sample",
            });
        }
        Ok(hsize)
    }
}

/// Lazy sequence of windowed frames over a signal.
///
/// Produced by [`stana`]. Cloning restarts iteration from the first frame.
#[derive(Debug, Clone)]
pub struct Frames<'a> {
    sig: &'a [f64],
    wind: &'a [f64],
    hsize: usize,
    origin: isize,
    nframes: usize,
    next: usize,
}

impl<'a> Frames<'a> {
    /// Total number of frames this iterator yields.
    pub fn num_frames(&self) -> usize {
        self.nframes
    }

    /// Hop size in samples.
    pub fn hop_size(&self) -> usize {
        self.hsize
    }

    /// Start sample of frame `k` (may be negative in synthesis mode).
    pub fn frame_start(&self, k: usize) -> isize {
        self.origin + (k * self.hsize) as isize
    }
}

impl Iterator for Frames<'_> {
    type Item = Vec<f64>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.nframes {
            return None;
        }
        let n0 = self.frame_start(self.next);
        self.next += 1;

        let frame = self
            .wind
            .iter()
            .enumerate()
            .map(|(i, &w)| {
                let n = n0 + i as isize;
                if n >= 0 && (n as usize) < self.sig.len() {
                    self.sig[n as usize] * w
                } else {
                    0.0
                }
            })
            .collect();
        Some(frame)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self.nframes - self.next;
        (left, Some(left))
    }
}

impl ExactSizeIterator for Frames<'_> {}

/// Short-time analysis: slice `sig` into overlapping windowed frames.
///
/// # Arguments
/// * `sig` - Input signal
/// * `sample_rate` - Sample rate in Hz (used to resolve `trange`)
/// * `wind` - Analysis window; frame length equals the window length
/// * `hop` - Hop between frames
/// * `synth` - Pre-pad the frame grid by `hsize - wsize` so every sample in
///   range gets full overlap-add coverage during later synthesis
/// * `trange` - Optional (start, end) time bounds in seconds; `None` selects
///   the corresponding signal boundary
pub fn stana<'a>(
    sig: &'a [f64],
    sample_rate: u32,
    wind: &'a Window,
    hop: Hop,
    synth: bool,
    trange: (Option<f64>, Option<f64>),
) -> Result<Frames<'a>> {
    let wsize = wind.len();
    let hsize = hop.size(wsize)?;

    let start = match trange.0 {
        Some(t) => (t * sample_rate as f64) as isize,
        None => 0,
    };
    let end = match trange.1 {
        Some(t) => ((t * sample_rate as f64) as usize).min(sig.len()),
        None => sig.len(),
    };

    let origin = if synth {
        start + hsize as isize - wsize as isize
    } else {
        start
    };

    // One frame per hop position with its start inside [origin, end).
    let span = end as isize - origin;
    let nframes = if span > 0 {
        (span as usize + hsize - 1) / hsize
    } else {
        0
    };

    Ok(Frames {
        sig,
        wind: wind.coeffs(),
        hsize,
        origin,
        nframes,
        next: 0,
    })
}

/// Overlap-add synthesis: reassemble windowed frames into a signal.
///
/// Frames are placed on the synthesis grid (frame `k` starts at
/// `hsize - wsize + k*hsize`) and summed together with the window envelope at
/// the same offsets; dividing by the accumulated envelope removes the
/// analysis windowing exactly wherever the envelope is nonzero. Composed
/// with [`stana`] in synthesis mode this reproduces the original signal to
/// floating-point precision.
pub fn overlap_add<I>(frames: I, wind: &Window, hsize: usize) -> Result<Vec<f64>>
where
    I: IntoIterator<Item = Vec<f64>>,
{
    let wsize = wind.len();
    let offset = hsize as isize - wsize as isize;

    let mut out: Vec<f64> = Vec::new();
    let mut envelope: Vec<f64> = Vec::new();

    for (k, frame) in frames.into_iter().enumerate() {
        if frame.len() != wsize {
            return Err(SigError::ShapeMismatch {
                what: "frame length",
                expected: wsize,
                got: frame.len(),
            });
        }
        let n0 = offset + (k * hsize) as isize;
        let frame_end = n0 + wsize as isize;
        if frame_end > out.len() as isize {
            out.resize(frame_end as usize, 0.0);
            envelope.resize(frame_end as usize, 0.0);
        }
        for (i, (&v, &w)) in frame.iter().zip(wind.coeffs()).enumerate() {
            let n = n0 + i as isize;
            if n >= 0 {
                out[n as usize] += v;
                envelope[n as usize] += w;
            }
        }
    }

    for (y, &e) in out.iter_mut().zip(envelope.iter()) {
        if e > 1e-12 {
            *y /= e;
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::window::{hamming, Window, WindowType};

    fn ramp(n: usize) -> Vec<f64> {
        (0..n).map(|i| i as f64).collect()
    }

    #[test]
    fn test_hop_resolution() {
        assert_eq!(Hop::Fraction(0.25).size(512).unwrap(), 128);
        assert_eq!(Hop::Samples(160).size(400).unwrap(), 160);
        assert!(Hop::Fraction(0.0).size(512).is_err());
        assert!(Hop::Fraction(1.5).size(512).is_err());
        assert!(Hop::Samples(0).size(512).is_err());
    }

    #[test]
    fn test_analysis_frame_grid() {
        let sig = ramp(10);
        let wind = Window::new(WindowType::Rectangular, 4, None, false).unwrap();
        let frames = stana(&sig, 1, &wind, Hop::Samples(2), false, (None, None)).unwrap();

        assert_eq!(frames.num_frames(), 5);
        let all: Vec<Vec<f64>> = frames.collect();
        assert_eq!(all[1], vec![2.0, 3.0, 4.0, 5.0]);
        // Last frame runs past the signal and is zero-padded.
        assert_eq!(all[4], vec![8.0, 9.0, 0.0, 0.0]);
    }

    #[test]
    fn test_frames_are_windowed() {
        let sig = vec![1.0; 64];
        let wind = hamming(16, None, false).unwrap();
        let mut frames = stana(&sig, 1, &wind, Hop::Samples(16), false, (None, None)).unwrap();
        let first = frames.next().unwrap();
        for (v, &w) in first.iter().zip(wind.coeffs()) {
            assert!((v - w).abs() < 1e-12);
        }
    }

    #[test]
    fn test_restartable() {
        let sig = ramp(100);
        let wind = hamming(16, None, false).unwrap();
        let frames = stana(&sig, 1, &wind, Hop::Samples(4), false, (None, None)).unwrap();

        let mut once = frames.clone();
        once.next();
        once.next();

        let a: Vec<Vec<f64>> = frames.clone().collect();
        let b: Vec<Vec<f64>> = frames.collect();
        assert_eq!(a, b);
    }

    #[test]
    fn test_trange_selects_offset() {
        let sig = ramp(200);
        let wind = Window::new(WindowType::Rectangular, 8, None, false).unwrap();
        let mut frames = stana(
            &sig,
            100,
            &wind,
            Hop::Samples(8),
            false,
            (Some(0.5), None),
        )
        .unwrap();
        let first = frames.next().unwrap();
        assert_eq!(first[0], 50.0);
    }

    #[test]
    fn test_round_trip() {
        let sig: Vec<f64> = (0..1000)
            .map(|i| (0.05 * i as f64).sin() + 0.3 * (0.011 * i as f64).cos())
            .collect();
        let wind = hamming(64, Some(Hop::Fraction(0.25)), true).unwrap();
        let hsize = Hop::Fraction(0.25).size(64).unwrap();

        let frames = stana(&sig, 1, &wind, Hop::Fraction(0.25), true, (None, None)).unwrap();
        let synth = overlap_add(frames, &wind, hsize).unwrap();

        assert!(synth.len() >= sig.len());
        for (s, y) in sig.iter().zip(synth.iter()) {
            assert!((s - y).abs() < 1e-9, "{} vs {}", s, y);
        }
    }
}
