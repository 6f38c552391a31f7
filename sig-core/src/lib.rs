//! audsig - Offline speech/audio signal analysis
//!
//! Short-time Fourier analysis/synthesis, real and complex cepstra,
//! gammatone-filterbank features, PNCC, and spectro-temporal receptive
//! field filters. Strictly single-channel batch processing: every entry
//! point is a pure function over in-memory buffers.

pub mod error;
pub mod fbanks;
pub mod spectemp;
pub mod stproc;
pub mod transform;
pub mod window;

pub use error::SigError;
pub use fbanks::Gammatone;
pub use spectemp::{pncc, strf, StrfParams};
pub use stproc::{overlap_add, stana, Frames, Hop};
pub use transform::{compcep, istft, realcep, realcep_comp, stft, stpowspec, CepstrumMethod};
pub use window::{hamming, Window, WindowType};
