//! Frame-wise spectral and cepstral transforms.

pub(crate) mod fft;

pub mod cepstrum;
pub mod stft;

pub use cepstrum::{compcep, realcep, realcep_comp, CepstrumMethod};
pub use stft::{istft, stft, stpowspec};
