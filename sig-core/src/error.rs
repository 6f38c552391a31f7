//! Error taxonomy shared by every module in the crate.
//!
//! All operations are deterministic pure computations, so errors surface
//! synchronously and carry the offending parameter; nothing is retried and
//! partial results are never returned.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SigError {
    #[error(
        "window of length {wsize} with hop of {hsize} samples cannot satisfy \
         overlap-add completeness: {reason}"
    )]
    InvalidWindowConfig {
        wsize: usize,
        hsize: usize,
        reason: &'static str,
    },

    #[error("cepstral order {order} exceeds the alias-safe bound {bound} (internal FFT size {nfft})")]
    Aliasing {
        order: usize,
        bound: usize,
        nfft: usize,
    },

    #[error("shape mismatch for {what}: expected {expected}, got {got}")]
    ShapeMismatch {
        what: &'static str,
        expected: usize,
        got: usize,
    },

    #[error("numerical instability in {context}: {reason}")]
    NumericInstability {
        context: &'static str,
        reason: String,
    },
}

pub type Result<T> = std::result::Result<T, SigError>;
