//! Spectro-temporal feature extraction: power-normalized cepstral
//! coefficients and spectro-temporal receptive field filters.

pub mod pncc;
pub mod strf;

pub use pncc::pncc;
pub use strf::{strf, StrfParams};
