#![forbid(unsafe_code)]
#![doc = "Common error kinds and algorithm identifiers for berder."]

pub mod algorithm;
pub mod error;

pub use algorithm::*;
pub use error::*;
