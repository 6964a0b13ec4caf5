//! Privacy SDK: anonymous transfers, HoleID identities and credentials,
//! HoleMail messaging and HoleSwap token swaps, all run through one validated
//! operation pipeline over pluggable prover and ledger collaborators.

pub mod app;
pub mod config;
pub mod domain;
pub mod infra;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use app::ZkHole;
pub use config::{Network, SdkConfig};
pub use domain::{ErrorKind, SdkError};
