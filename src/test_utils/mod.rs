//! Test doubles for the collaborator traits.

pub mod mocks;

pub use mocks::{MockConfig, MockLedger, MockProver, MockWallet};
