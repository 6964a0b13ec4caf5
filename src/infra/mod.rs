//! Infrastructure layer implementations.

pub mod ids;
pub mod ledger;
pub mod prover;
pub mod sealer;
pub mod wallet;

pub use ids::RandomIdGenerator;
pub use ledger::{RpcLedger, SimulatedLedger};
pub use prover::PlaceholderProver;
pub use sealer::Base64Sealer;
pub use wallet::{KeypairWallet, WatchOnlyWallet, signing_key_from_base58};
