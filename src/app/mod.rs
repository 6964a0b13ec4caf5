//! Application layer: the operation pipeline and the domain clients built on it.

pub mod identity;
pub mod mail;
pub mod pipeline;
pub mod sdk;
pub mod swap;
pub mod transfer;

pub use identity::HoleIdClient;
pub use mail::HoleMailClient;
pub use pipeline::{Authority, OperationExecutor, OperationSpec, Run, Spend};
pub use sdk::{ZkHole, ZkHoleBuilder};
pub use swap::HoleSwapClient;
pub use transfer::ZkHoleClient;
