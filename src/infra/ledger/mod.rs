//! Ledger implementations.

pub mod rpc;
pub mod simulated;

pub use rpc::RpcLedger;
pub use simulated::SimulatedLedger;
