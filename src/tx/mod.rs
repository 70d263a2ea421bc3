//! Transaction assembly and submission with redundant-endpoint failover

pub mod broadcast;
pub mod fee;
pub mod payload;
pub mod sequence;
pub mod signer;

pub use broadcast::{BroadcastConfig, BroadcastCoordinator, BroadcastOutcome};
pub use fee::{FeeEstimator, FeeQuote};
pub use payload::{NativeTransfer, PayloadBuilder, TokenTransfer, TxPayload};
pub use sequence::SequenceTracker;
pub use signer::{Account, SignedTransaction};
