//! The action error taxonomy.
//!
//! Every mutating action on the engine returns `Result<_, ActionError>`.
//! Rejections are local and non-fatal, and always all-or-nothing: a failed
//! action leaves no resources partially deducted and no state partially
//! transitioned.

/// Why a mutating action was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ActionError {
    /// A purchase, transition, or enqueue could not cover its costs.
    #[error("insufficient funds")]
    InsufficientFunds,

    /// A queue slot limit is full.
    #[error("capacity exceeded")]
    CapacityExceeded,

    /// The action is not valid in the current state (duplicate active
    /// expedition, peak progression reached, unknown definition, ...).
    #[error("invalid state: {0}")]
    InvalidState(&'static str),
}
