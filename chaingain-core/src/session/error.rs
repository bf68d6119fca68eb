use thiserror::Error;

/// Interactions a card refuses.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[cfg_attr(feature = "ffi", derive(uniffi::Error))]
pub enum CardError {
    /// The card is waiting for a verification result.
    #[error("verification already in flight")]
    VerificationPending,
}

/// Interactions a session refuses.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[cfg_attr(feature = "ffi", derive(uniffi::Error))]
pub enum SessionError {
    /// A session needs at least one vocabulary item.
    #[error("cannot start a session without vocabulary")]
    EmptyDeck,
    /// The current card rejected the interaction.
    #[error(transparent)]
    Card(#[from] CardError),
}
