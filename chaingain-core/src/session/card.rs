//! The per-card "Submit / Next" state machine.
//!
//! A card performs no I/O. Submitting while editing hands back a
//! [`PendingVerification`] for the caller to resolve; the result is fed back
//! through [`Card::apply_result`]. Submitting again once the result is shown
//! resets the card and asks the session to advance.

use std::fmt;

use crate::deck::VocabularyItem;
use crate::verification::VerificationResult;

use super::error::CardError;

/// Identity of one card instance within a session.
///
/// Ids are never reused, so a result addressed to a discarded card can be
/// recognised and dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CardId(u64);

impl CardId {
    /// Wraps a raw id.
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// The raw id.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for CardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "card#{}", self.0)
    }
}

/// Which side of the card is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "ffi", derive(uniffi::Enum))]
pub enum CardStage {
    /// Waiting for an answer; the action button reads "Submit".
    Editing,
    /// The verification outcome is shown; the action button reads "Next".
    ResultShown,
}

impl CardStage {
    /// Label of the single action button in this stage.
    #[must_use]
    pub const fn button_label(self) -> &'static str {
        match self {
            Self::Editing => "Submit",
            Self::ResultShown => "Next",
        }
    }
}

/// Whether the answer was accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "ffi", derive(uniffi::Enum))]
pub enum Correctness {
    /// Not verified yet.
    Unknown,
    /// Accepted.
    Correct,
    /// Rejected, or verification failed.
    Incorrect,
}

impl From<bool> for Correctness {
    fn from(correct: bool) -> Self {
        if correct {
            Self::Correct
        } else {
            Self::Incorrect
        }
    }
}

/// Everything the presentation layer needs to draw a card.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
pub struct CardState {
    /// The word to translate.
    pub word: String,
    /// The learner's current answer.
    pub input_value: String,
    /// Which side is showing.
    pub stage: CardStage,
    /// Verification outcome.
    pub correct: Correctness,
    /// Expected answer, once verified.
    pub correct_word: Option<String>,
    /// Certificate content id, once verified.
    pub certificate: Option<String>,
}

impl CardState {
    /// The initial state for `word`.
    #[must_use]
    pub fn new(word: impl Into<String>) -> Self {
        Self {
            word: word.into(),
            input_value: String::new(),
            stage: CardStage::Editing,
            correct: Correctness::Unknown,
            correct_word: None,
            certificate: None,
        }
    }
}

/// A verification the caller has to perform for a card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingVerification {
    /// The card that asked for it.
    pub card_id: CardId,
    /// The word shown on the card.
    pub original: String,
    /// The answer captured at submit time.
    pub translated: String,
}

/// What the caller must do after a submit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CardAction {
    /// Verify the captured answer, then call [`Card::apply_result`].
    Verify(PendingVerification),
    /// Move the session to the next item.
    Advance,
}

/// One vocabulary item's interaction lifecycle.
#[derive(Debug, Clone)]
pub struct Card {
    id: CardId,
    item: VocabularyItem,
    state: CardState,
    pending: bool,
}

impl Card {
    /// Creates a fresh card for `item`.
    #[must_use]
    pub fn new(id: CardId, item: VocabularyItem) -> Self {
        let state = CardState::new(item.word.clone());
        Self {
            id,
            item,
            state,
            pending: false,
        }
    }

    /// This card's id.
    #[must_use]
    pub const fn id(&self) -> CardId {
        self.id
    }

    /// The vocabulary item on this card.
    #[must_use]
    pub const fn item(&self) -> &VocabularyItem {
        &self.item
    }

    /// Snapshot for rendering.
    #[must_use]
    pub const fn state(&self) -> &CardState {
        &self.state
    }

    /// Current stage.
    #[must_use]
    pub const fn stage(&self) -> CardStage {
        self.state.stage
    }

    /// Whether a verification has been handed out and not yet applied.
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        self.pending
    }

    /// Replaces the answer. Ignored unless the card is editable.
    pub fn set_input(&mut self, value: impl Into<String>) -> bool {
        if self.state.stage != CardStage::Editing || self.pending {
            return false;
        }
        self.state.input_value = value.into();
        true
    }

    /// Activates the action button.
    ///
    /// # Errors
    ///
    /// Returns [`CardError::VerificationPending`] if the previous submit has
    /// not been resolved yet.
    pub fn submit(&mut self) -> Result<CardAction, CardError> {
        match self.state.stage {
            CardStage::Editing if self.pending => Err(CardError::VerificationPending),
            CardStage::Editing => {
                self.pending = true;
                Ok(CardAction::Verify(PendingVerification {
                    card_id: self.id,
                    original: self.item.word.clone(),
                    translated: self.state.input_value.clone(),
                }))
            }
            CardStage::ResultShown => {
                self.reset();
                Ok(CardAction::Advance)
            }
        }
    }

    /// Applies a verification outcome and flips the card.
    ///
    /// Returns `false`, leaving the card untouched, when `pending` was not
    /// issued by this card or is no longer awaited.
    pub fn apply_result(
        &mut self,
        pending: &PendingVerification,
        result: VerificationResult,
    ) -> bool {
        if pending.card_id != self.id
            || !self.pending
            || self.state.stage != CardStage::Editing
        {
            return false;
        }
        self.pending = false;
        self.state.correct = result.correct.into();
        self.state.correct_word = result.correct_word;
        self.state.certificate = result.certificate;
        self.state.stage = CardStage::ResultShown;
        true
    }

    /// Returns the card to its initial state.
    pub fn reset(&mut self) {
        self.state = CardState::new(self.item.word.clone());
        self.pending = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card() -> Card {
        Card::new(CardId::new(7), VocabularyItem::new("Hallo", "Hello"))
    }

    fn verify(card: &mut Card) -> PendingVerification {
        match card.submit().unwrap() {
            CardAction::Verify(pending) => pending,
            CardAction::Advance => panic!("expected a verification"),
        }
    }

    #[test]
    fn test_initial_state() {
        let card = card();
        assert_eq!(card.state(), &CardState::new("Hallo"));
        assert_eq!(card.stage().button_label(), "Submit");
        assert!(!card.is_pending());
    }

    #[test]
    fn test_submit_captures_input() {
        let mut card = card();
        assert!(card.set_input("Hello"));
        let pending = verify(&mut card);
        assert_eq!(
            pending,
            PendingVerification {
                card_id: CardId::new(7),
                original: "Hallo".to_string(),
                translated: "Hello".to_string(),
            }
        );
        assert!(card.is_pending());
        assert_eq!(card.stage(), CardStage::Editing);
    }

    #[test]
    fn test_input_frozen_while_pending() {
        let mut card = card();
        card.set_input("Hello");
        let _pending = verify(&mut card);
        assert!(!card.set_input("Hi"));
        assert_eq!(card.state().input_value, "Hello");
        assert_eq!(card.submit(), Err(CardError::VerificationPending));
    }

    #[test]
    fn test_two_stage_submit() {
        let mut card = card();
        card.set_input("Hello");
        let pending = verify(&mut card);
        assert!(card.apply_result(
            &pending,
            VerificationResult {
                correct: true,
                correct_word: None,
                certificate: Some("bafy123".to_string()),
            },
        ));
        assert_eq!(card.stage(), CardStage::ResultShown);
        assert_eq!(card.stage().button_label(), "Next");
        assert_eq!(card.state().correct, Correctness::Correct);
        assert_eq!(card.state().certificate.as_deref(), Some("bafy123"));

        assert!(!card.set_input("ignored"));
        assert_eq!(card.submit(), Ok(CardAction::Advance));
        assert_eq!(card.state(), &CardState::new("Hallo"));
    }

    #[test]
    fn test_empty_answer_is_still_verified() {
        let mut card = card();
        let pending = verify(&mut card);
        assert_eq!(pending.translated, "");
        assert!(card.apply_result(&pending, VerificationResult::rejected()));
        assert_eq!(card.state().correct, Correctness::Incorrect);
        assert_eq!(card.state().certificate, None);
        assert_eq!(card.state().correct_word, None);
    }

    #[test]
    fn test_foreign_or_stale_result_is_ignored() {
        let mut card = card();
        let mut pending = verify(&mut card);

        let mut foreign = pending.clone();
        foreign.card_id = CardId::new(8);
        assert!(!card.apply_result(&foreign, VerificationResult::rejected()));
        assert!(card.is_pending());

        assert!(card.apply_result(&pending, VerificationResult::rejected()));
        // A duplicate delivery must not overwrite the shown result.
        pending.translated = "changed".to_string();
        let accepted = VerificationResult {
            correct: true,
            ..VerificationResult::default()
        };
        assert!(!card.apply_result(&pending, accepted));
        assert_eq!(card.state().correct, Correctness::Incorrect);
    }

    #[test]
    fn test_reset_clears_pending() {
        let mut card = card();
        card.set_input("Hello");
        let pending = verify(&mut card);
        card.reset();
        assert!(!card.is_pending());
        assert!(!card.apply_result(&pending, VerificationResult::rejected()));
        assert_eq!(card.state(), &CardState::new("Hallo"));
    }
}
