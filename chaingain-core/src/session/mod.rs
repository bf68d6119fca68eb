//! Session controller: walks a deck one card at a time.

mod card;
mod error;

pub use card::*;
pub use error::*;

use crate::deck::{Deck, VocabularyItem};
use crate::verification::VerificationResult;

/// What happened on a session-level submit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionStep {
    /// The answer needs verifying; hand the outcome to [`Session::complete`].
    Verify(PendingVerification),
    /// A fresh card for the item at `index` is now current.
    Advanced {
        /// The new current index.
        index: usize,
    },
    /// The last card's result was acknowledged; there is no next item.
    Finished,
}

/// Learning progress within a session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
pub struct Progress {
    /// 1-based position of the current card.
    pub position: u32,
    /// Number of items in the session.
    pub total: u32,
    /// Answers accepted so far.
    pub correct_answers: u32,
    /// Certificates minted so far, oldest first.
    pub certificates: Vec<String>,
}

/// Owns the vocabulary list, the current index and the live card.
///
/// `current_index` stays within `0..items.len()` and never decreases, except
/// through an explicit [`Session::restart`].
#[derive(Debug, Clone)]
pub struct Session {
    items: Vec<VocabularyItem>,
    current_index: usize,
    card: Card,
    next_card_id: u64,
    finished: bool,
    correct_answers: u32,
    certificates: Vec<String>,
}

impl Session {
    /// Starts a session at the first item of `deck`.
    #[must_use]
    pub fn new(deck: &Deck) -> Self {
        Self::start(deck.items().to_vec())
    }

    /// Starts a session from raw items.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::EmptyDeck`] if `items` is empty.
    pub fn from_items(items: Vec<VocabularyItem>) -> Result<Self, SessionError> {
        if items.is_empty() {
            return Err(SessionError::EmptyDeck);
        }
        Ok(Self::start(items))
    }

    fn start(items: Vec<VocabularyItem>) -> Self {
        let card = Card::new(CardId::new(0), items[0].clone());
        Self {
            items,
            current_index: 0,
            card,
            next_card_id: 1,
            finished: false,
            correct_answers: 0,
            certificates: Vec::new(),
        }
    }

    /// Index of the current item.
    #[must_use]
    pub const fn current_index(&self) -> usize {
        self.current_index
    }

    /// The current item.
    #[must_use]
    pub fn current_item(&self) -> &VocabularyItem {
        &self.items[self.current_index]
    }

    /// The live card.
    #[must_use]
    pub const fn card(&self) -> &Card {
        &self.card
    }

    /// Number of items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Always `false`: a session is never empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Whether the current item is the last one.
    #[must_use]
    pub fn is_last(&self) -> bool {
        self.current_index + 1 == self.items.len()
    }

    /// Whether the last card's result has been acknowledged.
    #[must_use]
    pub const fn is_finished(&self) -> bool {
        self.finished
    }

    /// Moves to the next item with a fresh card. A no-op on the last item.
    ///
    /// Returns whether the index moved.
    pub fn advance(&mut self) -> bool {
        if self.current_index + 1 >= self.items.len() {
            return false;
        }
        self.current_index += 1;
        self.card = self.fresh_card();
        true
    }

    /// Updates the live card's answer. See [`Card::set_input`].
    pub fn set_input(&mut self, value: impl Into<String>) -> bool {
        self.card.set_input(value)
    }

    /// Activates the live card's action button.
    ///
    /// On the last item, acknowledging the result calls [`Session::advance`]
    /// (a no-op there), marks the session finished and leaves the result on
    /// screen.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Card`] if the card is awaiting verification.
    pub fn submit(&mut self) -> Result<SessionStep, SessionError> {
        if self.card.stage() == CardStage::ResultShown && self.is_last() {
            self.advance();
            self.finished = true;
            return Ok(SessionStep::Finished);
        }

        match self.card.submit()? {
            CardAction::Verify(pending) => Ok(SessionStep::Verify(pending)),
            CardAction::Advance => {
                self.advance();
                Ok(SessionStep::Advanced {
                    index: self.current_index,
                })
            }
        }
    }

    /// Delivers a verification outcome.
    ///
    /// Results for cards that are no longer live are discarded. Returns
    /// whether the result was applied.
    pub fn complete(
        &mut self,
        pending: &PendingVerification,
        result: VerificationResult,
    ) -> bool {
        if pending.card_id != self.card.id() {
            tracing::warn!(
                card = %pending.card_id,
                live = %self.card.id(),
                "discarding verification result for a card that is gone"
            );
            return false;
        }

        let correct = result.correct;
        let certificate = result.certificate.clone();
        if !self.card.apply_result(pending, result) {
            tracing::warn!(card = %pending.card_id, "discarding unexpected verification result");
            return false;
        }

        if correct {
            self.correct_answers += 1;
        }
        if let Some(certificate) = certificate {
            tracing::info!(%certificate, "certificate earned");
            self.certificates.push(certificate);
        }
        true
    }

    /// Replaces the live card with a fresh one for the same item.
    pub fn reset_card(&mut self) {
        self.card = self.fresh_card();
        self.finished = false;
    }

    /// Goes back to the first item and clears progress.
    pub fn restart(&mut self) {
        self.current_index = 0;
        self.card = self.fresh_card();
        self.finished = false;
        self.correct_answers = 0;
        self.certificates.clear();
    }

    /// Progress counters for display.
    #[must_use]
    pub fn progress(&self) -> Progress {
        Progress {
            position: u32::try_from(self.current_index + 1).unwrap_or(u32::MAX),
            total: u32::try_from(self.items.len()).unwrap_or(u32::MAX),
            correct_answers: self.correct_answers,
            certificates: self.certificates.clone(),
        }
    }

    fn fresh_card(&mut self) -> Card {
        let id = CardId::new(self.next_card_id);
        self.next_card_id += 1;
        Card::new(id, self.items[self.current_index].clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> Session {
        Session::from_items(vec![
            VocabularyItem::new("Hallo", "Hello"),
            VocabularyItem::new("Tschüss", "Bye"),
        ])
        .unwrap()
    }

    fn expect_verify(step: SessionStep) -> PendingVerification {
        match step {
            SessionStep::Verify(pending) => pending,
            other => panic!("expected a verification, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_items_rejected() {
        assert_eq!(
            Session::from_items(Vec::new()).unwrap_err(),
            SessionError::EmptyDeck
        );
    }

    #[test]
    fn test_scenario_correct_answer_with_certificate() {
        let mut session = session();
        assert_eq!(session.current_index(), 0);

        session.set_input("Hello");
        let pending = expect_verify(session.submit().unwrap());
        assert!(session.complete(
            &pending,
            VerificationResult {
                correct: true,
                correct_word: None,
                certificate: Some("bafy123".to_string()),
            },
        ));

        let state = session.card().state();
        assert_eq!(state.correct, Correctness::Correct);
        assert_eq!(state.certificate.as_deref(), Some("bafy123"));
        assert_eq!(state.stage, CardStage::ResultShown);

        assert_eq!(session.submit().unwrap(), SessionStep::Advanced { index: 1 });
        assert_eq!(session.current_index(), 1);
        assert_eq!(session.card().state(), &CardState::new("Tschüss"));
        assert_eq!(session.current_item(), &VocabularyItem::new("Tschüss", "Bye"));

        let progress = session.progress();
        assert_eq!(progress.position, 2);
        assert_eq!(progress.correct_answers, 1);
        assert_eq!(progress.certificates, vec!["bafy123".to_string()]);
    }

    #[test]
    fn test_advance_is_bounded() {
        let mut session = session();
        assert!(session.advance());
        assert!(!session.advance());
        assert!(!session.advance());
        assert_eq!(session.current_index(), 1);
    }

    #[test]
    fn test_last_card_keeps_result_after_next() {
        let mut session = session();
        session.advance();
        session.set_input("Bye");
        let pending = expect_verify(session.submit().unwrap());
        session.complete(&pending, VerificationResult::rejected());

        assert_eq!(session.submit().unwrap(), SessionStep::Finished);
        assert!(session.is_finished());
        assert_eq!(session.current_index(), 1);
        assert_eq!(session.card().stage(), CardStage::ResultShown);
        assert_eq!(session.card().state().input_value, "Bye");

        // Further activations stay put.
        assert_eq!(session.submit().unwrap(), SessionStep::Finished);

        session.reset_card();
        assert!(!session.is_finished());
        assert_eq!(session.card().state(), &CardState::new("Tschüss"));
    }

    #[test]
    fn test_late_result_for_previous_card_is_discarded() {
        let mut session = session();
        session.set_input("Hello");
        let stale = expect_verify(session.submit().unwrap());

        // The host abandons the card (e.g. skips ahead) before the reply lands.
        session.reset_card();
        session.advance();

        let accepted = VerificationResult {
            correct: true,
            correct_word: None,
            certificate: Some("bafy-late".to_string()),
        };
        assert!(!session.complete(&stale, accepted));
        assert_eq!(session.card().state(), &CardState::new("Tschüss"));
        assert!(session.progress().certificates.is_empty());
    }

    #[test]
    fn test_double_submit_while_pending_is_rejected() {
        let mut session = session();
        let _pending = expect_verify(session.submit().unwrap());
        assert_eq!(
            session.submit(),
            Err(SessionError::Card(CardError::VerificationPending))
        );
    }

    #[test]
    fn test_restart_clears_progress() {
        let mut session = session();
        let pending = expect_verify(session.submit().unwrap());
        session.complete(
            &pending,
            VerificationResult {
                correct: true,
                ..VerificationResult::default()
            },
        );
        session.submit().unwrap();
        session.restart();
        assert_eq!(session.current_index(), 0);
        assert_eq!(session.progress().correct_answers, 0);
        assert_eq!(session.card().state(), &CardState::new("Hallo"));
    }
}
