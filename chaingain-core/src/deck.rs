use serde::{Deserialize, Serialize};

use crate::error::ChainGainError;

/// A word to translate together with its reference translation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
pub struct VocabularyItem {
    /// The prompt shown on the card.
    pub word: String,
    /// Reference translation, revealed on the back of the card.
    pub translation: String,
}

impl VocabularyItem {
    /// Creates an item.
    #[must_use]
    pub fn new(word: impl Into<String>, translation: impl Into<String>) -> Self {
        Self {
            word: word.into(),
            translation: translation.into(),
        }
    }
}

/// An ordered, non-empty list of vocabulary items.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deck {
    items: Vec<VocabularyItem>,
}

impl Deck {
    /// Builds a deck from items.
    ///
    /// # Errors
    ///
    /// Returns [`ChainGainError::InvalidInput`] if `items` is empty or an
    /// item has a blank word.
    pub fn new(items: Vec<VocabularyItem>) -> Result<Self, ChainGainError> {
        if items.is_empty() {
            return Err(ChainGainError::InvalidInput {
                attribute: "deck".to_string(),
                reason: "a deck needs at least one item".to_string(),
            });
        }
        if let Some(position) = items.iter().position(|item| item.word.trim().is_empty()) {
            return Err(ChainGainError::InvalidInput {
                attribute: "deck".to_string(),
                reason: format!("item {position} has an empty word"),
            });
        }
        Ok(Self { items })
    }

    /// Parses a deck from a JSON array of `{ "word", "translation" }` objects.
    ///
    /// # Errors
    ///
    /// Returns [`ChainGainError::SerializationError`] for malformed JSON and
    /// the errors of [`Deck::new`] otherwise.
    pub fn from_json(json: &str) -> Result<Self, ChainGainError> {
        let items: Vec<VocabularyItem> =
            serde_json::from_str(json).map_err(|err| ChainGainError::SerializationError {
                error: format!("invalid deck: {err}"),
            })?;
        Self::new(items)
    }

    /// The items in presentation order.
    #[must_use]
    pub fn items(&self) -> &[VocabularyItem] {
        &self.items
    }

    /// Number of items; never zero.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Always `false`; present for API symmetry with `len`.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_json() {
        let deck = Deck::from_json(
            r#"[{"word": "Hallo", "translation": "Hello"}, {"word": "Tschüss", "translation": "Bye"}]"#,
        )
        .unwrap();
        assert_eq!(deck.len(), 2);
        assert_eq!(deck.items()[1], VocabularyItem::new("Tschüss", "Bye"));
    }

    #[test]
    fn test_empty_deck_is_rejected() {
        assert!(matches!(
            Deck::from_json("[]"),
            Err(ChainGainError::InvalidInput { .. })
        ));
    }

    #[test]
    fn test_blank_word_is_rejected() {
        let err = Deck::new(vec![
            VocabularyItem::new("cat", "gato"),
            VocabularyItem::new("  ", "nada"),
        ])
        .unwrap_err();
        assert!(err.to_string().contains("item 1"));
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(
            Deck::from_json(r#"{"word": "cat"}"#),
            Err(ChainGainError::SerializationError { .. })
        ));
    }
}
