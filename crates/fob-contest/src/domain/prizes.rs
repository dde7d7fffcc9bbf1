//! Prize manager: the ordered prize list and its assignment to winners.

use fob_core::error::DomainError;
use serde::{Deserialize, Serialize};

use super::entries::ParticipantId;

/// Maximum number of prizes a contest can offer.
pub const MAX_PRIZES: usize = 4;

/// Maximum length of a single prize description, in characters.
pub const MAX_PRIZE_LEN: usize = 200;

/// Ordered prize list; index 0 is first prize. Empty means "not set yet".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PrizeList(Vec<String>);

impl PrizeList {
    /// Validates and builds a prize list.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if the list is empty, has more than
    /// [`MAX_PRIZES`] entries, or contains a blank or over-long prize.
    pub fn new(prizes: Vec<String>) -> Result<Self, DomainError> {
        if prizes.is_empty() || prizes.len() > MAX_PRIZES {
            return Err(DomainError::Validation(format!(
                "prize list must contain between 1 and {MAX_PRIZES} prizes, got {}",
                prizes.len()
            )));
        }

        let mut cleaned = Vec::with_capacity(prizes.len());
        for (index, prize) in prizes.into_iter().enumerate() {
            let prize = prize.trim().to_owned();
            if prize.is_empty() {
                return Err(DomainError::Validation(format!(
                    "prize {} is empty",
                    index + 1
                )));
            }
            if prize.chars().count() > MAX_PRIZE_LEN {
                return Err(DomainError::Validation(format!(
                    "prize {} exceeds {MAX_PRIZE_LEN} characters",
                    index + 1
                )));
            }
            cleaned.push(prize);
        }
        Ok(Self(cleaned))
    }

    /// Prizes in rank order.
    #[must_use]
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    /// Returns `true` if no prizes have been set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of prizes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Pairs ranked winners with prizes by position. Winners ranked beyond
    /// the prize list get an award with no prize.
    #[must_use]
    pub fn assign(&self, winners: &[ParticipantId]) -> Vec<PrizeAward> {
        winners
            .iter()
            .enumerate()
            .map(|(index, participant_id)| PrizeAward {
                rank: index + 1,
                participant_id: participant_id.clone(),
                prize: self.0.get(index).cloned(),
            })
            .collect()
    }
}

/// A winner's rank and the prize it earned, if any.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrizeAward {
    /// 1-based rank among the winners.
    pub rank: usize,
    /// The winning participant.
    pub participant_id: ParticipantId,
    /// The prize for this rank, or `None` when the list ran out.
    pub prize: Option<String>,
}
