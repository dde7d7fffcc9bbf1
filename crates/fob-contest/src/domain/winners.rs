//! Winner selection.

use super::entries::{Entry, ParticipantId};

/// Returns the participants whose guess matches `result`, earliest correct
/// guess first. Ties on `submitted_at` are broken by participant id so the
/// ranking is reproducible. An empty vector means nobody guessed right.
pub fn select_winners<'a, I>(entries: I, result: &str) -> Vec<ParticipantId>
where
    I: IntoIterator<Item = &'a Entry>,
{
    let mut matching: Vec<&Entry> = entries
        .into_iter()
        .filter(|entry| entry.guess == result)
        .collect();
    matching.sort_by(|a, b| {
        a.submitted_at
            .cmp(&b.submitted_at)
            .then_with(|| a.participant_id.cmp(&b.participant_id))
    });
    matching
        .into_iter()
        .map(|entry| entry.participant_id.clone())
        .collect()
}
