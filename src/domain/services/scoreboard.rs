//! Scoreboard construction domain service.
//!
//! Turns a set of participants into a ranked leaderboard. Output is fully
//! deterministic: equal scores are ordered by nickname (ascending, whatever
//! the score order), then by connection id.

use serde::{Deserialize, Serialize};

use crate::domain::entities::Participant;
use crate::domain::value_objects::ConnectionId;

/// Score ordering of the leaderboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScoreOrder {
    #[serde(rename = "asc", alias = "ascending")]
    Ascending,
    #[default]
    #[serde(rename = "desc", alias = "descending")]
    Descending,
}

/// How tied scores are ranked.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RankMode {
    /// Ties share a rank; the next score is one rank lower (5,5,3 -> 1,1,2)
    #[default]
    Dense,
    /// Ties share a rank; the next score takes its position (5,5,3 -> 1,1,3)
    Competition,
}

/// Leaderboard configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ScoreboardOptions {
    #[serde(default)]
    pub order: ScoreOrder,
    #[serde(default)]
    pub rank_mode: RankMode,
    /// Keep only the first N entries
    #[serde(default)]
    pub limit: Option<usize>,
    /// Include connection ids in the entries
    #[serde(default)]
    pub include_ids: bool,
}

/// One leaderboard row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScoreboardEntry {
    pub rank: u32,
    pub nickname: String,
    pub score: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<ConnectionId>,
}

/// Domain service for building leaderboards.
pub struct ScoreboardBuilder;

impl ScoreboardBuilder {
    /// Build the ranked leaderboard for the given participants.
    pub fn build<'a, I>(participants: I, options: &ScoreboardOptions) -> Vec<ScoreboardEntry>
    where
        I: IntoIterator<Item = (&'a ConnectionId, &'a Participant)>,
    {
        let mut rows: Vec<(&ConnectionId, &Participant)> = participants.into_iter().collect();

        rows.sort_by(|(a_id, a), (b_id, b)| {
            let by_score = match options.order {
                ScoreOrder::Ascending => a.score.cmp(&b.score),
                ScoreOrder::Descending => b.score.cmp(&a.score),
            };
            by_score
                .then_with(|| a.nickname.cmp(&b.nickname))
                .then_with(|| a_id.cmp(b_id))
        });

        if let Some(limit) = options.limit.filter(|l| *l > 0) {
            rows.truncate(limit);
        }

        let mut entries = Vec::with_capacity(rows.len());
        let mut last_score = None;
        let mut rank = 0u32;

        for (position, (id, participant)) in rows.into_iter().enumerate() {
            if last_score != Some(participant.score) {
                rank = match options.rank_mode {
                    RankMode::Dense => rank + 1,
                    RankMode::Competition => position as u32 + 1,
                };
                last_score = Some(participant.score);
            }

            entries.push(ScoreboardEntry {
                rank,
                nickname: participant.nickname.clone(),
                score: participant.score,
                id: options.include_ids.then_some(*id),
            });
        }

        entries
    }
}
