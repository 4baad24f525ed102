mod rules;

use serde::{Deserialize, Serialize};

use super::availability::RoomSummary;
use super::domain::{Room, Wing};
use super::repository::RoomQuery;

pub const MAX_RECOMMENDATIONS: usize = 5;

/// Preferences a student states when asking for a room suggestion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomPreferences {
    #[serde(default)]
    pub wing: Option<Wing>,
    #[serde(default)]
    pub floor: Option<u16>,
    #[serde(default)]
    pub has_ac: Option<bool>,
    #[serde(default)]
    pub budget: Option<u32>,
}

impl RoomPreferences {
    /// Every stated preference also acts as a hard filter on candidates.
    pub(crate) fn candidate_query(&self) -> RoomQuery {
        RoomQuery {
            bookable_only: true,
            wing: self.wing,
            floor: self.floor,
            has_ac: self.has_ac,
            min_rent: None,
            max_rent: self.budget,
        }
    }
}

/// Factors contributing to a room's recommendation score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreFactor {
    WingMatch,
    FloorMatch,
    AcMatch,
    Balcony,
    AttachedBathroom,
    Privacy,
    Budget,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreComponent {
    pub factor: ScoreFactor,
    pub points: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScoredRoom {
    #[serde(flatten)]
    pub summary: RoomSummary,
    pub score: i32,
    pub components: Vec<ScoreComponent>,
}

/// Stateless ranker applying the scoring rubric to candidate rooms.
pub struct RecommendationEngine {
    limit: usize,
}

impl RecommendationEngine {
    pub fn new() -> Self {
        Self {
            limit: MAX_RECOMMENDATIONS,
        }
    }

    /// Scores candidates and keeps the best `limit`. Candidates must arrive in
    /// ascending room order; the sort is stable so ties keep that order.
    pub fn rank(&self, preferences: &RoomPreferences, candidates: &[Room]) -> Vec<ScoredRoom> {
        let mut scored: Vec<ScoredRoom> = candidates
            .iter()
            .filter(|room| room.has_free_bed())
            .map(|room| {
                let (components, score) = rules::score_room(room, preferences);
                ScoredRoom {
                    summary: RoomSummary::from_room(room),
                    score,
                    components,
                }
            })
            .collect();

        scored.sort_by(|left, right| right.score.cmp(&left.score));
        scored.truncate(self.limit);
        scored
    }
}

impl Default for RecommendationEngine {
    fn default() -> Self {
        Self::new()
    }
}
