//! Leaderboard view model.

use crate::dataset::Dataset;
use crate::ranking::rank;
use std::time::Duration;

/// Extra entrance delay per rank position.
pub const ENTRANCE_STAGGER: Duration = Duration::from_millis(50);

/// Shown in place of the grid when there is nothing to rank.
pub const EMPTY_MESSAGE: &str = "No student results are available yet.";

/// One leaderboard card.
#[derive(Debug, Clone, PartialEq)]
pub struct LeaderboardCard {
    /// 1-based
    pub rank: usize,
    pub exam_number: String,
    pub name: String,
    pub total: String,
    pub grade: String,
    pub evaluation: String,
    pub department: String,
    pub entrance_delay: Duration,
}

/// What the leaderboard region shows.
#[derive(Debug, Clone, PartialEq)]
pub enum LeaderboardView {
    Loading,
    /// Fallback placeholder, grid suppressed.
    Empty,
    /// Background load failed; message goes in the fallback region.
    Failed(String),
    Cards(Vec<LeaderboardCard>),
}

impl LeaderboardView {
    /// Text for the fallback region, if it is visible.
    pub fn fallback_text(&self) -> Option<&str> {
        match self {
            LeaderboardView::Empty => Some(EMPTY_MESSAGE),
            LeaderboardView::Failed(message) => Some(message),
            LeaderboardView::Loading | LeaderboardView::Cards(_) => None,
        }
    }
}

/// Build the leaderboard for the top `limit` students.
pub fn render(dataset: &Dataset, limit: usize) -> LeaderboardView {
    let ranked = rank(dataset, limit);
    if ranked.is_empty() {
        return LeaderboardView::Empty;
    }

    let cards = ranked
        .into_iter()
        .enumerate()
        .map(|(index, entry)| LeaderboardCard {
            rank: index + 1,
            exam_number: entry.exam_number,
            name: entry.record.name,
            total: entry.record.total,
            grade: entry.record.grade,
            evaluation: entry.record.evaluation,
            department: entry.record.department,
            entrance_delay: ENTRANCE_STAGGER * index as u32,
        })
        .collect();

    LeaderboardView::Cards(cards)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::StudentRecord;
    use crate::ranking::DEFAULT_TOP_N;

    #[test]
    fn test_render_cards_in_rank_order() {
        let data = Dataset::from_json(
            br#"{
                "1001": {"name": "A", "grade": "G3", "total": "300/500", "evaluation": "Good",
                         "status": "Pass", "department": "Arts"},
                "1002": {"name": "B", "grade": "G3", "total": "450/500", "evaluation": "Excellent",
                         "status": "Pass", "department": "Science"}
            }"#,
        )
        .unwrap();

        let cards = match render(&data, DEFAULT_TOP_N) {
            LeaderboardView::Cards(cards) => cards,
            other => panic!("expected cards, got {:?}", other),
        };
        assert_eq!(cards.len(), 2);
        assert_eq!(cards[0].rank, 1);
        assert_eq!(cards[0].name, "B");
        assert_eq!(cards[0].total, "450/500");
        assert_eq!(cards[0].evaluation, "Excellent");
        assert_eq!(cards[0].department, "Science");
        assert_eq!(cards[0].entrance_delay, Duration::ZERO);
        assert_eq!(cards[1].rank, 2);
        assert_eq!(cards[1].name, "A");
        assert_eq!(cards[1].entrance_delay, Duration::from_millis(50));
    }

    #[test]
    fn test_render_empty_dataset_shows_fallback() {
        let view = render(&Dataset::default(), DEFAULT_TOP_N);
        assert_eq!(view, LeaderboardView::Empty);
        assert_eq!(view.fallback_text(), Some(EMPTY_MESSAGE));
    }

    #[test]
    fn test_failed_view_exposes_message() {
        let view = LeaderboardView::Failed("boom".to_string());
        assert_eq!(view.fallback_text(), Some("boom"));
        assert_eq!(LeaderboardView::Loading.fallback_text(), None);
    }

    #[test]
    fn test_render_respects_limit() {
        let data = Dataset::from_entries((0..4).map(|i| {
            (
                i.to_string(),
                StudentRecord {
                    total: format!("{}/10", i),
                    ..Default::default()
                },
            )
        }));
        match render(&data, 3) {
            LeaderboardView::Cards(cards) => {
                assert_eq!(cards.len(), 3);
                assert_eq!(cards[2].rank, 3);
                assert_eq!(cards[2].exam_number, "1");
            }
            other => panic!("expected cards, got {:?}", other),
        }
    }
}
