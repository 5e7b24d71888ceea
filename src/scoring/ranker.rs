// Ranking: order scored profiles by similarity.
//
// Descending by score. Equal scores keep their input order (the sort is
// stable); there is no secondary tie-break.

use serde::Serialize;

use super::similarity::SectionScores;
use crate::profile::ProfileRecord;

/// Default number of candidates in the short list.
pub const DEFAULT_TOP_K: usize = 5;

/// A profile together with its similarity to the query.
#[derive(Debug, Clone, Serialize)]
pub struct ScoredProfile {
    pub profile: ProfileRecord,
    /// Mean cosine similarity over present sections, 0.0 when none were present
    pub score: f64,
    pub sections: SectionScores,
}

impl ScoredProfile {
    pub fn new(profile: ProfileRecord, score: f64, sections: SectionScores) -> Self {
        Self {
            profile,
            score,
            sections,
        }
    }

    /// False when the score is 0.0 only because no section had any text.
    pub fn has_signal(&self) -> bool {
        self.sections.present_count() > 0
    }
}

/// Sort by score, highest first, keeping input order among equal scores.
pub fn rank(mut scored: Vec<ScoredProfile>) -> Vec<ScoredProfile> {
    scored.sort_by(|a, b| sort_key(b.score).total_cmp(&sort_key(a.score)));
    scored
}

/// `total_cmp` orders -0.0 below 0.0; fold them so they tie.
fn sort_key(score: f64) -> f64 {
    score + 0.0
}

/// The first `k` entries of a ranking.
pub fn top_k(ranking: &[ScoredProfile], k: usize) -> &[ScoredProfile] {
    &ranking[..k.min(ranking.len())]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scored(id: &str, score: f64) -> ScoredProfile {
        ScoredProfile::new(
            ProfileRecord::new(format!("Prof {id}"), id),
            score,
            SectionScores::default(),
        )
    }

    fn ids(ranking: &[ScoredProfile]) -> Vec<&str> {
        ranking.iter().map(|s| s.profile.id.as_str()).collect()
    }

    #[test]
    fn test_rank_descending() {
        let ranking = rank(vec![scored("a", 0.1), scored("b", 0.7), scored("c", 0.4)]);
        assert_eq!(ids(&ranking), vec!["b", "c", "a"]);
    }

    #[test]
    fn test_ties_keep_input_order() {
        let ranking = rank(vec![scored("A", 0.9), scored("B", 0.9), scored("C", 0.5)]);
        assert_eq!(ids(&ranking), vec!["A", "B", "C"]);

        let ranking = rank(vec![scored("B", 0.9), scored("A", 0.9), scored("C", 0.5)]);
        assert_eq!(ids(&ranking), vec!["B", "A", "C"]);
    }

    #[test]
    fn test_nan_score_keeps_a_total_order() {
        let ranking = rank(vec![
            scored("a", 0.2),
            scored("nan", f64::NAN),
            scored("b", 0.8),
            scored("c", 0.5),
        ]);
        let finite: Vec<&str> = ids(&ranking).into_iter().filter(|id| *id != "nan").collect();
        assert_eq!(finite, vec!["b", "c", "a"]);
    }

    #[test]
    fn test_signed_zeros_tie() {
        let ranking = rank(vec![scored("neg", -0.0), scored("pos", 0.0), scored("top", 0.1)]);
        assert_eq!(ids(&ranking), vec!["top", "neg", "pos"]);
    }

    #[test]
    fn test_top_k_bounds() {
        let ranking = rank(vec![scored("a", 0.3), scored("b", 0.2)]);
        assert_eq!(top_k(&ranking, 5).len(), 2);
        assert_eq!(ids(top_k(&ranking, 1)), vec!["a"]);
        assert!(top_k(&ranking, 0).is_empty());
    }

    #[test]
    fn test_has_signal() {
        assert!(!scored("a", 0.0).has_signal());
    }
}
