// Section-wise similarity scoring.
//
// A profile's score is the mean of the cosine similarities between the query
// vector and each present section vector. Every present section gets one
// equal vote regardless of how many entries it had, so a long publication
// list can't drown out a short but precisely matching research area.
//
// A profile with no present sections scores 0.0.

use serde::Serialize;

use super::aggregate::SectionVectors;
use crate::profile::Section;

/// Cosine similarity between two vectors.
///
/// Returns 0.0 when either vector has zero norm or the lengths differ.
/// Range is [-1, 1]: semantic vectors can point away from each other, and
/// that signal is kept rather than clamped to zero.
pub fn cosine_similarity(a: &[f64], b: &[f64]) -> f64 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot: f64 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let mag_a: f64 = a.iter().map(|x| x * x).sum::<f64>().sqrt();
    let mag_b: f64 = b.iter().map(|x| x * x).sum::<f64>().sqrt();

    let denom = mag_a * mag_b;
    if denom < f64::EPSILON {
        0.0
    } else {
        (dot / denom).clamp(-1.0, 1.0)
    }
}

/// Per-section cosine similarities for one profile. `None` for absent sections.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct SectionScores {
    scores: [Option<f64>; 4],
}

impl SectionScores {
    pub fn get(&self, section: Section) -> Option<f64> {
        self.scores[section.index()]
    }

    pub fn present_count(&self) -> usize {
        self.scores.iter().filter(|s| s.is_some()).count()
    }

    /// The best-matching present section, if any.
    pub fn strongest(&self) -> Option<(Section, f64)> {
        Section::ALL
            .into_iter()
            .filter_map(|s| self.get(s).map(|score| (s, score)))
            .fold(None, |best, (s, score)| match best {
                Some((_, best_score)) if best_score >= score => best,
                _ => Some((s, score)),
            })
    }
}

/// Score one profile against the query vector.
///
/// Returns the overall score (mean over present sections, 0.0 if none) and
/// the per-section breakdown.
pub fn score_sections(query: &[f64], sections: &SectionVectors) -> (f64, SectionScores) {
    let mut scores = SectionScores::default();
    let mut total = 0.0;
    let mut present = 0usize;

    for (section, vector) in sections.iter() {
        if let Some(vector) = vector {
            let sim = cosine_similarity(query, vector);
            scores.scores[section.index()] = Some(sim);
            total += sim;
            present += 1;
        }
    }

    let score = if present == 0 {
        0.0
    } else {
        total / present as f64
    };

    (score, scores)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cosine_identical() {
        let a = vec![1.0, 2.0, 3.0];
        assert!((cosine_similarity(&a, &a) - 1.0).abs() < 1e-10);
    }

    #[test]
    fn test_cosine_orthogonal() {
        let sim = cosine_similarity(&[1.0, 0.0, 0.0], &[0.0, 1.0, 0.0]);
        assert!(sim.abs() < 1e-10);
    }

    #[test]
    fn test_cosine_opposite_is_minus_one() {
        let sim = cosine_similarity(&[1.0, 0.0], &[-2.0, 0.0]);
        assert!((sim + 1.0).abs() < 1e-10);
    }

    #[test]
    fn test_cosine_zero_vector() {
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 2.0]), 0.0);
    }

    #[test]
    fn test_cosine_mismatched_dimensions() {
        assert_eq!(cosine_similarity(&[1.0, 2.0], &[1.0, 2.0, 3.0]), 0.0);
    }

    #[test]
    fn test_cosine_is_symmetric() {
        let a = vec![1.0, 3.0, -2.0, 0.5];
        let b = vec![2.0, -1.0, 4.0, 0.0];
        assert!((cosine_similarity(&a, &b) - cosine_similarity(&b, &a)).abs() < 1e-12);
    }

    #[test]
    fn test_all_absent_scores_zero() {
        let (score, breakdown) = score_sections(&[1.0, 0.0], &SectionVectors::default());
        assert_eq!(score, 0.0);
        assert_eq!(breakdown.present_count(), 0);
        assert_eq!(breakdown.strongest(), None);
    }

    #[test]
    fn test_mean_over_present_sections_only() {
        let mut sections = SectionVectors::default();
        sections.set(Section::ResearchAreas, Some(vec![1.0, 0.0]));
        sections.set(Section::Projects, Some(vec![0.0, 1.0]));

        let (score, breakdown) = score_sections(&[1.0, 0.0], &sections);
        // (1.0 + 0.0) / 2, absent sections don't vote
        assert!((score - 0.5).abs() < 1e-12);
        assert_eq!(breakdown.get(Section::PeriodicPapers), None);
        assert_eq!(
            breakdown.strongest().map(|(s, _)| s),
            Some(Section::ResearchAreas)
        );
    }

    #[test]
    fn test_each_section_has_equal_weight() {
        // A perfect area match holds its own against an unrelated section,
        // however the section vectors were pooled.
        let mut sections = SectionVectors::default();
        sections.set(Section::ResearchAreas, Some(vec![1.0, 0.0, 0.0]));
        sections.set(Section::CongressPapers, Some(vec![0.0, 0.0, 50.0]));

        let (score, _) = score_sections(&[1.0, 0.0, 0.0], &sections);
        assert!((score - 0.5).abs() < 1e-12);
    }
}
