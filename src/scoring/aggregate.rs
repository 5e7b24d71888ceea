// Section aggregation: one vector per section per profile.
//
// Every entry of a section is embedded and the vectors are averaged. A
// section with nothing to embed stays absent (None). Absent is not the zero
// vector: a zero vector would still be compared and drag the profile's mean
// down, while an absent section simply doesn't vote.

use tracing::warn;

use crate::corpus::ProfileTexts;
use crate::embedding::traits::TextEmbedder;
use crate::error::{BancaError, DegradedSection, Result};
use crate::profile::{Query, QueryCombination, Section};

/// One optional vector per section, indexed by `Section::index`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SectionVectors {
    slots: [Option<Vec<f64>>; 4],
}

impl SectionVectors {
    pub fn get(&self, section: Section) -> Option<&[f64]> {
        self.slots[section.index()].as_deref()
    }

    pub fn set(&mut self, section: Section, vector: Option<Vec<f64>>) {
        self.slots[section.index()] = vector;
    }

    /// Sections with their vectors, absent ones included, in `Section::ALL` order.
    pub fn iter(&self) -> impl Iterator<Item = (Section, Option<&[f64]>)> {
        Section::ALL.into_iter().map(move |s| (s, self.get(s)))
    }

    pub fn present_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    pub fn all_absent(&self) -> bool {
        self.present_count() == 0
    }
}

/// Element-wise mean of equal-length vectors. `None` when there are none.
///
/// Order of the input does not matter beyond floating-point rounding.
pub fn mean_pool(vectors: &[Vec<f64>]) -> Option<Vec<f64>> {
    let first = vectors.first()?;
    let n = vectors.len() as f64;
    let mut mean = vec![0.0_f64; first.len()];

    for vector in vectors {
        for (acc, &value) in mean.iter_mut().zip(vector) {
            *acc += value;
        }
    }

    for value in &mut mean {
        *value /= n;
    }

    Some(mean)
}

/// Embed every section of one profile.
///
/// Empty sections come back absent. A section the embedder fails on also
/// comes back absent, with a `DegradedSection` record explaining why; the
/// other sections are unaffected.
pub fn embed_sections(
    embedder: &dyn TextEmbedder,
    texts: &ProfileTexts<'_>,
) -> (SectionVectors, Vec<DegradedSection>) {
    let mut vectors = SectionVectors::default();
    let mut degraded = Vec::new();

    for section in Section::ALL {
        let items = texts.section(section);
        if items.is_empty() {
            continue;
        }

        match embedder.embed_batch(items) {
            Ok(embeddings) => vectors.set(section, mean_pool(&embeddings)),
            Err(e) => {
                warn!(
                    id = %texts.profile.id,
                    section = %section,
                    error = %e,
                    "Section could not be embedded, treating as absent"
                );
                degraded.push(DegradedSection {
                    profile_id: texts.profile.id.clone(),
                    section,
                    reason: e.to_string(),
                });
            }
        }
    }

    (vectors, degraded)
}

/// Embed the student's query.
///
/// With `Mean`, theme and summary are embedded separately and averaged; an
/// empty summary means the theme alone (never an average with the embedding
/// of an empty string). With `Concatenate`, both are embedded as one text.
pub fn embed_query(
    embedder: &dyn TextEmbedder,
    query: &Query,
    combination: QueryCombination,
) -> Result<Vec<f64>> {
    if !query.has_summary() {
        return embedder.embed(&query.theme);
    }

    match combination {
        QueryCombination::Mean => {
            let embeddings =
                embedder.embed_batch(&[query.theme.clone(), query.summary.clone()])?;
            mean_pool(&embeddings)
                .ok_or_else(|| BancaError::embedding("embedder returned no vectors"))
        }
        QueryCombination::Concatenate => {
            embedder.embed(&format!("{} {}", query.theme, query.summary))
        }
    }
}
