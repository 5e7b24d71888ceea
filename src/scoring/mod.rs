// Scoring: from embedded sections to an ordered list of candidates.
//
// aggregate:  section texts -> one vector per section (mean pooling)
// similarity: query vector vs. section vectors -> one score per profile
// ranker:     scores -> stable descending order, top-k

pub mod aggregate;
pub mod ranker;
pub mod similarity;
