// Committee proposal from a ranking.
//
// A thesis committee has the advisor, two titular members and one substitute.
// The proposal walks the ranking from the top, skips the advisor, and fills
// titular seats first.

use serde::Serialize;

use crate::profile::Query;
use crate::scoring::ranker::ScoredProfile;

/// A proposed committee for one thesis.
#[derive(Debug, Clone, Serialize)]
pub struct Committee {
    pub title: String,
    /// None when the summary was empty
    pub summary: Option<String>,
    /// The advisor, when found among the ranked candidates
    pub advisor: Option<ScoredProfile>,
    pub titular1: ScoredProfile,
    pub titular2: ScoredProfile,
    pub substitute: ScoredProfile,
}

impl Committee {
    /// Propose a committee from `ranking` (best first).
    ///
    /// Returns None when fewer than three candidates remain once the advisor
    /// is set aside.
    pub fn propose(
        query: &Query,
        ranking: &[ScoredProfile],
        advisor_id: Option<&str>,
    ) -> Option<Self> {
        let is_advisor = |s: &ScoredProfile| advisor_id.is_some_and(|id| s.profile.id == id);

        let advisor = ranking.iter().find(|s| is_advisor(*s)).cloned();
        let mut members = ranking.iter().filter(|s| !is_advisor(*s)).cloned();

        let titular1 = members.next()?;
        let titular2 = members.next()?;
        let substitute = members.next()?;

        Some(Self {
            title: query.theme.clone(),
            summary: query.has_summary().then(|| query.summary.clone()),
            advisor,
            titular1,
            titular2,
            substitute,
        })
    }

    /// Members in seat order: titular, titular, substitute.
    pub fn members(&self) -> [&ScoredProfile; 3] {
        [&self.titular1, &self.titular2, &self.substitute]
    }
}
