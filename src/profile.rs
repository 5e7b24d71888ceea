// Profile and query data model.
//
// A ProfileRecord is what the CV scraper hands us: a name, an identifier and
// four lists of free text, most recent entry first. We never mutate records;
// the scoring pipeline borrows them for one run.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{InputError, RejectedProfile};

/// One researcher's extracted CV data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileRecord {
    /// Missing in the input means empty; `validate` rejects it.
    #[serde(default)]
    pub name: String,
    /// Unique identifier (the CV platform id)
    #[serde(default, alias = "lattes_id")]
    pub id: String,
    #[serde(default)]
    pub research_areas: Vec<String>,
    #[serde(default)]
    pub periodic_papers: Vec<String>,
    #[serde(default)]
    pub congress_papers: Vec<String>,
    #[serde(default)]
    pub projects: Vec<String>,
}

impl ProfileRecord {
    /// Build a record with no section content. Handy for tests and callers
    /// that fill sections one by one.
    pub fn new(name: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id: id.into(),
            research_areas: Vec::new(),
            periodic_papers: Vec::new(),
            congress_papers: Vec::new(),
            projects: Vec::new(),
        }
    }

    /// The raw entries of one section, in the order the scraper produced them.
    pub fn section(&self, section: Section) -> &[String] {
        match section {
            Section::ResearchAreas => &self.research_areas,
            Section::PeriodicPapers => &self.periodic_papers,
            Section::CongressPapers => &self.congress_papers,
            Section::Projects => &self.projects,
        }
    }

    /// Check the fields scoring relies on.
    pub fn validate(&self) -> Result<(), InputError> {
        if self.id.trim().is_empty() {
            return Err(InputError::MissingId);
        }
        if self.name.trim().is_empty() {
            return Err(InputError::MissingName {
                id: self.id.clone(),
            });
        }
        Ok(())
    }
}

/// Parse a JSON array of profile records.
///
/// Records missing `name` or `id` still parse, with the field empty, so a
/// bad record is rejected on its own by `partition_valid` instead of failing
/// the whole array.
pub fn parse_profiles(json: &str) -> serde_json::Result<Vec<ProfileRecord>> {
    serde_json::from_str(json)
}

/// Split records into the ones that can be scored and the ones that can't.
///
/// Input order is preserved on both sides. The first record with a given id
/// wins; later duplicates are rejected.
pub fn partition_valid(
    profiles: &[ProfileRecord],
) -> (Vec<&ProfileRecord>, Vec<RejectedProfile>) {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut valid = Vec::with_capacity(profiles.len());
    let mut rejected = Vec::new();

    for (index, profile) in profiles.iter().enumerate() {
        let check = profile.validate().and_then(|()| {
            if seen.insert(profile.id.as_str()) {
                Ok(())
            } else {
                Err(InputError::DuplicateId {
                    id: profile.id.clone(),
                })
            }
        });

        match check {
            Ok(()) => valid.push(profile),
            Err(error) => rejected.push(RejectedProfile {
                index,
                name: profile.name.clone(),
                error,
            }),
        }
    }

    (valid, rejected)
}

/// One of the four text sections of a profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    ResearchAreas,
    PeriodicPapers,
    CongressPapers,
    Projects,
}

impl Section {
    /// All sections in a fixed order. Every per-section structure in the
    /// crate is indexed by position in this array.
    pub const ALL: [Section; 4] = [
        Section::ResearchAreas,
        Section::PeriodicPapers,
        Section::CongressPapers,
        Section::Projects,
    ];

    pub fn index(self) -> usize {
        match self {
            Section::ResearchAreas => 0,
            Section::PeriodicPapers => 1,
            Section::CongressPapers => 2,
            Section::Projects => 3,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Section::ResearchAreas => "research_areas",
            Section::PeriodicPapers => "periodic_papers",
            Section::CongressPapers => "congress_papers",
            Section::Projects => "projects",
        }
    }

    /// Short label for tables.
    pub fn label(&self) -> &'static str {
        match self {
            Section::ResearchAreas => "Areas",
            Section::PeriodicPapers => "Journals",
            Section::CongressPapers => "Congress",
            Section::Projects => "Projects",
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The student's side of the comparison.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Query {
    pub theme: String,
    #[serde(default)]
    pub summary: String,
}

impl Query {
    pub fn new(theme: impl Into<String>, summary: impl Into<String>) -> Self {
        Self {
            theme: theme.into(),
            summary: summary.into(),
        }
    }

    /// A query with a theme only.
    pub fn theme_only(theme: impl Into<String>) -> Self {
        Self::new(theme, String::new())
    }

    pub fn has_summary(&self) -> bool {
        !self.summary.trim().is_empty()
    }
}

/// How theme and summary are turned into one query vector.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum QueryCombination {
    /// Element-wise mean of the theme and summary embeddings
    #[default]
    Mean,
    /// Embed "theme summary" as a single text
    Concatenate,
}
