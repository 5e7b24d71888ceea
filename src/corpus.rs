// Corpus assembly: turns profile records into the text lists we embed.
//
// Produces two views of the same data:
//   1. per profile, per section: the (possibly translated) entries to embed
//   2. a flat global corpus of every entry, used to fit the lexical vocabulary
//
// Sections are capped at the most recent `max_items` entries. That bounds the
// embedding cost per profile and favors recent work.

use std::sync::LazyLock;

use regex_lite::Regex;
use tracing::{debug, info};

use crate::error::RejectedProfile;
use crate::profile::{partition_valid, ProfileRecord, Section};
use crate::translate::blocks::{translate_sections, DEFAULT_BLOCK_CHARS};
use crate::translate::traits::Translator;

/// Default cap on entries per section.
pub const DEFAULT_MAX_ITEMS: usize = 10;

static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid whitespace pattern"));

/// Texts of one profile, one list per section (indexed by `Section::index`).
#[derive(Debug, Clone)]
pub struct ProfileTexts<'a> {
    pub profile: &'a ProfileRecord,
    sections: [Vec<String>; 4],
}

impl<'a> ProfileTexts<'a> {
    pub fn new(profile: &'a ProfileRecord, sections: [Vec<String>; 4]) -> Self {
        Self { profile, sections }
    }

    pub fn section(&self, section: Section) -> &[String] {
        &self.sections[section.index()]
    }

    /// Every entry of every section, in `Section::ALL` order.
    pub fn texts(&self) -> impl Iterator<Item = &String> {
        self.sections.iter().flatten()
    }

    /// All entries joined into one document.
    pub fn joined(&self) -> String {
        self.texts().map(String::as_str).collect::<Vec<_>>().join(" ")
    }

    pub fn is_empty(&self) -> bool {
        self.sections.iter().all(Vec::is_empty)
    }
}

/// Output of the builder: scorable profiles plus the records it rejected.
#[derive(Debug, Clone)]
pub struct ProfileCorpus<'a> {
    pub entries: Vec<ProfileTexts<'a>>,
    pub rejected: Vec<RejectedProfile>,
}

impl ProfileCorpus<'_> {
    /// Flat list of every entry across all profiles and sections.
    pub fn global_texts(&self) -> Vec<String> {
        self.entries
            .iter()
            .flat_map(|entry| entry.texts().cloned())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Builds a `ProfileCorpus` from profile records.
pub struct TextCorpusBuilder<'t> {
    translator: Option<&'t dyn Translator>,
    max_items: usize,
    block_chars: usize,
}

impl Default for TextCorpusBuilder<'_> {
    fn default() -> Self {
        Self {
            translator: None,
            max_items: DEFAULT_MAX_ITEMS,
            block_chars: DEFAULT_BLOCK_CHARS,
        }
    }
}

impl<'t> TextCorpusBuilder<'t> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Translate paper titles with this translator before they enter the
    /// corpus. Without one, text is used as scraped.
    pub fn translator(mut self, translator: &'t dyn Translator) -> Self {
        self.translator = Some(translator);
        self
    }

    pub fn max_items(mut self, max_items: usize) -> Self {
        self.max_items = max_items;
        self
    }

    pub fn block_chars(mut self, block_chars: usize) -> Self {
        self.block_chars = block_chars;
        self
    }

    /// Validate, truncate, normalize and (optionally) translate every profile.
    pub fn build<'a>(&self, profiles: &'a [ProfileRecord]) -> ProfileCorpus<'a> {
        let (valid, rejected) = partition_valid(profiles);

        let entries: Vec<ProfileTexts<'a>> = valid
            .into_iter()
            .map(|profile| self.profile_texts(profile))
            .collect();

        info!(
            profiles = entries.len(),
            rejected = rejected.len(),
            translated = self.translator.is_some(),
            "Built profile corpus"
        );

        ProfileCorpus { entries, rejected }
    }

    /// Texts for a single (already validated) profile.
    pub fn profile_texts<'a>(&self, profile: &'a ProfileRecord) -> ProfileTexts<'a> {
        let mut sections: [Vec<String>; 4] = Section::ALL.map(|section| {
            profile
                .section(section)
                .iter()
                .take(self.max_items)
                .filter_map(|text| normalize(text))
                .collect()
        });

        // Paper titles are the sections written in mixed languages. One
        // request per profile carries both.
        if let Some(translator) = self.translator {
            let congress = Section::CongressPapers.index();
            let periodic = Section::PeriodicPapers.index();
            let translated = translate_sections(
                translator,
                &[&sections[congress], &sections[periodic]],
                self.block_chars,
            );
            let mut translated = translated.into_iter();
            if let (Some(c), Some(p)) = (translated.next(), translated.next()) {
                sections[congress] = c.iter().filter_map(|t| normalize(t)).collect();
                sections[periodic] = p.iter().filter_map(|t| normalize(t)).collect();
            }
        }

        debug!(
            id = %profile.id,
            areas = sections[0].len(),
            periodic = sections[1].len(),
            congress = sections[2].len(),
            projects = sections[3].len(),
            "Collected profile texts"
        );

        ProfileTexts::new(profile, sections)
    }
}

/// Collapse runs of whitespace and drop blank entries.
fn normalize(text: &str) -> Option<String> {
    let collapsed = WHITESPACE.replace_all(text.trim(), " ");
    if collapsed.is_empty() {
        None
    } else {
        Some(collapsed.into_owned())
    }
}
