//! Section mappers: one function per resume section, all sharing the
//! [`SectionMapper`] signature so the orchestrator can run them as a table.

pub mod accolades;
pub mod attachments;
pub mod basics;
pub mod education;
pub mod keys;
pub mod languages;
pub mod projects;
pub mod skills;
pub mod volunteer;
pub mod work;

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::errors::ExportError;
use crate::graph::{DisplayOrder, Entity, EntityGraph, Paging};
use crate::resume::ResumeDocuments;
use crate::sections::keys::SectionKeys;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Section {
    Basics,
    Languages,
    Attachments,
    Education,
    Work,
    Volunteer,
    Certificates,
    Skills,
    Projects,
    Awards,
    Publications,
}

impl Section {
    /// Fixed mapper order. Attachments must run after basics: both write the website.
    pub const PARSE_ORDER: [Section; 11] = [
        Section::Basics,
        Section::Languages,
        Section::Attachments,
        Section::Education,
        Section::Work,
        Section::Volunteer,
        Section::Certificates,
        Section::Skills,
        Section::Projects,
        Section::Awards,
        Section::Publications,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Section::Basics => "basics",
            Section::Languages => "languages",
            Section::Attachments => "attachments",
            Section::Education => "education",
            Section::Work => "work",
            Section::Volunteer => "volunteer",
            Section::Certificates => "certificates",
            Section::Skills => "skills",
            Section::Projects => "projects",
            Section::Awards => "awards",
            Section::Publications => "publications",
        }
    }

    pub fn mapper(self) -> SectionMapper {
        match self {
            Section::Basics => basics::map_basics,
            Section::Languages => languages::map_languages,
            Section::Attachments => attachments::map_attachments,
            Section::Education => education::map_education,
            Section::Work => work::map_work,
            Section::Volunteer => volunteer::map_volunteer,
            Section::Certificates => accolades::map_certificates,
            Section::Skills => skills::map_skills,
            Section::Projects => projects::map_projects,
            Section::Awards => accolades::map_awards,
            Section::Publications => accolades::map_publications,
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaptureResult {
    Success,
    Fail,
    Incomplete,
    Empty,
}

/// Mutable state threaded through every mapper of one parse attempt.
#[derive(Debug, Clone, Default)]
pub struct ParseContext {
    pub documents: ResumeDocuments,
    /// Public identifier from the page URL (`/in/<id>/`).
    pub profile_id: Option<String>,
    /// Internal member id, learned from the profile entity's URN.
    pub profile_urn_id: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    /// Locale the profile was served in, as `language_COUNTRY`.
    pub locale_tag: Option<String>,
    pub supported_locales: Vec<String>,
    pub warnings: Vec<String>,
}

impl ParseContext {
    pub fn new(documents: ResumeDocuments, profile_id: Option<String>) -> Self {
        Self {
            documents,
            profile_id,
            ..Self::default()
        }
    }

    pub(crate) fn note_order(&mut self, section: Section, order: DisplayOrder) {
        if order == DisplayOrder::Unordered {
            self.warnings.push(format!(
                "{section}: entries recovered by type scan, order may differ from the profile"
            ));
        }
    }
}

pub type SectionMapper = fn(&EntityGraph, &mut ParseContext) -> Result<CaptureResult, ExportError>;

/// Incomplete paging wins over everything, including zero captured entries.
pub fn capture_result(captured: usize, paging: Option<Paging>) -> CaptureResult {
    if paging.is_some_and(|p| p.is_incomplete()) {
        CaptureResult::Incomplete
    } else if captured > 0 {
        CaptureResult::Success
    } else {
        CaptureResult::Empty
    }
}

/// Entities that feed one section, plus the paging of the view they came from.
#[derive(Debug, Clone)]
pub struct SectionSource<'g> {
    pub entities: Vec<&'g Entity>,
    pub paging: Option<Paging>,
    pub order: DisplayOrder,
}

/// Locates a section's entities: ToC keys first, then the response's own root
/// elements (paginated section endpoints), then a type scan as a last resort.
pub fn resolve_section<'g>(graph: &'g EntityGraph, keys: &SectionKeys) -> SectionSource<'g> {
    let entities = graph.get_values_by_key(keys.toc_keys);
    if !entities.is_empty() {
        return SectionSource {
            entities,
            paging: graph.paging_for_keys(keys.toc_keys),
            order: DisplayOrder::Preserved,
        };
    }

    let roots: Vec<&Entity> = graph
        .get_elements()
        .into_iter()
        .filter(|e| e.is_type(keys.types))
        .collect();
    if !roots.is_empty() {
        return SectionSource {
            entities: roots,
            paging: graph.table_of_contents().paging(),
            order: DisplayOrder::Preserved,
        };
    }

    let scanned = graph.get_elements_by_type(keys.types);
    let order = if scanned.is_empty() {
        DisplayOrder::Preserved
    } else {
        warn!(
            types = ?keys.types,
            count = scanned.len(),
            "section resolved by type scan; display order is not guaranteed"
        );
        DisplayOrder::Unordered
    };
    SectionSource {
        entities: scanned,
        paging: graph.paging_for_keys(keys.toc_keys),
        order,
    }
}
