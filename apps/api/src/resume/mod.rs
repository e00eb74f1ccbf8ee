// Output documents: one accumulator per schema version plus the beta overlay.
// Every accumulator is fed from the same neutral records (see `records`).

pub mod common;
pub mod legacy;
pub mod records;
pub mod stable;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::resume::common::Profile;
use crate::resume::legacy::LegacyResume;
use crate::resume::records::{ProjectRecord, ResumeEntry};
use crate::resume::stable::StableResume;
use crate::sections::Section;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaVersion {
    Legacy,
    #[default]
    Stable,
    Beta,
}

/// In-progress documents for one parse attempt.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResumeDocuments {
    pub legacy: LegacyResume,
    pub stable: StableResume,
    /// Sparse diff deep-merged onto the stable document for [`SchemaVersion::Beta`].
    pub beta_overlay: Map<String, Value>,
    /// Leading entries of `stable.projects` that came from profile attachments.
    attachment_projects: usize,
}

impl ResumeDocuments {
    pub fn push<E: ResumeEntry>(&mut self, entry: E) {
        entry.project(self);
    }

    /// Projects derived from attachments are kept ahead of the project section's
    /// own entries so that re-mapping projects leaves them in place.
    pub fn push_attachment_project(&mut self, record: ProjectRecord) {
        self.stable
            .projects
            .insert(self.attachment_projects, record.into_project());
        self.attachment_projects += 1;
    }

    pub fn push_profile(&mut self, profile: Profile) {
        self.legacy.basics.profiles.push(profile.clone());
        self.stable.basics.profiles.push(profile);
    }

    pub fn has_profile_network(&self, network: &str) -> bool {
        self.stable
            .basics
            .profiles
            .iter()
            .any(|p| p.network.eq_ignore_ascii_case(network))
    }

    pub fn has_skill(&self, name: &str) -> bool {
        self.stable.skills.iter().any(|s| s.name == name)
    }

    pub fn has_website(&self) -> bool {
        !self.stable.basics.url.is_empty()
    }

    /// Drops every entry a section contributed, in all accumulators.
    pub fn clear_section(&mut self, section: Section) {
        let (legacy, stable) = (&mut self.legacy, &mut self.stable);
        match section {
            Section::Basics => {
                legacy.basics = Default::default();
                stable.basics = Default::default();
            }
            Section::Languages => {
                legacy.languages.clear();
                stable.languages.clear();
            }
            Section::Attachments => {}
            Section::Education => {
                legacy.education.clear();
                stable.education.clear();
            }
            Section::Work => {
                legacy.work.clear();
                stable.work.clear();
            }
            Section::Volunteer => {
                legacy.volunteer.clear();
                stable.volunteer.clear();
            }
            Section::Certificates => stable.certificates.clear(),
            Section::Skills => {
                legacy.skills.clear();
                stable.skills.clear();
            }
            Section::Projects => stable.projects.truncate(self.attachment_projects),
            Section::Awards => {
                legacy.awards.clear();
                stable.awards.clear();
            }
            Section::Publications => {
                legacy.publications.clear();
                stable.publications.clear();
            }
        }
    }

    /// Writes a value into the beta overlay at a nested object path.
    pub fn set_beta_field(&mut self, path: &[&str], value: Value) {
        let Some((last, parents)) = path.split_last() else {
            return;
        };
        let mut cursor = &mut self.beta_overlay;
        for segment in parents {
            let slot = cursor
                .entry(segment.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            if !slot.is_object() {
                *slot = Value::Object(Map::new());
            }
            let Value::Object(map) = slot else {
                return;
            };
            cursor = map;
        }
        cursor.insert(last.to_string(), value);
    }

    pub fn document(&self, version: SchemaVersion) -> Result<Value, serde_json::Error> {
        match version {
            SchemaVersion::Legacy => serde_json::to_value(&self.legacy),
            SchemaVersion::Stable => serde_json::to_value(&self.stable),
            SchemaVersion::Beta => {
                let mut merged = serde_json::to_value(&self.stable)?;
                merge_overlay(&mut merged, &Value::Object(self.beta_overlay.clone()));
                Ok(merged)
            }
        }
    }
}

/// Recursive object merge; anything that is not object-on-object is replaced.
pub fn merge_overlay(base: &mut Value, overlay: &Value) {
    match (base, overlay) {
        (Value::Object(base_map), Value::Object(overlay_map)) => {
            for (key, value) in overlay_map {
                match base_map.get_mut(key) {
                    Some(existing) => merge_overlay(existing, value),
                    None => {
                        base_map.insert(key.clone(), value.clone());
                    }
                }
            }
        }
        (base, overlay) => *base = overlay.clone(),
    }
}
