//! JSON Resume 0.x ("legacy") document.

use serde::{Deserialize, Serialize};

use crate::resume::common::{Award, Interest, Language, Location, Profile, Reference, Skill};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct LegacyResume {
    pub basics: LegacyBasics,
    pub work: Vec<LegacyWork>,
    pub volunteer: Vec<LegacyVolunteer>,
    pub education: Vec<LegacyEducation>,
    pub awards: Vec<Award>,
    pub publications: Vec<LegacyPublication>,
    pub skills: Vec<Skill>,
    pub languages: Vec<Language>,
    pub interests: Vec<Interest>,
    pub references: Vec<Reference>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct LegacyBasics {
    pub name: String,
    pub label: String,
    pub picture: String,
    pub email: String,
    pub phone: String,
    pub website: String,
    pub summary: String,
    pub location: Location,
    pub profiles: Vec<Profile>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LegacyWork {
    pub company: String,
    pub position: String,
    pub website: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    pub summary: String,
    pub highlights: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LegacyVolunteer {
    pub organization: String,
    pub position: String,
    pub website: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    pub summary: String,
    pub highlights: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LegacyEducation {
    pub institution: String,
    pub area: String,
    pub study_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    pub gpa: String,
    pub courses: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LegacyPublication {
    pub name: String,
    pub publisher: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_date: Option<String>,
    pub website: String,
    pub summary: String,
}
