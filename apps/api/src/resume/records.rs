//! Schema-neutral section records.
//!
//! Mappers build one neutral record per source entity; [`ResumeEntry::project`]
//! fans it out into every schema accumulator, so a fact is resolved once and
//! only field names differ between the outputs.

use crate::normalize::dates::DateRange;
use crate::resume::common::{Award, Language, Skill};
use crate::resume::legacy::{LegacyEducation, LegacyPublication, LegacyVolunteer, LegacyWork};
use crate::resume::stable::{
    Certificate, Project, StableEducation, StablePublication, StableVolunteer, StableWork,
};
use crate::resume::ResumeDocuments;

pub trait ResumeEntry {
    fn project(self, documents: &mut ResumeDocuments);
}

/// Sparse update of the basics block. `None` leaves the current value untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BasicsPatch {
    pub name: Option<String>,
    pub label: Option<String>,
    pub picture: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub summary: Option<String>,
    pub address: Option<String>,
    pub postal_code: Option<String>,
    pub country_code: Option<String>,
}

fn set_both(value: Option<String>, legacy: &mut String, stable: &mut String) {
    if let Some(value) = value {
        legacy.clone_from(&value);
        *stable = value;
    }
}

impl ResumeEntry for BasicsPatch {
    fn project(self, documents: &mut ResumeDocuments) {
        let legacy = &mut documents.legacy.basics;
        let stable = &mut documents.stable.basics;
        set_both(self.name, &mut legacy.name, &mut stable.name);
        set_both(self.label, &mut legacy.label, &mut stable.label);
        set_both(self.picture, &mut legacy.picture, &mut stable.image);
        set_both(self.email, &mut legacy.email, &mut stable.email);
        set_both(self.phone, &mut legacy.phone, &mut stable.phone);
        set_both(self.website, &mut legacy.website, &mut stable.url);
        set_both(self.summary, &mut legacy.summary, &mut stable.summary);
        set_both(
            self.address,
            &mut legacy.location.address,
            &mut stable.location.address,
        );
        set_both(
            self.postal_code,
            &mut legacy.location.postal_code,
            &mut stable.location.postal_code,
        );
        set_both(
            self.country_code,
            &mut legacy.location.country_code,
            &mut stable.location.country_code,
        );
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorkRecord {
    pub company: String,
    pub position: String,
    pub company_url: String,
    pub location: Option<String>,
    pub summary: String,
    pub dates: DateRange,
}

impl ResumeEntry for WorkRecord {
    fn project(self, documents: &mut ResumeDocuments) {
        documents.legacy.work.push(LegacyWork {
            company: self.company.clone(),
            position: self.position.clone(),
            website: self.company_url.clone(),
            start_date: self.dates.start.clone(),
            end_date: self.dates.end.clone(),
            summary: self.summary.clone(),
            highlights: Vec::new(),
        });
        documents.stable.work.push(StableWork {
            name: self.company,
            position: self.position,
            url: self.company_url,
            location: self.location,
            start_date: self.dates.start,
            end_date: self.dates.end,
            summary: self.summary,
            highlights: Vec::new(),
        });
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct VolunteerRecord {
    pub organization: String,
    pub position: String,
    pub organization_url: String,
    pub summary: String,
    pub dates: DateRange,
}

impl ResumeEntry for VolunteerRecord {
    fn project(self, documents: &mut ResumeDocuments) {
        documents.legacy.volunteer.push(LegacyVolunteer {
            organization: self.organization.clone(),
            position: self.position.clone(),
            website: self.organization_url.clone(),
            start_date: self.dates.start.clone(),
            end_date: self.dates.end.clone(),
            summary: self.summary.clone(),
            highlights: Vec::new(),
        });
        documents.stable.volunteer.push(StableVolunteer {
            organization: self.organization,
            position: self.position,
            url: self.organization_url,
            start_date: self.dates.start,
            end_date: self.dates.end,
            summary: self.summary,
            highlights: Vec::new(),
        });
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EducationRecord {
    pub institution: String,
    pub area: String,
    pub study_type: String,
    pub grade: String,
    pub courses: Vec<String>,
    pub dates: DateRange,
}

impl ResumeEntry for EducationRecord {
    fn project(self, documents: &mut ResumeDocuments) {
        documents.legacy.education.push(LegacyEducation {
            institution: self.institution.clone(),
            area: self.area.clone(),
            study_type: self.study_type.clone(),
            start_date: self.dates.start.clone(),
            end_date: self.dates.end.clone(),
            gpa: self.grade.clone(),
            courses: self.courses.clone(),
        });
        documents.stable.education.push(StableEducation {
            institution: self.institution,
            url: String::new(),
            area: self.area,
            study_type: self.study_type,
            start_date: self.dates.start,
            end_date: self.dates.end,
            score: self.grade,
            courses: self.courses,
        });
    }
}

/// Certificates only exist in the stable schema.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CertificateRecord {
    pub name: String,
    pub issuer: String,
    pub url: String,
    pub date: Option<String>,
}

impl ResumeEntry for CertificateRecord {
    fn project(self, documents: &mut ResumeDocuments) {
        documents.stable.certificates.push(Certificate {
            name: self.name,
            date: self.date,
            url: self.url,
            issuer: self.issuer,
        });
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SkillRecord {
    pub name: String,
}

impl ResumeEntry for SkillRecord {
    fn project(self, documents: &mut ResumeDocuments) {
        let skill = Skill {
            name: self.name,
            level: String::new(),
            keywords: Vec::new(),
        };
        documents.legacy.skills.push(skill.clone());
        documents.stable.skills.push(skill);
    }
}

/// Projects only exist in the stable schema.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProjectRecord {
    pub name: String,
    pub description: String,
    pub url: String,
    pub dates: DateRange,
}

impl ProjectRecord {
    pub fn into_project(self) -> Project {
        Project {
            name: self.name,
            description: self.description,
            highlights: Vec::new(),
            keywords: Vec::new(),
            start_date: self.dates.start,
            end_date: self.dates.end,
            url: self.url,
            roles: Vec::new(),
        }
    }
}

impl ResumeEntry for ProjectRecord {
    fn project(self, documents: &mut ResumeDocuments) {
        documents.stable.projects.push(self.into_project());
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AwardRecord {
    pub title: String,
    pub awarder: String,
    pub summary: String,
    pub date: Option<String>,
}

impl ResumeEntry for AwardRecord {
    fn project(self, documents: &mut ResumeDocuments) {
        let award = Award {
            title: self.title,
            date: self.date,
            awarder: self.awarder,
            summary: self.summary,
        };
        documents.legacy.awards.push(award.clone());
        documents.stable.awards.push(award);
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PublicationRecord {
    pub name: String,
    pub publisher: String,
    pub url: String,
    pub summary: String,
    pub release_date: Option<String>,
}

impl ResumeEntry for PublicationRecord {
    fn project(self, documents: &mut ResumeDocuments) {
        documents.legacy.publications.push(LegacyPublication {
            name: self.name.clone(),
            publisher: self.publisher.clone(),
            release_date: self.release_date.clone(),
            website: self.url.clone(),
            summary: self.summary.clone(),
        });
        documents.stable.publications.push(StablePublication {
            name: self.name,
            publisher: self.publisher,
            release_date: self.release_date,
            url: self.url,
            summary: self.summary,
        });
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LanguageRecord {
    pub language: String,
    pub fluency: String,
}

impl ResumeEntry for LanguageRecord {
    fn project(self, documents: &mut ResumeDocuments) {
        let language = Language {
            language: self.language,
            fluency: self.fluency,
        };
        documents.legacy.languages.push(language.clone());
        documents.stable.languages.push(language);
    }
}
