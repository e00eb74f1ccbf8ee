//! Where each resume section lives in the source graph.
//!
//! ToC keys are listed profile-view first, dash second. Type strings back the
//! root-element and type-scan fallbacks.

use crate::graph::GroupConfig;

#[derive(Debug, Clone, Copy)]
pub struct SectionKeys {
    pub toc_keys: &'static [&'static str],
    pub types: &'static [&'static str],
}

pub const PROFILE: SectionKeys = SectionKeys {
    toc_keys: &["*profile"],
    types: &[
        "com.linkedin.voyager.identity.profile.Profile",
        "com.linkedin.voyager.dash.identity.profile.Profile",
    ],
};

pub const MINI_PROFILE_KEY: &str = "*miniProfile";

pub const LANGUAGES: SectionKeys = SectionKeys {
    toc_keys: &["*languageView", "*profileLanguages"],
    types: &[
        "com.linkedin.voyager.identity.profile.Language",
        "com.linkedin.voyager.dash.identity.profile.Language",
    ],
};

pub const ATTACHMENTS: SectionKeys = SectionKeys {
    toc_keys: &["*summaryTreasuryMedias", "*profileTreasuryMediaPosition"],
    types: &["com.linkedin.voyager.dash.identity.profile.treasury.TreasuryMedia"],
};

pub const EDUCATION: SectionKeys = SectionKeys {
    toc_keys: &["*educationView", "*profileEducations"],
    types: &[
        "com.linkedin.voyager.identity.profile.Education",
        "com.linkedin.voyager.dash.identity.profile.Education",
    ],
};

pub const WORK_POSITIONS: SectionKeys = SectionKeys {
    toc_keys: &["*positionView"],
    types: &[
        "com.linkedin.voyager.identity.profile.Position",
        "com.linkedin.voyager.dash.identity.profile.Position",
    ],
};

/// Positions clustered by employer, across every known physical layout.
pub const WORK_GROUPS: GroupConfig = GroupConfig {
    multi_root_key: "*profilePositionGroups",
    single_root_type: "com.linkedin.voyager.dash.identity.profile.PositionGroup",
    group_collection_key: "*profilePositionInPositionGroup",
    fallback_group_view_key: "*positionGroupView",
    fallback_group_array_key: "*positions",
    fallback_toc_keys: WORK_POSITIONS.toc_keys,
    fallback_type_strings: WORK_POSITIONS.types,
};

/// Keys whose paging metadata decides whether the work section is complete.
pub const WORK_PAGING_KEYS: &[&str] = &["*profilePositionGroups", "*positionGroupView", "*positionView"];

pub const VOLUNTEER: SectionKeys = SectionKeys {
    toc_keys: &["*volunteerExperienceView", "*profileVolunteerExperiences"],
    types: &[
        "com.linkedin.voyager.identity.profile.VolunteerExperience",
        "com.linkedin.voyager.dash.identity.profile.VolunteerExperience",
    ],
};

pub const CERTIFICATES: SectionKeys = SectionKeys {
    toc_keys: &["*certificationView", "*profileCertifications"],
    types: &[
        "com.linkedin.voyager.identity.profile.Certification",
        "com.linkedin.voyager.dash.identity.profile.Certification",
    ],
};

pub const SKILLS: SectionKeys = SectionKeys {
    toc_keys: &["*skillView", "*profileSkills"],
    types: &[
        "com.linkedin.voyager.identity.profile.Skill",
        "com.linkedin.voyager.dash.identity.profile.Skill",
    ],
};

pub const PROJECTS: SectionKeys = SectionKeys {
    toc_keys: &["*projectView", "*profileProjects"],
    types: &[
        "com.linkedin.voyager.identity.profile.Project",
        "com.linkedin.voyager.dash.identity.profile.Project",
    ],
};

pub const AWARDS: SectionKeys = SectionKeys {
    toc_keys: &["*honorView", "*profileHonors"],
    types: &[
        "com.linkedin.voyager.identity.profile.Honor",
        "com.linkedin.voyager.dash.identity.profile.Honor",
    ],
};

pub const PUBLICATIONS: SectionKeys = SectionKeys {
    toc_keys: &["*publicationView", "*profilePublications"],
    types: &[
        "com.linkedin.voyager.identity.profile.Publication",
        "com.linkedin.voyager.dash.identity.profile.Publication",
    ],
};
