pub mod parse;

pub use parse::{
    apply_section_page, convert_response, parse_profile_response, response_default_locale,
    AcquisitionMethod, ProfileParseSummary,
};
