// Pure normalizers for source-specific partial dates and locale-wrapped fields.

pub mod dates;
pub mod locale;

pub use dates::{extract_date_range, extract_single_date};
pub use locale::{locale_tag, localize_response};
