use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::graph::Entity;

/// Days per month, February fixed at 28. Leap years are not considered.
const DAYS_IN_MONTH: [u32; 12] = [31, 28, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];

/// A source date where any component may be missing. Month and day are 1-based.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartialDate {
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub month: Option<u32>,
    #[serde(default)]
    pub day: Option<u32>,
}

impl PartialDate {
    pub fn year(year: i32) -> Self {
        Self {
            year: Some(year),
            ..Self::default()
        }
    }

    pub fn from_value(value: &Value) -> Option<Self> {
        serde_json::from_value(value.clone()).ok()
    }

    fn valid_month(&self) -> Option<u32> {
        self.month.filter(|m| (1..=12).contains(m))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Bound {
    Start,
    End,
}

/// `YYYY-MM-DD`, defaulting to the first day of the year/month. Empty when the year is unknown.
pub fn parse_start_date(date: &PartialDate) -> String {
    format_date(date, Bound::Start)
}

/// `YYYY-MM-DD`, defaulting to the last day of the year/month. Empty when the year is unknown.
pub fn parse_end_date(date: &PartialDate) -> String {
    format_date(date, Bound::End)
}

fn format_date(date: &PartialDate, bound: Bound) -> String {
    let Some(year) = date.year else {
        return String::new();
    };
    let month = date.valid_month().unwrap_or(match bound {
        Bound::Start => 1,
        Bound::End => 12,
    });
    let day = date.day.unwrap_or(match bound {
        Bound::Start => 1,
        Bound::End => DAYS_IN_MONTH[(month - 1) as usize],
    });
    format!("{year}-{month:02}-{day:02}")
}

/// Start/end strings ready to attach to a resume entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DateRange {
    pub start: Option<String>,
    pub end: Option<String>,
}

/// Reads the entity's time period (`timePeriod` or `dateRange`), with bounds
/// under `startDate`/`start` and `endDate`/`end`. A bound is only produced
/// when the source carries a usable one: malformed or year-less bounds are
/// treated as absent.
pub fn extract_date_range(entity: &Entity) -> DateRange {
    let Some(period) = entity.any_field(&["timePeriod", "dateRange"]) else {
        return DateRange::default();
    };
    let bound = |names: [&str; 2], format: fn(&PartialDate) -> String| {
        names
            .iter()
            .find_map(|name| period.get(*name).filter(|v| !v.is_null()))
            .and_then(PartialDate::from_value)
            .map(|d| format(&d))
            .filter(|date| !date.is_empty())
    };
    DateRange {
        start: bound(["startDate", "start"], parse_start_date),
        end: bound(["endDate", "end"], parse_end_date),
    }
}

/// A single-date field (award issue date, publication date) normalized as a start date.
pub fn extract_single_date(entity: &Entity, names: &[&str]) -> Option<String> {
    entity
        .any_field(names)
        .and_then(PartialDate::from_value)
        .map(|d| parse_start_date(&d))
        .filter(|date| !date.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn entity(value: Value) -> Entity {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_start_year_only() {
        assert_eq!(parse_start_date(&PartialDate::year(2020)), "2020-01-01");
    }

    #[test]
    fn test_end_year_only() {
        assert_eq!(parse_end_date(&PartialDate::year(2020)), "2020-12-31");
    }

    #[test]
    fn test_end_february_is_always_28() {
        let date = PartialDate { year: Some(2020), month: Some(2), day: None };
        assert_eq!(parse_end_date(&date), "2020-02-28");
    }

    #[test]
    fn test_missing_year_is_empty() {
        assert_eq!(parse_start_date(&PartialDate::default()), "");
        let no_year = PartialDate { year: None, month: Some(3), day: Some(4) };
        assert_eq!(parse_end_date(&no_year), "");
    }

    #[test]
    fn test_components_zero_padded() {
        let date = PartialDate { year: Some(2019), month: Some(3), day: Some(7) };
        assert_eq!(parse_start_date(&date), "2019-03-07");
        assert_eq!(parse_end_date(&date), "2019-03-07");
    }

    #[test]
    fn test_end_of_thirty_day_month() {
        let date = PartialDate { year: Some(2018), month: Some(11), day: None };
        assert_eq!(parse_end_date(&date), "2018-11-30");
    }

    #[test]
    fn test_out_of_range_month_treated_as_missing() {
        let date = PartialDate { year: Some(2018), month: Some(13), day: None };
        assert_eq!(parse_end_date(&date), "2018-12-31");
        assert_eq!(parse_start_date(&date), "2018-01-01");
    }

    #[test]
    fn test_date_range_from_time_period() {
        let e = entity(json!({
            "timePeriod": { "startDate": { "year": 2015, "month": 6 }, "endDate": { "year": 2017 } }
        }));
        let range = extract_date_range(&e);
        assert_eq!(range.start.as_deref(), Some("2015-06-01"));
        assert_eq!(range.end.as_deref(), Some("2017-12-31"));
    }

    #[test]
    fn test_date_range_alternate_names_and_open_end() {
        let e = entity(json!({ "dateRange": { "start": { "year": 2021, "month": 9 } } }));
        let range = extract_date_range(&e);
        assert_eq!(range.start.as_deref(), Some("2021-09-01"));
        assert_eq!(range.end, None);
    }

    #[test]
    fn test_malformed_bound_is_absent() {
        let e = entity(json!({
            "timePeriod": { "startDate": "spring 2015", "endDate": { "month": 4 } }
        }));
        assert_eq!(extract_date_range(&e), DateRange::default());

        let e = entity(json!({
            "timePeriod": { "startDate": { "year": "soon" }, "endDate": { "year": 2017, "month": 4 } }
        }));
        let range = extract_date_range(&e);
        assert_eq!(range.start, None);
        assert_eq!(range.end.as_deref(), Some("2017-04-30"));
    }

    #[test]
    fn test_no_period_no_dates() {
        assert_eq!(extract_date_range(&entity(json!({}))), DateRange::default());
    }

    #[test]
    fn test_single_date() {
        let e = entity(json!({ "issuedOn": { "year": 2012, "month": 5 } }));
        assert_eq!(
            extract_single_date(&e, &["issueDate", "issuedOn"]).as_deref(),
            Some("2012-05-01")
        );
    }
}
