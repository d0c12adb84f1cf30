use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;

static SITE_STAMP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)<font[^>]*>((?:January|February|March|April|May|June|July|August|September|October|November|December)\s+\d{4})",
    )
    .expect("date stamp pattern must compile")
});

static ISO_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(\d{4})-(\d{2})-(\d{2})\b").expect("iso date pattern must compile")
});

static MONTH_DAY_YEAR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(January|February|March|April|May|June|July|August|September|October|November|December)\s+(\d{1,2}),?\s+(\d{4})\b",
    )
    .expect("month day year pattern must compile")
});

static MONTH_YEAR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(January|February|March|April|May|June|July|August|September|October|November|December)\s+(\d{4})\b",
    )
    .expect("month year pattern must compile")
});

/// Seam for generic publication-date inference over a whole page, used when
/// the site-specific date stamp is absent or unparseable.
pub trait InferDate {
    fn infer(&self, html: &str) -> Option<String>;
}

/// Resolves the publication date of one essay page as `YYYY-MM-DD`.
///
/// The site stamps essays with a styled `Month YYYY` fragment; that stamp
/// wins whenever it parses. Absence of any date is a valid result, never an
/// error.
pub fn resolve_date(html: &str, fallback: &dyn InferDate) -> Option<String> {
    site_date_stamp(html).or_else(|| fallback.infer(html))
}

fn site_date_stamp(html: &str) -> Option<String> {
    let caps = SITE_STAMP.captures(html)?;
    parse_month_year(&caps[1])
}

fn parse_month_year(value: &str) -> Option<String> {
    let collapsed = value.split_whitespace().collect::<Vec<_>>().join(" ");
    for format in ["%B %Y", "%b %Y"] {
        if let Ok(date) = NaiveDate::parse_from_str(&format!("{collapsed}-01"), &format!("{format}-%d"))
        {
            return Some(date.format("%Y-%m-%d").to_string());
        }
    }
    None
}

/// Default date inference: scans the page for common date shapes, most
/// specific first, and normalizes the first one that parses.
#[derive(Debug, Default)]
pub struct HeuristicDates;

impl InferDate for HeuristicDates {
    fn infer(&self, html: &str) -> Option<String> {
        if let Some(date) = find_iso_date(html) {
            return Some(date);
        }
        if let Some(date) = find_month_day_year(html) {
            return Some(date);
        }
        find_month_year(html)
    }
}

fn find_iso_date(text: &str) -> Option<String> {
    for caps in ISO_DATE.captures_iter(text) {
        let year = caps[1].parse().ok()?;
        let month = caps[2].parse().ok()?;
        let day = caps[3].parse().ok()?;
        if let Some(date) = NaiveDate::from_ymd_opt(year, month, day) {
            return Some(date.format("%Y-%m-%d").to_string());
        }
    }
    None
}

fn find_month_day_year(text: &str) -> Option<String> {
    for caps in MONTH_DAY_YEAR.captures_iter(text) {
        let candidate = format!("{} {} {}", &caps[1], &caps[2], &caps[3]);
        if let Ok(date) = NaiveDate::parse_from_str(&candidate, "%B %d %Y") {
            return Some(date.format("%Y-%m-%d").to_string());
        }
    }
    None
}

fn find_month_year(text: &str) -> Option<String> {
    let caps = MONTH_YEAR.captures(text)?;
    parse_month_year(&format!("{} {}", &caps[1], &caps[2]))
}
