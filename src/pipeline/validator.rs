use crate::config::{MetroConfig, PipelineConfig};
use crate::domain::EventCandidate;
use crate::error::Result;
use crate::pipeline::enrich::Enricher;
use chrono::{Duration, NaiveDateTime, Utc};
use chrono_tz::Tz;
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;

static DIGITS_ONLY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[\d/\-\s:]+$").expect("valid digits-only regex"));
static MONTH_DAY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(jan|feb|mar|apr|may|jun|jul|aug|sep|oct|nov|dec)\d{1,2}$")
        .expect("valid month-day regex")
});
static HTML_ENTITY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"&[a-z]+;").expect("valid entity regex"));
static REPEAT_PUNCT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([!?.]){2,}").expect("valid punctuation regex"));

/// Titles that are navigation noise, not events.
const GENERIC_TITLES: &[&str] = &["event", "show", "performance", "image", "home", "calendar"];
const UI_FRAGMENTS: &[&str] = &["jump to", "click here", "more info", "iframe", "please update"];

/// Why a candidate was refused. Rejections are logged and dropped, never
/// repaired or retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectionReason {
    TitleTooShort,
    DescriptionTooShort,
    StartTooFarPast,
    StartTooFarFuture,
    LowQualityTitle,
}

impl fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let message = match self {
            RejectionReason::TitleTooShort => "Title is too short",
            RejectionReason::DescriptionTooShort => "Description is too short",
            RejectionReason::StartTooFarPast => "Event date is too far in the past",
            RejectionReason::StartTooFarFuture => "Event date is too far in the future",
            RejectionReason::LowQualityTitle => "Title appears to be low quality",
        };
        f.write_str(message)
    }
}

/// Structural and semantic gatekeeper for scraped candidates.
///
/// `clean_and_enhance` runs first so the gate judges the cleaned text; a
/// candidate that fails any check is dropped with a specific reason.
pub struct Validator {
    metro_tz: Tz,
    default_city: String,
    default_state: String,
    max_past: Duration,
    max_future: Duration,
    enricher: Enricher,
}

impl Validator {
    pub fn new(metro: &MetroConfig, pipeline: &PipelineConfig, enricher: Enricher) -> Result<Self> {
        Ok(Self {
            metro_tz: metro.tz()?,
            default_city: metro.city.clone(),
            default_state: metro.state.clone(),
            max_past: Duration::days(pipeline.max_past_days),
            max_future: Duration::days(pipeline.max_future_days),
            enricher,
        })
    }

    /// Civil "now" in the metro region, independent of the host clock's
    /// zone. Candidate times are civil times in the same region, so the
    /// window comparison stays apples-to-apples.
    fn local_now(&self) -> NaiveDateTime {
        Utc::now().with_timezone(&self.metro_tz).naive_local()
    }

    /// Gate checks in order, short-circuiting on the first failure.
    pub fn validate(&self, candidate: &EventCandidate) -> std::result::Result<(), RejectionReason> {
        if candidate.title.trim().chars().count() < 3 {
            return Err(RejectionReason::TitleTooShort);
        }

        if candidate.description.trim().chars().count() < 10 {
            return Err(RejectionReason::DescriptionTooShort);
        }

        let now = self.local_now();
        if candidate.start_datetime < now - self.max_past {
            return Err(RejectionReason::StartTooFarPast);
        }
        if candidate.start_datetime > now + self.max_future {
            return Err(RejectionReason::StartTooFarFuture);
        }

        if is_low_quality_title(&candidate.title) {
            return Err(RejectionReason::LowQualityTitle);
        }

        Ok(())
    }

    /// Normalize text fields, default the location to the metro region, and
    /// attach derived classification signals. Always succeeds.
    pub fn clean_and_enhance(&self, candidate: &mut EventCandidate) {
        candidate.title = clean_text(&candidate.title);
        candidate.description = clean_text(&candidate.description);

        if let Some(venue) = candidate.venue_name.take() {
            candidate.venue_name = Some(clean_text(&venue));
        }
        if let Some(address) = candidate.street_address.take() {
            candidate.street_address = Some(clean_text(&address));
        }

        if is_blank(&candidate.city) {
            candidate.city = Some(self.default_city.clone());
        }
        if is_blank(&candidate.state) {
            candidate.state = Some(self.default_state.clone());
        }

        self.enricher.enrich(candidate);
    }
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().map_or(true, |s| s.trim().is_empty())
}

/// Garbage-title screen: date fragments, generic single words, and UI text
/// that scrapers pick up from page chrome.
pub fn is_low_quality_title(title: &str) -> bool {
    let title = title.trim().to_lowercase();

    if title.chars().count() < 3 {
        return true;
    }

    if DIGITS_ONLY_RE.is_match(&title) {
        return true;
    }

    if MONTH_DAY_RE.is_match(&title) {
        return true;
    }

    if GENERIC_TITLES.contains(&title.as_str()) {
        return true;
    }

    UI_FRAGMENTS.iter().any(|fragment| title.contains(fragment))
}

/// Normalize scraped text: strip bare named entities, collapse runs of
/// terminal punctuation, collapse whitespace, trim.
pub fn clean_text(text: &str) -> String {
    let without_entities = HTML_ENTITY_RE.replace_all(text, " ");
    let collapsed_punct = REPEAT_PUNCT_RE.replace_all(&without_entities, "$1");
    collapsed_punct
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
