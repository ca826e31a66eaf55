use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Closed category enumeration for catalog events.
///
/// Wire names are the lowercase phrases downstream consumers already rely
/// on. A candidate without a category stays `None`; the pipeline never
/// forces a default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventCategory {
    #[serde(rename = "music")]
    Music,
    #[serde(rename = "arts and culture")]
    ArtsAndCulture,
    #[serde(rename = "food and drink")]
    FoodAndDrink,
    #[serde(rename = "theater")]
    Theater,
    #[serde(rename = "lectures")]
    Lectures,
    #[serde(rename = "sports")]
    Sports,
    #[serde(rename = "community")]
    Community,
    #[serde(rename = "other")]
    Other,
}

impl EventCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventCategory::Music => "music",
            EventCategory::ArtsAndCulture => "arts and culture",
            EventCategory::FoodAndDrink => "food and drink",
            EventCategory::Theater => "theater",
            EventCategory::Lectures => "lectures",
            EventCategory::Sports => "sports",
            EventCategory::Community => "community",
            EventCategory::Other => "other",
        }
    }
}

impl fmt::Display for EventCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A scraped event before identity assignment.
///
/// Candidates are produced by collectors, mutated in place by the validator
/// (text cleaned, derived flags attached), and possibly folded into another
/// candidate during deduplication. `start_datetime` is a civil time local to
/// the metro region. `source_url`/`source_name` are the provenance anchor
/// and are always present.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventCandidate {
    pub title: String,
    pub description: String,
    pub start_datetime: NaiveDateTime,
    #[serde(default)]
    pub end_datetime: Option<NaiveDateTime>,
    #[serde(default)]
    pub all_day: bool,

    #[serde(default)]
    pub venue_name: Option<String>,
    #[serde(default)]
    pub street_address: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub zip_code: Option<String>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,

    #[serde(default)]
    pub category: Option<EventCategory>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub age_restrictions: Option<String>,
    #[serde(default)]
    pub cost: Option<String>,
    #[serde(default)]
    pub registration_required: bool,

    pub source_url: String,
    pub source_name: String,

    #[serde(default)]
    pub contact_email: Option<String>,
    #[serde(default)]
    pub contact_phone: Option<String>,
    #[serde(default)]
    pub website_url: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub recurring_pattern: Option<serde_json::Value>,

    /// Derived by the enricher, never scraper-supplied.
    #[serde(default)]
    pub family_friendly: bool,
}

impl EventCandidate {
    /// Bare candidate with only the required fields set.
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        start_datetime: NaiveDateTime,
        source_url: impl Into<String>,
        source_name: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            start_datetime,
            end_datetime: None,
            all_day: false,
            venue_name: None,
            street_address: None,
            city: None,
            state: None,
            zip_code: None,
            latitude: None,
            longitude: None,
            category: None,
            tags: Vec::new(),
            age_restrictions: None,
            cost: None,
            registration_required: false,
            source_url: source_url.into(),
            source_name: source_name.into(),
            contact_email: None,
            contact_phone: None,
            website_url: None,
            image_url: None,
            recurring_pattern: None,
            family_friendly: false,
        }
    }
}

/// A finalized catalog event. The field names here are a stability contract
/// toward the query API and the static renderer that consume the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventRecord {
    pub id: Uuid,
    #[serde(flatten)]
    pub event: EventCandidate,
    pub scraped_at: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
}

impl EventRecord {
    /// Assign identity and timestamps to a surviving candidate. This is the
    /// only place identity is ever minted.
    pub fn finalize(event: EventCandidate, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            event,
            scraped_at: now,
            last_updated: now,
        }
    }
}
