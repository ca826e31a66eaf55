use crate::domain::{EventCandidate, EventCategory};
use crate::error::{AggregatorError, Result};
use crate::heuristics::HeuristicCatalog;
use chrono::Timelike;
use regex::Regex;
use tracing::debug;

/// Attaches derived classification signals to cleaned candidates: the
/// family-friendly flag and the food/drink category override. Both are pure
/// functions of the candidate plus the heuristic catalog.
pub struct Enricher {
    catalog: HeuristicCatalog,
    family_keywords: Regex,
    age_range: Regex,
    venue_vocabulary: Regex,
    menu_keywords: Regex,
}

impl Enricher {
    pub fn new(catalog: HeuristicCatalog) -> Result<Self> {
        let family_keywords = word_boundary_regex(&catalog.family.keywords)?;
        let venue_vocabulary = word_boundary_regex(&catalog.food_drink.venue_vocabulary)?;
        let menu_keywords = word_boundary_regex(&catalog.food_drink.menu_keywords)?;
        // Explicit numeric age ranges like "ages 3-5" or "age 2+"
        let age_range = Regex::new(r"\bages?\s+\d{1,2}\s*[-–+]")
            .map_err(|e| AggregatorError::Config(format!("invalid age-range pattern: {e}")))?;

        Ok(Self {
            catalog,
            family_keywords,
            age_range,
            venue_vocabulary,
            menu_keywords,
        })
    }

    /// Catalog revision in use, for run logs.
    pub fn catalog_version(&self) -> &str {
        &self.catalog.version
    }

    pub fn enrich(&self, candidate: &mut EventCandidate) {
        candidate.family_friendly = self.is_family_friendly(candidate);

        if let Some(category) = self.food_drink_override(candidate) {
            if candidate.category != Some(category) {
                debug!(
                    title = %candidate.title,
                    previous = ?candidate.category,
                    "category overridden to food and drink"
                );
            }
            candidate.category = Some(category);
        }
    }

    /// Family-friendly signal from title + description + start hour.
    ///
    /// Evening events (start hour at or past the cutoff) qualify only via an
    /// explicit inclusion phrase; generic child vocabulary like a passing
    /// "kids' menu" must not mark an adult evening listing.
    pub fn is_family_friendly(&self, candidate: &EventCandidate) -> bool {
        let text = format!("{} {}", candidate.title, candidate.description).to_lowercase();

        if candidate.start_datetime.hour() >= self.catalog.family.evening_cutoff_hour {
            return self
                .catalog
                .family
                .evening_inclusion_phrases
                .iter()
                .any(|phrase| text.contains(phrase));
        }

        self.family_keywords.is_match(&text)
            || self.age_range.is_match(&text)
            || self
                .catalog
                .family
                .phrases
                .iter()
                .any(|phrase| text.contains(phrase))
    }

    /// Forced food-and-drink reclassification, first matching rule wins:
    /// excluded venue kinds block everything, then known establishments,
    /// then venue-type vocabulary on venue/source name, then food/drink
    /// vocabulary in the text.
    pub fn food_drink_override(&self, candidate: &EventCandidate) -> Option<EventCategory> {
        let venue = candidate
            .venue_name
            .as_deref()
            .unwrap_or("")
            .trim()
            .to_lowercase();
        let source = candidate.source_name.trim().to_lowercase();

        if self
            .catalog
            .food_drink
            .venue_exclusions
            .iter()
            .any(|fragment| venue.contains(fragment))
        {
            return None;
        }

        let known = self
            .catalog
            .food_drink
            .known_venues
            .iter()
            .any(|name| name == &venue || name == &source);
        if known {
            return Some(EventCategory::FoodAndDrink);
        }

        if (!venue.is_empty() && self.venue_vocabulary.is_match(&venue))
            || self.venue_vocabulary.is_match(&source)
        {
            return Some(EventCategory::FoodAndDrink);
        }

        let text = format!("{} {}", candidate.title, candidate.description).to_lowercase();
        if self.menu_keywords.is_match(&text) {
            return Some(EventCategory::FoodAndDrink);
        }

        None
    }
}

/// One alternation over all terms, anchored on word boundaries. Terms come
/// from catalog data, so they are escaped before compilation.
fn word_boundary_regex(terms: &[String]) -> Result<Regex> {
    let alternation = terms
        .iter()
        .map(|term| regex::escape(term))
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!(r"\b(?:{alternation})\b"))
        .map_err(|e| AggregatorError::Config(format!("invalid heuristic pattern: {e}")))
}
