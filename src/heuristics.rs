use crate::error::{AggregatorError, Result};
use serde::Deserialize;
use std::fs;

/// Versioned lookup tables driving the enrichment heuristics.
///
/// The lists are data, not control flow: operators extend them through a
/// TOML file named by `heuristics_file` in the config without touching the
/// matching logic. The built-in defaults are the curated tables the catalog
/// ships with.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HeuristicCatalog {
    /// Catalog revision, logged with every run so enrichment output can be
    /// traced back to the table that produced it.
    pub version: String,
    pub family: FamilyRules,
    pub food_drink: FoodDrinkRules,
}

/// Tables for the family-friendly signal.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FamilyRules {
    /// Start hour (24h, metro-local) at and after which only an explicit
    /// inclusion phrase can mark an event family-friendly. Generic child
    /// vocabulary shows up in adult evening listings ("kids' menu") and must
    /// not trigger there.
    pub evening_cutoff_hour: u32,
    /// Phrases that alone qualify an evening event.
    pub evening_inclusion_phrases: Vec<String>,
    /// Single words, matched on word boundaries ("teen" must not fire
    /// inside "nineteenth").
    pub keywords: Vec<String>,
    /// Multi-word phrases, matched by substring.
    pub phrases: Vec<String>,
}

/// Tables for the food/drink category override.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FoodDrinkRules {
    /// Venue-name fragments that block the override entirely. Libraries and
    /// museums host the occasional tasting but are not food/drink venues.
    pub venue_exclusions: Vec<String>,
    /// Known food-and-drink establishments, matched exactly against the
    /// case-folded venue or source name.
    pub known_venues: Vec<String>,
    /// Venue-type vocabulary, matched on word boundaries against the venue
    /// or source name.
    pub venue_vocabulary: Vec<String>,
    /// Food/drink vocabulary matched against title + description.
    pub menu_keywords: Vec<String>,
}

impl Default for HeuristicCatalog {
    fn default() -> Self {
        Self {
            version: "v1.0.0".to_string(),
            family: FamilyRules::default(),
            food_drink: FoodDrinkRules::default(),
        }
    }
}

impl Default for FamilyRules {
    fn default() -> Self {
        Self {
            evening_cutoff_hour: 20,
            evening_inclusion_phrases: strings(&[
                "all ages",
                "all-ages",
                "family friendly",
                "family-friendly",
                "family event",
                "family program",
                "family fun",
                "family day",
            ]),
            keywords: strings(&[
                "kid",
                "kids",
                "child",
                "children",
                "baby",
                "babies",
                "toddler",
                "toddlers",
                "infant",
                "infants",
                "youth",
                "teen",
                "teens",
                "teenager",
                "teenagers",
                "puppet",
                "puppets",
                "pajama",
                "pajamas",
                "caregiver",
                "caregivers",
            ]),
            phrases: strings(&[
                "story time",
                "storytime",
                "story hour",
                "lapsit",
                "lap sit",
                "family program",
                "family event",
                "family fun",
                "family day",
                "family friendly",
                "family-friendly",
                "puppet show",
                "all ages",
                "all-ages",
                "arts and crafts",
                "sing-along",
                "sing along",
                "singalong",
                "read-aloud",
                "read aloud",
                "playgroup",
                "play group",
                "playdate",
                "play date",
                "pj storytime",
                "preschool",
                "kindergarten",
                "young reader",
                "young readers",
                "parent and child",
            ]),
        }
    }
}

impl Default for FoodDrinkRules {
    fn default() -> Self {
        Self {
            venue_exclusions: strings(&[
                "library", "branch", "museum", "theater", "theatre", "school", "church",
            ]),
            known_venues: strings(&[
                "lamplighter brewing co.",
                "lamplighter brewing",
                "lamplighter cx",
                "aeronaut brewing company",
                "aeronaut brewing",
                "portico brewing",
                "remnant brewing",
                "cambridge brewing company",
                "winter hill brewing company",
            ]),
            venue_vocabulary: strings(&[
                "brewing",
                "brewery",
                "brewpub",
                "taproom",
                "tap room",
                "beer garden",
                "beer hall",
                "winery",
                "wine bar",
                "distillery",
                "restaurant",
                "cafe",
                "café",
                "bistro",
                "diner",
                "bar",
                "pub",
                "tavern",
                "lounge",
                "grill",
                "eatery",
                "coffeehouse",
                "bakery",
                "patisserie",
            ]),
            menu_keywords: strings(&[
                "beer",
                "wine tasting",
                "cocktail",
                "cocktails",
                "spirits",
                "whiskey",
                "bourbon",
                "happy hour",
                "craft beer",
                "ipa",
                "lager",
                "stout",
                "cider",
                "mead",
                "food truck",
                "pop-up dinner",
                "cooking class",
                "culinary",
                "farmers market",
                "food festival",
            ]),
        }
    }
}

impl HeuristicCatalog {
    pub fn load(path: &str) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            AggregatorError::Config(format!("Failed to read heuristics file '{}': {}", path, e))
        })?;
        let catalog: HeuristicCatalog = toml::from_str(&content)?;
        Ok(catalog)
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}
