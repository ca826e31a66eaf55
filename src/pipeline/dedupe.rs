use crate::config::PipelineConfig;
use crate::domain::EventCandidate;
use crate::pipeline::similarity;
use std::collections::HashSet;
use tracing::debug;

/// Thresholds for the duplicate predicate.
#[derive(Debug, Clone)]
pub struct DedupeConfig {
    pub title_similarity_threshold: f64,
    pub venue_similarity_threshold: f64,
    pub max_start_delta_secs: i64,
}

impl Default for DedupeConfig {
    fn default() -> Self {
        Self {
            title_similarity_threshold: 0.85,
            venue_similarity_threshold: 0.70,
            max_start_delta_secs: 3600,
        }
    }
}

impl From<&PipelineConfig> for DedupeConfig {
    fn from(pipeline: &PipelineConfig) -> Self {
        Self {
            title_similarity_threshold: pipeline.title_similarity_threshold,
            venue_similarity_threshold: pipeline.venue_similarity_threshold,
            max_start_delta_secs: pipeline.max_start_delta_secs,
        }
    }
}

/// Collapses candidates that describe the same real event as reported by
/// different sources.
pub struct Deduplicator {
    config: DedupeConfig,
}

impl Deduplicator {
    pub fn new() -> Self {
        Self {
            config: DedupeConfig::default(),
        }
    }

    pub fn with_config(config: DedupeConfig) -> Self {
        Self { config }
    }

    /// Pair predicate: near-identical titles, start times within the delta,
    /// and similar venues when both sides name one. A missing venue on
    /// either side skips the venue check rather than disqualifying the pair.
    pub fn are_duplicates(&self, a: &EventCandidate, b: &EventCandidate) -> bool {
        let title_similarity =
            similarity::ratio(&a.title.to_lowercase(), &b.title.to_lowercase());
        if title_similarity < self.config.title_similarity_threshold {
            return false;
        }

        let delta_secs = (a.start_datetime - b.start_datetime).num_seconds().abs();
        if delta_secs > self.config.max_start_delta_secs {
            return false;
        }

        if let (Some(venue_a), Some(venue_b)) = (&a.venue_name, &b.venue_name) {
            let venue_similarity =
                similarity::ratio(&venue_a.to_lowercase(), &venue_b.to_lowercase());
            if venue_similarity < self.config.venue_similarity_threshold {
                return false;
            }
        }

        true
    }

    /// Anchor-based single-linkage grouping: each unprocessed candidate
    /// anchors a group and every later unprocessed candidate joins if it
    /// matches the anchor. Members are compared against the anchor only,
    /// not against each other, so a chain can pull in a pair that would not
    /// match directly. Singleton groups are not emitted.
    pub fn find_duplicate_groups(&self, candidates: &[EventCandidate]) -> Vec<Vec<usize>> {
        let mut groups = Vec::new();
        let mut processed: HashSet<usize> = HashSet::new();

        for anchor in 0..candidates.len() {
            if processed.contains(&anchor) {
                continue;
            }

            let mut group = vec![anchor];
            for other in (anchor + 1)..candidates.len() {
                if processed.contains(&other) {
                    continue;
                }
                if self.are_duplicates(&candidates[anchor], &candidates[other]) {
                    group.push(other);
                    processed.insert(other);
                }
            }

            if group.len() > 1 {
                processed.insert(anchor);
                groups.push(group);
            }
        }

        groups
    }

    /// Reduce a duplicate group to one candidate. The first member is the
    /// base; later members can only lengthen the description, fill fields
    /// the base lacks (first non-empty wins, coordinates move as a pair),
    /// and extend the tag set.
    pub fn merge(&self, group: &[&EventCandidate]) -> Option<EventCandidate> {
        let (base, rest) = group.split_first()?;
        let mut merged = (*base).clone();

        for other in rest {
            if other.description.chars().count() > merged.description.chars().count() {
                merged.description = other.description.clone();
            }

            fill_text(&mut merged.venue_name, &other.venue_name);
            fill_text(&mut merged.street_address, &other.street_address);

            if merged.latitude.is_none() {
                if let Some(latitude) = other.latitude {
                    merged.latitude = Some(latitude);
                    merged.longitude = other.longitude;
                }
            }

            if merged.category.is_none() {
                merged.category = other.category;
            }

            for tag in &other.tags {
                if !merged.tags.contains(tag) {
                    merged.tags.push(tag.clone());
                }
            }

            fill_text(&mut merged.contact_email, &other.contact_email);
            fill_text(&mut merged.contact_phone, &other.contact_phone);
            fill_text(&mut merged.website_url, &other.website_url);
            fill_text(&mut merged.image_url, &other.image_url);
        }

        Some(merged)
    }

    /// Replace every duplicate group with its merged survivor; candidates
    /// in no group pass through unchanged, after the merged ones.
    pub fn deduplicate(&self, candidates: Vec<EventCandidate>) -> Vec<EventCandidate> {
        if candidates.is_empty() {
            return candidates;
        }

        let groups = self.find_duplicate_groups(&candidates);
        let grouped: HashSet<usize> = groups.iter().flatten().copied().collect();

        let mut result = Vec::with_capacity(candidates.len());
        for group in &groups {
            let members: Vec<&EventCandidate> =
                group.iter().map(|&index| &candidates[index]).collect();
            debug!(
                anchor = %members[0].title,
                size = members.len(),
                "merging duplicate group"
            );
            if let Some(merged) = self.merge(&members) {
                result.push(merged);
            }
        }

        for (index, candidate) in candidates.into_iter().enumerate() {
            if !grouped.contains(&index) {
                result.push(candidate);
            }
        }

        result
    }
}

impl Default for Deduplicator {
    fn default() -> Self {
        Self::new()
    }
}

/// Fill `slot` from `value` only when the slot is empty and the value is
/// not. Blank strings count as empty on both sides.
fn fill_text(slot: &mut Option<String>, value: &Option<String>) {
    let slot_empty = slot.as_deref().map_or(true, |s| s.trim().is_empty());
    if !slot_empty {
        return;
    }
    if let Some(v) = value {
        if !v.trim().is_empty() {
            *slot = Some(v.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::EventCategory;
    use chrono::{NaiveDate, NaiveDateTime};

    fn start(hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 11, 14)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }

    fn jazz_a() -> EventCandidate {
        let mut c = EventCandidate::new(
            "Fall Jazz Night",
            "Live jazz quartet performs classic standards.",
            start(20, 0),
            "https://example.com/events/a",
            "Lamplighter Brewing",
        );
        c.venue_name = Some("Lamplighter Brewing".to_string());
        c.tags = vec!["jazz".to_string(), "live music".to_string()];
        c
    }

    fn jazz_b() -> EventCandidate {
        let mut c = EventCandidate::new(
            "Fall Jazz Nite",
            "Jazz quartet, classics.",
            start(20, 5),
            "https://example.com/events/b",
            "Boston Shows",
        );
        c.venue_name = Some("Lamplighter CX".to_string());
        c.tags = vec!["jazz".to_string(), "nightlife".to_string()];
        c.image_url = Some("https://example.com/jazz.jpg".to_string());
        c.latitude = Some(42.3706);
        c.longitude = Some(-71.1003);
        c
    }

    #[test]
    fn near_identical_listings_are_duplicates() {
        let dedupe = Deduplicator::new();
        assert!(dedupe.are_duplicates(&jazz_a(), &jazz_b()));
    }

    #[test]
    fn dissimilar_titles_never_match_even_at_same_time() {
        let dedupe = Deduplicator::new();
        let a = jazz_a();
        let mut b = jazz_a();
        b.title = "Community Contra Dance".to_string();
        assert!(!dedupe.are_duplicates(&a, &b));
    }

    #[test]
    fn far_apart_start_times_never_match() {
        let dedupe = Deduplicator::new();
        let a = jazz_a();
        let mut b = jazz_a();
        b.start_datetime = start(22, 30);
        assert!(!dedupe.are_duplicates(&a, &b));
    }

    #[test]
    fn different_venues_block_the_match() {
        let dedupe = Deduplicator::new();
        let a = jazz_a();
        let mut b = jazz_a();
        b.venue_name = Some("The Sinclair".to_string());
        assert!(!dedupe.are_duplicates(&a, &b));
    }

    #[test]
    fn missing_venue_skips_the_venue_check() {
        let dedupe = Deduplicator::new();
        let a = jazz_a();
        let mut b = jazz_b();
        b.venue_name = None;
        assert!(dedupe.are_duplicates(&a, &b));
    }

    #[test]
    fn merge_keeps_longer_description_and_fills_gaps() {
        let dedupe = Deduplicator::new();
        let a = jazz_a();
        let b = jazz_b();
        let merged = dedupe.merge(&[&a, &b]).unwrap();

        // A's description is longer and survives
        assert_eq!(merged.description, a.description);
        // A's venue is already set and is not replaced
        assert_eq!(merged.venue_name.as_deref(), Some("Lamplighter Brewing"));
        // B fills what A lacks
        assert_eq!(merged.image_url, b.image_url);
        assert_eq!(merged.latitude, b.latitude);
        assert_eq!(merged.longitude, b.longitude);
        // Tags union, duplicates collapsed, first-seen order
        assert_eq!(merged.tags, vec!["jazz", "live music", "nightlife"]);
    }

    #[test]
    fn merge_takes_strictly_longer_description_from_later_member() {
        let dedupe = Deduplicator::new();
        let mut a = jazz_a();
        a.description = "Short blurb.".to_string();
        let b = jazz_b();
        let merged = dedupe.merge(&[&a, &b]).unwrap();
        assert_eq!(merged.description, b.description);
    }

    #[test]
    fn merge_fills_category_only_when_base_has_none() {
        let dedupe = Deduplicator::new();
        let mut a = jazz_a();
        let mut b = jazz_b();
        b.category = Some(EventCategory::Music);
        let merged = dedupe.merge(&[&a, &b]).unwrap();
        assert_eq!(merged.category, Some(EventCategory::Music));

        a.category = Some(EventCategory::Community);
        let merged = dedupe.merge(&[&a, &b]).unwrap();
        assert_eq!(merged.category, Some(EventCategory::Community));
    }

    #[test]
    fn merge_of_empty_group_is_none() {
        let dedupe = Deduplicator::new();
        assert!(dedupe.merge(&[]).is_none());
    }

    #[test]
    fn deduplicate_collapses_the_pair_and_passes_singletons() {
        let dedupe = Deduplicator::new();
        let mut other = EventCandidate::new(
            "Community Contra Dance",
            "Beginner friendly contra dancing with a live band.",
            start(19, 30),
            "https://example.com/events/c",
            "Arts at the Armory",
        );
        other.venue_name = Some("Arts at the Armory".to_string());

        let result = dedupe.deduplicate(vec![jazz_a(), jazz_b(), other.clone()]);
        assert_eq!(result.len(), 2);
        // Merged group comes first, survivor keeps the anchor's title
        assert_eq!(result[0].title, "Fall Jazz Night");
        assert_eq!(result[1].title, other.title);
    }

    #[test]
    fn deduplicate_is_idempotent() {
        let dedupe = Deduplicator::new();
        let once = dedupe.deduplicate(vec![jazz_a(), jazz_b()]);
        let twice = dedupe.deduplicate(once.clone());
        assert_eq!(once.len(), twice.len());
        assert_eq!(once[0].title, twice[0].title);
        assert_eq!(once[0].description, twice[0].description);
        assert_eq!(once[0].tags, twice[0].tags);
    }

    #[test]
    fn group_members_need_not_match_each_other() {
        // B and C each match the anchor A but not one another; the group
        // still forms as {A, B, C} because membership is decided against
        // the anchor alone. This pins the deliberately loose policy.
        let dedupe = Deduplicator::new();
        let mut a = jazz_a();
        a.venue_name = None;
        let mut b = a.clone();
        b.title = "Fall Jazz Night Duo".to_string();
        let mut c = a.clone();
        c.title = "The Fall Jazz Night".to_string();

        assert!(dedupe.are_duplicates(&a, &b));
        assert!(dedupe.are_duplicates(&a, &c));
        assert!(!dedupe.are_duplicates(&b, &c));

        let groups = dedupe.find_duplicate_groups(&[a, b, c]);
        assert_eq!(groups, vec![vec![0, 1, 2]]);
    }

    #[test]
    fn grouping_does_not_chase_chains_transitively() {
        // C matches B but not the anchor A, so C stays out of A's group
        // even though a transitive closure would pull it in.
        let dedupe = Deduplicator::new();
        let mut a = jazz_a();
        a.venue_name = None;
        let mut b = a.clone();
        b.title = "Fall Jazz Nights".to_string();
        let mut c = a.clone();
        c.title = "Fall Jazz Nights Live".to_string();

        assert!(dedupe.are_duplicates(&a, &b));
        assert!(dedupe.are_duplicates(&b, &c));
        assert!(!dedupe.are_duplicates(&a, &c));

        let groups = dedupe.find_duplicate_groups(&[a, b, c]);
        assert_eq!(groups, vec![vec![0, 1]]);
    }

    #[test]
    fn empty_input_stays_empty() {
        let dedupe = Deduplicator::new();
        assert!(dedupe.deduplicate(Vec::new()).is_empty());
    }
}
