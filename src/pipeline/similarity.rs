//! Ratcliff/Obershelp sequence similarity.
//!
//! The duplicate detector scores titles and venue names with the
//! longest-matching-block ratio: find the longest common substring, recurse
//! on the pieces to its left and right, and report `2 * matched / total`.

/// Similarity of two strings in `[0, 1]`. Two empty strings are identical.
pub fn ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }
    let matched = matching_chars(&a, &b);
    2.0 * matched as f64 / total as f64
}

fn matching_chars(a: &[char], b: &[char]) -> usize {
    let (a_start, b_start, len) = longest_match(a, b);
    if len == 0 {
        return 0;
    }
    len + matching_chars(&a[..a_start], &b[..b_start])
        + matching_chars(&a[a_start + len..], &b[b_start + len..])
}

/// Longest common block between `a` and `b`, as (start in a, start in b,
/// length). Ties go to the earliest block in `a`, then in `b`.
fn longest_match(a: &[char], b: &[char]) -> (usize, usize, usize) {
    let mut best = (0, 0, 0);
    let mut prev = vec![0usize; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        let mut current = vec![0usize; b.len() + 1];
        for (j, cb) in b.iter().enumerate() {
            if ca == cb {
                let run = prev[j] + 1;
                current[j + 1] = run;
                if run > best.2 {
                    best = (i + 1 - run, j + 1 - run, run);
                }
            }
        }
        prev = current;
    }

    best
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_strings_score_one() {
        assert_eq!(ratio("fall jazz night", "fall jazz night"), 1.0);
        assert_eq!(ratio("", ""), 1.0);
    }

    #[test]
    fn disjoint_strings_score_zero() {
        assert_eq!(ratio("abc", "xyz"), 0.0);
    }

    #[test]
    fn empty_against_nonempty_scores_zero() {
        assert_eq!(ratio("", "abc"), 0.0);
    }

    #[test]
    fn near_identical_titles_clear_the_dedupe_threshold() {
        // "fall jazz ni" (12) + "t" match out of 28 chars total
        let score = ratio("fall jazz night", "fall jazz nite");
        assert!((score - 26.0 / 28.0).abs() < 1e-9);
        assert!(score >= 0.85);
    }

    #[test]
    fn shared_prefix_venues_clear_the_venue_threshold() {
        let score = ratio("lamplighter brewing", "lamplighter cx");
        assert!(score >= 0.70);
    }

    #[test]
    fn recursion_counts_blocks_on_both_sides() {
        // Blocks: "ab" + "cd" around a mismatch
        let score = ratio("abxcd", "abycd");
        assert!((score - 8.0 / 10.0).abs() < 1e-9);
    }

    #[test]
    fn order_matters_beyond_shared_characters() {
        // Same multiset of chars, low block overlap
        assert!(ratio("abcd", "dcba") < 0.5);
    }
}
