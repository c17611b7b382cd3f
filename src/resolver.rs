use std::collections::{BTreeMap, BTreeSet};

/// Outcome of resolving a spoken doctor fragment against the roster.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    Resolved(String),
    /// Exactly two candidates, lexical order, for a short clarification
    /// prompt.
    Ambiguous([String; 2]),
    Unresolved,
}

/// Accept the similarity fallback only above this ratio; a wrong provider
/// assignment is worse than one extra clarification question.
const SIMILARITY_THRESHOLD: f64 = 0.72;

/// Fragment tokens shorter than this are noise and ignored.
const MIN_TOKEN_LEN: usize = 3;

/// Lower-case, strip the honorific "dr"/"dr.", drop punctuation, collapse
/// whitespace.
fn normalize(s: &str) -> String {
    let lowered = s.to_lowercase();
    let mut cleaned = String::with_capacity(lowered.len());
    for c in lowered.chars() {
        if c.is_ascii_alphanumeric() {
            cleaned.push(c);
        } else {
            cleaned.push(' ');
        }
    }
    cleaned
        .split_whitespace()
        .filter(|tok| *tok != "dr")
        .collect::<Vec<_>>()
        .join(" ")
}

fn tokens(s: &str) -> Vec<String> {
    normalize(s).split_whitespace().map(str::to_string).collect()
}

/// Two-phase fuzzy match of a caller's doctor fragment against the roster.
///
/// Phase one collects every provider with a token starting with a fragment
/// token of length >= 3; one survivor resolves, several are ambiguous.
/// Phase two falls back to conservative whole-string similarity. Prefix
/// matching runs first so a confident partial-word hit short-circuits
/// before the looser global match can produce a wrong guess.
pub fn resolve(fragment: &str, roster: &[String]) -> Resolution {
    if fragment.trim().is_empty() || roster.is_empty() {
        return Resolution::Unresolved;
    }

    let mut token_to_providers: BTreeMap<String, BTreeSet<&String>> = BTreeMap::new();
    for provider in roster {
        for tok in tokens(provider) {
            token_to_providers.entry(tok).or_default().insert(provider);
        }
    }

    let fragment_tokens: Vec<String> = tokens(fragment)
        .into_iter()
        .filter(|tok| tok.len() >= MIN_TOKEN_LEN)
        .collect();

    if !fragment_tokens.is_empty() {
        let mut matches: BTreeSet<&String> = BTreeSet::new();
        for ft in &fragment_tokens {
            for (tok, providers) in &token_to_providers {
                if tok.starts_with(ft.as_str()) {
                    matches.extend(providers);
                }
            }
        }

        let mut survivors = matches.iter().map(|p| (*p).clone());
        match matches.len() {
            1 => {
                if let Some(provider) = survivors.next() {
                    return Resolution::Resolved(provider);
                }
            }
            n if n > 1 => {
                // BTreeSet iteration is already lexical
                if let (Some(a), Some(b)) = (survivors.next(), survivors.next()) {
                    return Resolution::Ambiguous([a, b]);
                }
            }
            _ => {}
        }
    }

    // Fallback: conservative full-string similarity
    let normalized_fragment = normalize(fragment);
    let best = roster
        .iter()
        .map(|provider| {
            (
                similarity_ratio(&normalized_fragment, &normalize(provider)),
                provider,
            )
        })
        .max_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));

    match best {
        Some((score, provider)) if score >= SIMILARITY_THRESHOLD => {
            Resolution::Resolved(provider.clone())
        }
        _ => Resolution::Unresolved,
    }
}

/// Similarity ratio with difflib `SequenceMatcher.ratio` semantics:
/// 2*M / (len(a) + len(b)), where M counts characters covered by the
/// recursive longest-matching-block decomposition.
pub fn similarity_ratio(a: &str, b: &str) -> f64 {
    let a = a.as_bytes();
    let b = b.as_bytes();
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }
    2.0 * matching_chars(a, b) as f64 / total as f64
}

fn matching_chars(a: &[u8], b: &[u8]) -> usize {
    if a.is_empty() || b.is_empty() {
        return 0;
    }

    // longest common substring via rolling DP row
    let mut best_len = 0usize;
    let mut best_a = 0usize;
    let mut best_b = 0usize;
    let mut prev = vec![0usize; b.len() + 1];
    for i in 0..a.len() {
        let mut cur = vec![0usize; b.len() + 1];
        for j in 0..b.len() {
            if a[i] == b[j] {
                let run = prev[j] + 1;
                cur[j + 1] = run;
                if run > best_len {
                    best_len = run;
                    best_a = i + 1 - run;
                    best_b = j + 1 - run;
                }
            }
        }
        prev = cur;
    }

    if best_len == 0 {
        return 0;
    }

    best_len
        + matching_chars(&a[..best_a], &b[..best_b])
        + matching_chars(&a[best_a + best_len..], &b[best_b + best_len..])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roster() -> Vec<String> {
        vec![
            "Dr. Jesan Ahmed".to_string(),
            "Dr. Hasan Rahman".to_string(),
            "Dr. Gregory House".to_string(),
        ]
    }

    #[test]
    fn test_normalize_strips_honorific_and_punctuation() {
        assert_eq!(normalize("Dr. Jesan Ahmed"), "jesan ahmed");
        assert_eq!(normalize("DR GREGORY  HOUSE!"), "gregory house");
        assert_eq!(normalize("dr."), "");
    }

    #[test]
    fn test_unique_prefix_resolves() {
        assert_eq!(
            resolve("gregory", &roster()),
            Resolution::Resolved("Dr. Gregory House".to_string())
        );
        assert_eq!(
            resolve("I want doctor hou", &roster()),
            Resolution::Resolved("Dr. Gregory House".to_string())
        );
        assert_eq!(
            resolve("jesan please", &roster()),
            Resolution::Resolved("Dr. Jesan Ahmed".to_string())
        );
    }

    #[test]
    fn test_shared_token_is_ambiguous_in_lexical_order() {
        let two_ahmeds = vec![
            "Dr. Jesan Ahmed".to_string(),
            "Dr. Ahmedul Kabir".to_string(),
            "Dr. Gregory House".to_string(),
        ];
        assert_eq!(
            resolve("ahmed", &two_ahmeds),
            Resolution::Ambiguous([
                "Dr. Ahmedul Kabir".to_string(),
                "Dr. Jesan Ahmed".to_string(),
            ])
        );
    }

    #[test]
    fn test_ambiguous_keeps_two_lexically_lowest() {
        let many = vec![
            "Dr. Anna Smith".to_string(),
            "Dr. Andrew Stone".to_string(),
            "Dr. Andrea Hall".to_string(),
        ];
        assert_eq!(
            resolve("and", &many),
            Resolution::Ambiguous([
                "Dr. Andrea Hall".to_string(),
                "Dr. Andrew Stone".to_string(),
            ])
        );
    }

    #[test]
    fn test_canonical_name_is_fixed_point() {
        for name in roster() {
            assert_eq!(resolve(&name, &roster()), Resolution::Resolved(name.clone()));
        }
    }

    #[test]
    fn test_short_tokens_are_ignored() {
        // every token under 3 chars; falls through to similarity, which
        // cannot clear the threshold
        assert_eq!(resolve("dr ha", &roster()), Resolution::Unresolved);
    }

    #[test]
    fn test_similarity_fallback_accepts_close_misspelling() {
        // no token of "hassan rahmann" prefixes a roster token ("hassan"
        // vs "hasan"), so phase two runs
        assert_eq!(
            resolve("hassan rahmann", &roster()),
            Resolution::Resolved("Dr. Hasan Rahman".to_string())
        );
    }

    #[test]
    fn test_no_match_is_unresolved() {
        assert_eq!(resolve("doctor strange", &roster()), Resolution::Unresolved);
        assert_eq!(resolve("", &roster()), Resolution::Unresolved);
    }

    #[test]
    fn test_similarity_ratio_matches_difflib_semantics() {
        assert_eq!(similarity_ratio("", ""), 1.0);
        assert_eq!(similarity_ratio("abc", "abc"), 1.0);
        assert_eq!(similarity_ratio("abc", "xyz"), 0.0);
        // difflib: SequenceMatcher(None, "abcd", "bcde").ratio() == 0.75
        assert!((similarity_ratio("abcd", "bcde") - 0.75).abs() < 1e-9);
    }
}
