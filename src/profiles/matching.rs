//! Team-name normalization and resolution.
//!
//! Names arrive from odds feeds, score providers, and ratings snapshots in
//! wildly different shapes ("Saint Mary's Gaels", "st. marys", "ST MARYS
//! CA"). Resolution walks a ladder: normalized exact match, then
//! substring / shared-token overlap, then fuzzy similarity as a last
//! resort. Fuzzy matching uses normalized Levenshtein so the threshold is
//! an edit-similarity fraction, with a deliberately conservative default.

use strsim::normalized_levenshtein;

/// How a candidate name was matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameMatch {
    Exact,
    Substring,
    TokenOverlap,
    Fuzzy,
}

/// Mascot suffixes stripped before comparison. Feeds often append these;
/// ratings snapshots almost never do.
const MASCOTS: &[&str] = &[
    "blue devils",
    "tar heels",
    "crimson tide",
    "fighting irish",
    "nittany lions",
    "golden eagles",
    "golden bears",
    "red raiders",
    "sun devils",
    "mean green",
    "red storm",
    "wildcats",
    "bulldogs",
    "tigers",
    "bears",
    "eagles",
    "hawks",
    "cardinals",
    "panthers",
    "lions",
    "knights",
    "warriors",
    "cougars",
    "huskies",
    "hornets",
    "owls",
    "rams",
    "rebels",
    "spartans",
    "wolverines",
    "broncos",
    "volunteers",
    "gators",
    "seminoles",
    "hurricanes",
    "aggies",
    "cowboys",
    "sooners",
    "jayhawks",
    "cyclones",
    "buckeyes",
    "hoosiers",
    "badgers",
    "hawkeyes",
    "terrapins",
    "bobcats",
    "orange",
    "ducks",
    "beavers",
    "bruins",
    "mavericks",
    "trojans",
    "buffaloes",
    "utes",
    "lobos",
    "aztecs",
    "falcons",
    "mountaineers",
    "longhorns",
    "razorbacks",
    "gamecocks",
    "commodores",
    "hoyas",
    "musketeers",
    "billikens",
    "flyers",
    "dukes",
    "gaels",
    "friars",
    "pirates",
];

/// Tokens too generic to establish a match on their own.
const GENERIC_TOKENS: &[&str] = &["st", "university", "college", "tech", "a&m", "north", "south", "east", "west"];

/// Canonicalize a raw team name for comparison.
///
/// Lowercases, strips punctuation, unifies the st./saint/state tangle to
/// a single token, and drops a trailing mascot.
pub fn normalize(raw: &str) -> String {
    let lowered = raw.trim().to_lowercase();
    let cleaned: String = lowered
        .chars()
        .map(|c| if c == '-' || c == '.' { ' ' } else { c })
        .filter(|c| c.is_alphanumeric() || c.is_whitespace() || *c == '&' || *c == '\'')
        .collect();
    let cleaned = cleaned.replace('\'', "");

    let unified: Vec<&str> = cleaned
        .split_whitespace()
        .map(|w| match w {
            "state" | "saint" => "st",
            other => other,
        })
        .collect();
    let mut name = unified.join(" ");

    for mascot in MASCOTS {
        if let Some(stripped) = name.strip_suffix(mascot) {
            let stripped = stripped.trim_end();
            if !stripped.is_empty() {
                name = stripped.to_string();
            }
            break;
        }
    }
    name
}

fn significant_tokens(name: &str) -> Vec<&str> {
    name.split_whitespace()
        .filter(|t| t.len() > 2 && !GENERIC_TOKENS.contains(t))
        .collect()
}

/// Resolve a normalized query against normalized candidate keys.
///
/// Returns the matched key and how it matched, or `None` when nothing
/// clears the ladder. `query` and all candidates must already be
/// normalized.
pub fn resolve<'a, I>(query: &str, candidates: I, fuzzy_threshold: f64) -> Option<(&'a str, NameMatch)>
where
    I: Iterator<Item = &'a str> + Clone,
{
    if query.is_empty() {
        return None;
    }

    for key in candidates.clone() {
        if key == query {
            return Some((key, NameMatch::Exact));
        }
    }

    // Substring containment either way ("gonzaga" vs "gonzaga u").
    for key in candidates.clone() {
        if key.contains(query) || query.contains(key) {
            return Some((key, NameMatch::Substring));
        }
    }

    // Shared significant token ("wichita st" vs "wichita").
    let query_tokens = significant_tokens(query);
    if !query_tokens.is_empty() {
        for key in candidates.clone() {
            let key_tokens = significant_tokens(key);
            if query_tokens.iter().any(|t| key_tokens.contains(t)) {
                return Some((key, NameMatch::TokenOverlap));
            }
        }
    }

    // Fuzzy last resort: best edit similarity above the threshold.
    let mut best: Option<(&'a str, f64)> = None;
    for key in candidates {
        let score = normalized_levenshtein(query, key);
        if score >= fuzzy_threshold && best.map_or(true, |(_, b)| score > b) {
            best = Some((key, score));
        }
    }
    best.map(|(key, _)| (key, NameMatch::Fuzzy))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_strips_mascots_and_punctuation() {
        assert_eq!(normalize("Duke Blue Devils"), "duke");
        assert_eq!(normalize("St. John's Red Storm"), "st johns");
        assert_eq!(normalize("Texas A&M"), "texas a&m");
    }

    #[test]
    fn normalize_unifies_state_variants() {
        assert_eq!(normalize("Michigan State"), normalize("Michigan St."));
        assert_eq!(normalize("Saint Mary's"), normalize("St. Marys"));
    }

    #[test]
    fn resolve_prefers_exact_over_partial() {
        let keys = ["duke", "duquesne"];
        let (key, kind) = resolve("duke", keys.iter().copied(), 0.6).unwrap();
        assert_eq!(key, "duke");
        assert_eq!(kind, NameMatch::Exact);
    }

    #[test]
    fn resolve_substring_match() {
        let keys = ["north carolina"];
        let (key, kind) = resolve("carolina", keys.iter().copied(), 0.6).unwrap();
        assert_eq!(key, "north carolina");
        assert_eq!(kind, NameMatch::Substring);
    }

    #[test]
    fn resolve_token_overlap() {
        let keys = ["gonzaga"];
        let (_, kind) = resolve("gonzaga zags", keys.iter().copied(), 0.6).unwrap();
        // "gonzaga zags" is not a substring pair but shares a token.
        assert!(matches!(kind, NameMatch::Substring | NameMatch::TokenOverlap));
    }

    #[test]
    fn resolve_fuzzy_catches_typos() {
        let keys = ["villanova"];
        let (key, kind) = resolve("vilanova", keys.iter().copied(), 0.6).unwrap();
        assert_eq!(key, "villanova");
        assert_eq!(kind, NameMatch::Fuzzy);
    }

    #[test]
    fn resolve_rejects_unrelated_names() {
        let keys = ["purdue"];
        assert!(resolve("pepperdine", keys.iter().copied(), 0.6).is_none());
    }

    #[test]
    fn generic_token_alone_does_not_match() {
        // "Ohio St" and "Kent St" share only the generic "st" token and no
        // substring, so they must not resolve to each other.
        let keys = ["kent st"];
        assert!(resolve("ohio st", keys.iter().copied(), 0.6).is_none());
    }
}
