//! Free-text location normalization for registry queries.
//!
//! Patients type locations as "City State" ("Boston Massachusetts"). The
//! registry accepts two formats depending on the parameter: an abbreviated
//! `"City, ST"` locality term and a `"United States:State:City"` geography
//! qualifier. [`normalize`] produces both.

/// Fixed full-name → USPS abbreviation lookup for the 50 states.
static STATE_ABBREVIATIONS: &[(&str, &str)] = &[
    ("alabama", "AL"),
    ("alaska", "AK"),
    ("arizona", "AZ"),
    ("arkansas", "AR"),
    ("california", "CA"),
    ("colorado", "CO"),
    ("connecticut", "CT"),
    ("delaware", "DE"),
    ("florida", "FL"),
    ("georgia", "GA"),
    ("hawaii", "HI"),
    ("idaho", "ID"),
    ("illinois", "IL"),
    ("indiana", "IN"),
    ("iowa", "IA"),
    ("kansas", "KS"),
    ("kentucky", "KY"),
    ("louisiana", "LA"),
    ("maine", "ME"),
    ("maryland", "MD"),
    ("massachusetts", "MA"),
    ("michigan", "MI"),
    ("minnesota", "MN"),
    ("mississippi", "MS"),
    ("missouri", "MO"),
    ("montana", "MT"),
    ("nebraska", "NE"),
    ("nevada", "NV"),
    ("new hampshire", "NH"),
    ("new jersey", "NJ"),
    ("new mexico", "NM"),
    ("new york", "NY"),
    ("north carolina", "NC"),
    ("north dakota", "ND"),
    ("ohio", "OH"),
    ("oklahoma", "OK"),
    ("oregon", "OR"),
    ("pennsylvania", "PA"),
    ("rhode island", "RI"),
    ("south carolina", "SC"),
    ("south dakota", "SD"),
    ("tennessee", "TN"),
    ("texas", "TX"),
    ("utah", "UT"),
    ("vermont", "VT"),
    ("virginia", "VA"),
    ("washington", "WA"),
    ("west virginia", "WV"),
    ("wisconsin", "WI"),
    ("wyoming", "WY"),
];

/// A location rendered in the two formats the registry accepts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedLocation {
    /// `"City, ST"` locality term (`query.locn`). Falls back to the raw
    /// input when the string cannot be split into city and state.
    pub locality: String,
    /// `"United States:State:City"` geography qualifier (`filter.geo`),
    /// with the state token as supplied. `None` when parsing fails.
    pub geo_qualifier: Option<String>,
}

/// Normalize a free-text "City State" string.
///
/// The last whitespace-delimited token is taken as the state, everything
/// before it as the city. State full names map through the 50-entry
/// abbreviation table (case-insensitive); anything else — including
/// already-abbreviated states and the trailing token of a compound state
/// name — passes through verbatim, so partial input still produces a
/// best-effort query string. Never errors: inputs with fewer than two
/// tokens come back with the original string as the locality and no
/// qualifier.
///
/// Pure and idempotent on its own output: `"Boston Massachusetts"` →
/// `"Boston, MA"` → `"Boston, MA"`.
pub fn normalize(raw: &str) -> NormalizedLocation {
    let tokens: Vec<&str> = raw.split_whitespace().collect();
    if tokens.len() < 2 {
        return NormalizedLocation {
            locality: raw.to_string(),
            geo_qualifier: None,
        };
    }

    let state = tokens[tokens.len() - 1];
    // Trailing commas appear when the input is already in "City, ST" form.
    let city = tokens[..tokens.len() - 1]
        .iter()
        .map(|t| t.trim_end_matches(','))
        .collect::<Vec<_>>()
        .join(" ");

    NormalizedLocation {
        locality: format!("{}, {}", city, abbreviate_state(state)),
        geo_qualifier: Some(format!("United States:{}:{}", state, city)),
    }
}

/// Map a state token to its USPS abbreviation, passing unknown tokens
/// through verbatim.
fn abbreviate_state(token: &str) -> &str {
    let lowered = token.to_lowercase();
    STATE_ABBREVIATIONS
        .iter()
        .find(|(name, _)| *name == lowered)
        .map(|(_, abbrev)| *abbrev)
        .unwrap_or(token)
}
