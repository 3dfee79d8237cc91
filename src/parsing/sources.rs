use itertools::Itertools;

/// Lowercase keyword to citation label. Result order follows this table.
const SOURCE_KEYWORDS: [(&str, &str); 9] = [
    ("congress", "Congress.gov"),
    ("fec", "FEC.gov"),
    ("vote", "Congressional Records"),
    ("bill", "Congress.gov"),
    ("white house", "WhiteHouse.gov"),
    ("senate", "Senate.gov"),
    ("house", "House.gov"),
    ("supreme court", "SupremeCourt.gov"),
    ("federal register", "FederalRegister.gov"),
];

pub const DEFAULT_SOURCE: &str = "Government Records";

/// Guesses which public records a reply draws on. Never returns an empty list.
pub fn extract(text: &str) -> Vec<String> {
    let text = text.to_lowercase();

    let sources: Vec<String> = SOURCE_KEYWORDS
        .iter()
        .filter(|(keyword, _)| text.contains(keyword))
        .map(|(_, label)| *label)
        .unique()
        .map(str::to_owned)
        .collect();

    if sources.is_empty() {
        vec![DEFAULT_SOURCE.to_owned()]
    } else {
        sources
    }
}
