use std::sync::OnceLock;

use regex::Regex;

/// Banned substrings, matched against the lowercased post text.
///
/// Entries with capitals can never match lowercased text; they are kept so
/// the list reads the same as the one users were shown.
const BLOCKED_KEYWORDS: &[&str] = &[
    "Skibidi", "skibidi", "toilet", "gyatt", "mewing", "mew", "rizz", "rizzing",
    "rizzler", "sigma", "Ohio", "bussin’", "cook", "cooking", "let", "him/her", "baddie",
    "fanum", "tax", "drake", "nonchalant", "aura", "grimace", "shake", "edging", "edge",
    "goon", "gooning", "looksmaxing", "alpha", "griddy", "baby", "gronk", "diddy",
    "Qaundale", "dingle", "Sus", "sussy", "imposter", "among", "us", "Reese’s", "pieces",
    "life", "saver", "gummies", "meme", "devious", "Ei", "ei", "ratio", "L", "bozo", "brain",
    "rot", "ishowspeed/ishowmeat", "bing", "chilling", "bomboclat", "mog", "mogging",
    "yap", "yapping", "yapper", "goonmaxing", "Freddy", "fazbear", "Kai", "cenat", "oil",
];

fn keyword_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| {
        let alternation = BLOCKED_KEYWORDS
            .iter()
            .map(|word| regex::escape(word))
            .collect::<Vec<_>>()
            .join("|");
        Regex::new(&alternation).expect("Regex should compile")
    })
}

pub fn contains_blocked_keyword(text: &str) -> bool {
    keyword_regex().is_match(&text.to_lowercase())
}
