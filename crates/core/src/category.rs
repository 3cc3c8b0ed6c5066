/// Canonical category tables. Scanned in definition order; the first
/// category with any synonym present as a substring wins. Substring matching
/// is intentional here — the synonyms are content words, not stop-words — but
/// it is looser than the intent matcher's boundary matching and can
/// over-match on embedded words. Known and kept for compatibility.
const CATEGORY_TABLE: &[(&str, &[&str])] = &[
    ("Park", &["park", "garden", "green space", "playground"]),
    ("Museum", &["museum", "gallery", "exhibit", "history"]),
    (
        "Restaurant",
        &["restaurant", "food", "dining", "dinner", "lunch", "cafe", "coffee"],
    ),
    ("Beach", &["beach", "seaside", "shore"]),
    ("Temple", &["temple", "church", "mosque", "shrine"]),
    ("Shopping", &["mall", "shopping", "market", "bazaar"]),
    ("Zoo", &["zoo", "aquarium", "wildlife"]),
    ("Viewpoint", &["viewpoint", "lookout", "scenic", "sunset"]),
];

/// Mood phrase → the canonical category it maps to. Checked only when no
/// category synonym matched; same first-match-wins rule.
const MOOD_TABLE: &[(&str, &str)] = &[
    ("romantic", "Viewpoint"),
    ("quiet", "Park"),
    ("peaceful", "Park"),
    ("family", "Zoo"),
    ("kids", "Zoo"),
    ("cultural", "Museum"),
    ("culture", "Museum"),
    ("hungry", "Restaurant"),
    ("foodie", "Restaurant"),
    ("relax", "Beach"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoodMatch {
    pub mood: &'static str,
    pub category: &'static str,
}

pub fn match_category(text: &str) -> Option<&'static str> {
    CATEGORY_TABLE
        .iter()
        .find(|(_, synonyms)| synonyms.iter().any(|synonym| text.contains(synonym)))
        .map(|(canonical, _)| *canonical)
}

pub fn match_mood(text: &str) -> Option<MoodMatch> {
    MOOD_TABLE
        .iter()
        .find(|(mood, _)| text.contains(mood))
        .map(|(mood, category)| MoodMatch {
            mood,
            category,
        })
}
