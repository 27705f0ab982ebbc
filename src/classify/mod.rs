//! Keyword-frequency categorization of articles into six fixed buckets.
//!
//! Scoring is plain substring counting over `title + description + hint`,
//! lowercased: every occurrence of every keyword adds one, including hits
//! inside longer words (`"ai"` in `"said"`). The highest score wins, ties go to
//! the bucket declared first in [`keywords::TABLE`], and an all-zero text is
//! `miscellaneous`.

mod keywords;

use serde::Serialize;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Tech,
    Startups,
    Business,
    Politics,
    Finance,
    Miscellaneous,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::Tech,
        Category::Startups,
        Category::Business,
        Category::Politics,
        Category::Finance,
        Category::Miscellaneous,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Tech => "tech",
            Category::Startups => "startups",
            Category::Business => "business",
            Category::Politics => "politics",
            Category::Finance => "finance",
            Category::Miscellaneous => "miscellaneous",
        }
    }

    fn parse(s: &str) -> Option<Category> {
        let s = s.trim();
        Category::ALL.into_iter().find(|c| c.as_str().eq_ignore_ascii_case(s))
    }
}

/// Hints that name a source as mixed-content rather than a bucket.
const VAGUE_HINTS: &[&str] = &["misc", "general", "mixed", "various"];

/// False only when the hint is exactly one of the five specific buckets.
pub fn should_categorize(hint: Option<&str>) -> bool {
    let Some(hint) = hint.map(str::trim).filter(|h| !h.is_empty()) else { return true };
    if hint.contains(',') { return true; }
    if VAGUE_HINTS.iter().any(|v| v.eq_ignore_ascii_case(hint)) { return true; }
    !matches!(Category::parse(hint), Some(c) if c != Category::Miscellaneous)
}

pub fn direct_category(hint: Option<&str>) -> Category {
    hint.and_then(Category::parse).unwrap_or(Category::Miscellaneous)
}

pub fn classify(title: &str, description: &str, hint: Option<&str>) -> Category {
    let text = format!("{} {} {}", title, description, hint.unwrap_or("")).to_lowercase();
    let mut best = (Category::Miscellaneous, 0usize);
    for (category, words) in keywords::TABLE.iter() {
        let score = score(&text, words);
        if score > best.1 { best = (*category, score); }
    }
    best.0
}

/// Trust a precise source label, otherwise score the text.
pub fn categorize(title: &str, description: &str, hint: Option<&str>) -> Category {
    if should_categorize(hint) { classify(title, description, hint) } else { direct_category(hint) }
}

fn score(text: &str, words: &[&str]) -> usize {
    words.iter().map(|w| text.matches(w).count()).sum()
}
