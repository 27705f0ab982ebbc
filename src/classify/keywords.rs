use super::Category;

/// Lowercase keywords per bucket, in tie-break order.
pub const TABLE: [(Category, &[&str]); 6] = [
    (Category::Tech, &[
        "ai", "artificial intelligence", "machine learning", "software", "hardware", "chip",
        "semiconductor", "cloud", "cyber", "robot", "smartphone", "apple", "google", "microsoft",
        "openai", "nvidia", "developer", "open source", "algorithm", "quantum", "data center",
        "gadget", "browser", "programming",
    ]),
    (Category::Startups, &[
        "startup", "funding round", "seed round", "series a", "series b", "venture capital",
        "founder", "accelerator", "y combinator", "unicorn", "incubator", "pre-seed",
        "angel investor", "bootstrapped",
    ]),
    (Category::Business, &[
        "company", "companies", "ceo", "revenue", "earnings", "merger", "acquisition", "retail",
        "supply chain", "layoffs", "industry", "corporate", "profit", "sales", "market share",
        "quarterly",
    ]),
    (Category::Politics, &[
        "election", "government", "president", "congress", "senate", "parliament", "minister",
        "policy", "legislation", "lawmaker", "vote", "campaign", "democrat", "republican",
        "white house", "regulation", "diplomat", "geopolitic",
    ]),
    (Category::Finance, &[
        "stock", "shares", "bond", "interest rate", "inflation", "federal reserve", "central bank",
        "bank", "investor", "crypto", "bitcoin", "nasdaq", "s&p 500", "dow jones", "wall street",
        "ipo", "dividend", "treasury", "mortgage",
    ]),
    (Category::Miscellaneous, &[
        "sports", "travel", "food", "health", "culture", "entertainment", "science", "climate",
        "weather", "lifestyle",
    ]),
];
