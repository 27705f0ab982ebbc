use std::sync::OnceLock;

use regex::Regex;

fn pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^PT(?:(\d+)H)?(?:(\d+)M)?(?:(\d+)S)?$").expect("static duration regex"))
}

/// `PT[nH][nM][nS]` to whole seconds. Anything else is 0 (unknown duration).
pub fn parse_iso_duration(s: &str) -> u64 {
    let Some(caps) = pattern().captures(s) else { return 0 };
    let part = |i: usize| caps.get(i).and_then(|m| m.as_str().parse::<u64>().ok()).unwrap_or(0);
    part(1).saturating_mul(3600)
        .saturating_add(part(2).saturating_mul(60))
        .saturating_add(part(3))
}
