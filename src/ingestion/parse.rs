use atom_syndication::{Entry, Feed};
use chrono::DateTime;
use rss::{Channel, Item};
use scraper::Html;

use super::types::FeedEntry;
use crate::util::time::RawDate;

/// RSS first, then Atom. Entries come back in document order.
pub fn parse_entries(xml: &[u8]) -> Result<Vec<FeedEntry>, String> {
    match Channel::read_from(xml) {
        Ok(channel) => Ok(channel.items().iter().map(from_rss_item).collect()),
        Err(rss_err) => match Feed::read_from(xml) {
            Ok(feed) => Ok(feed.entries().iter().map(from_atom_entry).collect()),
            Err(atom_err) => Err(format!("not RSS ({}) or Atom ({})", rss_err, atom_err)),
        },
    }
}

fn from_rss_item(item: &Item) -> FeedEntry {
    FeedEntry {
        link: non_empty(item.link()),
        title: non_empty(item.title()),
        description: item.description().map(html_to_text).filter(|s| !s.is_empty()),
        date: rss_date(item),
    }
}

// pubDate that is valid RFC 2822 counts as structured; anything else goes to the fallback parser
fn rss_date(item: &Item) -> RawDate {
    if let Some(raw) = item.pub_date() {
        return match DateTime::parse_from_rfc2822(raw.trim()) {
            Ok(dt) => RawDate::Structured(dt.naive_utc()),
            Err(_) => RawDate::Text(raw.to_string()),
        };
    }
    match item.dublin_core_ext().and_then(|dc| dc.dates().first()) {
        Some(raw) => RawDate::Text(raw.clone()),
        None => RawDate::Missing,
    }
}

fn from_atom_entry(entry: &Entry) -> FeedEntry {
    let link = entry
        .links()
        .iter()
        .find(|l| l.rel() == "alternate")
        .or_else(|| entry.links().first())
        .map(|l| l.href().to_string());
    let description = entry
        .summary()
        .map(|t| t.value.as_str())
        .or_else(|| entry.content().and_then(|c| c.value()))
        .map(html_to_text)
        .filter(|s| !s.is_empty());
    FeedEntry {
        link: non_empty(link.as_deref()),
        title: non_empty(Some(entry.title().value.as_str())),
        description,
        date: atom_date(entry),
    }
}

// atom_syndication fills a missing <updated> with the epoch
fn atom_date(entry: &Entry) -> RawDate {
    match entry.published() {
        Some(published) => RawDate::Structured(published.naive_utc()),
        None if entry.updated().timestamp() == 0 => RawDate::Missing,
        None => RawDate::Structured(entry.updated().naive_utc()),
    }
}

fn non_empty(s: Option<&str>) -> Option<String> {
    s.map(str::trim).filter(|s| !s.is_empty()).map(str::to_string)
}

/// Visible text of an HTML fragment, whitespace collapsed.
pub fn html_to_text(html: &str) -> String {
    let frag = Html::parse_fragment(html);
    let parts: Vec<&str> = frag.root_element().text().collect();
    collapse_whitespace(&parts.join(" "))
}

fn collapse_whitespace(s: &str) -> String {
    let mut buf = String::with_capacity(s.len());
    let mut in_ws = false;
    for ch in s.chars() {
        if ch.is_whitespace() {
            if !in_ws {
                if !buf.is_empty() { buf.push(' '); }
                in_ws = true;
            }
        } else {
            buf.push(ch);
            in_ws = false;
        }
    }
    buf.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    const RSS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0" xmlns:dc="http://purl.org/dc/elements/1.1/">
<channel>
  <title>Example</title><link>https://example.com</link><description>feed</description>
  <item>
    <title>First</title>
    <link>https://example.com/1</link>
    <description>&lt;p&gt;AI &amp;amp;   chips&lt;/p&gt;</description>
    <pubDate>Mon, 06 Oct 2025 10:00:00 GMT</pubDate>
  </item>
  <item>
    <title>No link</title>
    <pubDate>2025-10-06 08:00:00</pubDate>
  </item>
  <item>
    <title>Dublin core</title>
    <link>https://example.com/3</link>
    <dc:date>2025-10-06T07:00:00Z</dc:date>
  </item>
  <item>
    <link>https://example.com/4</link>
  </item>
</channel>
</rss>"#;

    const ATOM: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <title>Example</title>
  <id>urn:uuid:feed</id>
  <updated>2025-10-06T12:00:00Z</updated>
  <entry>
    <title>Atom entry</title>
    <id>urn:uuid:1</id>
    <link rel="self" href="https://example.com/self"/>
    <link rel="alternate" href="https://example.com/atom-1"/>
    <updated>2025-10-06T12:00:00Z</updated>
    <published>2025-10-06T09:30:00+02:00</published>
    <summary type="html">&lt;p&gt;Hello &lt;b&gt;world&lt;/b&gt;&lt;/p&gt;</summary>
  </entry>
  <entry>
    <title>Only updated</title>
    <id>urn:uuid:2</id>
    <link href="https://example.com/atom-2"/>
    <updated>2025-10-05T18:00:00Z</updated>
  </entry>
  <entry>
    <title>Undated</title>
    <id>urn:uuid:3</id>
    <link href="https://example.com/atom-3"/>
  </entry>
</feed>"#;

    fn naive(d: u32, h: u32, m: u32) -> chrono::NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 10, d).unwrap().and_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn rss_items_keep_order_and_date_kind() {
        let entries = parse_entries(RSS.as_bytes()).unwrap();
        assert_eq!(entries.len(), 4);

        assert_eq!(entries[0].title.as_deref(), Some("First"));
        assert_eq!(entries[0].description.as_deref(), Some("AI & chips"));
        assert_eq!(entries[0].date, RawDate::Structured(naive(6, 10, 0)));

        assert_eq!(entries[1].link, None);
        assert_eq!(entries[1].date, RawDate::Text("2025-10-06 08:00:00".into()));

        assert_eq!(entries[2].date, RawDate::Text("2025-10-06T07:00:00Z".into()));

        assert_eq!(entries[3].title, None);
        assert_eq!(entries[3].date, RawDate::Missing);
    }

    #[test]
    fn atom_falls_back_after_rss() {
        let entries = parse_entries(ATOM.as_bytes()).unwrap();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].link.as_deref(), Some("https://example.com/atom-1"));
        assert_eq!(entries[0].description.as_deref(), Some("Hello world"));
        assert_eq!(entries[0].date, RawDate::Structured(naive(6, 7, 30)));
        assert_eq!(entries[1].link.as_deref(), Some("https://example.com/atom-2"));
        assert_eq!(entries[1].date, RawDate::Structured(naive(5, 18, 0)));
    }

    #[test]
    fn atom_entry_without_dates_is_missing_not_epoch() {
        let entries = parse_entries(ATOM.as_bytes()).unwrap();
        assert_eq!(entries[2].title.as_deref(), Some("Undated"));
        assert_eq!(entries[2].date, RawDate::Missing);
    }

    #[test]
    fn garbage_is_an_error() {
        assert!(parse_entries(b"{\"not\": \"xml\"}").is_err());
    }

    #[test]
    fn html_to_text_strips_markup() {
        assert_eq!(html_to_text("<div class=\"ai\">Plain <i>text</i>\n\n here</div>"), "Plain text here");
        assert_eq!(html_to_text("already plain"), "already plain");
    }
}
