//! Metadata rollup for top-layer clips
//!
//! A clip combines several rendered jobs, so its suggested metadata is built
//! from the media assets of those jobs.

use serde::Serialize;
use sqlx::FromRow;
use std::collections::{BTreeSet, HashSet};

/// Longest aggregated description, in characters
pub const DESCRIPTION_LIMIT: usize = 1000;

/// Longest aggregated SEO description, in characters
pub const SEO_DESCRIPTION_LIMIT: usize = 500;

/// The fields of one linked media asset that feed the rollup
#[derive(Debug, Clone, Default, FromRow)]
pub struct LinkedMedia {
    pub tags: String,
    pub description: String,
    pub seo_description: String,
    pub character_name: Option<String>,
}

/// Suggested metadata for a clip
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ClipMeta {
    pub tags: String,
    pub characters: String,
    pub description: String,
    pub seo_description: String,
}

/// Roll up linked media into clip metadata
///
/// Tags and character names are deduplicated and sorted. Descriptions are
/// deduplicated in first-seen order and cut to the length limits above.
pub fn aggregate_clip_meta(media: &[LinkedMedia]) -> ClipMeta {
    let mut tags = BTreeSet::new();
    let mut characters = BTreeSet::new();
    let mut descriptions = FirstSeen::default();
    let mut seo_parts = FirstSeen::default();

    for item in media {
        for tag in item.tags.split(',').map(str::trim).filter(|t| !t.is_empty()) {
            tags.insert(tag);
        }
        if let Some(name) = item.character_name.as_deref().filter(|n| !n.is_empty()) {
            characters.insert(name);
        }
        descriptions.push(&item.description);
        seo_parts.push(&item.seo_description);
    }

    ClipMeta {
        tags: tags.into_iter().collect::<Vec<_>>().join(", "),
        characters: characters.into_iter().collect::<Vec<_>>().join(", "),
        description: truncate_chars(&descriptions.items.join(" | "), DESCRIPTION_LIMIT),
        seo_description: truncate_chars(&seo_parts.items.join(" "), SEO_DESCRIPTION_LIMIT),
    }
}

/// Distinct non-empty strings in insertion order
#[derive(Default)]
struct FirstSeen<'a> {
    seen: HashSet<&'a str>,
    items: Vec<&'a str>,
}

impl<'a> FirstSeen<'a> {
    fn push(&mut self, value: &'a str) {
        if !value.is_empty() && self.seen.insert(value) {
            self.items.push(value);
        }
    }
}

fn truncate_chars(s: &str, limit: usize) -> String {
    s.chars().take(limit).collect()
}
