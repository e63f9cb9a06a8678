//! Title and tag derivation for render jobs
//!
//! A job's suggested media title and tag list are derived from its character
//! and its ingredients. Callers must pass ingredients in category-name order
//! (as returned by [`crate::db::jobs::job_ingredients`]) so that every call
//! site produces identical text for the same job.

use crate::models::{JobDetail, JobIngredient};
use serde::Serialize;

/// Separator between the character name and the ingredient list in a title
pub const TITLE_SEPARATOR: &str = " — ";

/// Suggested title and comma-separated tags for a job
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DerivedMeta {
    pub title: String,
    pub tags: String,
}

/// Derive title and tags from a character and its ingredient names
///
/// - title: character name, then `" — "` and the comma-space joined
///   ingredient names when there are any
/// - tags: lowercased character name with spaces turned into commas, then
///   the character's own tags verbatim, then the lowercased ingredient names
///
/// Empty segments are kept as they come, so a job without a character but
/// with ingredients yields tags starting with a comma.
pub fn derive_title_tags(
    character_name: Option<&str>,
    character_tags: Option<&str>,
    ingredient_names: &[&str],
) -> DerivedMeta {
    let name = character_name.unwrap_or_default();
    let joined = ingredient_names.join(", ");

    let title = if joined.is_empty() {
        name.to_string()
    } else if name.is_empty() {
        joined.clone()
    } else {
        format!("{}{}{}", name, TITLE_SEPARATOR, joined)
    };

    let mut tags = name.to_lowercase().replace(' ', ",");
    if let Some(char_tags) = character_tags.filter(|t| !t.is_empty()) {
        tags.push(',');
        tags.push_str(char_tags);
    }
    if !joined.is_empty() {
        let lowered: Vec<String> = ingredient_names.iter().map(|n| n.to_lowercase()).collect();
        tags.push(',');
        tags.push_str(&lowered.join(","));
    }

    DerivedMeta { title, tags }
}

/// Derive title and tags for a loaded job
pub fn derive_for_job(job: &JobDetail, ingredients: &[JobIngredient]) -> DerivedMeta {
    let names: Vec<&str> = ingredients.iter().map(|i| i.name.as_str()).collect();
    derive_title_tags(
        job.character_name.as_deref(),
        job.char_tags.as_deref(),
        &names,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_with_character_and_ingredients() {
        // Lighting sorts before Wardrobe, so Dusk Lighting comes first
        let meta = derive_title_tags(Some("Nova"), None, &["Dusk Lighting", "Red Cape"]);
        assert_eq!(meta.title, "Nova — Dusk Lighting, Red Cape");
        assert_eq!(meta.tags, "nova,dusk lighting,red cape");
    }

    #[test]
    fn test_character_tags_appended_verbatim() {
        let meta = derive_title_tags(Some("Star Child"), Some("Hero, Cosmic"), &["Glow"]);
        assert_eq!(meta.title, "Star Child — Glow");
        assert_eq!(meta.tags, "star,child,Hero, Cosmic,glow");
    }

    #[test]
    fn test_no_ingredients() {
        let meta = derive_title_tags(Some("Nova"), Some(""), &[]);
        assert_eq!(meta.title, "Nova");
        assert_eq!(meta.tags, "nova");
    }

    #[test]
    fn test_no_character_keeps_leading_comma() {
        let meta = derive_title_tags(None, None, &["Red Cape"]);
        assert_eq!(meta.title, "Red Cape");
        assert_eq!(meta.tags, ",red cape");
    }

    #[test]
    fn test_nothing_at_all() {
        assert_eq!(derive_title_tags(None, None, &[]), DerivedMeta::default());
    }
}
