//! Database models
//!
//! Row structs mirror the tables created in [`crate::db::migrations`]. Listing
//! structs flatten a row together with the joined display columns the pages
//! need. Input structs double as form payloads: missing optional fields
//! default to empty strings and empty id fields become `None`.

use serde::{de, Deserialize, Deserializer, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;

/// Surrogate key type used by every table
pub type DbId = i64;

// ============================================================================
// Status enumerations
// ============================================================================

macro_rules! status_enum {
    (
        $(#[$meta:meta])*
        $name:ident { $($variant:ident => $text:literal),+ $(,)? } default $default:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
        #[serde(rename_all = "snake_case")]
        #[sqlx(rename_all = "snake_case")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            /// Every value, in display order
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Stored text form
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl Default for $name {
            fn default() -> Self {
                $name::$default
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = crate::Error;

            fn from_str(s: &str) -> crate::Result<Self> {
                match s {
                    $($text => Ok($name::$variant),)+
                    other => Err(crate::Error::InvalidInput(format!(
                        "Invalid {} value: {}",
                        stringify!($name),
                        other
                    ))),
                }
            }
        }
    };
}

status_enum! {
    /// Character lifecycle; retired characters drop out of pickers
    CharacterStatus {
        Concept => "concept",
        Active => "active",
        Retired => "retired",
    } default Concept
}

status_enum! {
    /// Render job progress
    JobStatus {
        Planned => "planned",
        InProgress => "in_progress",
        Rendered => "rendered",
        Complete => "complete",
    } default Planned
}

status_enum! {
    /// Media asset review state
    QualityStatus {
        Unreviewed => "unreviewed",
        Approved => "approved",
        Rejected => "rejected",
    } default Unreviewed
}

status_enum! {
    /// Prompt collection state
    PromptStatus {
        Pending => "pending",
        Collected => "collected",
        Done => "done",
        Flagged => "flagged",
    } default Pending
}

status_enum! {
    /// Project lifecycle
    ProjectStatus {
        Active => "active",
        Archived => "archived",
    } default Active
}

impl JobStatus {
    /// Rendered and complete jobs count toward the rendered funnel stage
    pub fn is_rendered(&self) -> bool {
        matches!(self, JobStatus::Rendered | JobStatus::Complete)
    }

    /// Statuses shown in the dock's active job list
    pub const ACTIVE: &'static [JobStatus] =
        &[JobStatus::Planned, JobStatus::InProgress, JobStatus::Rendered];
}

// ============================================================================
// Form helpers
// ============================================================================

/// Deserialize an optional value where an empty string means `None`
pub fn empty_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: fmt::Display,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => s.parse().map(Some).map_err(de::Error::custom),
    }
}

fn default_subtype() -> String {
    "concept".to_string()
}

// ============================================================================
// Archetypes and characters
// ============================================================================

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Archetype {
    pub id: DbId,
    pub name: String,
    pub subtype: String,
    pub description: String,
    pub tags: String,
    pub image_path: String,
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ArchetypeListing {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub archetype: Archetype,
    pub char_count: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ArchetypeInput {
    pub name: String,
    #[serde(default = "default_subtype")]
    pub subtype: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tags: String,
    #[serde(default)]
    pub image_path: String,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Character {
    pub id: DbId,
    pub name: String,
    pub archetype_id: Option<DbId>,
    pub description: String,
    pub visual_notes: String,
    pub status: CharacterStatus,
    pub tags: String,
    pub image_path: String,
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CharacterListing {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub character: Character,
    pub archetype_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CharacterInput {
    pub name: String,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub archetype_id: Option<DbId>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub visual_notes: String,
    #[serde(default)]
    pub status: CharacterStatus,
    #[serde(default)]
    pub tags: String,
    #[serde(default)]
    pub image_path: String,
}

/// Payload of the set-image form shared by archetypes and characters
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ImagePathInput {
    #[serde(default)]
    pub image_path: String,
}

// ============================================================================
// Ingredients
// ============================================================================

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct IngredientCategory {
    pub id: DbId,
    pub name: String,
    pub description: String,
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CategoryListing {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub category: IngredientCategory,
    pub item_count: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CategoryInput {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Ingredient {
    pub id: DbId,
    pub category_id: Option<DbId>,
    pub code: String,
    pub name: String,
    pub description: String,
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct IngredientListing {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub ingredient: Ingredient,
    pub category_name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IngredientInput {
    #[serde(default, deserialize_with = "empty_as_none")]
    pub category_id: Option<DbId>,
    #[serde(default)]
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct IngredientRule {
    pub id: DbId,
    pub rule_type: String,
    pub source_type: String,
    pub source_ingredient_id: Option<DbId>,
    pub source_category_id: Option<DbId>,
    pub target_type: String,
    pub target_ingredient_id: Option<DbId>,
    pub target_category_id: Option<DbId>,
    pub notes: String,
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct RuleListing {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub rule: IngredientRule,
    pub source_ing_name: Option<String>,
    pub source_cat_name: Option<String>,
    pub target_ing_name: Option<String>,
    pub target_cat_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RuleInput {
    pub rule_type: String,
    pub source_type: String,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub source_ingredient_id: Option<DbId>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub source_category_id: Option<DbId>,
    pub target_type: String,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub target_ingredient_id: Option<DbId>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub target_category_id: Option<DbId>,
    #[serde(default)]
    pub notes: String,
}

// ============================================================================
// Output types
// ============================================================================

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct OutputType {
    pub id: DbId,
    pub name: String,
    pub description: String,
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OutputTypeInput {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct RequirementListing {
    pub id: DbId,
    pub output_type_id: Option<DbId>,
    pub category_id: Option<DbId>,
    pub output_name: String,
    pub category_name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RequirementInput {
    pub output_type_id: DbId,
    pub category_id: DbId,
}

// ============================================================================
// Render jobs
// ============================================================================

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct RenderJob {
    pub id: DbId,
    pub character_id: Option<DbId>,
    pub output_type_id: Option<DbId>,
    pub status: JobStatus,
    pub notes: String,
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct JobListing {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub job: RenderJob,
    pub character_name: Option<String>,
    pub output_type_name: Option<String>,
}

/// Job row joined with the character fields used by title/tag derivation
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct JobDetail {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub job: RenderJob,
    pub character_name: Option<String>,
    pub char_desc: Option<String>,
    pub char_tags: Option<String>,
    pub output_type_name: Option<String>,
}

/// Ingredient chosen for a job, with its category name
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct JobIngredient {
    pub name: String,
    pub code: String,
    pub category_name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JobInput {
    #[serde(default, deserialize_with = "empty_as_none")]
    pub character_id: Option<DbId>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub output_type_id: Option<DbId>,
    #[serde(default)]
    pub status: JobStatus,
    #[serde(default)]
    pub notes: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JobStatusInput {
    pub status: JobStatus,
}

// ============================================================================
// Media assets
// ============================================================================

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct MediaAsset {
    pub id: DbId,
    pub job_id: Option<DbId>,
    pub character_id: Option<DbId>,
    pub output_type_id: Option<DbId>,
    pub file_path: String,
    pub title: String,
    pub description: String,
    pub tags: String,
    pub seo_title: String,
    pub seo_description: String,
    pub quality_status: QualityStatus,
    pub notes: String,
    pub prompt: String,
    pub created_at: Option<String>,
}

impl MediaAsset {
    /// All five publishing fields are filled in
    pub fn is_fully_annotated(&self) -> bool {
        [
            &self.title,
            &self.description,
            &self.tags,
            &self.seo_title,
            &self.seo_description,
        ]
        .iter()
        .all(|field| !field.is_empty())
    }
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct MediaListing {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub media: MediaAsset,
    pub character_name: Option<String>,
    pub output_type_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MediaInput {
    #[serde(default, deserialize_with = "empty_as_none")]
    pub job_id: Option<DbId>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub character_id: Option<DbId>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub output_type_id: Option<DbId>,
    #[serde(default)]
    pub file_path: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tags: String,
    #[serde(default)]
    pub seo_title: String,
    #[serde(default)]
    pub seo_description: String,
    #[serde(default)]
    pub quality_status: QualityStatus,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub prompt: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct QualityStatusInput {
    pub quality_status: QualityStatus,
}

// ============================================================================
// Top-layer media
// ============================================================================

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TopLayerMedia {
    pub id: DbId,
    pub title: String,
    pub file_path: String,
    pub description: String,
    pub tags: String,
    pub seo_title: String,
    pub seo_description: String,
    pub notes: String,
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TopLayerInput {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub file_path: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tags: String,
    #[serde(default)]
    pub seo_title: String,
    #[serde(default)]
    pub seo_description: String,
    #[serde(default)]
    pub notes: String,
}

/// A job linked to a clip, joined with one of the job's media assets (if any)
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TopLayerLinkedJob {
    pub link_id: DbId,
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub job: JobListing,
    pub media_title: Option<String>,
    pub media_tags: Option<String>,
    pub media_desc: Option<String>,
    pub media_seo_title: Option<String>,
    pub media_seo_desc: Option<String>,
    pub quality_status: Option<QualityStatus>,
}

/// Link form shared by clips and projects
#[derive(Debug, Clone, Deserialize)]
pub struct LinkJobInput {
    #[serde(default, deserialize_with = "empty_as_none")]
    pub job_id: Option<DbId>,
}

// ============================================================================
// Projects and prompts
// ============================================================================

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Project {
    pub id: DbId,
    pub name: String,
    pub description: String,
    pub status: ProjectStatus,
    pub notes: String,
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ProjectListing {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub project: Project,
    pub job_count: i64,
    pub prompt_count: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProjectInput {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub status: ProjectStatus,
    #[serde(default)]
    pub notes: String,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ProjectJobLink {
    pub link_id: DbId,
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub job: JobListing,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Prompt {
    pub id: DbId,
    pub project_id: Option<DbId>,
    pub job_id: Option<DbId>,
    pub text: String,
    pub label: String,
    pub status: PromptStatus,
    pub notes: String,
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PromptListing {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub prompt: Prompt,
    pub project_name: Option<String>,
    pub job_num: Option<DbId>,
    pub character_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PromptInput {
    #[serde(default, deserialize_with = "empty_as_none")]
    pub project_id: Option<DbId>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub job_id: Option<DbId>,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub notes: String,
}

// ============================================================================
// Dock
// ============================================================================

/// Number of shortcut slots in the dock
pub const DOCK_SLOTS: i64 = 5;

#[derive(Debug, Clone, FromRow, Serialize, PartialEq, Eq)]
pub struct DockSlot {
    pub id: DbId,
    pub slot: i64,
    pub label: String,
    pub url: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trip_text() {
        for status in JobStatus::ALL {
            assert_eq!(status.as_str().parse::<JobStatus>().unwrap(), *status);
        }
        assert_eq!(JobStatus::InProgress.as_str(), "in_progress");
    }

    #[test]
    fn test_prompt_status_allow_list() {
        assert!("collected".parse::<PromptStatus>().is_ok());
        assert!("archived".parse::<PromptStatus>().is_err());
        assert!("".parse::<PromptStatus>().is_err());
    }

    #[test]
    fn test_rendered_statuses() {
        assert!(JobStatus::Rendered.is_rendered());
        assert!(JobStatus::Complete.is_rendered());
        assert!(!JobStatus::Planned.is_rendered());
        assert!(!JobStatus::InProgress.is_rendered());
    }

    #[test]
    fn test_fully_annotated() {
        let mut asset = MediaAsset {
            id: 1,
            job_id: Some(1),
            character_id: None,
            output_type_id: None,
            file_path: String::new(),
            title: "t".into(),
            description: "d".into(),
            tags: "a,b".into(),
            seo_title: "st".into(),
            seo_description: "sd".into(),
            quality_status: QualityStatus::Unreviewed,
            notes: String::new(),
            prompt: String::new(),
            created_at: None,
        };
        assert!(asset.is_fully_annotated());
        asset.seo_title.clear();
        assert!(!asset.is_fully_annotated());
    }

    #[test]
    fn test_empty_form_ids_become_none() {
        #[derive(Deserialize)]
        struct Probe {
            #[serde(default, deserialize_with = "empty_as_none")]
            id: Option<DbId>,
        }

        let probe: Probe = serde_json::from_str(r#"{"id": ""}"#).unwrap();
        assert_eq!(probe.id, None);
        let probe: Probe = serde_json::from_str(r#"{"id": "42"}"#).unwrap();
        assert_eq!(probe.id, Some(42));
        let probe: Probe = serde_json::from_str("{}").unwrap();
        assert_eq!(probe.id, None);
    }
}
