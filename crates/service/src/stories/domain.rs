use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use crate::errors::ServiceError;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoryStatus {
    Pending,
    #[default]
    Approved,
    Rejected,
}

impl StoryStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            StoryStatus::Pending => "pending",
            StoryStatus::Approved => "approved",
            StoryStatus::Rejected => "rejected",
        }
    }
}

impl fmt::Display for StoryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

impl FromStr for StoryStatus {
    type Err = ServiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(StoryStatus::Pending),
            "approved" => Ok(StoryStatus::Approved),
            "rejected" => Ok(StoryStatus::Rejected),
            _ => Err(ServiceError::Validation("Invalid status".into())),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StoryCategory {
    Personal,
    Community,
    History,
    Culture,
}

impl StoryCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            StoryCategory::Personal => "Personal",
            StoryCategory::Community => "Community",
            StoryCategory::History => "History",
            StoryCategory::Culture => "Culture",
        }
    }
}

impl FromStr for StoryCategory {
    type Err = ServiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "personal" => Ok(StoryCategory::Personal),
            "community" => Ok(StoryCategory::Community),
            "history" => Ok(StoryCategory::History),
            "culture" => Ok(StoryCategory::Culture),
            _ => Err(ServiceError::Validation(format!("Invalid category: {}", s))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StoryLocation {
    pub name: String,
    pub lat: f64,
    pub lng: f64,
}

/// Accepts either a single string or an array of strings.
fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
        Null,
    }
    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(s) if s.is_empty() => Vec::new(),
        OneOrMany::One(s) => vec![s],
        OneOrMany::Many(v) => v,
        OneOrMany::Null => Vec::new(),
    })
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Story {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_id: Option<String>,
    pub title: String,
    #[serde(default)]
    pub excerpt: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub author_initials: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<StoryCategory>,
    #[serde(default, alias = "image", deserialize_with = "one_or_many")]
    pub images: Vec<String>,
    #[serde(default)]
    pub likes: u32,
    #[serde(default)]
    pub comments: u32,
    #[serde(default)]
    pub felt_this_count: u32,
    #[serde(default)]
    pub is_anonymous: bool,
    #[serde(default)]
    pub has_audio: bool,
    #[serde(default)]
    pub has_video: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<StoryLocation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub circle: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    #[serde(default)]
    pub status: StoryStatus,
    #[serde(default = "Utc::now", alias = "timestamp")]
    pub created_at: DateTime<Utc>,
}

impl Story {
    pub fn counter(&self, kind: ReactionKind) -> u32 {
        match kind {
            ReactionKind::Like => self.likes,
            ReactionKind::FeltThis => self.felt_this_count,
            ReactionKind::Bookmark => 0,
        }
    }

    /// Adjust the counter tied to `kind` by one, never below zero.
    pub fn bump(&mut self, kind: ReactionKind, up: bool) -> u32 {
        let slot = match kind {
            ReactionKind::Like => &mut self.likes,
            ReactionKind::FeltThis => &mut self.felt_this_count,
            ReactionKind::Bookmark => return 0,
        };
        *slot = if up { slot.saturating_add(1) } else { slot.saturating_sub(1) };
        *slot
    }
}

/// Up to two uppercase initials from a display name.
pub fn initials(name: &str) -> String {
    name.split_whitespace()
        .filter_map(|w| w.chars().next())
        .flat_map(char::to_uppercase)
        .take(2)
        .collect()
}

const EXCERPT_CHARS: usize = 150;

fn excerpt_of(content: &str) -> String {
    let trimmed = content.trim();
    if trimmed.chars().count() <= EXCERPT_CHARS {
        return trimmed.to_string();
    }
    let cut: String = trimmed.chars().take(EXCERPT_CHARS).collect();
    format!("{}...", cut.trim_end())
}

/// Body of `POST /api/stories`. Server-owned fields (id, counters, status,
/// timestamps) are not accepted.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StoryInput {
    pub title: String,
    pub excerpt: Option<String>,
    pub content: String,
    pub author: Option<String>,
    pub author_initials: Option<String>,
    pub category: Option<StoryCategory>,
    pub image: Option<String>,
    pub images: Option<Vec<String>>,
    pub is_anonymous: bool,
    pub has_audio: Option<bool>,
    pub has_video: Option<bool>,
    pub location: Option<StoryLocation>,
    pub circle: Option<String>,
    pub audio_url: Option<String>,
    pub video_url: Option<String>,
    pub language: Option<String>,
    pub profile_image: Option<String>,
    pub context: Option<String>,
}

impl StoryInput {
    /// Build the stored story for an author.
    pub fn into_story(self, author_id: &str, author_name: &str, status: StoryStatus) -> Story {
        let images = match (self.images, self.image) {
            (Some(images), _) => images,
            (None, Some(image)) if !image.is_empty() => vec![image],
            _ => Vec::new(),
        };
        let author = self.author.filter(|a| !a.trim().is_empty()).unwrap_or_else(|| author_name.to_string());
        let author_initials = self
            .author_initials
            .filter(|i| !i.trim().is_empty())
            .unwrap_or_else(|| initials(&author));
        let excerpt = self.excerpt.filter(|e| !e.trim().is_empty()).unwrap_or_else(|| excerpt_of(&self.content));
        Story {
            id: Uuid::new_v4().to_string(),
            author_id: Some(author_id.to_string()),
            title: self.title,
            excerpt,
            content: self.content,
            author,
            author_initials,
            category: self.category,
            images,
            likes: 0,
            comments: 0,
            felt_this_count: 0,
            is_anonymous: self.is_anonymous,
            has_audio: self.has_audio.unwrap_or(self.audio_url.is_some()),
            has_video: self.has_video.unwrap_or(self.video_url.is_some()),
            location: self.location,
            circle: self.circle,
            audio_url: self.audio_url,
            video_url: self.video_url,
            language: self.language,
            profile_image: self.profile_image,
            context: self.context,
            status,
            created_at: Utc::now(),
        }
    }
}

/// Body of `PUT /api/stories/:id`; absent fields stay as they are.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StoryUpdate {
    pub title: Option<String>,
    pub excerpt: Option<String>,
    pub content: Option<String>,
    pub category: Option<StoryCategory>,
    pub images: Option<Vec<String>>,
    pub is_anonymous: Option<bool>,
    pub has_audio: Option<bool>,
    pub has_video: Option<bool>,
    pub location: Option<StoryLocation>,
    pub circle: Option<String>,
    pub audio_url: Option<String>,
    pub video_url: Option<String>,
    pub language: Option<String>,
    pub context: Option<String>,
}

impl StoryUpdate {
    pub fn apply(self, story: &mut Story) {
        if let Some(v) = self.title { story.title = v; }
        if let Some(v) = self.excerpt { story.excerpt = v; }
        if let Some(v) = self.content { story.content = v; }
        if let Some(v) = self.category { story.category = Some(v); }
        if let Some(v) = self.images { story.images = v; }
        if let Some(v) = self.is_anonymous { story.is_anonymous = v; }
        if let Some(v) = self.location { story.location = Some(v); }
        if let Some(v) = self.circle { story.circle = Some(v); }
        if let Some(v) = self.audio_url {
            story.has_audio = true;
            story.audio_url = Some(v);
        }
        if let Some(v) = self.video_url {
            story.has_video = true;
            story.video_url = Some(v);
        }
        if let Some(v) = self.has_audio { story.has_audio = v; }
        if let Some(v) = self.has_video { story.has_video = v; }
        if let Some(v) = self.language { story.language = Some(v); }
        if let Some(v) = self.context { story.context = Some(v); }
    }
}

/// Listing criteria. Every set field must match.
#[derive(Clone, Debug, Default)]
pub struct StoryFilter {
    pub status: Option<StoryStatus>,
    pub circle: Option<String>,
    pub category: Option<StoryCategory>,
    pub author_id: Option<String>,
}

impl StoryFilter {
    pub fn approved() -> Self {
        Self { status: Some(StoryStatus::Approved), ..Default::default() }
    }

    pub fn matches(&self, story: &Story) -> bool {
        self.status.map_or(true, |s| story.status == s)
            && self.circle.as_deref().map_or(true, |c| story.circle.as_deref() == Some(c))
            && self.category.map_or(true, |c| story.category == Some(c))
            && self.author_id.as_deref().map_or(true, |a| story.author_id.as_deref() == Some(a))
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: String,
    pub story_id: String,
    pub author_id: String,
    pub author: String,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

impl Comment {
    pub fn new(story_id: &str, author_id: &str, author: &str, text: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            story_id: story_id.to_string(),
            author_id: author_id.to_string(),
            author: author.to_string(),
            text,
            created_at: Utc::now(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReactionKind {
    Like,
    FeltThis,
    Bookmark,
}

impl ReactionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ReactionKind::Like => "like",
            ReactionKind::FeltThis => "felt_this",
            ReactionKind::Bookmark => "bookmark",
        }
    }
}

/// Result of a toggle: whether the reaction is now set and the story's counter.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReactionOutcome {
    pub active: bool,
    pub count: u32,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReactionState {
    pub liked: bool,
    pub felt_this: bool,
    pub bookmarked: bool,
}
