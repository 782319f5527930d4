//! Story circles and writing prompts.
//!
//! Both catalogs are fixed; only a circle's story count is live, computed from
//! approved stories tagged with the circle id.

use std::{collections::HashMap, str::FromStr, sync::Arc};

use rand::seq::SliceRandom;
use serde::Serialize;

use crate::errors::ServiceError;
use crate::stories::{Story, StoryFilter, StoryStore};

#[derive(Clone, Copy, Debug)]
struct CircleDef {
    id: &'static str,
    name: &'static str,
    description: &'static str,
    icon: &'static str,
    gradient: &'static str,
}

const CIRCLES: [CircleDef; 6] = [
    CircleDef {
        id: "grandmas-kitchen",
        name: "Grandma's Kitchen",
        description: "Stories of family gatherings, shared meals, and recipes passed down through generations",
        icon: "🍞",
        gradient: "from-amber-100 to-orange-100 dark:from-amber-950/30 dark:to-orange-950/30",
    },
    CircleDef {
        id: "first-days",
        name: "First Days",
        description: "New beginnings, fresh starts, and the courage it takes to step into the unknown",
        icon: "🌅",
        gradient: "from-rose-100 to-pink-100 dark:from-rose-950/30 dark:to-pink-950/30",
    },
    CircleDef {
        id: "lost-and-found",
        name: "Lost & Found",
        description: "Stories of loss, rediscovery, and the things we carry with us through time",
        icon: "🔮",
        gradient: "from-purple-100 to-indigo-100 dark:from-purple-950/30 dark:to-indigo-950/30",
    },
    CircleDef {
        id: "street-corners",
        name: "Street Corners",
        description: "The places where community happens—markets, parks, libraries, and neighborhood spots",
        icon: "🏘️",
        gradient: "from-emerald-100 to-teal-100 dark:from-emerald-950/30 dark:to-teal-950/30",
    },
    CircleDef {
        id: "unspoken-words",
        name: "Unspoken Words",
        description: "The things we wish we'd said, letters never sent, and the silence between us",
        icon: "✉️",
        gradient: "from-blue-100 to-sky-100 dark:from-blue-950/30 dark:to-sky-950/30",
    },
    CircleDef {
        id: "rhythms-of-home",
        name: "Rhythms of Home",
        description: "Cultural traditions, dances, songs, and the heartbeat of community celebration",
        icon: "🎶",
        gradient: "from-yellow-100 to-amber-100 dark:from-yellow-950/30 dark:to-amber-950/30",
    },
];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PromptCategory {
    Sensory,
    Emotional,
    Relational,
    Temporal,
}

impl FromStr for PromptCategory {
    type Err = ServiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sensory" => Ok(PromptCategory::Sensory),
            "emotional" => Ok(PromptCategory::Emotional),
            "relational" => Ok(PromptCategory::Relational),
            "temporal" => Ok(PromptCategory::Temporal),
            _ => Err(ServiceError::Validation(format!("Invalid prompt category: {}", s))),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct WritingPrompt {
    pub id: &'static str,
    pub text: &'static str,
    pub category: PromptCategory,
}

const fn prompt(id: &'static str, text: &'static str, category: PromptCategory) -> WritingPrompt {
    WritingPrompt { id, text, category }
}

pub const PROMPTS: [WritingPrompt; 13] = [
    prompt("1", "What sounds do you remember from that moment?", PromptCategory::Sensory),
    prompt("2", "What was the light like? Morning sun? Candlelight? Streetlamps?", PromptCategory::Sensory),
    prompt("3", "Was there a particular smell that brings you back to this memory?", PromptCategory::Sensory),
    prompt("4", "What were your hands doing while this happened?", PromptCategory::Sensory),
    prompt("5", "How did this moment make you feel? Not what you thought—what you felt.", PromptCategory::Emotional),
    prompt("6", "If you could whisper something to your past self in this moment, what would it be?", PromptCategory::Emotional),
    prompt("7", "What part of this story do you still carry with you today?", PromptCategory::Emotional),
    prompt("8", "Who was there with you? What did their presence mean?", PromptCategory::Relational),
    prompt("9", "Was there someone who never knew how much this moment meant to you?", PromptCategory::Relational),
    prompt("10", "Who would you want to share this memory with?", PromptCategory::Relational),
    prompt("11", "How old were you? What season was it?", PromptCategory::Temporal),
    prompt("12", "What happened just before this moment? What came after?", PromptCategory::Temporal),
    prompt("13", "Is this a memory you return to often, or one that surprised you just now?", PromptCategory::Temporal),
];

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoryCircle {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub icon: &'static str,
    pub gradient: &'static str,
    pub story_count: usize,
}

impl StoryCircle {
    fn from_def(def: &CircleDef, story_count: usize) -> Self {
        Self {
            id: def.id,
            name: def.name,
            description: def.description,
            icon: def.icon,
            gradient: def.gradient,
            story_count,
        }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct CircleDetail {
    #[serde(flatten)]
    pub circle: StoryCircle,
    pub stories: Vec<Story>,
}

/// Prompts, optionally narrowed to one category.
pub fn prompts(category: Option<PromptCategory>) -> Vec<WritingPrompt> {
    PROMPTS.iter().copied().filter(|p| category.map_or(true, |c| p.category == c)).collect()
}

/// One prompt at random; `None` only if the category had no prompts.
pub fn random_prompt(category: Option<PromptCategory>) -> Option<WritingPrompt> {
    prompts(category).choose(&mut rand::thread_rng()).copied()
}

pub struct CatalogService {
    stories: Arc<dyn StoryStore>,
}

impl CatalogService {
    pub fn new(stories: Arc<dyn StoryStore>) -> Self { Self { stories } }

    pub async fn circles(&self) -> Result<Vec<StoryCircle>, ServiceError> {
        let approved = self.stories.list(&StoryFilter::approved()).await?;
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for story in &approved {
            if let Some(circle) = story.circle.as_deref() {
                *counts.entry(circle).or_default() += 1;
            }
        }
        Ok(CIRCLES.iter().map(|def| StoryCircle::from_def(def, counts.get(def.id).copied().unwrap_or(0))).collect())
    }

    pub async fn circle(&self, id: &str) -> Result<CircleDetail, ServiceError> {
        let def = CIRCLES.iter().find(|c| c.id == id).ok_or_else(|| ServiceError::not_found("Circle"))?;
        let filter = StoryFilter { circle: Some(def.id.to_string()), ..StoryFilter::approved() };
        let stories = self.stories.list(&filter).await?;
        Ok(CircleDetail { circle: StoryCircle::from_def(def, stories.len()), stories })
    }
}
