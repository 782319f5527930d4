//! Stories: publishing, moderation, reactions, bookmarks and comments.

pub mod domain;
pub mod repository;
pub mod service;

pub use domain::{
    Comment, ReactionKind, ReactionOutcome, ReactionState, Story, StoryCategory, StoryFilter, StoryInput,
    StoryLocation, StoryStatus, StoryUpdate,
};
pub use repository::StoryStore;
pub use service::{StoryPolicy, StoryService};
