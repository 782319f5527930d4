//! Users: profiles, search and the follow graph.

pub mod domain;
pub mod repository;
pub mod service;

pub use domain::{FollowCounts, FollowOutcome, ProfileUpdate, PublicUser, Role, UserProfile, UserRecord, UserSummary};
pub use repository::UserStore;
pub use service::UserService;
