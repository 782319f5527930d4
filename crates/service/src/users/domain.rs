use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Admin,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
        }
    }

    /// Unknown role strings fall back to `user`.
    pub fn parse(s: &str) -> Self {
        if s.eq_ignore_ascii_case("admin") { Role::Admin } else { Role::User }
    }
}

/// Stored user, in the shape of the legacy `users.json` records.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(rename = "password")]
    pub password_hash: String,
    #[serde(default)]
    pub bio: String,
    #[serde(default)]
    pub avatar: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub website: String,
    #[serde(default = "Utc::now")]
    pub joined_date: DateTime<Utc>,
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub followers: Vec<String>,
    #[serde(default)]
    pub following: Vec<String>,
}

impl UserRecord {
    pub fn new(name: impl Into<String>, email: impl Into<String>, password_hash: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            email: email.into(),
            password_hash,
            bio: String::new(),
            avatar: String::new(),
            location: String::new(),
            website: String::new(),
            joined_date: Utc::now(),
            role: Role::User,
            followers: Vec::new(),
            following: Vec::new(),
        }
    }
}

/// A user as the API returns it: everything but the password hash.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicUser {
    pub id: String,
    pub name: String,
    pub email: String,
    pub bio: String,
    pub avatar: String,
    pub location: String,
    pub website: String,
    pub joined_date: DateTime<Utc>,
    pub role: Role,
    pub followers: Vec<String>,
    pub following: Vec<String>,
}

impl From<UserRecord> for PublicUser {
    fn from(u: UserRecord) -> Self {
        Self {
            id: u.id,
            name: u.name,
            email: u.email,
            bio: u.bio,
            avatar: u.avatar,
            location: u.location,
            website: u.website,
            joined_date: u.joined_date,
            role: u.role,
            followers: u.followers,
            following: u.following,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(flatten)]
    pub user: PublicUser,
    pub followers_count: usize,
    pub following_count: usize,
}

impl From<UserRecord> for UserProfile {
    fn from(u: UserRecord) -> Self {
        let followers_count = u.followers.len();
        let following_count = u.following.len();
        Self { user: u.into(), followers_count, following_count }
    }
}

/// Entry of a follower/following list.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: String,
    pub name: String,
    pub email: String,
    pub avatar: String,
    pub bio: String,
}

impl From<UserRecord> for UserSummary {
    fn from(u: UserRecord) -> Self {
        Self { id: u.id, name: u.name, email: u.email, avatar: u.avatar, bio: u.bio }
    }
}

/// Partial profile update; `None` leaves the field untouched.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct ProfileUpdate {
    pub bio: Option<String>,
    pub avatar: Option<String>,
    pub location: Option<String>,
    pub website: Option<String>,
}

impl ProfileUpdate {
    pub fn apply(self, user: &mut UserRecord) {
        if let Some(bio) = self.bio { user.bio = bio; }
        if let Some(avatar) = self.avatar { user.avatar = avatar; }
        if let Some(location) = self.location { user.location = location; }
        if let Some(website) = self.website { user.website = website; }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowCounts {
    /// Followers of the target user.
    pub followers_count: usize,
    /// Accounts the acting user follows.
    pub following_count: usize,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FollowOutcome {
    pub message: String,
    #[serde(flatten)]
    pub counts: FollowCounts,
}
