//! Data tools: move legacy `users.json` / `stories.json` into another backend
//! and hash plaintext passwords in place.

use std::{collections::HashSet, path::Path};

use serde::de::DeserializeOwned;
use tracing::{info, warn};

use crate::auth::password::{hash_password, is_password_hash};
use crate::backend::Stores;
use crate::errors::ServiceError;
use crate::storage::{json_list_store::JsonListStore, read_json};
use crate::stories::Story;
use crate::users::UserRecord;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ImportReport {
    pub users: usize,
    pub passwords_hashed: usize,
    pub follows: usize,
    pub stories: usize,
    pub orphaned_stories: usize,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct HashReport {
    pub hashed: usize,
    pub skipped: usize,
}

/// A legacy JSON array; a missing file reads as empty.
pub async fn read_legacy<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, ServiceError> {
    Ok(read_json(path).await?.unwrap_or_default())
}

/// Upsert every legacy user, follow edge and story from `data_dir` into `target`.
/// Running it twice leaves the target unchanged.
pub async fn import_legacy(data_dir: &Path, target: &Stores) -> Result<ImportReport, ServiceError> {
    let users: Vec<UserRecord> = read_legacy(&data_dir.join("users.json")).await?;
    let stories: Vec<Story> = read_legacy(&data_dir.join("stories.json")).await?;
    let mut report = ImportReport::default();

    let ids: HashSet<String> = users.iter().map(|u| u.id.clone()).collect();
    let mut edges: HashSet<(String, String)> = HashSet::new();
    for user in &users {
        for followed in &user.following {
            edges.insert((user.id.clone(), followed.clone()));
        }
        for follower in &user.followers {
            edges.insert((follower.clone(), user.id.clone()));
        }
    }

    for mut user in users {
        if !is_password_hash(&user.password_hash) {
            user.password_hash = hash_password(&user.password_hash).map_err(ServiceError::storage)?;
            report.passwords_hashed += 1;
        }
        target.users.upsert(user).await?;
        report.users += 1;
    }

    for (follower, followed) in edges {
        if follower == followed || !ids.contains(&follower) || !ids.contains(&followed) {
            warn!(%follower, %followed, "skipping dangling follow edge");
            continue;
        }
        target.users.add_follow(&follower, &followed).await?;
        report.follows += 1;
    }

    for mut story in stories {
        if story.author_id.as_ref().is_some_and(|id| !ids.contains(id)) {
            story.author_id = None;
            report.orphaned_stories += 1;
        }
        target.stories.upsert(story).await?;
        report.stories += 1;
    }

    info!(
        users = report.users,
        follows = report.follows,
        stories = report.stories,
        orphaned = report.orphaned_stories,
        "legacy_import_finished"
    );
    Ok(report)
}

/// Rewrite a `users.json` so no password is stored in plaintext.
pub async fn hash_plaintext_passwords(path: &Path) -> Result<HashReport, ServiceError> {
    if !path.exists() {
        return Err(ServiceError::NotFound(format!("{} does not exist", path.display())));
    }
    let store = JsonListStore::<UserRecord>::new(path).await?;
    let report = store
        .update(|users| {
            let mut report = HashReport::default();
            for user in users.iter_mut() {
                if is_password_hash(&user.password_hash) {
                    report.skipped += 1;
                    continue;
                }
                user.password_hash = hash_password(&user.password_hash).map_err(ServiceError::storage)?;
                report.hashed += 1;
            }
            Ok(report)
        })
        .await?;
    info!(hashed = report.hashed, skipped = report.skipped, path = %path.display(), "passwords_hashed");
    Ok(report)
}
