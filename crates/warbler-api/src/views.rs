//! Row -> view model conversions.

use std::collections::HashSet;

use warbler_db::Database;
use warbler_db::models::{MessageRow, UserRow, UserStats};
use warbler_types::api::{EditProfileResponse, MessageResponse, UserProfile, UserSummary};

pub fn user_summary(user: &UserRow) -> UserSummary {
    UserSummary {
        id: user.id,
        username: user.username.clone(),
        image_url: user.image_url.clone(),
    }
}

pub fn user_profile(user: &UserRow, stats: UserStats) -> UserProfile {
    UserProfile {
        id: user.id,
        username: user.username.clone(),
        image_url: user.image_url.clone(),
        header_image_url: user.header_image_url.clone(),
        bio: user.bio.clone(),
        location: user.location.clone(),
        messages_count: stats.messages,
        following_count: stats.following,
        followers_count: stats.followers,
        likes_count: stats.likes,
    }
}

pub fn edit_profile(user: &UserRow) -> EditProfileResponse {
    EditProfileResponse {
        id: user.id,
        username: user.username.clone(),
        email: user.email.clone(),
        image_url: user.image_url.clone(),
        header_image_url: user.header_image_url.clone(),
        bio: user.bio.clone(),
        location: user.location.clone(),
    }
}

/// Attach like counts and the viewer's like state to a batch of messages.
pub fn present_messages(
    db: &Database,
    viewer: Option<i64>,
    rows: Vec<MessageRow>,
) -> warbler_db::Result<Vec<MessageResponse>> {
    let ids: Vec<i64> = rows.iter().map(|m| m.id).collect();
    let counts = db.like_counts(&ids)?;
    let liked = match viewer {
        Some(user_id) => db.liked_among(user_id, &ids)?,
        None => HashSet::new(),
    };

    let messages = rows
        .into_iter()
        .map(|m| MessageResponse {
            id: m.id,
            likes: counts.get(&m.id).copied().unwrap_or(0),
            liked: liked.contains(&m.id),
            text: m.text,
            timestamp: m.timestamp,
            user: UserSummary {
                id: m.user_id,
                username: m.author_username,
                image_url: m.author_image_url,
            },
        })
        .collect();

    Ok(messages)
}
