use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// -- Auth --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SignupRequest {
    pub username: String,
    pub email: String,
    pub password: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    pub user: UserSummary,
}

// -- Users --

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: i64,
    pub username: String,
    pub image_url: String,
}

/// Public profile with aggregate counts.
#[derive(Debug, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: i64,
    pub username: String,
    pub image_url: String,
    pub header_image_url: String,
    pub bio: Option<String>,
    pub location: Option<String>,
    pub messages_count: i64,
    pub following_count: i64,
    pub followers_count: i64,
    pub likes_count: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UserPage {
    pub user: UserProfile,
    pub messages: Vec<MessageResponse>,
    /// Whether the viewer follows this user; false for anonymous viewers.
    pub viewer_follows: bool,
}

#[derive(Debug, Deserialize)]
pub struct UserSearchQuery {
    pub q: Option<String>,
}

/// A user alongside a list of related users (following or followers).
#[derive(Debug, Serialize, Deserialize)]
pub struct ConnectionsResponse {
    pub user: UserSummary,
    pub users: Vec<UserSummary>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LikesResponse {
    pub user: UserSummary,
    pub messages: Vec<MessageResponse>,
}

/// The viewer's own editable profile.
#[derive(Debug, Serialize, Deserialize)]
pub struct EditProfileResponse {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub image_url: String,
    pub header_image_url: String,
    pub bio: Option<String>,
    pub location: Option<String>,
}

/// Omitted fields are left unchanged. `password` must be the current one.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProfileUpdateRequest {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub header_image_url: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    pub password: String,
}

// -- Messages --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewMessageRequest {
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub id: i64,
    pub text: String,
    pub timestamp: DateTime<Utc>,
    pub user: UserSummary,
    pub likes: i64,
    /// Whether the viewer likes this message; false for anonymous viewers.
    pub liked: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TimelineResponse {
    pub user: Option<UserSummary>,
    pub messages: Vec<MessageResponse>,
}

// -- Likes --

#[derive(Debug, Serialize, Deserialize)]
pub struct LikeResponse {
    pub message_id: i64,
    pub liked: bool,
    pub likes: i64,
}
