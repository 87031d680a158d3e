use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use serde::Serialize;

use super::{
    validate_non_empty, DomainError, DomainResult, Ordered, Playlist, PodcastSubscription, Review,
    ReviewId, UserId,
};

/// A registered user. Always owns exactly one playlist.
#[derive(Debug, Clone, Serialize)]
pub struct User {
    id: UserId,
    username: String,
    #[serde(skip_serializing)]
    password: String,
    subscriptions: Vec<PodcastSubscription>,
    review_ids: Vec<ReviewId>,
    playlist: Playlist,
}

/// Usernames are stored and looked up trimmed and lowercased.
pub(crate) fn normalize_username(username: &str) -> String {
    username.trim().to_lowercase()
}

impl User {
    /// `password` is stored as given; callers hash it first.
    pub fn new(id: UserId, username: &str, password: &str) -> DomainResult<Self> {
        let username = normalize_username(&validate_non_empty(username, "Username")?);
        if password.is_empty() {
            return Err(DomainError::Validation(
                "Password must be a non-empty string".to_string(),
            ));
        }
        let playlist = Playlist::new(id, id, &format!("{}'s Playlist", username))?;
        Ok(Self {
            id,
            username,
            password: password.to_string(),
            subscriptions: Vec::new(),
            review_ids: Vec::new(),
            playlist,
        })
    }

    pub fn id(&self) -> UserId {
        self.id
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn password(&self) -> &str {
        &self.password
    }

    pub fn subscriptions(&self) -> &[PodcastSubscription] {
        &self.subscriptions
    }

    pub fn add_subscription(&mut self, subscription: PodcastSubscription) -> DomainResult<()> {
        if subscription.owner() != self.id {
            return Err(DomainError::TypeMismatch(format!(
                "subscription {} is owned by user {}, not {}",
                subscription.id(),
                subscription.owner(),
                self.id
            )));
        }
        if !self.subscriptions.contains(&subscription) {
            self.subscriptions.push(subscription);
        }
        Ok(())
    }

    pub fn remove_subscription(&mut self, subscription: &PodcastSubscription) {
        self.subscriptions.retain(|s| s != subscription);
    }

    pub fn review_ids(&self) -> &[ReviewId] {
        &self.review_ids
    }

    pub fn has_review(&self, review_id: ReviewId) -> bool {
        self.review_ids.contains(&review_id)
    }

    pub fn add_review(&mut self, review: &Review) -> DomainResult<()> {
        if review.poster() != self.id {
            return Err(DomainError::TypeMismatch(format!(
                "review {} was posted by user {}, not {}",
                review.id(),
                review.poster(),
                self.id
            )));
        }
        self.link_review(review.id());
        Ok(())
    }

    pub fn playlist(&self) -> &Playlist {
        &self.playlist
    }

    pub fn playlist_mut(&mut self) -> &mut Playlist {
        &mut self.playlist
    }

    pub(crate) fn link_review(&mut self, review_id: ReviewId) {
        if !self.review_ids.contains(&review_id) {
            self.review_ids.push(review_id);
        }
    }

    pub(crate) fn unlink_review(&mut self, review_id: ReviewId) {
        self.review_ids.retain(|id| *id != review_id);
    }

    pub(crate) fn clear_links(&mut self) {
        self.review_ids.clear();
    }

    pub(crate) fn replace_playlist(&mut self, playlist: Playlist) {
        self.playlist = playlist;
    }
}

impl PartialEq for User {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for User {}

impl Hash for User {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl PartialOrd for User {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for User {
    fn cmp(&self, other: &Self) -> Ordering {
        self.id.cmp(&other.id)
    }
}

impl Ordered for User {
    type Key = UserId;

    fn sort_key(&self) -> UserId {
        self.id
    }
}

impl fmt::Display for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<User {}: {}>", self.id, self.username)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_username_normalized() {
        let user = User::new(1, "  Shyamli ", "pw1234").unwrap();
        assert_eq!(user.username(), "shyamli");
        assert_eq!(user.to_string(), "<User 1: shyamli>");
    }

    #[test]
    fn test_playlist_created_with_user() {
        let user = User::new(3, "Asma", "pw").unwrap();
        assert_eq!(user.playlist().id(), 3);
        assert_eq!(user.playlist().creator(), 3);
        assert_eq!(user.playlist().name(), "asma's Playlist");
        assert!(user.playlist().is_empty());
    }

    #[test]
    fn test_rejects_empty_fields() {
        assert!(matches!(User::new(1, " ", "pw"), Err(DomainError::Validation(_))));
        assert!(matches!(User::new(1, "jenny", ""), Err(DomainError::Validation(_))));
    }

    #[test]
    fn test_subscriptions() {
        let mut user = User::new(1, "jenny", "pw").unwrap();
        let sub = PodcastSubscription::new(1, 1, 5);
        user.add_subscription(sub.clone()).unwrap();
        user.add_subscription(sub.clone()).unwrap();
        assert_eq!(user.subscriptions().len(), 1);

        let foreign = PodcastSubscription::new(2, 9, 5);
        assert!(matches!(
            user.add_subscription(foreign),
            Err(DomainError::TypeMismatch(_))
        ));

        user.remove_subscription(&sub);
        assert!(user.subscriptions().is_empty());
    }

    #[test]
    fn test_review_from_other_user_rejected() {
        let mut user = User::new(1, "jenny", "pw").unwrap();
        let review = Review::new(2, 1, 4, "fine");
        assert!(matches!(user.add_review(&review), Err(DomainError::TypeMismatch(_))));
        assert!(user.review_ids().is_empty());
    }

    #[test]
    fn test_password_not_serialized() {
        let user = User::new(1, "jenny", "secret-hash").unwrap();
        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("secret-hash"));
        assert!(json.contains("\"username\":\"jenny\""));
    }
}
