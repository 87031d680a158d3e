use std::fmt;

use serde::Serialize;

use super::{Ordered, PodcastId, SubscriptionId, UserId};

/// A user's subscription to a podcast. Compared by value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct PodcastSubscription {
    id: SubscriptionId,
    owner: UserId,
    podcast: PodcastId,
}

impl PodcastSubscription {
    pub fn new(id: SubscriptionId, owner: UserId, podcast: PodcastId) -> Self {
        Self { id, owner, podcast }
    }

    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    pub fn owner(&self) -> UserId {
        self.owner
    }

    pub fn set_owner(&mut self, owner: UserId) {
        self.owner = owner;
    }

    pub fn podcast(&self) -> PodcastId {
        self.podcast
    }

    pub fn set_podcast(&mut self, podcast: PodcastId) {
        self.podcast = podcast;
    }
}

impl Ordered for PodcastSubscription {
    type Key = SubscriptionId;

    fn sort_key(&self) -> SubscriptionId {
        self.id
    }
}

impl fmt::Display for PodcastSubscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "<Subscription {}: user {} -> podcast {}>",
            self.id, self.owner, self.podcast
        )
    }
}
