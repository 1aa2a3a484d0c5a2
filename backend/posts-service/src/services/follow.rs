/// Follow service - the follower graph and the personal feed
use crate::db::{PostFilter, Store};
use crate::error::Result;
use crate::metrics::FOLLOW_EVENTS_TOTAL;
use crate::middleware::permissions::can_follow;
use crate::middleware::Identity;
use crate::models::{Follow, PostView, User, UserRef};
use crate::services::pagination::{paginate_posts, Page};
use std::sync::Arc;

#[derive(Clone)]
pub struct FollowService {
    store: Arc<dyn Store>,
    per_page: i64,
}

impl FollowService {
    pub fn new(store: Arc<dyn Store>, per_page: i64) -> Self {
        Self { store, per_page }
    }

    fn edge(identity: &Identity, author: &User) -> Follow {
        Follow {
            user: UserRef {
                id: identity.user_id,
                username: identity.username.clone(),
                full_name: String::new(),
            },
            author: author.to_ref(),
        }
    }

    /// Idempotent follow; returns true if a new edge was created.
    /// Following yourself is silently ignored.
    pub async fn follow(&self, identity: &Identity, author: &User) -> Result<bool> {
        if !can_follow(identity, author) {
            FOLLOW_EVENTS_TOTAL.with_label_values(&["noop"]).inc();
            return Ok(false);
        }

        let created = self.store.follow(identity.user_id, author.id).await?;
        let edge = Self::edge(identity, author);
        if created {
            FOLLOW_EVENTS_TOTAL.with_label_values(&["follow"]).inc();
            tracing::info!(follow = %edge, "follow created");
        } else {
            FOLLOW_EVENTS_TOTAL.with_label_values(&["noop"]).inc();
            tracing::debug!(follow = %edge, "follow already exists");
        }
        Ok(created)
    }

    /// Idempotent delete; returns true if an edge was removed.
    pub async fn unfollow(&self, identity: &Identity, author: &User) -> Result<bool> {
        let removed = self.store.unfollow(identity.user_id, author.id).await?;
        let edge = Self::edge(identity, author);
        if removed {
            FOLLOW_EVENTS_TOTAL.with_label_values(&["unfollow"]).inc();
            tracing::info!(follow = %edge, "follow removed");
        } else {
            FOLLOW_EVENTS_TOTAL.with_label_values(&["noop"]).inc();
        }
        Ok(removed)
    }

    /// Whether the viewer follows `author`. Anonymous viewers follow nobody.
    pub async fn is_following(&self, viewer: Option<&Identity>, author: &User) -> Result<bool> {
        match viewer {
            Some(identity) => self.store.is_following(identity.user_id, author.id).await,
            None => Ok(false),
        }
    }

    /// Posts by authors the acting user follows, newest first.
    pub async fn feed(&self, identity: &Identity, raw_page: Option<&str>) -> Result<Page<PostView>> {
        paginate_posts(
            self.store.as_ref(),
            PostFilter::FollowedBy(identity.user_id),
            raw_page,
            self.per_page,
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;
    use crate::models::PostDraft;

    fn identity(user: &User) -> Identity {
        Identity {
            user_id: user.id,
            username: user.username.clone(),
        }
    }

    #[tokio::test]
    async fn follow_is_idempotent_and_reversible() {
        let store = Arc::new(MemoryStore::new());
        let reader = store.create_user("reader", "", "").await.unwrap();
        let writer = store.create_user("writer", "", "").await.unwrap();
        let service = FollowService::new(store.clone(), 10);
        let me = identity(&reader);

        assert!(service.follow(&me, &writer).await.unwrap());
        assert!(!service.follow(&me, &writer).await.unwrap());
        assert_eq!(store.follower_count(writer.id).await.unwrap(), 1);
        assert!(service.is_following(Some(&me), &writer).await.unwrap());
        assert!(!service.is_following(None, &writer).await.unwrap());

        assert!(service.unfollow(&me, &writer).await.unwrap());
        assert!(!service.unfollow(&me, &writer).await.unwrap());
        assert_eq!(store.follower_count(writer.id).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn self_follow_is_ignored() {
        let store = Arc::new(MemoryStore::new());
        let writer = store.create_user("writer", "", "").await.unwrap();
        let service = FollowService::new(store.clone(), 10);

        assert!(!service.follow(&identity(&writer), &writer).await.unwrap());
        assert_eq!(store.following_count(writer.id).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn feed_only_contains_followed_authors() {
        let store = Arc::new(MemoryStore::new());
        let reader = store.create_user("reader", "", "").await.unwrap();
        let writer = store.create_user("writer", "", "").await.unwrap();
        let stranger = store.create_user("stranger", "", "").await.unwrap();
        for (author, text) in [(&writer, "followed"), (&stranger, "not followed")] {
            store
                .create_post(
                    author.id,
                    &PostDraft {
                        text: text.into(),
                        ..Default::default()
                    },
                )
                .await
                .unwrap();
        }
        let service = FollowService::new(store.clone(), 10);
        let me = identity(&reader);

        assert!(service.feed(&me, None).await.unwrap().items.is_empty());

        service.follow(&me, &writer).await.unwrap();
        let page = service.feed(&me, None).await.unwrap();
        let texts: Vec<&str> = page.items.iter().map(|p| p.text.as_str()).collect();
        assert_eq!(texts, ["followed"]);
    }
}
