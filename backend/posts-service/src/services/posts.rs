/// Post service - listings, post detail, publishing and editing
use crate::db::{PostFilter, Store};
use crate::error::{AppError, Result};
use crate::metrics::{LISTING_DURATION_SECONDS, POSTS_CREATED_TOTAL, POST_EDITS_TOTAL};
use crate::middleware::permissions::check_post_ownership;
use crate::middleware::Identity;
use crate::models::{CommentView, Group, Post, PostDraft, PostView, Profile, User};
use crate::services::pagination::{paginate_posts, Page};
use std::sync::Arc;
use std::time::Instant;

/// An author's profile header together with one page of their posts.
#[derive(Debug, Clone)]
pub struct ProfileListing {
    pub profile: Profile,
    pub page: Page<PostView>,
}

#[derive(Clone)]
pub struct PostService {
    store: Arc<dyn Store>,
    per_page: i64,
}

impl PostService {
    pub fn new(store: Arc<dyn Store>, per_page: i64) -> Self {
        Self { store, per_page }
    }

    async fn listing(
        &self,
        listing: &str,
        filter: PostFilter,
        raw_page: Option<&str>,
    ) -> Result<Page<PostView>> {
        let started = Instant::now();
        let page = paginate_posts(self.store.as_ref(), filter, raw_page, self.per_page).await?;
        LISTING_DURATION_SECONDS
            .with_label_values(&[listing])
            .observe(started.elapsed().as_secs_f64());
        Ok(page)
    }

    /// All posts, newest first.
    pub async fn index(&self, raw_page: Option<&str>) -> Result<Page<PostView>> {
        self.listing("index", PostFilter::All, raw_page).await
    }

    pub async fn group_posts(
        &self,
        slug: &str,
        raw_page: Option<&str>,
    ) -> Result<(Group, Page<PostView>)> {
        let group = self
            .store
            .find_group_by_slug(slug)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("group '{}'", slug)))?;

        let page = self
            .listing("group", PostFilter::Group(group.id), raw_page)
            .await?;
        Ok((group, page))
    }

    pub async fn find_author(&self, username: &str) -> Result<User> {
        self.store
            .find_user_by_username(username)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("user '{}'", username)))
    }

    pub async fn profile(&self, author: &User, raw_page: Option<&str>) -> Result<ProfileListing> {
        let page = self
            .listing("profile", PostFilter::Author(author.id), raw_page)
            .await?;

        let profile = Profile {
            user: author.to_ref(),
            posts_count: page.count,
            followers_count: self.store.follower_count(author.id).await?,
            following_count: self.store.following_count(author.id).await?,
        };
        Ok(ProfileListing { profile, page })
    }

    /// The post `post_id` written by `username`, or NotFound.
    pub async fn find_post(&self, username: &str, post_id: i64) -> Result<PostView> {
        self.store
            .find_post(username, post_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("post {} by '{}'", post_id, username)))
    }

    pub async fn post_detail(
        &self,
        username: &str,
        post_id: i64,
    ) -> Result<(PostView, Vec<CommentView>)> {
        let post = self.find_post(username, post_id).await?;
        let comments = self.store.list_comments(post.id).await?;
        Ok((post, comments))
    }

    pub async fn groups(&self) -> Result<Vec<Group>> {
        self.store.list_groups().await
    }

    /// Publish a post with the acting user as author.
    pub async fn create_post(&self, identity: &Identity, draft: &PostDraft) -> Result<Post> {
        let post = self.store.create_post(identity.user_id, draft).await?;
        POSTS_CREATED_TOTAL.inc();
        tracing::info!(
            post_id = post.id,
            author = %identity.username,
            group_id = ?post.group_id,
            "post created"
        );
        Ok(post)
    }

    /// Apply an edit. Only the author may edit; author and pub_date stay.
    pub async fn edit_post(
        &self,
        identity: &Identity,
        post: &PostView,
        draft: &PostDraft,
    ) -> Result<Post> {
        if let Err(err) = check_post_ownership(identity, post) {
            POST_EDITS_TOTAL.with_label_values(&["not_author"]).inc();
            return Err(err);
        }

        let updated = self
            .store
            .update_post(post.id, draft)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("post {}", post.id)))?;

        POST_EDITS_TOTAL.with_label_values(&["updated"]).inc();
        tracing::info!(post_id = updated.id, author = %identity.username, "post edited");
        Ok(updated)
    }

    pub fn record_invalid_edit(&self) {
        POST_EDITS_TOTAL.with_label_values(&["invalid"]).inc();
    }
}
