/// Database access layer
///
/// `Store` is the storage handle injected into services and handlers. Two
/// implementations exist: `PostgresStore` for deployments and `MemoryStore`
/// for tests and local runs without a database.
pub mod memory_store;
pub mod pg_store;

pub use memory_store::MemoryStore;
pub use pg_store::PostgresStore;

use crate::error::Result;
use crate::models::{
    Comment, CommentView, Group, NewGroup, Post, PostDraft, PostView, User,
};

/// Which posts a listing covers. Every listing is newest-first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostFilter {
    All,
    Group(i64),
    Author(i64),
    /// Posts whose author is followed by the given user.
    FollowedBy(i64),
}

#[async_trait::async_trait]
pub trait Store: Send + Sync {
    // ---------------------------------------------------------------------
    // Users (owned by the external account store)
    // ---------------------------------------------------------------------

    async fn find_user(&self, user_id: i64) -> Result<Option<User>>;

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>>;

    /// Register a user. Used for seeding; accounts are normally created by
    /// the external account service.
    async fn create_user(&self, username: &str, first_name: &str, last_name: &str)
        -> Result<User>;

    /// Delete a user together with their posts, comments and follow edges.
    async fn delete_user(&self, user_id: i64) -> Result<bool>;

    // ---------------------------------------------------------------------
    // Groups (administrative)
    // ---------------------------------------------------------------------

    async fn find_group(&self, group_id: i64) -> Result<Option<Group>>;

    async fn find_group_by_slug(&self, slug: &str) -> Result<Option<Group>>;

    /// All groups ordered by title, for the group select widget.
    async fn list_groups(&self) -> Result<Vec<Group>>;

    /// Fails with `Validation` if the slug is taken.
    async fn create_group(&self, group: NewGroup) -> Result<Group>;

    /// Delete a group. Its posts stay, with no group.
    async fn delete_group(&self, group_id: i64) -> Result<bool>;

    // ---------------------------------------------------------------------
    // Posts
    // ---------------------------------------------------------------------

    async fn count_posts(&self, filter: PostFilter) -> Result<i64>;

    /// One slice of a listing, author and group pre-joined.
    async fn list_posts(&self, filter: PostFilter, limit: i64, offset: i64)
        -> Result<Vec<PostView>>;

    /// The post with `post_id`, only if it was written by `username`.
    async fn find_post(&self, username: &str, post_id: i64) -> Result<Option<PostView>>;

    async fn create_post(&self, author_id: i64, draft: &PostDraft) -> Result<Post>;

    /// Replace text and group; replace the image only when the draft has one.
    /// Author and pub_date never change.
    async fn update_post(&self, post_id: i64, draft: &PostDraft) -> Result<Option<Post>>;

    /// Delete a post together with its comments.
    async fn delete_post(&self, post_id: i64) -> Result<bool>;

    // ---------------------------------------------------------------------
    // Comments
    // ---------------------------------------------------------------------

    /// Comments of a post, newest first.
    async fn list_comments(&self, post_id: i64) -> Result<Vec<CommentView>>;

    async fn create_comment(&self, post_id: i64, author_id: i64, text: &str) -> Result<Comment>;

    // ---------------------------------------------------------------------
    // Follow graph
    // ---------------------------------------------------------------------

    /// Atomic get-or-create. Returns true if a new edge was inserted.
    async fn follow(&self, user_id: i64, author_id: i64) -> Result<bool>;

    /// Returns true if an edge was removed; removing a missing edge is a no-op.
    async fn unfollow(&self, user_id: i64, author_id: i64) -> Result<bool>;

    async fn is_following(&self, user_id: i64, author_id: i64) -> Result<bool>;

    async fn follower_count(&self, author_id: i64) -> Result<i64>;

    async fn following_count(&self, user_id: i64) -> Result<i64>;

    async fn health_check(&self) -> Result<()> {
        Ok(())
    }
}
