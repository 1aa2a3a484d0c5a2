use super::{PostFilter, Store};
use crate::error::{AppError, Result};
use crate::models::{
    Comment, CommentView, Group, NewGroup, Post, PostDraft, PostView, User,
};
use chrono::Utc;
use std::collections::{BTreeMap, BTreeSet};
use tokio::sync::RwLock;

#[derive(Default)]
struct Inner {
    users: BTreeMap<i64, User>,
    groups: BTreeMap<i64, Group>,
    posts: BTreeMap<i64, Post>,
    comments: BTreeMap<i64, Comment>,
    /// (follower, author)
    follows: BTreeSet<(i64, i64)>,
    next_user_id: i64,
    next_group_id: i64,
    next_post_id: i64,
    next_comment_id: i64,
}

fn next_id(counter: &mut i64) -> i64 {
    *counter += 1;
    *counter
}

impl Inner {
    fn matches(&self, post: &Post, filter: PostFilter) -> bool {
        match filter {
            PostFilter::All => true,
            PostFilter::Group(group_id) => post.group_id == Some(group_id),
            PostFilter::Author(author_id) => post.author_id == author_id,
            PostFilter::FollowedBy(user_id) => self.follows.contains(&(user_id, post.author_id)),
        }
    }

    /// Newest first, ties broken by id.
    fn sorted_posts(&self, filter: PostFilter) -> Vec<&Post> {
        let mut posts: Vec<&Post> = self
            .posts
            .values()
            .filter(|p| self.matches(p, filter))
            .collect();
        posts.sort_by(|a, b| b.pub_date.cmp(&a.pub_date).then(b.id.cmp(&a.id)));
        posts
    }

    fn view(&self, post: &Post) -> Option<PostView> {
        let author = self.users.get(&post.author_id)?.to_ref();
        let group = post
            .group_id
            .and_then(|id| self.groups.get(&id))
            .map(Group::to_ref);
        let comments_count = self
            .comments
            .values()
            .filter(|c| c.post_id == post.id)
            .count() as i64;

        Some(PostView {
            id: post.id,
            text: post.text.clone(),
            pub_date: post.pub_date,
            image: post.image.clone(),
            author,
            group,
            comments_count,
        })
    }

    fn remove_post(&mut self, post_id: i64) -> bool {
        let removed = self.posts.remove(&post_id).is_some();
        if removed {
            self.comments.retain(|_, c| c.post_id != post_id);
        }
        removed
    }
}

/// In-process store for tests and database-less runs.
///
/// All state sits behind one lock, so each operation is atomic with respect
/// to the others, including the check-then-insert of `follow`.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl Store for MemoryStore {
    async fn find_user(&self, user_id: i64) -> Result<Option<User>> {
        Ok(self.inner.read().await.users.get(&user_id).cloned())
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>> {
        let inner = self.inner.read().await;
        Ok(inner
            .users
            .values()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn create_user(
        &self,
        username: &str,
        first_name: &str,
        last_name: &str,
    ) -> Result<User> {
        let mut inner = self.inner.write().await;
        if inner.users.values().any(|u| u.username == username) {
            return Err(AppError::Validation(format!(
                "username '{}' is already taken",
                username
            )));
        }

        let user = User {
            id: next_id(&mut inner.next_user_id),
            username: username.to_string(),
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
        };
        inner.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn delete_user(&self, user_id: i64) -> Result<bool> {
        let mut inner = self.inner.write().await;
        if inner.users.remove(&user_id).is_none() {
            return Ok(false);
        }

        let authored: Vec<i64> = inner
            .posts
            .values()
            .filter(|p| p.author_id == user_id)
            .map(|p| p.id)
            .collect();
        for post_id in authored {
            inner.remove_post(post_id);
        }
        inner.comments.retain(|_, c| c.author_id != user_id);
        inner
            .follows
            .retain(|(follower, author)| *follower != user_id && *author != user_id);
        Ok(true)
    }

    async fn find_group(&self, group_id: i64) -> Result<Option<Group>> {
        Ok(self.inner.read().await.groups.get(&group_id).cloned())
    }

    async fn find_group_by_slug(&self, slug: &str) -> Result<Option<Group>> {
        let inner = self.inner.read().await;
        Ok(inner.groups.values().find(|g| g.slug == slug).cloned())
    }

    async fn list_groups(&self) -> Result<Vec<Group>> {
        let inner = self.inner.read().await;
        let mut groups: Vec<Group> = inner.groups.values().cloned().collect();
        groups.sort_by(|a, b| a.title.cmp(&b.title).then(a.id.cmp(&b.id)));
        Ok(groups)
    }

    async fn create_group(&self, group: NewGroup) -> Result<Group> {
        let mut inner = self.inner.write().await;
        if inner.groups.values().any(|g| g.slug == group.slug) {
            return Err(AppError::Validation(format!(
                "group slug '{}' is already taken",
                group.slug
            )));
        }

        let group = Group {
            id: next_id(&mut inner.next_group_id),
            title: group.title,
            slug: group.slug,
            description: group.description,
        };
        inner.groups.insert(group.id, group.clone());
        Ok(group)
    }

    async fn delete_group(&self, group_id: i64) -> Result<bool> {
        let mut inner = self.inner.write().await;
        if inner.groups.remove(&group_id).is_none() {
            return Ok(false);
        }
        for post in inner.posts.values_mut() {
            if post.group_id == Some(group_id) {
                post.group_id = None;
            }
        }
        Ok(true)
    }

    async fn count_posts(&self, filter: PostFilter) -> Result<i64> {
        let inner = self.inner.read().await;
        Ok(inner.posts.values().filter(|p| inner.matches(p, filter)).count() as i64)
    }

    async fn list_posts(
        &self,
        filter: PostFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<PostView>> {
        let inner = self.inner.read().await;
        let offset = usize::try_from(offset.max(0)).unwrap_or(usize::MAX);
        let limit = usize::try_from(limit.max(0)).unwrap_or(usize::MAX);

        Ok(inner
            .sorted_posts(filter)
            .into_iter()
            .skip(offset)
            .take(limit)
            .filter_map(|p| inner.view(p))
            .collect())
    }

    async fn find_post(&self, username: &str, post_id: i64) -> Result<Option<PostView>> {
        let inner = self.inner.read().await;
        let Some(post) = inner.posts.get(&post_id) else {
            return Ok(None);
        };
        let view = inner
            .view(post)
            .filter(|view| view.author.username == username);
        Ok(view)
    }

    async fn create_post(&self, author_id: i64, draft: &PostDraft) -> Result<Post> {
        let mut inner = self.inner.write().await;
        if !inner.users.contains_key(&author_id) {
            return Err(AppError::Validation(format!("unknown author {}", author_id)));
        }
        if let Some(group_id) = draft.group_id {
            if !inner.groups.contains_key(&group_id) {
                return Err(AppError::Validation(format!("unknown group {}", group_id)));
            }
        }

        let post = Post {
            id: next_id(&mut inner.next_post_id),
            text: draft.text.clone(),
            pub_date: Utc::now(),
            author_id,
            group_id: draft.group_id,
            image: draft.image.clone(),
        };
        inner.posts.insert(post.id, post.clone());
        Ok(post)
    }

    async fn update_post(&self, post_id: i64, draft: &PostDraft) -> Result<Option<Post>> {
        let mut inner = self.inner.write().await;
        if let Some(group_id) = draft.group_id {
            if !inner.groups.contains_key(&group_id) {
                return Err(AppError::Validation(format!("unknown group {}", group_id)));
            }
        }

        let Some(post) = inner.posts.get_mut(&post_id) else {
            return Ok(None);
        };
        post.text = draft.text.clone();
        post.group_id = draft.group_id;
        if let Some(image) = &draft.image {
            post.image = Some(image.clone());
        }
        Ok(Some(post.clone()))
    }

    async fn delete_post(&self, post_id: i64) -> Result<bool> {
        Ok(self.inner.write().await.remove_post(post_id))
    }

    async fn list_comments(&self, post_id: i64) -> Result<Vec<CommentView>> {
        let inner = self.inner.read().await;
        let mut comments: Vec<&Comment> = inner
            .comments
            .values()
            .filter(|c| c.post_id == post_id)
            .collect();
        comments.sort_by(|a, b| b.created.cmp(&a.created).then(b.id.cmp(&a.id)));

        Ok(comments
            .into_iter()
            .filter_map(|c| {
                let author = inner.users.get(&c.author_id)?.to_ref();
                Some(CommentView {
                    id: c.id,
                    post_id: c.post_id,
                    text: c.text.clone(),
                    created: c.created,
                    author,
                })
            })
            .collect())
    }

    async fn create_comment(&self, post_id: i64, author_id: i64, text: &str) -> Result<Comment> {
        let mut inner = self.inner.write().await;
        if !inner.posts.contains_key(&post_id) {
            return Err(AppError::NotFound(format!("post {}", post_id)));
        }
        if !inner.users.contains_key(&author_id) {
            return Err(AppError::Validation(format!("unknown author {}", author_id)));
        }

        let comment = Comment {
            id: next_id(&mut inner.next_comment_id),
            post_id,
            author_id,
            text: text.to_string(),
            created: Utc::now(),
        };
        inner.comments.insert(comment.id, comment.clone());
        Ok(comment)
    }

    async fn follow(&self, user_id: i64, author_id: i64) -> Result<bool> {
        let mut inner = self.inner.write().await;
        if !inner.users.contains_key(&user_id) || !inner.users.contains_key(&author_id) {
            return Err(AppError::Validation("unknown user in follow".to_string()));
        }
        Ok(inner.follows.insert((user_id, author_id)))
    }

    async fn unfollow(&self, user_id: i64, author_id: i64) -> Result<bool> {
        Ok(self.inner.write().await.follows.remove(&(user_id, author_id)))
    }

    async fn is_following(&self, user_id: i64, author_id: i64) -> Result<bool> {
        Ok(self
            .inner
            .read()
            .await
            .follows
            .contains(&(user_id, author_id)))
    }

    async fn follower_count(&self, author_id: i64) -> Result<i64> {
        let inner = self.inner.read().await;
        Ok(inner.follows.iter().filter(|(_, a)| *a == author_id).count() as i64)
    }

    async fn following_count(&self, user_id: i64) -> Result<i64> {
        let inner = self.inner.read().await;
        Ok(inner.follows.iter().filter(|(u, _)| *u == user_id).count() as i64)
    }
}
