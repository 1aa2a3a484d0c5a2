/// Comment service - replies on posts
use crate::db::Store;
use crate::error::Result;
use crate::forms::{CommentForm, FormErrors};
use crate::metrics::COMMENTS_CREATED_TOTAL;
use crate::middleware::Identity;
use crate::models::{Comment, PostView};
use std::sync::Arc;

#[derive(Clone)]
pub struct CommentService {
    store: Arc<dyn Store>,
}

impl CommentService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Validate and store a comment by the acting user.
    ///
    /// An invalid form is dropped and reported back as field errors; the
    /// caller redirects to the post either way.
    pub async fn add_comment(
        &self,
        identity: &Identity,
        post: &PostView,
        form: &CommentForm,
    ) -> Result<std::result::Result<Comment, FormErrors>> {
        let text = match form.clean() {
            Ok(text) => text,
            Err(errors) => {
                COMMENTS_CREATED_TOTAL.with_label_values(&["invalid"]).inc();
                tracing::debug!(post_id = post.id, user = %identity.username, "comment rejected by validation");
                return Ok(Err(errors));
            }
        };

        let comment = self
            .store
            .create_comment(post.id, identity.user_id, &text)
            .await?;

        COMMENTS_CREATED_TOTAL.with_label_values(&["created"]).inc();
        tracing::info!(
            comment_id = comment.id,
            post_id = post.id,
            author = %identity.username,
            "comment added"
        );
        Ok(Ok(comment))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PostDraft;
    use crate::db::MemoryStore;

    #[tokio::test]
    async fn comment_is_stored_with_acting_author() {
        let store = Arc::new(MemoryStore::new());
        let writer = store.create_user("writer", "", "").await.unwrap();
        let reader = store.create_user("reader", "", "").await.unwrap();
        let post = store
            .create_post(
                writer.id,
                &PostDraft {
                    text: "text".into(),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        let view = store.find_post("writer", post.id).await.unwrap().unwrap();

        let service = CommentService::new(store.clone());
        let identity = Identity {
            user_id: reader.id,
            username: reader.username.clone(),
        };

        let comment = service
            .add_comment(&identity, &view, &CommentForm { text: " nice ".into() })
            .await
            .unwrap()
            .unwrap();
        assert_eq!(comment.author_id, reader.id);
        assert_eq!(comment.text, "nice");

        let rejected = service
            .add_comment(&identity, &view, &CommentForm { text: String::new() })
            .await
            .unwrap();
        assert!(rejected.is_err());
        assert_eq!(store.list_comments(post.id).await.unwrap().len(), 1);
    }
}
