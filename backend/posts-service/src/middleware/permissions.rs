/// Authorization policy for posts-service
///
/// Ownership checks for posts and the rule for follow edges. Handlers turn a
/// denied edit into a redirect to the post, never into an error page.
use crate::error::AppError;
use crate::middleware::Identity;
use crate::models::{PostView, User};

/// Result type for permission checks
pub type PermissionResult = Result<(), AppError>;

/// Check if a user wrote a post
pub fn check_post_ownership(identity: &Identity, post: &PostView) -> PermissionResult {
    if post.author.id == identity.user_id {
        Ok(())
    } else {
        Err(AppError::Forbidden(
            "You don't have permission to modify this post".to_string(),
        ))
    }
}

/// A user may follow anyone but themself
pub fn can_follow(identity: &Identity, author: &User) -> bool {
    identity.user_id != author.id
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::UserRef;
    use chrono::Utc;

    fn identity(user_id: i64) -> Identity {
        Identity {
            user_id,
            username: format!("user{user_id}"),
        }
    }

    #[test]
    fn only_author_owns_post() {
        let post = PostView {
            id: 1,
            text: "text".into(),
            pub_date: Utc::now(),
            image: None,
            author: UserRef {
                id: 7,
                username: "user7".into(),
                full_name: String::new(),
            },
            group: None,
            comments_count: 0,
        };
        assert!(check_post_ownership(&identity(7), &post).is_ok());
        assert!(matches!(
            check_post_ownership(&identity(8), &post),
            Err(AppError::Forbidden(_))
        ));
    }

    #[test]
    fn cannot_follow_self() {
        let author = User {
            id: 3,
            username: "user3".into(),
            first_name: String::new(),
            last_name: String::new(),
        };
        assert!(!can_follow(&identity(3), &author));
        assert!(can_follow(&identity(4), &author));
    }
}
