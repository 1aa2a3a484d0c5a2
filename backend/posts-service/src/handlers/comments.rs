/// Comment handler
use super::redirect;
use crate::error::Result;
use crate::forms::CommentForm;
use crate::middleware::AuthenticatedUser;
use crate::routes;
use crate::AppState;
use actix_web::{web, HttpResponse};

/// Store a comment and go back to the post. Invalid input is dropped.
pub async fn add_comment(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    path: web::Path<(String, i64)>,
    form: web::Form<CommentForm>,
) -> Result<HttpResponse> {
    let (username, post_id) = path.into_inner();
    let post = state.posts().find_post(&username, post_id).await?;

    // Field errors are not shown; the post page renders an empty form.
    let _ = state
        .comments()
        .add_comment(&user.0, &post, &form.into_inner())
        .await?;

    Ok(redirect(routes::post(&username, post.id)))
}
