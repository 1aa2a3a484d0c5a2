/// Post handlers - listings, post detail, publishing and editing
use super::{redirect, PageQuery};
use crate::error::Result;
use crate::forms::{BoundForm, CommentForm, PostForm};
use crate::middleware::permissions::check_post_ownership;
use crate::middleware::AuthenticatedUser;
use crate::models::{CommentView, Group, GroupRef, PostView, UserRef};
use crate::routes;
use crate::services::Page;
use crate::AppState;
use actix_web::http::header::ContentType;
use actix_web::web::Bytes;
use actix_web::{web, HttpRequest, HttpResponse};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct IndexPage {
    pub page: Page<PostView>,
}

#[derive(Debug, Serialize)]
pub struct GroupPage {
    pub group: Group,
    pub page: Page<PostView>,
}

#[derive(Debug, Serialize)]
pub struct PostPage {
    pub post: PostView,
    pub author: UserRef,
    pub comments: Vec<CommentView>,
    pub form: BoundForm<CommentForm>,
}

/// The publish/edit form. `post` is set when editing.
#[derive(Debug, Serialize)]
pub struct PostFormPage {
    pub form: BoundForm<PostForm>,
    pub groups: Vec<GroupRef>,
    pub edit: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post: Option<PostView>,
}

async fn render_post_form(
    state: &AppState,
    form: BoundForm<PostForm>,
    post: Option<PostView>,
) -> Result<HttpResponse> {
    let groups = state
        .posts()
        .groups()
        .await?
        .iter()
        .map(Group::to_ref)
        .collect();

    Ok(HttpResponse::Ok().json(PostFormPage {
        form,
        groups,
        edit: post.is_some(),
        post,
    }))
}

/// Main page. Whole responses are cached by path and query.
pub async fn index(
    state: web::Data<AppState>,
    req: HttpRequest,
    query: PageQuery,
) -> Result<HttpResponse> {
    let key = req
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| req.path().to_string());

    if let Some(body) = state.page_cache.get(&key) {
        return Ok(HttpResponse::Ok()
            .content_type(ContentType::json())
            .body(body));
    }

    let page = state.posts().index(query.raw()).await?;
    let body = Bytes::from(serde_json::to_vec(&IndexPage { page })?);
    state.page_cache.insert(key, body.clone());

    Ok(HttpResponse::Ok()
        .content_type(ContentType::json())
        .body(body))
}

pub async fn group_posts(
    state: web::Data<AppState>,
    path: web::Path<String>,
    query: PageQuery,
) -> Result<HttpResponse> {
    let slug = path.into_inner();
    let (group, page) = state.posts().group_posts(&slug, query.raw()).await?;
    Ok(HttpResponse::Ok().json(GroupPage { group, page }))
}

pub async fn post_view(
    state: web::Data<AppState>,
    path: web::Path<(String, i64)>,
) -> Result<HttpResponse> {
    let (username, post_id) = path.into_inner();
    let (post, comments) = state.posts().post_detail(&username, post_id).await?;

    Ok(HttpResponse::Ok().json(PostPage {
        author: post.author.clone(),
        post,
        comments,
        form: BoundForm::default(),
    }))
}

pub async fn new_post_form(
    state: web::Data<AppState>,
    _user: AuthenticatedUser,
) -> Result<HttpResponse> {
    render_post_form(&state, BoundForm::default(), None).await
}

pub async fn new_post(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    form: web::Form<PostForm>,
) -> Result<HttpResponse> {
    let form = form.into_inner();
    let service = state.posts();

    match form.clean(state.store.as_ref()).await? {
        Ok(draft) => {
            service.create_post(&user.0, &draft).await?;
            Ok(redirect(routes::index()))
        }
        Err(errors) => {
            tracing::debug!(author = %user.0.username, ?errors, "new post rejected by validation");
            render_post_form(&state, BoundForm::with_errors(form, errors), None).await
        }
    }
}

pub async fn post_edit_form(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    path: web::Path<(String, i64)>,
) -> Result<HttpResponse> {
    let (username, post_id) = path.into_inner();
    let post = state.posts().find_post(&username, post_id).await?;

    if check_post_ownership(&user.0, &post).is_err() {
        return Ok(redirect(routes::post(&username, post.id)));
    }

    let form = PostForm::from_post(
        &post.text,
        post.group.as_ref().map(|g| g.id),
        post.image.as_deref(),
    );
    render_post_form(&state, BoundForm::unbound(form), Some(post)).await
}

pub async fn post_edit(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    path: web::Path<(String, i64)>,
    form: web::Form<PostForm>,
) -> Result<HttpResponse> {
    let (username, post_id) = path.into_inner();
    let service = state.posts();
    let post = service.find_post(&username, post_id).await?;
    let detail = routes::post(&username, post.id);

    if check_post_ownership(&user.0, &post).is_err() {
        tracing::info!(
            post_id = post.id,
            user = %user.0.username,
            "edit by non-author ignored"
        );
        return Ok(redirect(detail));
    }

    let form = form.into_inner();
    match form.clean(state.store.as_ref()).await? {
        Ok(draft) => {
            service.edit_post(&user.0, &post, &draft).await?;
            Ok(redirect(detail))
        }
        Err(errors) => {
            service.record_invalid_edit();
            render_post_form(&state, BoundForm::with_errors(form, errors), Some(post)).await
        }
    }
}
