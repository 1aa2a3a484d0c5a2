/// Profile handlers - author pages, the follow feed and follow edges
use super::{redirect, PageQuery};
use crate::error::Result;
use crate::middleware::{AuthenticatedUser, Viewer};
use crate::models::{PostView, Profile};
use crate::routes;
use crate::services::Page;
use crate::AppState;
use actix_web::{web, HttpResponse};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ProfilePage {
    pub profile: Profile,
    pub page: Page<PostView>,
    /// Whether the viewer follows this author
    pub following: bool,
}

#[derive(Debug, Serialize)]
pub struct FeedPage {
    pub page: Page<PostView>,
}

pub async fn profile(
    state: web::Data<AppState>,
    viewer: Viewer,
    path: web::Path<String>,
    query: PageQuery,
) -> Result<HttpResponse> {
    let username = path.into_inner();
    let posts = state.posts();
    let author = posts.find_author(&username).await?;
    let listing = posts.profile(&author, query.raw()).await?;
    let following = state
        .follows()
        .is_following(viewer.identity(), &author)
        .await?;

    Ok(HttpResponse::Ok().json(ProfilePage {
        profile: listing.profile,
        page: listing.page,
        following,
    }))
}

pub async fn follow_index(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    query: PageQuery,
) -> Result<HttpResponse> {
    let page = state.follows().feed(&user.0, query.raw()).await?;
    Ok(HttpResponse::Ok().json(FeedPage { page }))
}

pub async fn profile_follow(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let username = path.into_inner();
    let author = state.posts().find_author(&username).await?;
    state.follows().follow(&user.0, &author).await?;
    Ok(redirect(routes::profile(&author.username)))
}

pub async fn profile_unfollow(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let username = path.into_inner();
    let author = state.posts().find_author(&username).await?;
    state.follows().unfollow(&user.0, &author).await?;
    Ok(redirect(routes::profile(&author.username)))
}
