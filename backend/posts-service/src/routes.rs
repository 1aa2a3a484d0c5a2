/// Route table and URL reversal
///
/// Fixed prefixes are registered before the `{username}` catch-alls, so a
/// user called `follow` or `new` cannot shadow them.
use crate::handlers;
use crate::metrics::serve_metrics;
use actix_web::web;
use urlencoding::encode;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(handlers::posts::index))
        .route("/about/author/", web::get().to(handlers::about::author))
        .route("/about/tech/", web::get().to(handlers::about::tech))
        .route("/group/{slug}/", web::get().to(handlers::posts::group_posts))
        .service(
            web::resource("/new/")
                .route(web::get().to(handlers::posts::new_post_form))
                .route(web::post().to(handlers::posts::new_post)),
        )
        .route("/follow/", web::get().to(handlers::profile::follow_index))
        .route("/api/v1/health", web::get().to(handlers::health::health_summary))
        .route("/api/v1/health/live", web::get().to(handlers::health::liveness_check))
        .route("/metrics", web::get().to(serve_metrics))
        .route("/{username}/", web::get().to(handlers::profile::profile))
        .route(
            "/{username}/follow/",
            web::get().to(handlers::profile::profile_follow),
        )
        .route(
            "/{username}/unfollow/",
            web::get().to(handlers::profile::profile_unfollow),
        )
        .route(
            "/{username}/{post_id:\\d+}/",
            web::get().to(handlers::posts::post_view),
        )
        .service(
            web::resource("/{username}/{post_id:\\d+}/edit/")
                .route(web::get().to(handlers::posts::post_edit_form))
                .route(web::post().to(handlers::posts::post_edit)),
        )
        .route(
            "/{username}/{post_id:\\d+}/comment/",
            web::post().to(handlers::comments::add_comment),
        )
        .default_service(web::route().to(handlers::page_not_found));
}

pub fn index() -> String {
    "/".to_string()
}

pub fn group_posts(slug: &str) -> String {
    format!("/group/{}/", encode(slug))
}

pub fn new_post() -> String {
    "/new/".to_string()
}

pub fn follow_index() -> String {
    "/follow/".to_string()
}

pub fn profile(username: &str) -> String {
    format!("/{}/", encode(username))
}

pub fn profile_follow(username: &str) -> String {
    format!("/{}/follow/", encode(username))
}

pub fn profile_unfollow(username: &str) -> String {
    format!("/{}/unfollow/", encode(username))
}

pub fn post(username: &str, post_id: i64) -> String {
    format!("/{}/{}/", encode(username), post_id)
}

pub fn post_edit(username: &str, post_id: i64) -> String {
    format!("/{}/{}/edit/", encode(username), post_id)
}

pub fn add_comment(username: &str, post_id: i64) -> String {
    format!("/{}/{}/comment/", encode(username), post_id)
}

pub fn about_author() -> String {
    "/about/author/".to_string()
}

pub fn about_tech() -> String {
    "/about/tech/".to_string()
}
