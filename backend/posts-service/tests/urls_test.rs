//! Status codes and redirects for every route

mod common;

use actix_web::http::StatusCode;
use actix_web::test;
use common::{location, login_redirect, TestContext};
use posts_service::routes;

#[actix_web::test]
async fn public_pages_are_available_to_anonymous_users() {
    let ctx = TestContext::new();
    let author = ctx.user("leo").await;
    let group = ctx.group("Test group", "test-slug").await;
    let post = ctx.post(&author, "Test text", Some(&group)).await;
    let app = ctx.app().await;

    for uri in [
        routes::index(),
        routes::group_posts("test-slug"),
        routes::profile("leo"),
        routes::post("leo", post.id),
        routes::about_author(),
        routes::about_tech(),
    ] {
        let req = test::TestRequest::get().uri(&uri).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK, "GET {uri}");
    }
}

#[actix_web::test]
async fn login_pages_redirect_anonymous_users() {
    let ctx = TestContext::new();
    let author = ctx.user("leo").await;
    let post = ctx.post(&author, "Test text", None).await;
    let app = ctx.app().await;

    for uri in [
        routes::new_post(),
        routes::follow_index(),
        routes::post_edit("leo", post.id),
        routes::profile_follow("leo"),
        routes::profile_unfollow("leo"),
    ] {
        let req = test::TestRequest::get().uri(&uri).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FOUND, "GET {uri}");
        assert_eq!(location(&resp), login_redirect(&uri));
    }
}

#[actix_web::test]
async fn login_redirect_keeps_query_string() {
    let ctx = TestContext::new();
    let app = ctx.app().await;

    let req = test::TestRequest::get().uri("/follow/?page=2").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), "/auth/login/?next=/follow/%3Fpage%3D2");
}

#[actix_web::test]
async fn login_pages_are_available_to_authorized_users() {
    let ctx = TestContext::new();
    let author = ctx.user("leo").await;
    let post = ctx.post(&author, "Test text", None).await;
    let app = ctx.app().await;

    for uri in [
        routes::new_post(),
        routes::follow_index(),
        routes::post_edit("leo", post.id),
    ] {
        let req = test::TestRequest::get()
            .uri(&uri)
            .insert_header(ctx.auth(&author))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK, "GET {uri}");
    }
}

#[actix_web::test]
async fn edit_page_redirects_non_author_to_post() {
    let ctx = TestContext::new();
    let author = ctx.user("leo").await;
    let other = ctx.user("anna").await;
    let post = ctx.post(&author, "Test text", None).await;
    let app = ctx.app().await;

    let req = test::TestRequest::get()
        .uri(&routes::post_edit("leo", post.id))
        .insert_header(ctx.auth(&other))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), routes::post("leo", post.id));
}

#[actix_web::test]
async fn unknown_objects_are_not_found() {
    let ctx = TestContext::new();
    let author = ctx.user("leo").await;
    ctx.user("anna").await;
    let post = ctx.post(&author, "Test text", None).await;
    let app = ctx.app().await;

    for uri in [
        routes::group_posts("missing"),
        routes::profile("nobody"),
        routes::post("anna", post.id),
        routes::post("leo", post.id + 100),
        "/leo/not-a-number/".to_string(),
        "/a/b/c/d/".to_string(),
    ] {
        let req = test::TestRequest::get().uri(&uri).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND, "GET {uri}");
    }
}

#[actix_web::test]
async fn unknown_url_reports_path() {
    let ctx = TestContext::new();
    let app = ctx.app().await;

    let req = test::TestRequest::get().uri("/a/b/c/d/").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["path"], "/a/b/c/d/");
    assert_eq!(body["status"], 404);
}

#[actix_web::test]
async fn health_endpoints_respond() {
    let ctx = TestContext::new();
    let app = ctx.app().await;

    for uri in ["/api/v1/health", "/api/v1/health/live", "/metrics"] {
        let req = test::TestRequest::get().uri(uri).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK, "GET {uri}");
    }
}
