//! Following authors and the follow feed

mod common;

use actix_web::http::StatusCode;
use actix_web::test;
use common::{location, login_redirect, TestContext};
use posts_service::db::{PostFilter, Store};
use posts_service::routes;

#[actix_web::test]
async fn follow_twice_creates_one_edge() {
    let ctx = TestContext::new();
    let author = ctx.user("leo").await;
    let reader = ctx.user("anna").await;
    let app = ctx.app().await;

    for _ in 0..2 {
        let req = test::TestRequest::get()
            .uri(&routes::profile_follow("leo"))
            .insert_header(ctx.auth(&reader))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FOUND);
        assert_eq!(location(&resp), routes::profile("leo"));
    }

    assert_eq!(ctx.store.follower_count(author.id).await.unwrap(), 1);
    assert!(ctx.store.is_following(reader.id, author.id).await.unwrap());
}

#[actix_web::test]
async fn unfollow_removes_edge_and_tolerates_missing_one() {
    let ctx = TestContext::new();
    let author = ctx.user("leo").await;
    let reader = ctx.user("anna").await;
    ctx.store.follow(reader.id, author.id).await.unwrap();
    let app = ctx.app().await;

    for _ in 0..2 {
        let req = test::TestRequest::get()
            .uri(&routes::profile_unfollow("leo"))
            .insert_header(ctx.auth(&reader))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FOUND);
        assert_eq!(location(&resp), routes::profile("leo"));
    }

    assert_eq!(ctx.store.follower_count(author.id).await.unwrap(), 0);
}

#[actix_web::test]
async fn cannot_follow_self() {
    let ctx = TestContext::new();
    let author = ctx.user("leo").await;
    let app = ctx.app().await;

    let req = test::TestRequest::get()
        .uri(&routes::profile_follow("leo"))
        .insert_header(ctx.auth(&author))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(ctx.store.following_count(author.id).await.unwrap(), 0);
}

#[actix_web::test]
async fn following_unknown_user_is_not_found() {
    let ctx = TestContext::new();
    let reader = ctx.user("anna").await;
    let app = ctx.app().await;

    let req = test::TestRequest::get()
        .uri(&routes::profile_follow("nobody"))
        .insert_header(ctx.auth(&reader))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn feed_shows_only_followed_authors() {
    let ctx = TestContext::new();
    let author = ctx.user("leo").await;
    let follower = ctx.user("anna").await;
    let stranger = ctx.user("ivan").await;
    ctx.store.follow(follower.id, author.id).await.unwrap();
    let post = ctx.post(&author, "Новый пост", None).await;
    ctx.post(&stranger, "Чужой пост", None).await;
    let app = ctx.app().await;

    let req = test::TestRequest::get()
        .uri(&routes::follow_index())
        .insert_header(ctx.auth(&follower))
        .to_request();
    let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    let items = body["page"]["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["id"], post.id);

    let req = test::TestRequest::get()
        .uri(&routes::follow_index())
        .insert_header(ctx.auth(&stranger))
        .to_request();
    let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["page"]["count"], 0);
    assert!(body["page"]["items"].as_array().unwrap().is_empty());
}

#[actix_web::test]
async fn invalid_token_is_treated_as_anonymous() {
    let ctx = TestContext::new();
    let app = ctx.app().await;

    let req = test::TestRequest::get()
        .uri(&routes::follow_index())
        .insert_header(("Authorization", "Bearer not-a-token"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert!(location(&resp).starts_with("/auth/login/"));
}

#[actix_web::test]
async fn token_for_unknown_user_is_treated_as_anonymous() {
    let ctx = TestContext::new();
    let app = ctx.app().await;
    let ghost = ctx.user("ghost").await;
    ctx.store.delete_user(ghost.id).await.unwrap();

    let req = test::TestRequest::post()
        .uri(&routes::new_post())
        .insert_header(ctx.auth(&ghost))
        .set_form([("text", "hello")])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), login_redirect(&routes::new_post()));
    assert_eq!(ctx.store.count_posts(PostFilter::All).await.unwrap(), 0);

    let req = test::TestRequest::get()
        .uri(&routes::follow_index())
        .insert_header(ctx.auth(&ghost))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert!(location(&resp).starts_with("/auth/login/"));
}
