//! Shared fixtures for posts-service integration tests
//!
//! Every test gets its own `MemoryStore` wired into the real route table.

#![allow(dead_code)]

use actix_web::body::MessageBody;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::{test, web, App};
use chrono::Duration as TokenTtl;
use posts_service::cache::PageCache;
use posts_service::config::Settings;
use posts_service::db::{MemoryStore, Store};
use posts_service::middleware::{IdentityMiddleware, JwtKeys};
use posts_service::models::{Group, NewGroup, Post, PostDraft, User};
use posts_service::{routes, AppState};
use std::sync::Arc;
use std::time::Duration;

pub const TEST_SECRET: &str = "posts-service-test-secret";
pub const LOGIN_URL: &str = "/auth/login/";

pub struct TestContext {
    pub store: Arc<MemoryStore>,
    pub state: web::Data<AppState>,
    pub keys: Arc<JwtKeys>,
}

impl TestContext {
    pub fn new() -> Self {
        Self::with_page_size(10)
    }

    pub fn with_page_size(posts_per_page: i64) -> Self {
        let store = Arc::new(MemoryStore::new());
        let page_cache = Arc::new(PageCache::new(Duration::from_secs(20)));
        let settings = Settings {
            posts_per_page,
            login_url: LOGIN_URL.to_string(),
        };
        let state = web::Data::new(AppState::new(store.clone(), page_cache, settings));

        Self {
            store,
            state,
            keys: Arc::new(JwtKeys::new(TEST_SECRET)),
        }
    }

    pub async fn app(
        &self,
    ) -> impl Service<
        actix_http::Request,
        Response = ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
    > {
        test::init_service(
            App::new()
                .app_data(self.state.clone())
                .wrap(IdentityMiddleware::new(self.keys.clone()))
                .configure(routes::configure),
        )
        .await
    }

    pub async fn user(&self, username: &str) -> User {
        self.store.create_user(username, "", "").await.unwrap()
    }

    pub async fn group(&self, title: &str, slug: &str) -> Group {
        self.store
            .create_group(NewGroup {
                title: title.to_string(),
                slug: slug.to_string(),
                description: format!("{title} description"),
            })
            .await
            .unwrap()
    }

    pub async fn post(&self, author: &User, text: &str, group: Option<&Group>) -> Post {
        self.store
            .create_post(
                author.id,
                &PostDraft {
                    text: text.to_string(),
                    group_id: group.map(|g| g.id),
                    image: None,
                },
            )
            .await
            .unwrap()
    }

    /// `Authorization` header for requests made as `user`.
    pub fn auth(&self, user: &User) -> (&'static str, String) {
        let token = self.keys.issue(user, TokenTtl::hours(1)).unwrap();
        ("Authorization", format!("Bearer {token}"))
    }
}

pub fn location<B>(resp: &ServiceResponse<B>) -> String {
    resp.headers()
        .get("Location")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

pub fn login_redirect(next: &str) -> String {
    format!("{LOGIN_URL}?next={next}")
}
