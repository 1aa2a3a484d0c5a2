/// Posts Service Library
///
/// Backend of a small social blog: users publish posts into optional
/// topical groups, comment on posts and follow authors, and a personal feed
/// collects posts from followed authors. Responses are JSON view models;
/// rendering them is left to the client.
///
/// # Modules
///
/// - `handlers`: HTTP request handlers, one per route
/// - `routes`: route table and URL reversal helpers
/// - `models`: Data structures for users, groups, posts, comments, follows
/// - `forms`: Form input and validation
/// - `services`: Business logic layer and pagination
/// - `db`: Storage trait with PostgreSQL and in-memory implementations
/// - `cache`: Page cache for the index
/// - `middleware`: Identity resolution, extractors and permissions
/// - `error`: Error types and handling
/// - `config`: Configuration management
/// - `metrics`: Observability and metrics collection
pub mod cache;
pub mod config;
pub mod db;
pub mod error;
pub mod forms;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;

pub use config::{Config, Settings};
pub use error::{AppError, Result};

use crate::cache::PageCache;
use crate::db::Store;
use crate::services::{CommentService, FollowService, PostService};
use std::sync::Arc;

/// Shared state handed to every handler as `web::Data<AppState>`.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub page_cache: Arc<PageCache>,
    pub settings: Settings,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, page_cache: Arc<PageCache>, settings: Settings) -> Self {
        Self {
            store,
            page_cache,
            settings,
        }
    }

    pub fn posts(&self) -> PostService {
        PostService::new(self.store.clone(), self.settings.posts_per_page)
    }

    pub fn comments(&self) -> CommentService {
        CommentService::new(self.store.clone())
    }

    pub fn follows(&self) -> FollowService {
        FollowService::new(self.store.clone(), self.settings.posts_per_page)
    }
}
