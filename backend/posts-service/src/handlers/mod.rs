/// HTTP handlers for posts-service
///
/// Every handler returns a JSON view model or a redirect:
/// - Posts: index, group listing, post detail, publishing and editing
/// - Profile: author pages, follow feed, follow and unfollow
/// - Comments: replies on a post
/// - About: static pages
/// - Health: liveness and store checks
pub mod about;
pub mod comments;
pub mod health;
pub mod posts;
pub mod profile;

use actix_web::{dev::Payload, http::header, Error, FromRequest, HttpRequest, HttpResponse};
use std::future::{ready, Ready};

/// `?page=` of every listing. Kept raw so bad values fall back to a page
/// instead of failing extraction. A repeated parameter uses its last value.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PageQuery {
    pub page: Option<String>,
}

impl PageQuery {
    pub fn parse(query: &str) -> Self {
        let page = url::form_urlencoded::parse(query.as_bytes())
            .filter(|(key, _)| key == "page")
            .map(|(_, value)| value.into_owned())
            .last();
        Self { page }
    }

    pub fn raw(&self) -> Option<&str> {
        self.page.as_deref()
    }
}

impl FromRequest for PageQuery {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(Ok(Self::parse(req.query_string())))
    }
}

pub(crate) fn redirect(location: impl AsRef<str>) -> HttpResponse {
    HttpResponse::Found()
        .insert_header((header::LOCATION, location.as_ref()))
        .finish()
}

/// Fallback for unknown URLs
pub async fn page_not_found(req: HttpRequest) -> HttpResponse {
    HttpResponse::NotFound().json(serde_json::json!({
        "error": "Page not found",
        "status": 404,
        "path": req.path(),
    }))
}
