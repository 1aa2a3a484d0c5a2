/// Static "about" pages
use actix_web::HttpResponse;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct AboutPage {
    pub page: &'static str,
    pub title: &'static str,
}

pub async fn author() -> HttpResponse {
    HttpResponse::Ok().json(AboutPage {
        page: "author",
        title: "About the author",
    })
}

pub async fn tech() -> HttpResponse {
    HttpResponse::Ok().json(AboutPage {
        page: "tech",
        title: "Technologies",
    })
}
