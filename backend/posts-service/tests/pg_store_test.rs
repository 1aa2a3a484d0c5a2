//! PostgreSQL store round trip
//!
//! Needs a disposable database:
//! `DATABASE_URL=postgres://... cargo test -p posts-service --test pg_store_test -- --ignored`

use db_pool::{create_pool, DbConfig};
use posts_service::db::{PostFilter, PostgresStore, Store};
use posts_service::models::{NewGroup, PostDraft};

async fn store() -> PostgresStore {
    let config = DbConfig::from_env("posts-service-test").expect("DATABASE_URL must be set");
    let pool = create_pool(config).await.expect("database must be reachable");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("migrations must apply");
    PostgresStore::new(pool)
}

fn unique(prefix: &str) -> String {
    format!("{prefix}{}", chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default())
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn posts_follows_and_group_deletion() {
    let store = store().await;
    let author = store.create_user(&unique("author"), "", "").await.unwrap();
    let reader = store.create_user(&unique("reader"), "", "").await.unwrap();
    let group = store
        .create_group(NewGroup {
            title: "Test group".into(),
            slug: unique("slug"),
            description: String::new(),
        })
        .await
        .unwrap();

    let post = store
        .create_post(
            author.id,
            &PostDraft {
                text: "text".into(),
                group_id: Some(group.id),
                image: None,
            },
        )
        .await
        .unwrap();
    let view = store
        .find_post(&author.username, post.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(view.group.as_ref().map(|g| g.id), Some(group.id));

    assert!(store.follow(reader.id, author.id).await.unwrap());
    assert!(!store.follow(reader.id, author.id).await.unwrap());
    let feed = store
        .list_posts(PostFilter::FollowedBy(reader.id), 10, 0)
        .await
        .unwrap();
    assert_eq!(feed.len(), 1);

    store
        .create_comment(post.id, reader.id, "comment")
        .await
        .unwrap();
    assert_eq!(store.list_comments(post.id).await.unwrap().len(), 1);

    assert!(store.delete_group(group.id).await.unwrap());
    let view = store
        .find_post(&author.username, post.id)
        .await
        .unwrap()
        .unwrap();
    assert!(view.group.is_none());
    assert_eq!(view.comments_count, 1);

    assert!(store.delete_user(author.id).await.unwrap());
    assert!(store.list_comments(post.id).await.unwrap().is_empty());
    store.delete_user(reader.id).await.unwrap();
}
