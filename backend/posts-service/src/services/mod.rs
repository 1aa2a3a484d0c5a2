/// Business logic layer for posts-service
///
/// - Pagination: page resolution and slicing for every listing
/// - Post service: listings, post detail, publishing and editing
/// - Comment service: replies on posts
/// - Follow service: follower graph and the follow feed
pub mod comments;
pub mod follow;
pub mod pagination;
pub mod posts;

pub use comments::CommentService;
pub use follow::FollowService;
pub use pagination::{paginate_posts, Page, Paginator};
pub use posts::{PostService, ProfileListing};
