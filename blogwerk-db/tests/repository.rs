//! Repository behavior shared by both backends.
//!
//! SQLite runs against a fresh in-memory database per test. PostgreSQL runs
//! the same suite when `TEST_POSTGRES_URL` points at a disposable database.

use blogwerk_common::model::{
    Id,
    comment::{ANONYMOUS_AUTHOR, CreateComment},
    post::{CreatePost, Post, PostFilter, UpdatePost},
};
use blogwerk_db::{PostRepository, Repository, postgres::PgClient, sqlite::SqliteClient};
use std::time::Duration;

fn unique_tag() -> String {
    Id::<()>::generate().to_string()
}

fn new_post(title: &str, author: &str, content: &str) -> CreatePost {
    CreatePost {
        title: title.to_owned(),
        author: author.to_owned(),
        content: content.to_owned(),
        cover_image: None,
    }
}

fn titles(posts: &[Post]) -> Vec<&str> {
    let mut titles: Vec<&str> = posts.iter().map(|post| post.title.as_str()).collect();
    titles.sort_unstable();
    titles
}

async fn search_is_case_insensitive_substring(repo: &dyn Repository) {
    let author = format!("Ann {}", unique_tag());
    for title in ["Go Basics", "Rust 101", "Going Deeper"] {
        repo.create_post(new_post(title, &author, "Lorem ipsum"))
            .await
            .unwrap();
    }

    let page = repo
        .list_filtered_posts(&PostFilter::new(
            Some("go".to_owned()),
            Some(author.to_uppercase()),
            1,
            10,
        ))
        .await
        .unwrap();

    assert_eq!(titles(&page.posts), ["Go Basics", "Going Deeper"]);
    assert_eq!(page.total, 2);
}

async fn search_matches_content_and_author_filter_is_conjunctive(repo: &dyn Repository) {
    let tag = unique_tag();
    let ann = format!("Ann {tag}");
    let bob = format!("Bob {tag}");
    repo.create_post(new_post("Plain", &ann, "all about ferris"))
        .await
        .unwrap();
    repo.create_post(new_post("Ferris", &bob, "crabs"))
        .await
        .unwrap();
    repo.create_post(new_post("Other", &ann, "nothing here"))
        .await
        .unwrap();

    let by_content = repo
        .list_filtered_posts(&PostFilter::new(
            Some(" FERRIS ".to_owned()),
            Some(tag.clone()),
            1,
            10,
        ))
        .await
        .unwrap();
    assert_eq!(titles(&by_content.posts), ["Ferris", "Plain"]);

    let both = repo
        .list_filtered_posts(&PostFilter::new(
            Some("ferris".to_owned()),
            Some(ann.clone()),
            1,
            10,
        ))
        .await
        .unwrap();
    assert_eq!(titles(&both.posts), ["Plain"]);
    assert_eq!(both.total, 1);
}

async fn like_wildcards_match_literally(repo: &dyn Repository) {
    let author = format!("Ann {}", unique_tag());
    repo.create_post(new_post("100% Rust", &author, "x"))
        .await
        .unwrap();
    repo.create_post(new_post("1000 Rusts", &author, "x"))
        .await
        .unwrap();

    let page = repo
        .list_filtered_posts(&PostFilter::new(
            Some("100%".to_owned()),
            Some(author),
            1,
            10,
        ))
        .await
        .unwrap();

    assert_eq!(titles(&page.posts), ["100% Rust"]);
}

async fn exact_case_non_ascii_search_matches(repo: &dyn Repository) {
    let author = format!("Ann {}", unique_tag());
    repo.create_post(new_post("Über Rust", &author, "x"))
        .await
        .unwrap();
    repo.create_post(new_post("Uber Go", &author, "x"))
        .await
        .unwrap();

    for search in ["Über", "Über rust", "ÜBER RUST"] {
        let page = repo
            .list_filtered_posts(&PostFilter::new(
                Some(search.to_owned()),
                Some(author.clone()),
                1,
                10,
            ))
            .await
            .unwrap();

        assert_eq!(titles(&page.posts), ["Über Rust"], "search {search}");
    }
}

async fn pagination_slices_after_counting(repo: &dyn Repository) {
    let author = format!("Ann {}", unique_tag());
    for index in 0..7 {
        repo.create_post(new_post(&format!("Post {index}"), &author, "body"))
            .await
            .unwrap();
    }

    let mut seen = Vec::new();
    for (page, expected) in [(1, 3), (2, 3), (3, 1), (4, 0)] {
        let result = repo
            .list_filtered_posts(&PostFilter::new(None, Some(author.clone()), page, 3))
            .await
            .unwrap();

        assert_eq!(result.posts.len(), expected, "page {page}");
        assert_eq!(result.total, 7, "page {page}");
        assert!(
            result
                .posts
                .windows(2)
                .all(|pair| pair[0].published_at >= pair[1].published_at)
        );
        seen.extend(result.posts.into_iter().map(|post| post.id));
    }

    seen.sort_unstable();
    seen.dedup();
    assert_eq!(seen.len(), 7);
}

async fn list_all_is_newest_first(repo: &dyn Repository) {
    let author = format!("Ann {}", unique_tag());
    let older = repo
        .create_post(new_post("Older", &author, "body"))
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_millis(2)).await;
    let newer = repo
        .create_post(new_post("Newer", &author, "body"))
        .await
        .unwrap();

    let posts = repo.list_posts().await.unwrap();
    let position = |id| posts.iter().position(|post| post.id == id).unwrap();

    assert!(position(newer.id) < position(older.id));
    assert!(
        posts
            .windows(2)
            .all(|pair| pair[0].published_at >= pair[1].published_at)
    );
}

async fn create_and_fetch_round_trip(repo: &dyn Repository) {
    let mut post = new_post("Title", &format!("Ann {}", unique_tag()), "Body");
    post.cover_image = Some("https://example.com/cover.png".to_owned());

    let created = repo.create_post(post).await.unwrap();
    let fetched = repo.fetch_post(created.id).await.unwrap();

    assert_eq!(fetched, Some(created));
    assert_eq!(repo.fetch_post(Id::generate()).await.unwrap(), None);
}

async fn update_only_changes_given_fields(repo: &dyn Repository) {
    let mut post = new_post("Old", &format!("Ann {}", unique_tag()), "Body");
    post.cover_image = Some("cover.png".to_owned());
    let created = repo.create_post(post).await.unwrap();

    let updated = repo
        .update_post(
            created.id,
            UpdatePost {
                title: Some("New".to_owned()),
                content: Some(String::new()),
                ..UpdatePost::default()
            },
        )
        .await
        .unwrap()
        .unwrap();

    let expected = Post {
        title: "New".to_owned(),
        ..created
    };
    assert_eq!(updated, expected);
    assert_eq!(repo.fetch_post(expected.id).await.unwrap(), Some(expected));
}

async fn update_of_missing_post_is_none(repo: &dyn Repository) {
    let result = repo
        .update_post(
            Id::generate(),
            UpdatePost {
                title: Some("New".to_owned()),
                ..UpdatePost::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(result, None);
}

async fn delete_reports_removal_and_keeps_comments(repo: &dyn Repository) {
    assert!(!repo.delete_post(Id::generate()).await.unwrap());

    let post = repo
        .create_post(new_post("Doomed", &format!("Ann {}", unique_tag()), "Body"))
        .await
        .unwrap();
    repo.create_comment(CreateComment {
        post_id: post.id,
        author: Some("Bob".to_owned()),
        content: "First!".to_owned(),
    })
    .await
    .unwrap();

    assert!(repo.delete_post(post.id).await.unwrap());
    assert!(!repo.delete_post(post.id).await.unwrap());
    assert_eq!(repo.fetch_post(post.id).await.unwrap(), None);
    assert_eq!(repo.list_comments(post.id).await.unwrap().len(), 1);
}

async fn comments_are_newest_first_and_stable(repo: &dyn Repository) {
    let post = repo
        .create_post(new_post("Talk", &format!("Ann {}", unique_tag()), "Body"))
        .await
        .unwrap();
    let first = repo
        .create_comment(CreateComment {
            post_id: post.id,
            author: None,
            content: "first".to_owned(),
        })
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_millis(2)).await;
    let second = repo
        .create_comment(CreateComment {
            post_id: post.id,
            author: Some("Bob".to_owned()),
            content: "second".to_owned(),
        })
        .await
        .unwrap();

    let comments = repo.list_comments(post.id).await.unwrap();
    assert_eq!(comments, vec![second, first]);
    assert_eq!(comments[1].author, ANONYMOUS_AUTHOR);
    assert_eq!(repo.list_comments(post.id).await.unwrap(), comments);
    assert!(repo.list_comments(Id::generate()).await.unwrap().is_empty());
}

async fn comments_do_not_require_an_existing_post(repo: &dyn Repository) {
    let orphan_post = Id::generate();
    let comment = repo
        .create_comment(CreateComment {
            post_id: orphan_post,
            author: Some("Bob".to_owned()),
            content: "Hello?".to_owned(),
        })
        .await
        .unwrap();

    assert_eq!(repo.list_comments(orphan_post).await.unwrap(), vec![comment]);
}

macro_rules! repository_suite {
    ($($case:ident),* $(,)?) => {
        mod sqlite {
            $(
                #[tokio::test]
                async fn $case() {
                    let repo = super::SqliteClient::connect_in_memory().await.unwrap();
                    super::$case(&repo).await;
                }
            )*
        }

        #[tokio::test]
        async fn postgres_suite() {
            let Ok(url) = std::env::var("TEST_POSTGRES_URL") else {
                eprintln!("TEST_POSTGRES_URL not set, skipping PostgreSQL suite");
                return;
            };
            let repo = PgClient::connect(&url).await.unwrap();
            $($case(&repo).await;)*
        }
    };
}

repository_suite!(
    search_is_case_insensitive_substring,
    search_matches_content_and_author_filter_is_conjunctive,
    like_wildcards_match_literally,
    exact_case_non_ascii_search_matches,
    pagination_slices_after_counting,
    list_all_is_newest_first,
    create_and_fetch_round_trip,
    update_only_changes_given_fields,
    update_of_missing_post_is_none,
    delete_reports_removal_and_keeps_comments,
    comments_are_newest_first_and_stable,
    comments_do_not_require_an_existing_post,
);

#[tokio::test]
async fn filtered_listing_over_whole_table() {
    let repo = SqliteClient::connect_in_memory().await.unwrap();
    for title in ["Go Basics", "Rust 101", "Going Deeper"] {
        repo.create_post(new_post(title, "Ann", "Lorem ipsum"))
            .await
            .unwrap();
    }

    let page = repo
        .list_filtered_posts(&PostFilter::new(
            Some("go".to_owned()),
            Some(String::new()),
            1,
            10,
        ))
        .await
        .unwrap();

    assert_eq!(titles(&page.posts), ["Go Basics", "Going Deeper"]);
    assert_eq!(page.total, 2);
}

#[tokio::test]
async fn file_database_persists_between_connections() {
    let path = std::env::temp_dir().join(format!("blogwerk-{}.db", unique_tag()));
    let url = format!("sqlite://{}", path.display());

    let created = {
        let repo = SqliteClient::connect(&url).await.unwrap();
        repo.create_post(new_post("Kept", "Ann", "Body")).await.unwrap()
    };

    let repo = SqliteClient::connect(&url).await.unwrap();
    assert_eq!(repo.fetch_post(created.id).await.unwrap(), Some(created));

    drop(repo);
    let _ = std::fs::remove_file(path);
}
