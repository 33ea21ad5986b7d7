// Database-backed tests. Need a reachable Postgres in DATABASE_URL:
//     cargo test -- --ignored

mod common;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use chrono::Utc;
use serde_json::json;
use sqlx::PgPool;
use tower::ServiceExt;
use uuid::Uuid;

use folio_api::errors::AppError;
use folio_api::models::portfolio::PortfolioRow;
use folio_api::models::resume::ResumeData;
use folio_api::models::user::{AuthProvider, UserRow};
use folio_api::portfolio::analytics::build_analytics;
use folio_api::portfolio::service::{
    apply_upload, change_slug, check_slug, create_with_unique_slug, UploadMode,
};
use folio_api::portfolio::slug::generate_slug;
use folio_api::routes::build_router;
use folio_api::store::users::NewUser;
use folio_api::store::{page_views, portfolios, users};

use common::{body_json, test_state};

async fn make_user(pool: &PgPool, email: &str) -> UserRow {
    users::insert(
        pool,
        NewUser {
            name: "Ada Lovelace",
            email,
            hashed_password: Some("not-a-real-hash"),
            provider: AuthProvider::Email,
            is_verified: true,
            avatar_url: None,
        },
    )
    .await
    .unwrap()
}

async fn make_portfolio(pool: &PgPool, user: &UserRow, name: &str) -> PortfolioRow {
    let data = ResumeData {
        name: name.to_string(),
        skills: vec!["Python".to_string(), "Go".to_string()],
        ..ResumeData::default()
    };
    create_with_unique_slug(pool, user.id, &data, Some("cv.pdf"))
        .await
        .unwrap()
}

fn public_get(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header(header::REFERER, "https://www.linkedin.com/feed/")
        .header(header::USER_AGENT, "Mozilla/5.0 (iPhone; CPU iPhone OS 17_0)")
        .body(Body::empty())
        .unwrap()
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn test_duplicate_registration_is_rejected(pool: PgPool) {
    let app = build_router(test_state(pool));
    let register = || {
        Request::builder()
            .method(Method::POST)
            .uri("/auth/register")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(
                json!({"name": "Ada", "email": "Ada@Example.com", "password": "correct-horse"})
                    .to_string(),
            ))
            .unwrap()
    };

    let first = app.clone().oneshot(register()).await.unwrap();
    assert_eq!(first.status(), StatusCode::CREATED);
    let body = body_json(first).await;
    assert_eq!(body["token_type"], "bearer");
    assert_eq!(body["user"]["email"], "ada@example.com");
    assert_eq!(body["user"]["is_verified"], false);
    assert!(body["user"].get("hashed_password").is_none());

    let second = app.oneshot(register()).await.unwrap();
    assert_eq!(second.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(second).await["error"]["message"], "Email already registered");
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn test_generated_slug_collision_gets_suffix(pool: PgPool) {
    let ada = make_user(&pool, "ada@example.com").await;
    let first = make_portfolio(&pool, &ada, "Ada Lovelace").await;

    // Force the next generated slug to collide with the first one.
    let other = make_user(&pool, "other@example.com").await;
    let contested = generate_slug("Ada Lovelace", other.id);
    portfolios::set_slug(&pool, first.id, &contested).await.unwrap();
    let second = make_portfolio(&pool, &other, "Ada Lovelace").await;

    let short: String = other.id.to_string().chars().take(4).collect();
    assert!(second.slug.ends_with(&format!("-{short}")));
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn test_custom_slug_owned_by_another_user_conflicts(pool: PgPool) {
    let ada = make_user(&pool, "ada@example.com").await;
    let grace = make_user(&pool, "grace@example.com").await;
    let ada_portfolio = make_portfolio(&pool, &ada, "Ada").await;
    let grace_portfolio = make_portfolio(&pool, &grace, "Grace").await;

    let ada_portfolio = change_slug(&pool, ada_portfolio, "  Ada-L ").await.unwrap();
    assert_eq!(ada_portfolio.slug, "ada-l");

    let err = change_slug(&pool, grace_portfolio, "ada-l").await.unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));

    // Own slug is a no-op and counts as available.
    let same = change_slug(&pool, ada_portfolio, "ada-l").await.unwrap();
    assert_eq!(same.slug, "ada-l");
    let check = check_slug(&pool, ada.id, "ada-l").await.unwrap();
    assert!(check.available && check.valid);
    let check = check_slug(&pool, grace.id, "ada-l").await.unwrap();
    assert!(!check.available && check.valid);
    let check = check_slug(&pool, grace.id, "-x").await.unwrap();
    assert!(!check.available && !check.valid);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn test_public_fetch_counts_exactly_one_view(pool: PgPool) {
    let ada = make_user(&pool, "ada@example.com").await;
    let portfolio = make_portfolio(&pool, &ada, "Ada").await;
    portfolios::set_published(&pool, portfolio.id, true).await.unwrap();
    let app = build_router(test_state(pool.clone()));
    let uri = format!("/portfolio/public/{}", portfolio.slug);

    for expected in 1..=2 {
        let response = app.clone().oneshot(public_get(&uri)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["view_count"], expected);
        assert_eq!(
            page_views::count_for_portfolio(&pool, portfolio.id).await.unwrap(),
            expected
        );
    }

    let stored = portfolios::find_by_user(&pool, ada.id).await.unwrap().unwrap();
    let analytics = build_analytics(&pool, &stored, Utc::now()).await.unwrap();
    assert_eq!(analytics.total_views, 2);
    assert_eq!(analytics.view_count, 2);
    assert_eq!(analytics.daily_views.len(), 7);
    assert_eq!(analytics.daily_views[6].views, 2);
    assert_eq!(analytics.referrers[0].source, "LinkedIn");
    assert_eq!(analytics.devices.mobile, 2);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn test_unpublished_portfolio_is_not_public(pool: PgPool) {
    let ada = make_user(&pool, "ada@example.com").await;
    let portfolio = make_portfolio(&pool, &ada, "Ada").await;
    portfolios::apply_changes(
        &pool,
        portfolio.id,
        portfolios::PortfolioChanges {
            custom_domain: Some(Some("ada.dev".to_string())),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    let app = build_router(test_state(pool.clone()));

    for uri in [
        format!("/portfolio/public/{}", portfolio.slug),
        "/portfolio/domain/ada.dev".to_string(),
    ] {
        let response = app.clone().oneshot(public_get(&uri)).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
    assert_eq!(page_views::count_for_portfolio(&pool, portfolio.id).await.unwrap(), 0);

    let analytics = build_analytics(&pool, &portfolio, Utc::now()).await.unwrap();
    assert_eq!(analytics.daily_views.len(), 7);
    assert!(analytics.daily_views.iter().all(|d| d.views == 0));
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn test_merge_upload_keeps_existing_edits(pool: PgPool) {
    let ada = make_user(&pool, "ada@example.com").await;
    make_portfolio(&pool, &ada, "Ada").await;

    let incoming = ResumeData {
        name: "Someone Else".to_string(),
        title: "Engineer".to_string(),
        skills: vec!["python".to_string(), "Rust".to_string()],
        ..ResumeData::default()
    };
    let merged = apply_upload(&pool, ada.id, incoming, "new.docx", UploadMode::Merge)
        .await
        .unwrap();
    assert_eq!(merged.parsed_data.name, "Ada");
    assert_eq!(merged.parsed_data.title, "Engineer");
    assert_eq!(merged.parsed_data.skills, vec!["Python", "Go", "Rust"]);
    assert_eq!(merged.resume_filename.as_deref(), Some("new.docx"));

    let replaced = apply_upload(
        &pool,
        ada.id,
        ResumeData::default(),
        "blank.pdf",
        UploadMode::Replace,
    )
    .await
    .unwrap();
    assert_eq!(replaced.parsed_data.0, ResumeData::default());
    assert_eq!(replaced.slug, merged.slug);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn test_deleting_user_cascades(pool: PgPool) {
    let ada = make_user(&pool, "ada@example.com").await;
    let portfolio = make_portfolio(&pool, &ada, "Ada").await;
    portfolios::set_published(&pool, portfolio.id, true).await.unwrap();
    portfolios::record_public_view(&pool, portfolio.id, &Default::default())
        .await
        .unwrap();

    assert!(users::delete(&pool, ada.id).await.unwrap());
    assert!(portfolios::find_by_user(&pool, ada.id).await.unwrap().is_none());
    assert_eq!(page_views::count_for_portfolio(&pool, portfolio.id).await.unwrap(), 0);
    assert!(users::find_by_id(&pool, ada.id).await.unwrap().is_none());
    assert!(!users::delete(&pool, Uuid::new_v4()).await.unwrap());
}
