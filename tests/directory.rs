use bridgeit::{
    db, directory,
    profiles::{self, UserType},
};
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};

async fn test_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    db::migrate(&pool).await.unwrap();
    pool
}

async fn seed(
    pool: &SqlitePool,
    user_id: &str,
    user_type: UserType,
    role: &str,
    field: &str,
    country: &str,
    bio: &str,
) {
    sqlx::query("INSERT INTO users (user_id,email,password_hash) VALUES (?,?,?)")
        .bind(user_id)
        .bind(format!("{user_id}@example.com"))
        .bind("unused")
        .execute(pool)
        .await
        .unwrap();
    sqlx::query(
        "INSERT INTO profiles (user_id,role,field,experience,country,citizenship,gender,bio,user_type,created_at,updated_at)
         VALUES (?,?,?,?,?,?,?,?,?,0,0)",
    )
    .bind(user_id)
    .bind(role)
    .bind(field)
    .bind("5")
    .bind(country)
    .bind(country)
    .bind("other")
    .bind(bio)
    .bind(user_type)
    .execute(pool)
    .await
    .unwrap();
}

#[tokio::test]
async fn browsing_returns_only_the_counterpart_type() {
    let pool = test_pool().await;
    seed(&pool, "e1", UserType::Employee, "Developer", "software", "Kenya", "rust and sql").await;
    seed(&pool, "e2", UserType::Employee, "Designer", "media", "Japan", "figma person").await;
    seed(&pool, "b1", UserType::Employer, "CTO", "fintech", "Kenya", "hiring broadly").await;
    seed(&pool, "b2", UserType::Employer, "Founder", "logistics", "Chile", "early startup").await;

    let for_employee = directory::fetch_by_type(&pool, UserType::Employee.counterpart())
        .await
        .unwrap();
    assert_eq!(for_employee.len(), 2);
    assert!(for_employee.iter().all(|p| p.user_type == UserType::Employer));

    let for_employer = directory::fetch_by_type(&pool, UserType::Employer.counterpart())
        .await
        .unwrap();
    assert_eq!(for_employer.len(), 2);
    assert!(for_employer.iter().all(|p| p.user_type == UserType::Employee));
}

#[tokio::test]
async fn filter_narrows_the_materialized_set() {
    let pool = test_pool().await;
    seed(&pool, "b1", UserType::Employer, "Marketing Director", "advertising", "Spain", "brand work").await;
    seed(&pool, "b2", UserType::Employer, "CTO", "software", "Norway", "distributed systems").await;
    seed(&pool, "b3", UserType::Employer, "Recruiter", "hr", "Brazil", "open market hiring").await;

    let all = directory::fetch_by_type(&pool, UserType::Employer).await.unwrap();
    let hits = directory::filter_profiles(all, Some("MARKET"));
    let ids: Vec<_> = hits.iter().map(|p| p.user_id.as_str()).collect();
    assert_eq!(ids, ["b1", "b3"]);
}

#[tokio::test]
async fn fetch_round_trips_a_profile() {
    let pool = test_pool().await;
    seed(&pool, "e1", UserType::Employee, "Developer", "software", "Kenya", "rust and sql").await;

    let profile = profiles::fetch(&pool, "e1").await.unwrap().unwrap();
    assert_eq!(profile.role, "Developer");
    assert_eq!(profile.user_type, UserType::Employee);

    assert!(profiles::fetch(&pool, "missing").await.unwrap().is_none());
}
