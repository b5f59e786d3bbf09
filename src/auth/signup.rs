use axum::{debug_handler, extract::State, http::StatusCode, Json};
use serde::Deserialize;
use sqlx::SqlitePool;
use tower_sessions::Session;
use uuid::Uuid;

use crate::{
    profiles::{now_unix, Profile, UserType},
    session, AppError, AppResult,
};

use super::password;

#[derive(Debug, Deserialize)]
pub(crate) struct SignupQuery {
    email: String,
    password: String,

    user_type: UserType,
    gender: String,
    country: String,
    citizenship: String,
    field: String,
    experience: String,
    role: String,
    #[serde(default)]
    bio: String,
}

#[debug_handler]
pub(crate) async fn signup(
    State(db_pool): State<SqlitePool>,
    session: Session,
    Json(query): Json<SignupQuery>,
) -> AppResult<(StatusCode, Json<Profile>)> {
    validate(&query)?;

    let email = query.email.trim().to_lowercase();
    let user_id = Uuid::now_v7().to_string();
    let password_hash = password::hash_password(&query.password)?;

    let now = now_unix();
    let profile = Profile {
        user_id: user_id.clone(),
        role: query.role,
        field: query.field,
        experience: query.experience,
        country: query.country,
        citizenship: query.citizenship,
        gender: query.gender,
        bio: query.bio,
        user_type: query.user_type,
        created_at: now,
        updated_at: now,
    };

    create_account(&db_pool, &email, &password_hash, &profile).await?;

    session::sign_in(&session, &user_id, &profile).await?;
    tracing::info!(%user_id, "new profile registered");

    Ok((StatusCode::CREATED, Json(profile)))
}

/// Creates the user row and its profile atomically: either both land or
/// neither does. A duplicate email surfaces as `Conflict` straight from the
/// UNIQUE constraint, so there is no check-then-insert race.
pub(crate) async fn create_account(
    db_pool: &SqlitePool,
    email: &str,
    password_hash: &str,
    profile: &Profile,
) -> AppResult<()> {
    let mut tx = db_pool.begin().await?;

    sqlx::query("INSERT INTO users (user_id,email,password_hash) VALUES (?,?,?)")
        .bind(&profile.user_id)
        .bind(email)
        .bind(password_hash)
        .execute(&mut *tx)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                AppError::Conflict("email already registered")
            }
            e => AppError::from(e),
        })?;

    sqlx::query(
        "INSERT INTO profiles (user_id,role,field,experience,country,citizenship,gender,bio,user_type,created_at,updated_at)
         VALUES (?,?,?,?,?,?,?,?,?,?,?)",
    )
    .bind(&profile.user_id)
    .bind(&profile.role)
    .bind(&profile.field)
    .bind(&profile.experience)
    .bind(&profile.country)
    .bind(&profile.citizenship)
    .bind(&profile.gender)
    .bind(&profile.bio)
    .bind(profile.user_type)
    .bind(profile.created_at)
    .bind(profile.updated_at)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(())
}

/// All checks run before any store write.
fn validate(query: &SignupQuery) -> AppResult<()> {
    if !valid_email(query.email.trim()) {
        return Err(AppError::Validation("malformed email address".into()));
    }
    if query.password.chars().count() < 6 {
        return Err(AppError::Validation(
            "password must be at least 6 characters".into(),
        ));
    }

    let required = [
        ("gender", &query.gender),
        ("country", &query.country),
        ("citizenship", &query.citizenship),
        ("field", &query.field),
        ("experience", &query.experience),
        ("role", &query.role),
    ];
    for (name, value) in required {
        if value.trim().is_empty() {
            return Err(AppError::Validation(format!("{name} is required")));
        }
    }

    Ok(())
}

fn valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.is_empty()
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !email.chars().any(char::is_whitespace)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use sqlx::sqlite::SqlitePoolOptions;

    fn query(email: &str, password: &str) -> SignupQuery {
        SignupQuery {
            email: email.into(),
            password: password.into(),
            user_type: UserType::Employee,
            gender: "female".into(),
            country: "Kenya".into(),
            citizenship: "Kenya".into(),
            field: "software".into(),
            experience: "2".into(),
            role: "developer".into(),
            bio: String::new(),
        }
    }

    fn test_profile(user_id: &str) -> Profile {
        Profile {
            user_id: user_id.into(),
            role: "developer".into(),
            field: "software".into(),
            experience: "2".into(),
            country: "Kenya".into(),
            citizenship: "Kenya".into(),
            gender: "female".into(),
            bio: String::new(),
            user_type: UserType::Employee,
            created_at: 0,
            updated_at: 0,
        }
    }

    async fn test_pool() -> SqlitePool {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        db::migrate(&pool).await.unwrap();
        pool
    }

    #[test]
    fn accepts_a_complete_signup() {
        validate(&query("ada@example.com", "secret1")).unwrap();
    }

    #[test]
    fn rejects_short_passwords() {
        let err = validate(&query("ada@example.com", "12345")).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn rejects_blank_questionnaire_fields() {
        let mut q = query("ada@example.com", "secret1");
        q.country = "   ".into();
        let err = validate(&q).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn accepts_plain_addresses() {
        assert!(valid_email("ada@example.com"));
        assert!(valid_email("a.b+c@mail.example.co"));
    }

    #[test]
    fn rejects_malformed_addresses() {
        assert!(!valid_email("ada"));
        assert!(!valid_email("ada@"));
        assert!(!valid_email("@example.com"));
        assert!(!valid_email("ada@example"));
        assert!(!valid_email("ada@.com"));
        assert!(!valid_email("ada @example.com"));
    }

    #[tokio::test]
    async fn duplicate_email_is_a_conflict() {
        let pool = test_pool().await;
        create_account(&pool, "ada@example.com", "hash", &test_profile("u1"))
            .await
            .unwrap();

        let err = create_account(&pool, "ada@example.com", "hash", &test_profile("u2"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn failed_profile_insert_leaves_no_orphan_user() {
        let pool = test_pool().await;
        sqlx::query("DROP TABLE profiles")
            .execute(&pool)
            .await
            .unwrap();

        create_account(&pool, "ada@example.com", "hash", &test_profile("u1"))
            .await
            .unwrap_err();
        let (users,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(users, 0);

        // once the store recovers, the same email signs up cleanly
        db::migrate(&pool).await.unwrap();
        create_account(&pool, "ada@example.com", "hash", &test_profile("u1"))
            .await
            .unwrap();
    }
}
