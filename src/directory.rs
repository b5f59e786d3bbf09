use axum::{
    debug_handler,
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use sqlx::SqlitePool;
use tower_sessions::Session;

use crate::{
    profiles::{Profile, UserType},
    session, AppResult,
};

#[derive(Debug, Deserialize)]
pub struct DirectoryQuery {
    pub q: Option<String>,
}

/// Counterpart browsing: employees see employers and the other way around.
/// The whole result set is materialized, then filtered in process; there is
/// no pagination or ranking.
#[debug_handler]
pub async fn browse(
    State(db_pool): State<SqlitePool>,
    session: Session,
    Query(DirectoryQuery { q }): Query<DirectoryQuery>,
) -> AppResult<Json<Vec<Profile>>> {
    let me = session::current_profile(&session, &db_pool).await?;
    let profiles = fetch_by_type(&db_pool, me.user_type.counterpart()).await?;
    Ok(Json(filter_profiles(profiles, q.as_deref())))
}

pub async fn fetch_by_type(db_pool: &SqlitePool, user_type: UserType) -> AppResult<Vec<Profile>> {
    Ok(sqlx::query_as::<_, Profile>(
        "SELECT user_id,role,field,experience,country,citizenship,gender,bio,user_type,created_at,updated_at
         FROM profiles WHERE user_type=?",
    )
    .bind(user_type)
    .fetch_all(db_pool)
    .await?)
}

/// Case-insensitive substring match across role, field, country and bio.
pub fn filter_profiles(profiles: Vec<Profile>, q: Option<&str>) -> Vec<Profile> {
    let Some(q) = q.map(str::trim).filter(|q| !q.is_empty()) else {
        return profiles;
    };
    let q = q.to_lowercase();

    profiles
        .into_iter()
        .filter(|p| {
            [&p.role, &p.field, &p.country, &p.bio]
                .into_iter()
                .any(|f| f.to_lowercase().contains(&q))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(role: &str, field: &str, country: &str, bio: &str) -> Profile {
        Profile {
            user_id: "u".into(),
            role: role.into(),
            field: field.into(),
            experience: "3".into(),
            country: country.into(),
            citizenship: "US".into(),
            gender: "female".into(),
            bio: bio.into(),
            user_type: UserType::Employer,
            created_at: 0,
            updated_at: 0,
        }
    }

    #[test]
    fn empty_filter_keeps_everything() {
        let all = vec![profile("a", "b", "c", "d"), profile("e", "f", "g", "h")];
        assert_eq!(filter_profiles(all.clone(), None).len(), 2);
        assert_eq!(filter_profiles(all, Some("  ")).len(), 2);
    }

    #[test]
    fn filter_matches_any_field_case_insensitively() {
        let all = vec![
            profile("Marketing Lead", "advertising", "Spain", "ten years in brand work"),
            profile("Engineer", "software", "Denmark", "rustacean"),
            profile("Analyst", "fintech", "Germany", "open MARKET research"),
        ];
        let hits = filter_profiles(all, Some("market"));
        assert_eq!(hits.len(), 2);
        assert!(hits.iter().all(|p| {
            p.role.to_lowercase().contains("market") || p.bio.to_lowercase().contains("market")
        }));
    }

    #[test]
    fn counterpart_flips_both_ways() {
        assert_eq!(UserType::Employee.counterpart(), UserType::Employer);
        assert_eq!(UserType::Employer.counterpart(), UserType::Employee);
    }
}
