use chrono::NaiveDateTime;
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    pub id: u64,
    pub username: String,
    pub password: String,
    pub full_name: String,
    pub email: String,
    pub role_id: u8,
    pub created_at: NaiveDateTime,
}

/// User as shown to clients, without the password hash.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UserProfile {
    #[schema(example = 1)]
    pub id: u64,
    #[schema(example = "yamada")]
    pub username: String,
    #[schema(example = "山田 太郎")]
    pub full_name: String,
    #[schema(example = "yamada@example.com")]
    pub email: String,
    pub is_admin: bool,
    #[schema(example = "2026-01-01T09:00:00", format = "date-time", value_type = String)]
    pub created_at: NaiveDateTime,
}

impl From<&User> for UserProfile {
    fn from(u: &User) -> Self {
        Self {
            id: u.id,
            username: u.username.clone(),
            full_name: u.full_name.clone(),
            email: u.email.clone(),
            is_admin: u.role_id == crate::model::role::Role::Admin.id(),
            created_at: u.created_at,
        }
    }
}

/// Registration data handed to the store; `password` is already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub password: String,
    pub full_name: String,
    pub email: String,
    pub role_id: u8,
}
