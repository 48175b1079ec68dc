use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::model::user::UserProfile;

#[derive(Deserialize, ToSchema)]
pub struct RegisterReq {
    #[schema(example = "yamada")]
    pub username: String,
    pub password: String,
    #[schema(example = "山田 太郎")]
    pub full_name: String,
    #[schema(example = "yamada@example.com")]
    pub email: String,
}

#[derive(Deserialize, ToSchema)]
pub struct LoginReqDto {
    #[schema(example = "yamada")]
    pub username: String,
    pub password: String,
}

#[derive(Serialize, ToSchema)]
pub struct LoginResponse {
    pub access_token: String,
    #[schema(example = "bearer")]
    pub token_type: String,
    pub user: UserProfile,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: u64,
    pub sub: String,
    pub role: u8, // role id
    pub exp: usize,
    pub jti: String,
}
