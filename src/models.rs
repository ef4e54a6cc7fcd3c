use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Deserialize, ToSchema)]
pub struct RegisterReq {
    #[schema(example = "kmitchell")]
    pub username: Option<String>,
    #[schema(example = "kevon@example.com")]
    pub email: Option<String>,
    #[schema(example = "correct horse battery staple")]
    pub password: Option<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct SigninReq {
    #[schema(example = "kevon@example.com")]
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: u64,
    pub role: String,
    pub email: String,
    pub iat: u64,
    pub exp: u64,
    pub jti: String,
}
