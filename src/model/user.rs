use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use strum::EnumIter;
use utoipa::ToSchema;

use super::{FieldKind, Owned, Resource, UpdateField};

/// Public view of a row in `users`; the password hash is never selected into it.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct User {
    #[schema(example = 1)]
    pub user_id: u64,
    #[schema(example = "kmitchell")]
    pub username: String,
    #[schema(example = "kevon@example.com")]
    pub email: String,
    #[schema(example = "user")]
    pub role: String,
    #[schema(value_type = Option<String>, format = "date-time")]
    pub created_at: Option<NaiveDateTime>,
    #[schema(value_type = Option<String>, format = "date-time")]
    pub updated_at: Option<NaiveDateTime>,
}

/// Sign-in lookup row. Never serialized.
#[derive(Debug, Deserialize, sqlx::FromRow)]
pub struct UserCredentials {
    pub user_id: u64,
    pub username: String,
    pub email: String,
    pub role: String,
    pub password_hash: String,
}

impl UserCredentials {
    pub const COLUMNS: &'static [&'static str] =
        &["user_id", "username", "email", "role", "password_hash"];
}

#[derive(Debug, Clone, Copy, EnumIter)]
pub enum UserField {
    Username,
    Email,
}

impl UpdateField for UserField {
    fn column(self) -> &'static str {
        match self {
            UserField::Username => "username",
            UserField::Email => "email",
        }
    }

    fn kind(self) -> FieldKind {
        FieldKind::Text
    }
}

pub struct Users;

impl Resource for Users {
    type Row = User;
    type Key = u64;
    type Field = UserField;

    const NOUN: &'static str = "user";
    const TITLE: &'static str = "User";
    const PARAM: &'static str = "userId";
    const TABLE: &'static str = "users";
    const PRIMARY_KEY: &'static str = "user_id";
    const COLUMNS: &'static [&'static str] =
        &["user_id", "username", "email", "role", "created_at", "updated_at"];

    fn key(row: &User) -> u64 {
        row.user_id
    }
}

impl Owned for Users {
    fn owner_id(row: &User) -> String {
        row.user_id.to_string()
    }
}
