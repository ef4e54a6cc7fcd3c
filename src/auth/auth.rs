use std::marker::PhantomData;
use std::str::FromStr;

use actix_web::{FromRequest, HttpMessage, HttpRequest, dev::Payload, web::Data};
use futures::future::{LocalBoxFuture, Ready, ready};

use crate::api::resource::load;
use crate::error::ApiError;
use crate::model::{Owned, role::Role};
use crate::models::Claims;
use crate::store::Store;

/// Principal placed in request extensions by `require_signin`.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: u64,
    pub role: Role,
}

impl TryFrom<Claims> for AuthUser {
    type Error = ApiError;

    fn try_from(claims: Claims) -> Result<Self, Self::Error> {
        let role = Role::from_str(&claims.role)
            .map_err(|_| ApiError::Unauthorized("Invalid role".to_string()))?;
        Ok(Self {
            user_id: claims.user_id,
            role,
        })
    }
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

impl FromRequest for AuthUser {
    type Error = ApiError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(
            req.extensions()
                .get::<AuthUser>()
                .cloned()
                .ok_or_else(|| ApiError::Unauthorized("No authorization token was found".to_string())),
        )
    }
}

/// Owner-or-admin check. Missing principal or owner denies.
pub fn has_authorization(principal: Option<&AuthUser>, owner_id: Option<&str>) -> bool {
    let Some(principal) = principal else {
        return false;
    };
    let is_owner = owner_id.is_some_and(|owner| owner == principal.user_id.to_string());
    is_owner || principal.is_admin()
}

/// Loaded row the signed-in principal may act on.
///
/// The row is loaded first, so a missing row answers 404 before any 403.
pub struct Authorized<R: Owned, S: Store> {
    pub row: R::Row,
    _store: PhantomData<fn() -> S>,
}

impl<R: Owned, S: Store> FromRequest for Authorized<R, S> {
    type Error = ApiError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let req = req.clone();
        Box::pin(async move {
            let store = req
                .app_data::<Data<S>>()
                .cloned()
                .ok_or_else(|| ApiError::Internal("Store is not configured".to_string()))?;
            let raw = req.match_info().get(R::PARAM).unwrap_or_default().to_string();
            let row = load::<R, S>(store.get_ref(), &raw).await?;

            let owner = R::owner_id(&row);
            let principal = req.extensions().get::<AuthUser>().cloned();
            if !has_authorization(principal.as_ref(), Some(&owner)) {
                return Err(ApiError::Forbidden);
            }

            req.extensions_mut().insert(row.clone());
            Ok(Authorized {
                row,
                _store: PhantomData,
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn principal(user_id: u64, role: Role) -> AuthUser {
        AuthUser { user_id, role }
    }

    #[test]
    fn owner_and_admin_pass() {
        assert!(has_authorization(Some(&principal(4, Role::User)), Some("4")));
        assert!(has_authorization(Some(&principal(9, Role::Admin)), Some("4")));
    }

    #[test]
    fn others_are_denied() {
        assert!(!has_authorization(Some(&principal(5, Role::User)), Some("4")));
    }

    #[test]
    fn missing_context_fails_closed() {
        assert!(!has_authorization(None, Some("4")));
        assert!(!has_authorization(Some(&principal(4, Role::User)), None));
    }

    #[test]
    fn unknown_role_claim_is_rejected() {
        let claims = Claims {
            user_id: 1,
            role: "root".into(),
            email: "r@x".into(),
            iat: 0,
            exp: 0,
            jti: "j".into(),
        };
        assert!(AuthUser::try_from(claims).is_err());
    }
}
