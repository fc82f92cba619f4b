use axum::{async_trait, extract::FromRequestParts, http::request::Parts};

use crate::{domain::models::EmployeeId, routes::ApiError};

/// Trusted employee identity injected by the upstream gateway.
///
/// The gateway authenticates the caller and forwards `x-employee-id`
/// (and `x-employee-role: admin` for admins); this service never sees
/// credentials. Returns 401 when the header is missing or malformed.
#[derive(Debug, Clone, Copy)]
pub struct EmployeeIdentity {
    pub id: EmployeeId,
    pub is_admin: bool,
}

#[async_trait]
impl<S> FromRequestParts<S> for EmployeeIdentity
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let id = parts
            .headers
            .get("x-employee-id")
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.parse::<i32>().ok())
            .ok_or_else(|| ApiError::unauthorized("Missing employee identity"))?;

        let is_admin = parts
            .headers
            .get("x-employee-role")
            .and_then(|value| value.to_str().ok())
            .map(|role| role.eq_ignore_ascii_case("admin"))
            .unwrap_or(false);

        Ok(Self {
            id: EmployeeId::new(id),
            is_admin,
        })
    }
}
