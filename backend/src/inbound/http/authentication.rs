//! Login and self-registration handlers.
//!
//! ```text
//! POST /auth/login/{client|admin|staff} {"login":"moviegoer","password":"..."}
//! POST /auth/register/client            {"login":"moviegoer","password":"..."}
//! ```

use actix_web::{post, web, HttpResponse};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::domain::{Error, LoginCredentials, UserRole};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::users::{parse_new_account, AccountRequest, AccountResponse};
use crate::inbound::http::validation::map_login_validation_error;
use crate::inbound::http::ApiResult;

/// Login request body.
#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub login: String,
    pub password: String,
}

impl TryFrom<LoginRequest> for LoginCredentials {
    type Error = Error;

    fn try_from(value: LoginRequest) -> Result<Self, Self::Error> {
        Self::try_from_parts(&value.login, &value.password).map_err(map_login_validation_error)
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct TokenResponse {
    pub token: String,
}

fn parse_role(raw: &str) -> Result<UserRole, Error> {
    raw.parse::<UserRole>().map_err(|_| {
        Error::not_found(format!("unknown account kind: {raw}"))
            .with_details(json!({ "field": "role", "value": raw, "code": "unknown_role" }))
    })
}

/// Exchange credentials for a bearer token.
#[post("/auth/login/{role}")]
pub async fn login(
    state: web::Data<HttpState>,
    path: web::Path<String>,
    payload: web::Json<LoginRequest>,
) -> ApiResult<web::Json<TokenResponse>> {
    let role = parse_role(&path.into_inner())?;
    let credentials = LoginCredentials::try_from(payload.into_inner())?;
    let token = state.login.login(role, credentials).await?;
    Ok(web::Json(TokenResponse {
        token: token.as_str().to_owned(),
    }))
}

/// Anonymous client sign-up.
#[post("/auth/register/client")]
pub async fn register_client(
    state: web::Data<HttpState>,
    payload: web::Json<AccountRequest>,
) -> ApiResult<HttpResponse> {
    let account = parse_new_account(payload.into_inner())?;
    let user = state.login.register_client(account).await?;
    Ok(HttpResponse::Created().json(AccountResponse::from(&user)))
}
