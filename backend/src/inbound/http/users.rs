//! Account handlers shared by the client, admin and staff collections.
//!
//! ```text
//! POST   /clients                 {"login":"moviegoer","password":"..."}
//! GET    /clients
//! GET    /clients/self
//! GET    /clients/login?match=movie
//! GET    /clients/login/{login}
//! GET    /clients/{id}
//! PUT    /clients/update          If-Match: "<etag>"
//! POST   /clients/{id}/activate
//! POST   /clients/{id}/deactivate
//! DELETE /clients/{id}
//! ```
//!
//! The same handlers serve `/admins` and `/staffs`; the scope's
//! [`AccountKind`] selects the role. Managing accounts requires an admin
//! token; reading or updating one's own account only requires being that
//! account. Where clients are replicas, [`replica_account_scope`] mounts the
//! lookups only.

use actix_web::{delete, get, post, put, web, HttpRequest, HttpResponse, Scope};
use serde::{Deserialize, Serialize};

use crate::domain::ports::{AccountUpdate, NewAccount};
use crate::domain::{Login, PlainPassword, ResourceTag, User, UserRole};
use crate::inbound::http::auth::Authenticated;
use crate::inbound::http::if_match::{require_if_match, tagged_json};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    map_login_validation_error, map_user_validation_error, missing_field_error, parse_user_id,
    FieldName,
};
use crate::inbound::http::{list_response, ApiResult};

const ID: FieldName = FieldName::new("id");
const MATCH: FieldName = FieldName::new("match");

/// Role served by an account scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccountKind(pub UserRole);

/// Body for account creation and client self-registration.
#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountRequest {
    pub login: String,
    pub password: String,
}

/// Body for `PUT /<accounts>/update`.
#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountUpdateRequest {
    pub id: String,
    pub login: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

/// Public view of an account; never carries the password hash.
#[derive(Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AccountResponse {
    pub id: String,
    pub login: String,
    pub active: bool,
}

impl From<&User> for AccountResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id().to_string(),
            login: user.login().to_string(),
            active: user.is_active(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct LoginMatchQuery {
    #[serde(rename = "match")]
    pub fragment: Option<String>,
}

fn account_tag(user: &User) -> ResourceTag {
    ResourceTag::user(*user.id().as_uuid(), user.login().as_str())
}

pub(crate) fn parse_new_account(payload: AccountRequest) -> ApiResult<NewAccount> {
    let login = Login::new(payload.login).map_err(map_user_validation_error)?;
    let password = PlainPassword::new(&payload.password).map_err(map_login_validation_error)?;
    Ok(NewAccount { login, password })
}

fn parse_update(payload: AccountUpdateRequest) -> ApiResult<AccountUpdate> {
    let id = parse_user_id(&payload.id, ID)?;
    let login = Login::new(payload.login).map_err(map_user_validation_error)?;
    let password = payload
        .password
        .as_deref()
        .map(PlainPassword::new)
        .transpose()
        .map_err(map_login_validation_error)?;
    Ok(AccountUpdate {
        id,
        login,
        password,
    })
}

/// Create an account of the scope's role.
#[post("")]
pub async fn create_account(
    state: web::Data<HttpState>,
    kind: web::Data<AccountKind>,
    auth: Authenticated,
    payload: web::Json<AccountRequest>,
) -> ApiResult<HttpResponse> {
    auth.require_role(UserRole::Admin)?;
    let account = parse_new_account(payload.into_inner())?;
    let user = state.accounts.create(kind.0, account).await?;
    Ok(HttpResponse::Created().json(AccountResponse::from(&user)))
}

#[get("")]
pub async fn list_accounts(
    state: web::Data<HttpState>,
    kind: web::Data<AccountKind>,
    auth: Authenticated,
) -> ApiResult<HttpResponse> {
    auth.require_role(UserRole::Admin)?;
    let users = state.accounts_query.find_all(kind.0).await?;
    Ok(list_response(users.iter().map(AccountResponse::from)))
}

/// The caller's own account, tagged for a later update.
#[get("/self")]
pub async fn own_account(
    state: web::Data<HttpState>,
    kind: web::Data<AccountKind>,
    auth: Authenticated,
) -> ApiResult<HttpResponse> {
    auth.require_role(kind.0)?;
    let user = state.accounts_query.find_by_id(kind.0, auth.user_id()).await?;
    tagged_json(state.signer.as_ref(), &account_tag(&user), &AccountResponse::from(&user))
}

/// Accounts whose login contains `?match=`.
#[get("/login")]
pub async fn match_accounts(
    state: web::Data<HttpState>,
    kind: web::Data<AccountKind>,
    auth: Authenticated,
    query: web::Query<LoginMatchQuery>,
) -> ApiResult<HttpResponse> {
    auth.require_role(UserRole::Admin)?;
    let fragment = query
        .into_inner()
        .fragment
        .ok_or_else(|| missing_field_error(MATCH))?;
    let users = state.accounts_query.find_matching(kind.0, fragment).await?;
    Ok(list_response(users.iter().map(AccountResponse::from)))
}

#[get("/login/{login}")]
pub async fn account_by_login(
    state: web::Data<HttpState>,
    kind: web::Data<AccountKind>,
    auth: Authenticated,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    auth.require_role(UserRole::Admin)?;
    let user = state
        .accounts_query
        .find_by_login(kind.0, path.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(AccountResponse::from(&user)))
}

/// Replace an account's login and optionally its password.
///
/// The `If-Match` tag must have been issued for the same id and login as
/// the payload.
#[put("/update")]
pub async fn update_account(
    req: HttpRequest,
    state: web::Data<HttpState>,
    kind: web::Data<AccountKind>,
    auth: Authenticated,
    payload: web::Json<AccountUpdateRequest>,
) -> ApiResult<HttpResponse> {
    let update = parse_update(payload.into_inner())?;
    auth.require_self_or(kind.0, update.id, &[UserRole::Admin])?;
    let expected = ResourceTag::user(*update.id.as_uuid(), update.login.as_str());
    require_if_match(&req, state.signer.as_ref(), &expected)?;
    state.accounts.update(kind.0, update).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[get("/{id}")]
pub async fn account_by_id(
    state: web::Data<HttpState>,
    kind: web::Data<AccountKind>,
    auth: Authenticated,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id = parse_user_id(&path.into_inner(), ID)?;
    auth.require_self_or(kind.0, id, &[UserRole::Admin])?;
    let user = state.accounts_query.find_by_id(kind.0, id).await?;
    tagged_json(state.signer.as_ref(), &account_tag(&user), &AccountResponse::from(&user))
}

#[post("/{id}/activate")]
pub async fn activate_account(
    state: web::Data<HttpState>,
    kind: web::Data<AccountKind>,
    auth: Authenticated,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    auth.require_role(UserRole::Admin)?;
    let id = parse_user_id(&path.into_inner(), ID)?;
    state.accounts.activate(kind.0, id).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[post("/{id}/deactivate")]
pub async fn deactivate_account(
    state: web::Data<HttpState>,
    kind: web::Data<AccountKind>,
    auth: Authenticated,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    auth.require_role(UserRole::Admin)?;
    let id = parse_user_id(&path.into_inner(), ID)?;
    state.accounts.deactivate(kind.0, id).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[delete("/{id}")]
pub async fn delete_account(
    state: web::Data<HttpState>,
    kind: web::Data<AccountKind>,
    auth: Authenticated,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    auth.require_role(UserRole::Admin)?;
    let id = parse_user_id(&path.into_inner(), ID)?;
    state.accounts.delete(kind.0, id).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Account routes for `role` mounted under `path`.
///
/// Literal segments are registered before `/{id}` so they are not captured
/// as identifiers.
pub fn account_scope(path: &str, role: UserRole) -> Scope {
    web::scope(path)
        .app_data(web::Data::new(AccountKind(role)))
        .service(create_account)
        .service(list_accounts)
        .service(own_account)
        .service(match_accounts)
        .service(account_by_login)
        .service(update_account)
        .service(account_by_id)
        .service(activate_account)
        .service(deactivate_account)
        .service(delete_account)
}

/// Read-only routes for accounts replicated from another service.
///
/// Writes to a replica would never reach the owning service, so only the
/// lookups are mounted. Writes get `405` on the collection and `404` on
/// the per-account action paths.
pub fn replica_account_scope(path: &str, role: UserRole) -> Scope {
    web::scope(path)
        .app_data(web::Data::new(AccountKind(role)))
        .service(list_accounts)
        .service(own_account)
        .service(match_accounts)
        .service(account_by_login)
        .service(account_by_id)
}

#[cfg(test)]
#[path = "users_tests.rs"]
mod tests;
