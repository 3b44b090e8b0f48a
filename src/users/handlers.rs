use axum::{
    extract::State,
    routing::get,
    Json, Router,
};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use super::{
    dto::{CreateUserRequest, Envelope, ListUsersQuery, TokenQuery, UpdateUser, UpdateUserRequest},
    error::{UserError, UserResult},
    extract::{UserId, ValidJson, ValidQuery},
    repo_types::{NewUser, Page, User},
};
use crate::{
    auth::{extractors::BearerToken, password::hash_password, AuthError, Claims},
    config::{EmptyPagePolicy, UpdateMissingPolicy},
    state::AppState,
};

const INVALID_ACCESS: &str = "Invalid Access";
const LIST_INVALID_ACCESS: &str = "Failed to fetch the users list";

pub fn users_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/users",
            get(list_users).post(create_user).put(update_user),
        )
        .route(
            "/users/:id",
            get(show_user).put(update_user_at).delete(destroy_user),
        )
}

/// Resolves the caller's token and checks it before any store access.
///
/// The request field wins over the `Authorization` header.
fn authenticate(
    state: &AppState,
    field: Option<String>,
    header: Option<String>,
    failure: &'static str,
) -> UserResult<Claims> {
    let token = field
        .filter(|t| !t.trim().is_empty())
        .or(header)
        .ok_or(UserError::Unauthenticated {
            message: failure,
            source: AuthError::Missing,
        })?;

    state
        .auth
        .verify(token.trim())
        .map_err(|source| UserError::Unauthenticated {
            message: failure,
            source,
        })
}

#[instrument(skip_all, fields(page = query.page, per_page = query.per_page))]
pub async fn list_users(
    State(state): State<AppState>,
    BearerToken(header): BearerToken,
    ValidQuery(query): ValidQuery<ListUsersQuery>,
) -> UserResult<Json<Envelope<Page<User>>>> {
    let caller = authenticate(&state, query.token, header, LIST_INVALID_ACCESS)?;

    let page = state.users.paginate(query.page, query.per_page).await?;
    if page.is_empty() && state.config.users.empty_page == EmptyPagePolicy::Failure {
        debug!(caller_id = %caller.sub, total = page.total, "empty page reported as failure");
        return Err(UserError::EmptyPage);
    }

    debug!(caller_id = %caller.sub, count = page.data.len(), total = page.total, "users listed");
    Ok(Json(Envelope::success("Users List Fetched Successfully", page)))
}

#[instrument(skip_all)]
pub async fn create_user(
    State(state): State<AppState>,
    BearerToken(header): BearerToken,
    ValidJson(input): ValidJson<CreateUserRequest>,
) -> UserResult<Json<Envelope<User>>> {
    let caller = authenticate(&state, input.token, header, INVALID_ACCESS)?;

    let password_hash = hash_password(&input.password)?;
    let user = state
        .users
        .create(NewUser {
            name: input.name,
            email: input.email,
            password_hash,
        })
        .await?;

    info!(caller_id = %caller.sub, user_id = %user.id, "user registered");
    Ok(Json(Envelope::success("User Registered Successfully", user)))
}

#[instrument(skip_all, fields(user_id = %path.0))]
pub async fn show_user(
    State(state): State<AppState>,
    path: UserId,
    BearerToken(header): BearerToken,
    ValidQuery(query): ValidQuery<TokenQuery>,
) -> UserResult<Json<Envelope<User>>> {
    authenticate(&state, query.token, header, INVALID_ACCESS)?;
    let id = path.parse()?;

    let user = state
        .users
        .find(id)
        .await?
        .ok_or_else(|| UserError::NotFound(id.to_string()))?;

    Ok(Json(Envelope::success("Details Fetched Successfully", user)))
}

/// `PUT /users` with the id in the body.
#[instrument(skip_all)]
pub async fn update_user(
    State(state): State<AppState>,
    BearerToken(header): BearerToken,
    ValidJson(mut input): ValidJson<UpdateUserRequest>,
) -> UserResult<Json<Envelope<()>>> {
    let id = input
        .id
        .ok_or_else(|| UserError::Validation("The id field is required.".into()))?;
    let caller = authenticate(&state, input.token.take(), header, INVALID_ACCESS)?;
    apply_update(&state, &caller, id, input).await
}

/// `PUT /users/:id`; a body id, if sent, must match the path.
#[instrument(skip_all, fields(user_id = %path.0))]
pub async fn update_user_at(
    State(state): State<AppState>,
    path: UserId,
    BearerToken(header): BearerToken,
    ValidJson(mut input): ValidJson<UpdateUserRequest>,
) -> UserResult<Json<Envelope<()>>> {
    let caller = authenticate(&state, input.token.take(), header, INVALID_ACCESS)?;
    let id = path.parse()?;
    if input.id.is_some_and(|body_id| body_id != id) {
        return Err(UserError::Validation(
            "The id field does not match the path.".into(),
        ));
    }
    apply_update(&state, &caller, id, input).await
}

/// Runs an authenticated update under the configured missing-id policy.
async fn apply_update(
    state: &AppState,
    caller: &Claims,
    id: Uuid,
    input: UpdateUser,
) -> UserResult<Json<Envelope<()>>> {
    match state.config.users.update_missing {
        // legacy find-or-create: an existing row is left as it is
        UpdateMissingPolicy::Create => {
            let found = state
                .users
                .find_or_create(id, &input.name, &input.email)
                .await?;
            let user_id = found.user.id;
            if found.created {
                warn!(caller_id = %caller.sub, %user_id, "update created a missing user");
            } else {
                debug!(caller_id = %caller.sub, %user_id, "update found an existing user, left unchanged");
            }
        }
        UpdateMissingPolicy::Reject => {
            state
                .users
                .update(id, &input.name, &input.email)
                .await?
                .ok_or_else(|| UserError::NotFound(id.to_string()))?;
            info!(caller_id = %caller.sub, user_id = %id, "user updated");
        }
    }

    Ok(Json(Envelope::done("User Updated Successfully")))
}

#[instrument(skip_all, fields(user_id = %path.0))]
pub async fn destroy_user(
    State(state): State<AppState>,
    path: UserId,
    BearerToken(header): BearerToken,
    ValidQuery(query): ValidQuery<TokenQuery>,
) -> UserResult<Json<Envelope<()>>> {
    let caller = authenticate(&state, query.token, header, INVALID_ACCESS)?;
    let id = path.parse()?;

    if !state.users.delete(id).await? {
        return Err(UserError::NotFound(id.to_string()));
    }

    info!(caller_id = %caller.sub, user_id = %id, "user deleted");
    Ok(Json(Envelope::done("User Deleted Successfully")))
}
