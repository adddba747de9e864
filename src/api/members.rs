//! Member management endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use validator::Validate;

use crate::{
    error::AppResult,
    models::member::{Member, RegisterMember, UpdateMember},
};

use super::AuthenticatedMember;

/// Register a new member
#[utoipa::path(
    post,
    path = "/members",
    tag = "members",
    request_body = RegisterMember,
    responses(
        (status = 201, description = "Member registered", body = Member),
        (status = 400, description = "Invalid input"),
        (status = 409, description = "Username already taken")
    )
)]
pub async fn register_member(
    State(state): State<crate::AppState>,
    Json(registration): Json<RegisterMember>,
) -> AppResult<(StatusCode, Json<Member>)> {
    registration.validate()?;

    let created = state.services.members.register(registration).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// List all members
#[utoipa::path(
    get,
    path = "/members",
    tag = "members",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "List of members", body = Vec<Member>),
        (status = 403, description = "Librarian privileges required")
    )
)]
pub async fn list_members(
    State(state): State<crate::AppState>,
    AuthenticatedMember(claims): AuthenticatedMember,
) -> AppResult<Json<Vec<Member>>> {
    claims.require_librarian()?;

    let members = state.services.members.list_members().await?;
    Ok(Json(members))
}

/// Get member details by ID
#[utoipa::path(
    get,
    path = "/members/{id}",
    tag = "members",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Member ID")
    ),
    responses(
        (status = 200, description = "Member details", body = Member),
        (status = 404, description = "Member not found")
    )
)]
pub async fn get_member(
    State(state): State<crate::AppState>,
    AuthenticatedMember(claims): AuthenticatedMember,
    Path(id): Path<i32>,
) -> AppResult<Json<Member>> {
    claims.require_self_or_librarian(id)?;

    let member = state.services.members.get_member(id).await?;
    Ok(Json(member))
}

/// Update a member
#[utoipa::path(
    put,
    path = "/members/{id}",
    tag = "members",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Member ID")
    ),
    request_body = UpdateMember,
    responses(
        (status = 200, description = "Member updated", body = Member),
        (status = 404, description = "Member not found")
    )
)]
pub async fn update_member(
    State(state): State<crate::AppState>,
    AuthenticatedMember(claims): AuthenticatedMember,
    Path(id): Path<i32>,
    Json(update): Json<UpdateMember>,
) -> AppResult<Json<Member>> {
    claims.require_self_or_librarian(id)?;
    update.validate()?;

    // Only admins may move someone to another tier
    if update.membership_type.is_some() {
        claims.require_admin()?;
    }

    let updated = state.services.members.update_member(id, update).await?;
    Ok(Json(updated))
}

/// Delete a member
#[utoipa::path(
    delete,
    path = "/members/{id}",
    tag = "members",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Member ID")
    ),
    responses(
        (status = 204, description = "Member deleted"),
        (status = 404, description = "Member not found"),
        (status = 409, description = "Loans reference this member")
    )
)]
pub async fn delete_member(
    State(state): State<crate::AppState>,
    AuthenticatedMember(claims): AuthenticatedMember,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    claims.require_admin()?;

    state.services.members.delete_member(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
