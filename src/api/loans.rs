//! Loan management endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::loan::{CreateLoanRequest, LoanView},
};

use super::AuthenticatedMember;

/// List all loans
#[utoipa::path(
    get,
    path = "/loans",
    tag = "loans",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "List of loans", body = Vec<LoanView>),
        (status = 403, description = "Librarian privileges required")
    )
)]
pub async fn list_loans(
    State(state): State<crate::AppState>,
    AuthenticatedMember(claims): AuthenticatedMember,
) -> AppResult<Json<Vec<LoanView>>> {
    claims.require_librarian()?;

    let loans = state.services.loans.list_loans().await?;
    Ok(Json(loans))
}

/// Get loan details by ID
#[utoipa::path(
    get,
    path = "/loans/{id}",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Loan ID")
    ),
    responses(
        (status = 200, description = "Loan details", body = LoanView),
        (status = 404, description = "Loan not found")
    )
)]
pub async fn get_loan(
    State(state): State<crate::AppState>,
    AuthenticatedMember(claims): AuthenticatedMember,
    Path(id): Path<i32>,
) -> AppResult<Json<LoanView>> {
    let loan = state.services.loans.get_loan(id).await?;
    claims.require_self_or_librarian(loan.member_id)?;

    Ok(Json(loan))
}

/// Get loans for a specific member
#[utoipa::path(
    get,
    path = "/members/{id}/loans",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Member ID")
    ),
    responses(
        (status = 200, description = "Member's loans", body = Vec<LoanView>),
        (status = 404, description = "Member not found")
    )
)]
pub async fn get_member_loans(
    State(state): State<crate::AppState>,
    AuthenticatedMember(claims): AuthenticatedMember,
    Path(member_id): Path<i32>,
) -> AppResult<Json<Vec<LoanView>>> {
    claims.require_self_or_librarian(member_id)?;

    let loans = state.services.loans.list_member_loans(member_id).await?;
    Ok(Json(loans))
}

/// Borrow a book
#[utoipa::path(
    post,
    path = "/loans",
    tag = "loans",
    security(("bearer_auth" = [])),
    request_body = CreateLoanRequest,
    responses(
        (status = 201, description = "Loan created", body = LoanView),
        (status = 404, description = "Book or member not found"),
        (status = 409, description = "No available copies or already borrowed")
    )
)]
pub async fn create_loan(
    State(state): State<crate::AppState>,
    AuthenticatedMember(claims): AuthenticatedMember,
    Json(request): Json<CreateLoanRequest>,
) -> AppResult<(StatusCode, Json<LoanView>)> {
    // Members borrow for themselves, staff for anyone
    claims.require_self_or_librarian(request.member_id)?;

    let loan = state
        .services
        .loans
        .create_loan(request.book_id, request.member_id)
        .await?;

    Ok((StatusCode::CREATED, Json(loan)))
}

/// Return a borrowed book
#[utoipa::path(
    post,
    path = "/loans/{id}/return",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Loan ID")
    ),
    responses(
        (status = 200, description = "Book returned", body = LoanView),
        (status = 404, description = "Loan not found"),
        (status = 409, description = "Already returned")
    )
)]
pub async fn return_loan(
    State(state): State<crate::AppState>,
    AuthenticatedMember(claims): AuthenticatedMember,
    Path(loan_id): Path<i32>,
) -> AppResult<Json<LoanView>> {
    claims.require_librarian()?;

    let loan = state.services.loans.return_book(loan_id).await?;
    Ok(Json(loan))
}
