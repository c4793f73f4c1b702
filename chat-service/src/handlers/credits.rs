//! Credit plan handlers.
//!
//! Plan catalogue listing and checkout-session creation. Unlike the
//! message handlers, failures here map onto HTTP status codes: 401 for a
//! missing user, 400 for an unknown plan, 500 for downstream faults.

use axum::{
    extract::State,
    http::{header::ORIGIN, HeaderMap},
    Json,
};
use server_core::error::AppError;

use crate::{
    dtos::{PlansResponse, PurchaseRequest, PurchaseResponse},
    middleware::AuthUser,
    models::{find_plan, Plan, Transaction, PLAN_CATALOGUE},
    AppState,
};

/// Return the full static plan catalogue to an authenticated caller.
pub async fn get_plans(_user: AuthUser) -> Json<PlansResponse<'static>> {
    Json(PlansResponse {
        success: true,
        plans: &PLAN_CATALOGUE,
    })
}

/// Create an unpaid transaction and a hosted checkout session for it.
///
/// The transaction is recorded before the checkout call and is left in
/// place if that call fails; reconciliation of orphaned unpaid records
/// happens out of band.
pub async fn purchase_plan(
    State(state): State<AppState>,
    user: AuthUser,
    headers: HeaderMap,
    Json(payload): Json<PurchaseRequest>,
) -> Result<Json<PurchaseResponse>, AppError> {
    // Unknown and empty plan ids share the invalid-plan channel.
    let plan: &Plan = find_plan(&payload.plan_id)
        .ok_or_else(|| AppError::BadRequest(anyhow::anyhow!("Invalid plan")))?;

    tracing::info!(
        user_id = %user.id,
        plan_id = %plan.id,
        amount = plan.price,
        "Creating purchase transaction"
    );

    let transaction = Transaction::unpaid(&user.id, plan);
    state.repository.create_transaction(&transaction).await?;

    let origin = headers
        .get(ORIGIN)
        .and_then(|v| v.to_str().ok())
        .unwrap_or(&state.config.client_url);

    let session = state
        .stripe
        .create_checkout_session(plan, &transaction.id, origin)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, transaction_id = %transaction.id, "Checkout session creation failed");
            AppError::InternalError(e)
        })?;

    tracing::info!(
        transaction_id = %transaction.id,
        session_id = %session.id,
        "Checkout session created"
    );

    Ok(Json(PurchaseResponse {
        success: true,
        url: session.url,
    }))
}
