//! HTTP Controller (Driver Adapter)
//!
//! Axum router delegating to the session orchestrator. Every route,
//! including both fallbacks, sits behind the bearer-token gate.

use std::sync::Arc;
use std::time::Instant;

use axum::{
    Json, Router,
    extract::{Query, State, rejection::QueryRejection},
    middleware,
    response::{IntoResponse, Response},
    routing::get,
};
use chrono::Utc;
use tracing::Instrument;
use uuid::Uuid;

use crate::application::ports::BankingConnector;
use crate::application::use_cases::SessionOrchestrator;
use crate::domain::banking::BankCredentials;
use crate::domain::session::{FailureReason, OrchestrationResult};
use crate::infrastructure::config::CredentialProvider;
use crate::infrastructure::metrics::record_inquiry;

use super::auth::{BearerGate, require_bearer};
use super::error::{ApiError, InquiryKind};
use super::request::TransactionsQuery;
use super::response::{BalanceEnvelope, TransactionsEnvelope};

/// Application state shared across handlers.
pub struct AppState<C>
where
    C: BankingConnector,
{
    /// Use case running the banking handshake.
    pub orchestrator: Arc<SessionOrchestrator<C>>,
    /// Source of per-request bank credentials.
    pub credentials: Arc<CredentialProvider>,
}

impl<C> AppState<C>
where
    C: BankingConnector,
{
    /// Create state over an orchestrator and credential provider.
    pub fn new(orchestrator: SessionOrchestrator<C>, credentials: CredentialProvider) -> Self {
        Self {
            orchestrator: Arc::new(orchestrator),
            credentials: Arc::new(credentials),
        }
    }
}

impl<C> Clone for AppState<C>
where
    C: BankingConnector,
{
    fn clone(&self) -> Self {
        Self {
            orchestrator: Arc::clone(&self.orchestrator),
            credentials: Arc::clone(&self.credentials),
        }
    }
}

/// Create the HTTP router with all endpoints.
pub fn create_router<C>(state: AppState<C>, gate: BearerGate) -> Router
where
    C: BankingConnector + 'static,
{
    Router::new()
        .route("/api/balance", get(get_balance::<C>))
        .route("/api/transactions", get(get_transactions::<C>))
        .fallback(route_not_found)
        .method_not_allowed_fallback(method_not_allowed)
        .layer(middleware::from_fn_with_state(
            Arc::new(gate),
            require_bearer,
        ))
        .with_state(state)
}

/// `GET /api/balance`.
async fn get_balance<C>(State(state): State<AppState<C>>) -> Response
where
    C: BankingConnector + 'static,
{
    let kind = InquiryKind::Balance;
    let span = tracing::info_span!("inquiry", inquiry = kind.as_str(), request_id = %Uuid::new_v4());

    async move {
        let started = Instant::now();
        let credentials = match load_credentials(&state) {
            Ok(credentials) => credentials,
            Err(reason) => return finish(kind, reason.into(), started),
        };

        let result = state.orchestrator.run_balance_inquiry(&credentials).await;
        finish(kind, result, started)
    }
    .instrument(span)
    .await
}

/// `GET /api/transactions?from=&to=`.
async fn get_transactions<C>(
    State(state): State<AppState<C>>,
    query: Result<Query<TransactionsQuery>, QueryRejection>,
) -> Response
where
    C: BankingConnector + 'static,
{
    let kind = InquiryKind::Transactions;
    let span = tracing::info_span!("inquiry", inquiry = kind.as_str(), request_id = %Uuid::new_v4());

    async move {
        let started = Instant::now();

        let Query(query) = match query {
            Ok(query) => query,
            Err(rejection) => {
                let message = format!("Invalid query string: {}", rejection.body_text());
                tracing::warn!(error = %message, "Query string unreadable");
                return finish(kind, FailureReason::ProtocolError(message).into(), started);
            }
        };

        let range = match query.resolve(Utc::now().date_naive()) {
            Ok(range) => range,
            Err(e) => {
                tracing::warn!(error = %e, "Date parameter unreadable");
                return finish(kind, FailureReason::ProtocolError(e.to_string()).into(), started);
            }
        };

        let credentials = match load_credentials(&state) {
            Ok(credentials) => credentials,
            Err(reason) => return finish(kind, reason.into(), started),
        };

        let result = state
            .orchestrator
            .run_statement_inquiry(&credentials, range)
            .await;
        finish(kind, result, started)
    }
    .instrument(span)
    .await
}

async fn route_not_found() -> ApiError {
    ApiError::RouteNotFound
}

async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}

fn load_credentials<C>(state: &AppState<C>) -> Result<BankCredentials, FailureReason>
where
    C: BankingConnector,
{
    state.credentials.load().map_err(|e| {
        tracing::error!(error = %e, "Refusing inquiry");
        FailureReason::ConfigIncomplete
    })
}

/// Record the outcome and render it.
fn finish(kind: InquiryKind, result: OrchestrationResult, started: Instant) -> Response {
    record_inquiry(kind, result.outcome_label(), started.elapsed());

    let now = Utc::now();
    match result {
        OrchestrationResult::BalanceRetrieved(snapshot) => {
            Json(BalanceEnvelope::new(&snapshot, now)).into_response()
        }
        OrchestrationResult::StatementsRetrieved(history) => {
            Json(TransactionsEnvelope::new(&history, now)).into_response()
        }
        OrchestrationResult::Failed(reason) => ApiError::inquiry(kind, reason).into_response(),
    }
}
