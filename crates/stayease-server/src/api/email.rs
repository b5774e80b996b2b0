use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Extension, Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use stayease_mail::{templates, validate_address, MailError, OutgoingEmail};

use crate::middleware::RequestId;

use super::{ApiError, ApiResponse, AppState};

#[derive(Debug, Deserialize)]
pub(super) struct SendEmailRequest {
    to: String,
    subject: String,
    text: Option<String>,
    html: Option<String>,
}

#[derive(Debug, Serialize)]
pub(super) struct EmailSent {
    sent: bool,
    to: String,
}

fn map_mail_error(req_id: &RequestId, error: &MailError) -> ApiError {
    match error {
        MailError::NotConfigured => ApiError::new(
            req_id.0.clone(),
            "service_unavailable",
            "email transport is not configured",
        ),
        MailError::InvalidAddress { .. } => ApiError::bad_request(req_id, error.to_string()),
        MailError::Build(_) | MailError::Smtp(_) => {
            tracing::error!(error = %error, "email delivery failed");
            ApiError::new(req_id.0.clone(), "internal_error", "email delivery failed")
        }
    }
}

async fn deliver(
    state: &AppState,
    req_id: RequestId,
    email: OutgoingEmail,
) -> Result<Json<ApiResponse<EmailSent>>, ApiError> {
    validate_address(&email.to).map_err(|e| map_mail_error(&req_id, &e))?;
    state
        .mailer
        .send(&email)
        .await
        .map_err(|e| map_mail_error(&req_id, &e))?;

    tracing::info!(to = %email.to, subject = %email.subject, "email: sent");
    Ok(Json(ApiResponse::new(
        EmailSent {
            sent: true,
            to: email.to,
        },
        req_id.0,
    )))
}

pub(super) async fn send_email(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    body: Result<Json<SendEmailRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<EmailSent>>, ApiError> {
    let Json(request) = body.map_err(|e| ApiError::bad_request(&req_id, e.body_text()))?;

    if request.subject.trim().is_empty() {
        return Err(ApiError::new(
            req_id.0,
            "validation_error",
            "subject is required",
        ));
    }
    let html = request.html.filter(|h| !h.trim().is_empty());
    let text = request.text.filter(|t| !t.trim().is_empty());
    if text.is_none() && html.is_none() {
        return Err(ApiError::new(
            req_id.0,
            "validation_error",
            "either text or html is required",
        ));
    }

    let email = OutgoingEmail {
        to: request.to.trim().to_string(),
        subject: request.subject,
        text: text.unwrap_or_default(),
        html,
    };
    deliver(&state, req_id, email).await
}

/// Send the self-test message to the configured sender address.
pub(super) async fn send_test_email(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<EmailSent>>, ApiError> {
    let Some(to) = state.mailer.sender_address().map(str::to_owned) else {
        return Err(map_mail_error(&req_id, &MailError::NotConfigured));
    };
    deliver(&state, req_id, templates::test_email(&to, Utc::now())).await
}

pub(super) async fn send_test_email_to(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(email): Path<String>,
) -> Result<Json<ApiResponse<EmailSent>>, ApiError> {
    deliver(&state, req_id, templates::test_email(email.trim(), Utc::now())).await
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use stayease_mail::DisabledMailer;
    use tower::ServiceExt;

    use crate::api::build_app;
    use crate::test_support::{lazy_pool, state_with, RecordingMailer};

    fn send_request(body: &serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/email/nodemailer/send")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .expect("request")
    }

    #[tokio::test]
    async fn send_delivers_through_mailer() {
        let mailer = Arc::new(RecordingMailer::default());
        let app = build_app(state_with(lazy_pool(), mailer.clone()));
        let response = app
            .oneshot(send_request(&serde_json::json!({
                "to": "renter@stayease.test",
                "subject": "Viewing confirmed",
                "text": "See you Saturday.",
            })))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body bytes");
        let json: serde_json::Value = serde_json::from_slice(&body).expect("json parse");
        assert_eq!(json["data"]["sent"], true);
        assert_eq!(mailer.recipients(), vec!["renter@stayease.test".to_string()]);
    }

    #[tokio::test]
    async fn send_rejects_invalid_address() {
        let mailer = Arc::new(RecordingMailer::default());
        let app = build_app(state_with(lazy_pool(), mailer.clone()));
        let response = app
            .oneshot(send_request(&serde_json::json!({
                "to": "not-an-email",
                "subject": "Hello",
                "text": "Hi",
            })))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(mailer.recipients().is_empty());
    }

    #[tokio::test]
    async fn send_requires_a_body() {
        let app = build_app(state_with(lazy_pool(), Arc::new(RecordingMailer::default())));
        let response = app
            .oneshot(send_request(&serde_json::json!({
                "to": "renter@stayease.test",
                "subject": "Hello",
            })))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn disabled_transport_is_service_unavailable() {
        let app = build_app(state_with(lazy_pool(), Arc::new(DisabledMailer)));
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/email/test")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_email_goes_to_sender_address() {
        let mailer = Arc::new(RecordingMailer::default());
        let app = build_app(state_with(lazy_pool(), mailer.clone()));
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/email/test")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(mailer.recipients(), vec!["bookings@stayease.test".to_string()]);
    }

    #[tokio::test]
    async fn test_email_to_path_address() {
        let mailer = Arc::new(RecordingMailer::default());
        let app = build_app(state_with(lazy_pool(), mailer.clone()));
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/email/test-to/owner@stayease.test")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(mailer.recipients(), vec!["owner@stayease.test".to_string()]);
    }
}
