//! Subscription and contact form endpoints
//!
//! - `POST /subscribe`
//! - `POST /contact`
//!
//! Both answer `{success, message}` whatever the outcome. Submissions are
//! kept in memory up to the configured limits.

use std::collections::HashSet;

use axum::{
    extract::{rejection::JsonRejection, FromRequest, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::post,
    Router,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::RwLock;

use super::AppState;
use crate::config::FormsConfig;

/// Longest accepted email address
pub const MAX_EMAIL_LEN: usize = 254;

/// Body of every form response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormResponse {
    /// Whether the submission was accepted
    pub success: bool,
    /// Human-readable outcome
    pub message: String,
}

impl FormResponse {
    fn ok(message: &str) -> Json<Self> {
        Json(Self {
            success: true,
            message: message.to_string(),
        })
    }
}

/// Form submission failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    #[error("Invalid data")]
    InvalidData,

    #[error("Missing required fields")]
    MissingFields,

    #[error("Invalid email format")]
    InvalidEmail,

    #[error("Message exceeds {0} characters")]
    MessageTooLong(usize),

    #[error("Submission storage is full")]
    StorageFull,
}

impl FormError {
    /// HTTP status for this error
    pub fn status(&self) -> StatusCode {
        match self {
            FormError::StorageFull => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::BAD_REQUEST,
        }
    }
}

impl From<JsonRejection> for FormError {
    fn from(rejection: JsonRejection) -> Self {
        tracing::debug!(reason = %rejection.body_text(), "Form body rejected");
        FormError::InvalidData
    }
}

impl IntoResponse for FormError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::warn!(error = %self, "Form submission refused");
        } else {
            tracing::debug!(error = %self, "Form submission rejected");
        }
        let body = FormResponse {
            success: false,
            message: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

/// JSON body extractor whose rejections use [`FormResponse`]
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(FormError))]
pub struct FormJson<T>(pub T);

/// Normalise an email address for storage and duplicate checks.
///
/// Trims, lowercases and requires `local@domain.tld` with no whitespace.
pub fn normalise_email(raw: &str) -> Result<String, FormError> {
    let email = raw.trim().to_lowercase();
    if email.is_empty() || email.len() > MAX_EMAIL_LEN || email.chars().any(char::is_whitespace)
    {
        return Err(FormError::InvalidEmail);
    }
    let (local, domain) = email.split_once('@').ok_or(FormError::InvalidEmail)?;
    let domain_ok = domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !domain.contains('@');
    if local.is_empty() || !domain_ok {
        return Err(FormError::InvalidEmail);
    }
    Ok(email)
}

/// A stored contact message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactMessage {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub message: String,
}

/// Result of a subscription attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Subscription {
    Added,
    AlreadySubscribed,
}

/// In-memory store for form submissions
#[derive(Debug)]
pub struct FormStore {
    limits: FormsConfig,
    subscriptions: RwLock<HashSet<String>>,
    messages: RwLock<Vec<ContactMessage>>,
}

impl FormStore {
    /// Create an empty store
    pub fn new(limits: FormsConfig) -> Self {
        Self {
            limits,
            subscriptions: RwLock::new(HashSet::new()),
            messages: RwLock::new(Vec::new()),
        }
    }

    /// Add a normalised email unless it is already present.
    pub async fn subscribe(&self, email: String) -> Result<Subscription, FormError> {
        let mut subscriptions = self.subscriptions.write().await;
        if subscriptions.contains(&email) {
            return Ok(Subscription::AlreadySubscribed);
        }
        if subscriptions.len() >= self.limits.max_subscriptions {
            return Err(FormError::StorageFull);
        }
        subscriptions.insert(email);
        Ok(Subscription::Added)
    }

    /// Store a contact message.
    pub async fn record_message(&self, message: ContactMessage) -> Result<(), FormError> {
        let mut messages = self.messages.write().await;
        if messages.len() >= self.limits.max_messages {
            return Err(FormError::StorageFull);
        }
        messages.push(message);
        Ok(())
    }

    /// Number of stored subscriptions
    pub async fn subscription_count(&self) -> usize {
        self.subscriptions.read().await.len()
    }

    /// Number of stored messages
    pub async fn message_count(&self) -> usize {
        self.messages.read().await.len()
    }
}

/// Subscription request
#[derive(Debug, Clone, Deserialize)]
pub struct SubscribeRequest {
    pub email: String,
}

/// Contact form request
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ContactRequest {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub message: String,
}

/// Build the form routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/subscribe", post(subscribe_handler))
        .route("/contact", post(contact_handler))
}

/// POST /subscribe
async fn subscribe_handler(
    State(state): State<AppState>,
    FormJson(request): FormJson<SubscribeRequest>,
) -> Result<Json<FormResponse>, FormError> {
    let email = normalise_email(&request.email)?;

    match state.forms.subscribe(email).await? {
        Subscription::Added => {
            let total = state.forms.subscription_count().await;
            tracing::info!(total, "New subscription");
            Ok(FormResponse::ok("Subscription successful"))
        }
        Subscription::AlreadySubscribed => Ok(FormResponse::ok("Email already subscribed")),
    }
}

/// POST /contact
async fn contact_handler(
    State(state): State<AppState>,
    FormJson(request): FormJson<ContactRequest>,
) -> Result<Json<FormResponse>, FormError> {
    let name = request.name.trim();
    let message = request.message.trim();
    if name.is_empty() || request.email.trim().is_empty() || message.is_empty() {
        return Err(FormError::MissingFields);
    }
    let email = normalise_email(&request.email)?;
    let max_chars = state.config.forms.max_message_chars;
    if message.chars().count() > max_chars {
        return Err(FormError::MessageTooLong(max_chars));
    }

    let phone = request
        .phone
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty());
    state
        .forms
        .record_message(ContactMessage {
            name: name.to_string(),
            email,
            phone,
            message: message.to_string(),
        })
        .await?;
    let total = state.forms.message_count().await;
    tracing::info!(total, "New contact message");

    Ok(FormResponse::ok("Message sent successfully"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ServerConfig;
    use crate::routes::test_support::{body_json, json_post, test_state};
    use axum::body::Body;
    use axum::http::{header, Request};
    use serde_json::json;
    use std::sync::Arc;
    use tower::ServiceExt;

    fn limited_state(forms: FormsConfig) -> AppState {
        let config = ServerConfig {
            forms,
            ..Default::default()
        };
        AppState::new(Arc::new(config)).unwrap()
    }

    #[test]
    fn test_normalise_email() {
        assert_eq!(
            normalise_email("  Jane.Doe@Example.COM ").unwrap(),
            "jane.doe@example.com"
        );
        for bad in [
            "",
            "plain",
            "@example.com",
            "jane@",
            "jane@localhost",
            "jane@.com",
            "jane@example.",
            "ja ne@example.com",
            "a@b@example.com",
        ] {
            assert_eq!(normalise_email(bad), Err(FormError::InvalidEmail), "{bad}");
        }
        let long = format!("{}@example.com", "a".repeat(MAX_EMAIL_LEN));
        assert!(normalise_email(&long).is_err());
    }

    #[tokio::test]
    async fn test_subscribe_then_duplicate() {
        let state = test_state();
        let router = routes().with_state(state.clone());

        let response = router
            .clone()
            .oneshot(json_post("/subscribe", json!({"email": "cfo@example.com"})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["success"], true);
        assert_eq!(json["message"], "Subscription successful");

        let response = router
            .oneshot(json_post("/subscribe", json!({"email": " CFO@Example.com"})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["message"], "Email already subscribed");
        assert_eq!(state.forms.subscription_count().await, 1);
    }

    #[tokio::test]
    async fn test_subscribe_rejects_bad_input() {
        let router = routes().with_state(test_state());

        let response = router
            .clone()
            .oneshot(json_post("/subscribe", json!({"email": "not-an-address"})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert_eq!(json["success"], false);
        assert_eq!(json["message"], "Invalid email format");

        let response = router
            .clone()
            .oneshot(json_post("/subscribe", json!({"name": "no email"})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["message"], "Invalid data");

        let request = Request::builder()
            .method("POST")
            .uri("/subscribe")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{broken"))
            .unwrap();
        let response = router.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["success"], false);
    }

    #[tokio::test]
    async fn test_subscribe_when_full() {
        let state = limited_state(FormsConfig {
            max_subscriptions: 1,
            ..Default::default()
        });
        let router = routes().with_state(state);

        let response = router
            .clone()
            .oneshot(json_post("/subscribe", json!({"email": "a@example.com"})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        // Re-subscribing an existing address still succeeds
        let response = router
            .clone()
            .oneshot(json_post("/subscribe", json!({"email": "a@example.com"})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = router
            .oneshot(json_post("/subscribe", json!({"email": "b@example.com"})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body_json(response).await["success"], false);
    }

    #[tokio::test]
    async fn test_contact_accepts_message() {
        let state = test_state();
        let router = routes().with_state(state.clone());

        let body = json!({
            "name": "Jane Doe",
            "email": "jane@example.com",
            "phone": "  ",
            "message": "Please send the Q2 pack."
        });
        let response = router.oneshot(json_post("/contact", body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        assert_eq!(json["success"], true);
        assert_eq!(json["message"], "Message sent successfully");

        let messages = state.forms.messages.read().await;
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].phone, None);
    }

    #[tokio::test]
    async fn test_contact_validation() {
        let router = routes().with_state(test_state());

        let cases = [
            (
                json!({"email": "jane@example.com", "message": "Hi"}),
                "Missing required fields",
            ),
            (
                json!({"name": "Jane", "email": "jane", "message": "Hi"}),
                "Invalid email format",
            ),
            (
                json!({"name": "Jane", "email": "jane@example.com", "message": "x".repeat(5_001)}),
                "Message exceeds 5000 characters",
            ),
        ];
        for (body, message) in cases {
            let response = router
                .clone()
                .oneshot(json_post("/contact", body))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{message}");
            assert_eq!(body_json(response).await["message"], message);
        }
    }
}
