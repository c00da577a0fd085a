//! Shared harness driving the in-memory application through its pipeline.
//!
//! Callers are resolved the way the HTTP boundary resolves them: from the
//! bearer token issued at registration or login.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use activity_hub::config::IdentitySettings;
use activity_hub::domain::dispatch::Request;
use activity_hub::domain::handlers::{Login, RegisterAccount};
use activity_hub::domain::ports::TokenVerifier;
use activity_hub::domain::{
    ActivityDetails, DispatchError, ErrorCode, LoginCredentials, RequestContext,
    SessionUser,
};
use activity_hub::inbound::http::dispatch_error_body;
use activity_hub::InMemoryApp;
use chrono::{Duration, Utc};
use mockable::DefaultClock;
use tokio::runtime::Runtime;

pub const PASSWORD: &str = "Pa$$w0rd";

fn settings() -> IdentitySettings {
    IdentitySettings {
        token_secret: Some("behaviour-test-secret".to_owned()),
        token_issuer: None,
        token_lifetime_minutes: None,
        password_min_length: None,
        password_require_uppercase: None,
        password_require_lowercase: None,
        password_require_digit: None,
        password_require_non_alphanumeric: None,
    }
}

pub fn email_for(username: &str) -> String {
    format!("{}@example.com", username.to_lowercase())
}

/// One application instance plus the sessions issued so far.
#[derive(Clone)]
pub struct Hub {
    runtime: Arc<Runtime>,
    app: Arc<InMemoryApp>,
    sessions: Arc<Mutex<HashMap<String, SessionUser>>>,
}

impl Hub {
    pub fn new() -> Self {
        let app =
            InMemoryApp::from_settings(&settings(), "https://img.test", Arc::new(DefaultClock))
                .expect("application builds");
        Self {
            runtime: Arc::new(Runtime::new().expect("create runtime")),
            app: Arc::new(app),
            sessions: Arc::default(),
        }
    }

    pub fn app(&self) -> &InMemoryApp {
        &self.app
    }

    /// Context for `username`, resolved from the token they were issued.
    pub fn context(&self, username: &str) -> RequestContext {
        let session = self
            .sessions
            .lock()
            .expect("sessions lock")
            .get(username)
            .cloned()
            .unwrap_or_else(|| panic!("{username} has no session"));
        let verified = self
            .app
            .tokens
            .verify(session.token.as_str())
            .expect("issued token verifies");
        RequestContext::for_user(verified)
    }

    pub fn send<R: Request>(
        &self,
        context: &RequestContext,
        request: R,
    ) -> Result<R::Response, DispatchError> {
        self.runtime
            .block_on(self.app.pipeline.send(context, request))
    }

    pub fn send_as<R: Request>(
        &self,
        username: &str,
        request: R,
    ) -> Result<R::Response, DispatchError> {
        let context = self.context(username);
        self.send(&context, request)
    }

    fn remember(&self, session: &SessionUser) {
        self.sessions
            .lock()
            .expect("sessions lock")
            .insert(session.username.clone(), session.clone());
    }

    pub fn register_with(&self, username: &str, email: &str) -> Result<SessionUser, DispatchError> {
        let request = RegisterAccount::try_from_parts(
            username,
            username,
            email,
            PASSWORD,
            &self.app.password_policy,
        )?;
        let session = self.send(&RequestContext::anonymous(), request)?;
        self.remember(&session);
        Ok(session)
    }

    pub fn register(&self, username: &str) -> SessionUser {
        self.register_with(username, &email_for(username))
            .expect("registration succeeds")
    }

    pub fn login(&self, username: &str, password: &str) -> Result<SessionUser, DispatchError> {
        let credentials = LoginCredentials::try_from_parts(&email_for(username), password)?;
        let session = self.send(&RequestContext::anonymous(), Login { credentials })?;
        self.remember(&session);
        Ok(session)
    }
}

pub fn upcoming_details(title: &str) -> ActivityDetails {
    ActivityDetails::try_new(
        title,
        "Bring snacks",
        "games",
        Utc::now() + Duration::days(7),
        "Bristol",
        "Cafe Kino",
    )
    .expect("valid details")
}

/// Code a dispatch failure carries once rendered for a client.
pub fn error_code(error: &DispatchError) -> ErrorCode {
    dispatch_error_body(error).code()
}

pub fn parse_code(name: &str) -> ErrorCode {
    match name {
        "invalid request" => ErrorCode::InvalidRequest,
        "unauthorized" => ErrorCode::Unauthorized,
        "forbidden" => ErrorCode::Forbidden,
        "not found" => ErrorCode::NotFound,
        "conflict" => ErrorCode::Conflict,
        "internal error" => ErrorCode::InternalError,
        other => panic!("unknown error code {other}"),
    }
}
