use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    http::{Method, Request, Response},
    Router,
};
use rust_decimal_macros::dec;
use serde_json::Value;
use tokio::sync::mpsc;
use tower::ServiceExt;

use dairychain_api::{
    auth::{AuthConfig, AuthService},
    config::AppConfig,
    db,
    entities::{collection_point, diary_shop, production_site, transporter, user},
    events::{self, EventSender},
    handlers::AppServices,
    models::Role,
    notifications::{Mailer, Notifier, SmsClient},
    services::registry::{NewCollectionPoint, NewSite, NewTransporter},
    services::users::NewUser,
    AppState,
};

/// Test harness: the full application router over an in-memory SQLite
/// database, with one management and one diary account seeded.
pub struct TestApp {
    router: Router,
    pub state: AppState,
    pub management_token: String,
    pub diary_token: String,
    pub diary_user: user::Model,
    _event_task: tokio::task::JoinHandle<()>,
}

impl TestApp {
    pub async fn new() -> Self {
        let cfg = AppConfig::for_tests("sqlite::memory:".to_string());

        let pool = db::establish_connection(&cfg)
            .await
            .expect("failed to create test database");
        db::run_migrations(&pool)
            .await
            .expect("failed to run migrations in tests");
        let db_arc = Arc::new(pool);

        let (event_tx, event_rx) = mpsc::channel(64);
        let event_sender = EventSender::new(event_tx);

        // Disabled clients: notifications are logged, never sent.
        let notifier = Arc::new(Notifier::new(
            SmsClient::new(cfg.sms.clone()),
            Mailer::new(cfg.mail.clone()).expect("mailer"),
        ));
        let event_task = tokio::spawn(events::process_events(event_rx, notifier));

        let auth_service = Arc::new(AuthService::new(AuthConfig::new(
            cfg.jwt_secret.clone(),
            cfg.auth_issuer.clone(),
            cfg.auth_audience.clone(),
            Duration::from_secs(cfg.jwt_expiration),
        )));

        let services = AppServices::new(db_arc.clone(), event_sender.clone(), auth_service.clone());

        let state = AppState {
            db: db_arc,
            config: cfg,
            event_sender,
            auth: auth_service.clone(),
            services,
        };

        let manager = state
            .services
            .users
            .create_user(NewUser {
                name: "Test Manager".to_string(),
                phone: "+250788000100".to_string(),
                email: Some("manager@test.local".to_string()),
                password: "management-pass".to_string(),
                role: Role::Management,
                site_id: None,
            })
            .await
            .expect("seed manager");
        let diary_user = state
            .services
            .users
            .create_user(NewUser {
                name: "Diary Operator".to_string(),
                phone: "+250788000101".to_string(),
                email: None,
                password: "diary-pass-123".to_string(),
                role: Role::Diary,
                site_id: None,
            })
            .await
            .expect("seed diary user");

        let management_token = auth_service
            .generate_token(&manager)
            .expect("manager token")
            .access_token;
        let diary_token = auth_service
            .generate_token(&diary_user)
            .expect("diary token")
            .access_token;

        let router = Router::new()
            .merge(dairychain_api::handlers::health::health_routes())
            .nest("/api/v1", dairychain_api::api_v1_routes())
            .layer(axum::middleware::from_fn_with_state(
                auth_service,
                |axum::extract::State(auth): axum::extract::State<Arc<AuthService>>,
                 mut req: axum::http::Request<Body>,
                 next: axum::middleware::Next| async move {
                    req.extensions_mut().insert(auth);
                    next.run(req).await
                },
            ))
            .with_state(state.clone());

        Self {
            router,
            state,
            management_token,
            diary_token,
            diary_user,
            _event_task: event_task,
        }
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> Response<Body> {
        self.send(method, uri, body, None).await
    }

    pub async fn request_as(
        &self,
        token: &str,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> Response<Body> {
        self.send(method, uri, body, Some(token)).await
    }

    /// Request authenticated as the seeded management account.
    pub async fn request_authenticated(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> Response<Body> {
        let token = self.management_token.clone();
        self.send(method, uri, body, Some(&token)).await
    }

    async fn send(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> Response<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {}", token));
        }

        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(serde_json::to_vec(&json).unwrap()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("request should not fail at the transport level")
    }

    // --- seed helpers ---

    pub async fn seed_transporter(&self, name: &str, phone: &str) -> transporter::Model {
        self.state
            .services
            .registry
            .create_transporter(NewTransporter {
                name: name.to_string(),
                phone: phone.to_string(),
                plate_number: Some("RAD 001 A".to_string()),
                capacity_liters: dec!(1000),
            })
            .await
            .expect("seed transporter")
    }

    pub async fn seed_collection_point(&self, name: &str) -> collection_point::Model {
        self.state
            .services
            .registry
            .create_collection_point(NewCollectionPoint {
                name: name.to_string(),
                district: "Nyagatare".to_string(),
                sector: None,
                contact_phone: "+250788000200".to_string(),
            })
            .await
            .expect("seed collection point")
    }

    pub async fn seed_diary_shop(&self, name: &str) -> diary_shop::Model {
        self.state
            .services
            .registry
            .create_diary_shop(NewSite {
                name: name.to_string(),
                location: "Kigali".to_string(),
                contact_phone: "+250788000300".to_string(),
            })
            .await
            .expect("seed diary shop")
    }

    pub async fn seed_production_site(&self, name: &str) -> production_site::Model {
        self.state
            .services
            .registry
            .create_production_site(NewSite {
                name: name.to_string(),
                location: "Musanze".to_string(),
                contact_phone: "+250788000400".to_string(),
            })
            .await
            .expect("seed production site")
    }
}

/// Reads a response body as JSON.
pub async fn read_json(response: Response<Body>) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read response body");
    serde_json::from_slice(&bytes).expect("parse response body")
}
