/// Application state and router builder
///
/// This module defines the shared application state and provides a
/// function to build the Axum router with all routes and middleware.
///
/// # Example
///
/// ```no_run
/// use taskboard_web::{app::AppState, config::Config};
/// use sqlx::PgPool;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = PgPool::connect(&config.database.url).await?;
/// let state = AppState::new(pool, config);
/// let app = taskboard_web::app::build_router(state);
/// # Ok(())
/// # }
/// ```

use crate::{config::Config, report::ErrorReporter};
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{Redirect, Response},
    routing::{get, post},
    Router,
};
use sqlx::PgPool;
use std::sync::Arc;
use taskboard_shared::auth::session::{self, CurrentUser};
use taskboard_shared::http::cookies::Cookies;
use taskboard_shared::models::user::User;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

/// Shared application state
///
/// This is cloned for each request handler via Axum's `State` extractor.
/// Uses Arc internally for cheap cloning.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,

    /// Application configuration
    pub config: Arc<Config>,

    /// External error reporter
    pub reporter: ErrorReporter,
}

impl AppState {
    /// Creates new application state
    pub fn new(db: PgPool, config: Config) -> Self {
        let reporter = ErrorReporter::new(&config.report);
        Self {
            db,
            config: Arc::new(config),
            reporter,
        }
    }

    /// Gets the session signing secret
    pub fn session_secret(&self) -> &str {
        &self.config.session.secret
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// ```text
/// /
/// ├── GET  /health                 # Health check
/// ├── GET  /                       # Redirect to /tasks
/// ├── /session                     # Login / logout
/// ├── /users                       # Registration and account management
/// ├── /statuses                    # Workflow statuses (reference data)
/// ├── /labels                      # Labels (reference data)
/// └── /tasks                       # Tasks: list (filterable), CRUD
/// ```
///
/// Mutating routes take the POST aliases (`/:id`, `/:id/delete`,
/// `/:id/edit`) alongside PATCH/DELETE, mirroring the method-override
/// workaround HTML forms need.
///
/// # Middleware Stack
///
/// Applied in order (bottom to top):
/// 1. Logging (tower-http TraceLayer)
/// 2. 500-response reporting
/// 3. Session loading (cookie → CurrentUser extension)
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    let session_routes = Router::new()
        .route("/new", get(routes::session::new_form))
        .route("/", post(routes::session::create).delete(routes::session::destroy))
        .route("/delete", post(routes::session::destroy));

    let user_routes = Router::new()
        .route("/", get(routes::users::index).post(routes::users::create))
        .route(
            "/:id",
            post(routes::users::update)
                .patch(routes::users::update)
                .delete(routes::users::destroy),
        )
        .route("/:id/delete", post(routes::users::destroy));

    let status_routes = Router::new()
        .route(
            "/",
            get(routes::statuses::index).post(routes::statuses::create),
        )
        .route(
            "/:id",
            post(routes::statuses::update)
                .patch(routes::statuses::update)
                .delete(routes::statuses::destroy),
        )
        .route("/:id/delete", post(routes::statuses::destroy));

    let label_routes = Router::new()
        .route("/", get(routes::labels::index).post(routes::labels::create))
        .route(
            "/:id",
            post(routes::labels::update)
                .patch(routes::labels::update)
                .delete(routes::labels::destroy),
        )
        .route("/:id/delete", post(routes::labels::destroy));

    let task_routes = Router::new()
        .route("/", get(routes::tasks::index).post(routes::tasks::create))
        .route(
            "/:id",
            get(routes::tasks::show)
                .patch(routes::tasks::update)
                .delete(routes::tasks::destroy),
        )
        .route("/:id/edit", post(routes::tasks::update))
        .route("/:id/delete", post(routes::tasks::destroy));

    Router::new()
        .route("/health", get(routes::health::health_check))
        .route("/", get(root))
        .nest("/session", session_routes)
        .nest("/users", user_routes)
        .nest("/statuses", status_routes)
        .nest("/labels", label_routes)
        .nest("/tasks", task_routes)
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            load_session,
        ))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            report_server_errors,
        ))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .with_state(state)
}

/// Landing route: the task list is the home page
async fn root() -> Redirect {
    Redirect::to("/tasks")
}

/// Session-loading middleware
///
/// Verifies the signed session cookie and, when the referenced user still
/// exists, injects [`CurrentUser`] into request extensions. Anything wrong
/// with the cookie reads as logged-out; a database failure is logged and
/// also reads as logged-out rather than failing the whole request.
async fn load_session(State(state): State<AppState>, mut req: Request, next: Next) -> Response {
    let cookies = Cookies::from_headers(req.headers());

    if let Some(user_id) = session::user_id_from_cookies(&cookies, state.session_secret()) {
        match User::find_by_id(&state.db, user_id).await {
            Ok(Some(user)) => {
                req.extensions_mut().insert(CurrentUser(user));
            }
            Ok(None) => {
                // Stale cookie for a deleted account
            }
            Err(e) => {
                tracing::warn!("Failed to load session user {}: {}", user_id, e);
            }
        }
    }

    next.run(req).await
}

/// 500-reporting middleware
///
/// Forwards server errors to the external reporter after the response is
/// built. The client still gets the generic 500 body.
async fn report_server_errors(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Response {
    let method = req.method().to_string();
    let path = req.uri().path().to_string();

    let response = next.run(req).await;

    if response.status().is_server_error() {
        state
            .reporter
            .report(&method, &path, response.status().as_u16(), "Internal Server Error");
    }

    response
}
