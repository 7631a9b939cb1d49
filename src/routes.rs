// src/routes.rs

use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method, header},
    middleware,
    routing::{delete, get, post, put},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    handlers::{admin, auth, cbt, chat, diagram, notes, organizer, profile, quiz, session},
    models::topic::ORGANIZER_BODY_LIMIT,
    state::AppState,
    utils::jwt::{admin_middleware, auth_middleware},
};

/// Assembles the main application router.
///
/// * Public: register, login and the syllabus.
/// * Everything else requires a bearer token; `/api/admin` also requires the admin role.
/// * Global middleware: Trace, CORS.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin([
            HeaderValue::from_static("http://localhost:3000"),
            HeaderValue::from_static("http://127.0.0.1:3000"),
            HeaderValue::from_static("http://localhost:5173"),
        ])
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    let require_auth = middleware::from_fn_with_state(state.clone(), auth_middleware);

    let auth_routes = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .merge(
            Router::new()
                .route("/me", get(auth::me))
                .layer(require_auth.clone()),
        );

    let quiz_routes = Router::new()
        .route("/syllabus", get(quiz::get_syllabus))
        .merge(
            Router::new()
                .route("/review", post(quiz::start_review_quiz))
                .route("/exam", post(quiz::start_exam_quiz))
                .layer(require_auth.clone()),
        );

    let cbt_routes = Router::new()
        .route("/start", post(cbt::start_cbt))
        .route("/results", get(cbt::list_my_results))
        .layer(require_auth.clone());

    let session_routes = Router::new()
        .route("/{id}", get(session::get_session).delete(session::abandon))
        .route("/{id}/answers/{position}", put(session::answer))
        .route("/{id}/navigate", post(session::navigate))
        .route("/{id}/submit", post(session::submit))
        .layer(require_auth.clone());

    let note_routes = Router::new()
        .route("/", get(notes::list_notes))
        .route("/{id}", get(notes::get_note))
        .route("/{id}/download", get(notes::download_note))
        .layer(require_auth.clone());

    let chat_routes = Router::new()
        .route(
            "/",
            get(chat::get_history)
                .post(chat::send_message)
                .delete(chat::clear_history),
        )
        .layer(require_auth.clone());

    let organizer_routes = Router::new()
        .route("/categorize", post(organizer::categorize))
        // Photographed question sheets exceed axum's 2 MB default
        .layer(DefaultBodyLimit::max(ORGANIZER_BODY_LIMIT))
        .layer(require_auth.clone());

    let diagram_routes = Router::new()
        .route("/", post(diagram::generate))
        .layer(require_auth.clone());

    let profile_routes = Router::new()
        .route("/", get(profile::get_profile))
        .layer(require_auth.clone());

    let admin_routes = Router::new()
        .route("/users", get(admin::list_users))
        .route("/users/{id}", delete(admin::delete_user))
        .route("/results", get(admin::list_results))
        .route("/notes", post(admin::create_note))
        .route("/notes/{id}", delete(admin::delete_note))
        // Double middleware protection: Auth first, then Admin check
        .layer(middleware::from_fn(admin_middleware))
        .layer(require_auth);

    Router::new()
        .nest("/api/auth", auth_routes)
        .nest("/api/quiz", quiz_routes)
        .nest("/api/cbt", cbt_routes)
        .nest("/api/sessions", session_routes)
        .nest("/api/notes", note_routes)
        .nest("/api/chat", chat_routes)
        .nest("/api/organizer", organizer_routes)
        .nest("/api/diagrams", diagram_routes)
        .nest("/api/profile", profile_routes)
        .nest("/api/admin", admin_routes)
        // Global Middleware (applied from outside in)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
