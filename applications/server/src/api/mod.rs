/// API route modules
pub mod change_requests;
pub mod collaborators;
pub mod health;
pub mod playlists;
pub mod smart_playlists;

use crate::{middleware, state::AppState};
use axum::{
    middleware as axum_middleware,
    routing::{get, patch, post},
    Router,
};
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, TraceLayer},
};

/// Build the HTTP router with every route under `/api`
pub fn create_router(app_state: AppState) -> Router {
    let auth_service = Arc::clone(&app_state.auth_service);

    // Public routes (token optional)
    let public_routes = Router::new()
        .route("/health", get(health::health))
        .route("/playlists/public", get(playlists::list_public_playlists))
        .route("/playlists/user/:user_id", get(playlists::list_user_playlists))
        .route("/playlists/:id", get(playlists::get_playlist))
        .route("/playlists/:id/activities", get(playlists::list_activities))
        .layer(axum_middleware::from_fn_with_state(
            Arc::clone(&auth_service),
            middleware::optional_auth_middleware,
        ));

    // Protected routes (auth required)
    let protected_routes = Router::new()
        // Playlists
        .route(
            "/playlists",
            get(playlists::list_playlists).post(playlists::create_playlist),
        )
        .route(
            "/playlists/:id",
            patch(playlists::update_playlist).delete(playlists::delete_playlist),
        )
        .route("/playlists/:id/tracks", post(playlists::add_track))
        .route(
            "/playlists/:id/tracks/reorder",
            patch(playlists::reorder_tracks),
        )
        .route(
            "/playlists/:id/tracks/:track_id",
            axum::routing::delete(playlists::remove_track),
        )
        .route("/playlists/:id/duplicate", post(playlists::duplicate_playlist))
        .route("/playlists/:id/share", post(playlists::share_playlist))
        // Smart playlists
        .route("/playlists/smart", post(smart_playlists::create_smart_playlist))
        .route("/playlists/smart/preview", post(smart_playlists::preview))
        .route("/playlists/smart/refresh", post(smart_playlists::refresh_all))
        // Collaborators
        .route(
            "/playlists/:id/collaborators",
            get(collaborators::list_collaborators).post(collaborators::invite_collaborator),
        )
        .route(
            "/playlists/:id/collaborators/:cid",
            patch(collaborators::update_role).delete(collaborators::remove_collaborator),
        )
        .route(
            "/playlists/:id/collaborators/:cid/accept",
            post(collaborators::accept_invite),
        )
        .route(
            "/playlists/:id/collaborators/:cid/reject",
            post(collaborators::reject_invite),
        )
        // Change requests
        .route(
            "/playlists/:id/change-requests",
            get(change_requests::list_change_requests),
        )
        .route(
            "/playlists/:id/change-requests/:rid/approve",
            post(change_requests::approve_change_request),
        )
        .route(
            "/playlists/:id/change-requests/:rid/reject",
            post(change_requests::reject_change_request),
        )
        .layer(axum_middleware::from_fn_with_state(
            auth_service,
            middleware::auth_middleware,
        ));

    Router::new()
        .nest("/api", public_routes.merge(protected_routes))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::default().include_headers(true)),
        )
        .layer(CorsLayer::permissive())
        .with_state(app_state)
}
