use axum::Router;

use crate::state::AppState;

pub mod antiques;
pub mod auth;
pub mod blog;
pub mod doc;
pub mod health;
pub mod newsletter;
pub mod orders;
pub mod params;
pub mod payments;
pub mod sellers;
pub mod wishlists;

// Build the API router without binding state; it is provided at the top level.
pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/antiques", antiques::router())
        .nest("/sellers", sellers::router())
        .nest("/wishlists", wishlists::router())
        .nest("/orders", orders::router())
        .nest("/payments", payments::router())
        .nest("/blog", blog::router())
        .nest("/newsletter", newsletter::router())
}
