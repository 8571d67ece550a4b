use crate::db::{DbPool, OrmConn};
use crate::stripe::StripeClient;

#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub orm: OrmConn,
    pub stripe: StripeClient,
    pub base_url: String,
}
