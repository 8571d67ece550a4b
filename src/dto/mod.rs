pub mod antiques;
pub mod auth;
pub mod blog;
pub mod newsletter;
pub mod orders;
pub mod sellers;
pub mod wishlists;
