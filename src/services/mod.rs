pub mod antique_service;
pub mod auth_service;
pub mod blog_service;
pub mod newsletter_service;
pub mod order_service;
pub mod seller_service;
pub mod webhook_service;
pub mod wishlist_service;
