pub mod antique_images;
pub mod antiques;
pub mod audit_logs;
pub mod blog_posts;
pub mod daily_pick_items;
pub mod daily_picks;
pub mod order_items;
pub mod orders;
pub mod processed_stripe_events;
pub mod sellers;
pub mod subscribers;
pub mod users;
pub mod wishlist_items;
pub mod wishlists;

pub use antique_images::Entity as AntiqueImages;
pub use antiques::Entity as Antiques;
pub use audit_logs::Entity as AuditLogs;
pub use blog_posts::Entity as BlogPosts;
pub use daily_pick_items::Entity as DailyPickItems;
pub use daily_picks::Entity as DailyPicks;
pub use order_items::Entity as OrderItems;
pub use orders::Entity as Orders;
pub use processed_stripe_events::Entity as ProcessedStripeEvents;
pub use sellers::Entity as Sellers;
pub use subscribers::Entity as Subscribers;
pub use users::Entity as Users;
pub use wishlist_items::Entity as WishlistItems;
pub use wishlists::Entity as Wishlists;
