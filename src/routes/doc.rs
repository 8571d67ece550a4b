use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        antiques::{AntiqueList, AntiqueWithImages, DailyPicks},
        blog::BlogPostList,
        orders::{CheckoutResult, CheckoutStarted, InvoiceDownload, OrderList, OrderWithItems, PortalStarted},
        wishlists::{WishlistList, WishlistWithAntiques},
    },
    models::{Antique, AntiqueImage, BlogPost, Order, OrderItem, Seller, Subscriber, User, Wishlist},
    response::{ApiResponse, Meta},
    routes::{antiques, auth, blog, health, newsletter, orders, params, payments, sellers, wishlists},
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        auth::login,
        auth::register,
        antiques::list_antiques,
        antiques::daily_picks,
        antiques::get_antique,
        antiques::create_antique,
        antiques::update_antique,
        antiques::delete_antique,
        sellers::upsert_my_profile,
        sellers::get_seller,
        wishlists::list_wishlists,
        wishlists::create_wishlist,
        wishlists::get_wishlist,
        wishlists::delete_wishlist,
        wishlists::add_item,
        wishlists::remove_item,
        orders::list_orders,
        orders::get_order,
        orders::download_invoice,
        payments::start_checkout,
        payments::checkout_result,
        payments::stripe_webhook,
        payments::billing_portal,
        blog::list_posts,
        blog::get_post,
        blog::create_post,
        blog::update_post,
        blog::delete_post,
        newsletter::subscribe,
        newsletter::unsubscribe
    ),
    components(
        schemas(
            User,
            Seller,
            Antique,
            AntiqueImage,
            Wishlist,
            Order,
            OrderItem,
            BlogPost,
            Subscriber,
            AntiqueList,
            AntiqueWithImages,
            DailyPicks,
            WishlistList,
            WishlistWithAntiques,
            OrderList,
            OrderWithItems,
            CheckoutStarted,
            CheckoutResult,
            InvoiceDownload,
            PortalStarted,
            BlogPostList,
            params::Pagination,
            params::AntiqueQuery,
            params::OrderListQuery,
            Meta,
            ApiResponse<Antique>,
            ApiResponse<AntiqueList>,
            ApiResponse<OrderWithItems>,
            ApiResponse<OrderList>,
            ApiResponse<CheckoutStarted>
        )
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Auth", description = "Authentication endpoints"),
        (name = "Antiques", description = "Antique listing endpoints"),
        (name = "Sellers", description = "Seller profile endpoints"),
        (name = "Wishlists", description = "Wishlist endpoints"),
        (name = "Orders", description = "Order endpoints"),
        (name = "Payments", description = "Checkout and Stripe webhook endpoints"),
        (name = "Blog", description = "Blog endpoints"),
        (name = "Newsletter", description = "Newsletter subscription endpoints"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
