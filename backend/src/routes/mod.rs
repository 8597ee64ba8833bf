//! Route definitions for the Larder restaurant inventory platform

use axum::{
    routing::{get, post},
    Router,
};

use crate::{handlers, AppState};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Ingredient management
        .nest("/ingredients", ingredient_routes())
        // Stock ledger
        .nest("/stocks", stock_routes())
        // Recipe management
        .nest("/recipes", recipe_routes())
        // Allocation and recipe execution
        .nest("/execution", execution_routes())
        // Waste records and the manual expiry sweep
        .nest("/waste", waste_routes())
        // Sales audit reads
        .nest("/sales", sale_routes())
        // Restaurant management
        .nest("/restaurants", restaurant_routes())
        // User management
        .nest("/users", user_routes())
        // Event management
        .nest("/events", event_routes())
        // Dashboard statistics
        .nest("/stats", stats_routes())
}

/// Ingredient management routes
fn ingredient_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_ingredients).post(handlers::create_ingredient),
        )
        .route(
            "/:ingredient_id",
            get(handlers::get_ingredient)
                .put(handlers::update_ingredient)
                .delete(handlers::delete_ingredient),
        )
        .route("/:ingredient_id/quantity", get(handlers::get_total_quantity))
}

/// Stock ledger routes
fn stock_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_stock).post(handlers::create_stock))
        .route(
            "/:stock_id",
            get(handlers::get_stock)
                .put(handlers::update_stock)
                .delete(handlers::delete_stock),
        )
}

/// Recipe management routes
fn recipe_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_recipes).post(handlers::create_recipe),
        )
        .route(
            "/:recipe_id",
            get(handlers::get_recipe)
                .put(handlers::update_recipe)
                .delete(handlers::delete_recipe),
        )
}

/// Allocation and recipe execution routes
fn execution_routes() -> Router<AppState> {
    Router::new()
        .route("/allocate", post(handlers::allocate))
        .route("/processed", post(handlers::execute_processed_recipe))
        .route("/full", post(handlers::execute_full_recipe))
}

/// Waste routes
fn waste_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_waste))
        .route("/sweep", post(handlers::sweep_expired))
        .route("/:waste_id", get(handlers::get_waste))
}

/// Sales audit routes
fn sale_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_sales))
        .route("/:sale_id", get(handlers::get_sale))
}

/// Restaurant management routes
fn restaurant_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_restaurants).post(handlers::create_restaurant),
        )
        .route(
            "/:restaurant_id",
            get(handlers::get_restaurant)
                .put(handlers::update_restaurant)
                .delete(handlers::delete_restaurant),
        )
}

/// User management routes
fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_users).post(handlers::create_user))
        .route(
            "/:user_id",
            get(handlers::get_user)
                .put(handlers::update_user)
                .delete(handlers::delete_user),
        )
}

/// Event management routes
fn event_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_events).post(handlers::create_event))
        .route(
            "/:event_id",
            get(handlers::get_event)
                .put(handlers::update_event)
                .delete(handlers::delete_event),
        )
}

/// Dashboard statistics routes
fn stats_routes() -> Router<AppState> {
    Router::new()
        .route("/stock-counts", get(handlers::get_stock_counts))
        .route("/stock-history", get(handlers::get_stock_history))
}
