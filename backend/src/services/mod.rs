//! Business logic services for the Larder restaurant inventory platform

pub mod allocation;
pub mod event;
pub mod execution;
pub mod ingredient;
pub mod recipe;
pub mod restaurant;
pub mod sale;
pub mod stats;
pub mod stock;
pub mod user;
pub mod waste;

pub use allocation::AllocationService;
pub use event::EventService;
pub use execution::ExecutionService;
pub use ingredient::IngredientService;
pub use recipe::RecipeService;
pub use restaurant::RestaurantService;
pub use sale::SaleService;
pub use stats::StatsService;
pub use stock::StockService;
pub use user::UserService;
pub use waste::WasteService;
