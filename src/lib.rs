//! SugarBounce token / BuyCredit relay tooling library.

pub mod config;
pub mod blockchain;
pub mod typed_data;
pub mod flows;
pub mod observability;

pub use config::schema::AppConfig;
pub use flows::Session;
