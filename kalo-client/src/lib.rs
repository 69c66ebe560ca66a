pub mod api_client;
pub mod availability;
pub mod calorie;
pub mod error;
pub mod mock;
pub mod refresh;
pub mod session;
pub mod settings;
pub mod token;
pub mod utils;
