pub mod catalog;
pub mod config;
pub mod engine;
pub mod error;
pub mod events;
pub mod lock;
pub mod models;
pub mod output;
pub mod state;

pub use engine::simulate;
