//! Stakeline - Client-side session controller for a live wager price feed
//!
//! Owns one WebSocket connection to the wager backend, translates its
//! JSON frames into typed events, and maintains the bounded rolling
//! price series and settled balances the presentation layer renders.

pub mod config;
pub mod controller;
pub mod error;
pub mod link;
pub mod protocol;
pub mod services;
pub mod types;

pub use config::Config;
pub use controller::SessionController;
pub use error::{ClientError, Result};
pub use link::SessionLink;
pub use services::{PriceSeries, WalletState};
pub use types::*;
