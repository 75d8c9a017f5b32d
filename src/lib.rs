//! dot11_sentry library components
//!
//! The stateful side of the sentry: alert rate limiting, the WEP key table, handshake
//! tracking, the packet chain and the device list the chain commits into. Frame
//! dissection itself lives in `libwifi`.

pub mod alerts;
pub mod auth;
pub mod capture;
pub mod chain;
pub mod config;
pub mod devices;
pub mod keystore;
pub mod session;
pub mod status;

pub use session::{Session, SessionStats};
