//! HTTP handlers

pub mod admin;
pub mod businesses;
pub mod health;
pub mod slack;

pub use admin::*;
pub use businesses::*;
pub use health::*;
pub use slack::handle_slack_action;
