//! TagDeck TUI library exports.

pub mod api_client;
pub mod config;
pub mod controller;
pub mod error;
pub mod events;
pub mod form;
pub mod keys;
pub mod notifications;
pub mod persistence;
pub mod selection;
pub mod state;
pub mod tasks;
pub mod telemetry;
pub mod theme;
pub mod views;
pub mod widgets;
