pub mod action;
pub mod app;
pub mod client;
pub mod config;
pub mod cron;
pub mod details;
pub mod dispatch;
pub mod domain;
pub mod event;
pub mod theme;
pub mod tui;
pub mod widgets;
pub mod worker;
