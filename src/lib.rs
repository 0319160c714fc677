pub mod auth;
pub mod chat;
pub mod children;
pub mod cli;
pub mod config;
pub mod growth;
pub mod notify;
pub mod profile;
pub mod relay;
pub mod reminders;
pub mod remote;
pub mod routing;
pub mod schema;
