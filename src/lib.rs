pub mod config;
pub mod db;
pub mod error;
pub mod extract;
mod gateway;
pub mod i18n;
pub mod metrics;
pub mod pipeline;
pub mod retry;
pub mod summarizer;
pub mod translation;
pub mod web;
