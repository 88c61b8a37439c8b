pub mod app;
pub mod config;
pub mod ebo;
pub mod form;
pub mod gateway;
pub mod library;
pub mod runtime;
pub mod shared;
pub mod steps;
pub mod wizard;
