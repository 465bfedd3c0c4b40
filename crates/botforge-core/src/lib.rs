pub mod action;
pub mod catalog;
pub mod codegen;
pub mod command;
pub mod config;
pub mod error;
pub mod group;
pub mod ident;
pub mod io;
pub mod paths;
pub mod project;
pub mod resolver;
pub mod state;
pub mod step;
pub mod subsystem;
pub mod types;
pub mod validate;

pub use error::{CoreError, Result};
