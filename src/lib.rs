pub mod canvas;
pub mod config;
pub mod history;
pub mod logging;
pub mod output;
pub mod repl;
pub mod service;
pub mod session;
pub mod shape;
pub mod svg;
pub mod transform;
