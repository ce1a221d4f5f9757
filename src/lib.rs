pub mod cli;
pub mod config;
pub mod ctx;
pub mod diagnosis;
pub mod eval;
pub mod input;
pub mod io;
pub mod math;
pub mod pipeline;
pub mod schema;
pub mod synthetic;
pub mod taxonomy;
