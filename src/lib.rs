pub mod cache;
pub mod descriptor;
pub mod model;
pub mod package;
pub mod probe;
pub mod runtime;
pub mod setup;
