pub mod canvas;
pub mod config;
pub mod feedback;
pub mod ink;
pub mod quiz;
pub mod recognition;
pub mod script;
pub mod snapshot;
