pub mod core;
pub mod geometry;
pub mod io;
pub mod scene;
pub mod utils;
