#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
pub mod solver;
