pub mod collision;
pub mod config;
pub mod constants;
pub mod digestion;
pub mod geometry;
pub mod math;
pub mod random;
pub mod sector;
pub mod snake;
pub mod tracker;
pub mod types;
pub mod world;
