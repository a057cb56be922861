pub mod ai;
pub mod combat;
pub mod entity;
pub mod physics;
pub mod quest;
pub mod rng;
pub mod tile;
