pub mod door;
pub mod event;
pub mod level;
pub mod progress;
pub mod save;
pub mod screen;
pub mod step;
pub mod transition;
pub mod world;
