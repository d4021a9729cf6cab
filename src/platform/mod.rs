//! SDL2 implementations of the rendering, audio and input seams.

mod desktop;
pub use desktop::*;
