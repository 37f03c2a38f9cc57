//! Passport card rendering.

mod card_renderer;
mod palette;

pub use card_renderer::{CardRenderer, MAX_SCALE};
