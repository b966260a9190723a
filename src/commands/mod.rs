mod check;
mod render;

pub use check::run_check;
pub use render::run_render;
