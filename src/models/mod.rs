pub mod blend;
pub mod gemini;
pub mod image;
pub mod request;

pub use blend::*;
pub use gemini::*;
pub use image::*;
pub use request::*;
