pub mod chat;
pub mod common;
pub mod image;

pub use chat::*;
pub use common::*;
pub use image::*;
