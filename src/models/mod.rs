pub mod brief;
pub mod client;
pub mod document;
pub mod enums;

pub use brief::*;
pub use client::*;
pub use document::*;
pub use enums::*;
