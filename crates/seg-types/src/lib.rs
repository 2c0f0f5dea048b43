pub mod category;
pub mod mode;

pub use category::*;
pub use mode::*;
