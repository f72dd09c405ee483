pub mod history;
pub mod product;
pub(crate) mod timestamp;

pub use history::*;
pub use product::*;
