mod health;
mod packages;

pub use health::*;
pub use packages::*;
