mod publish;
mod star;

pub use publish::*;
pub use star::*;
