mod data;
mod management;

pub use data::*;
pub use management::*;
