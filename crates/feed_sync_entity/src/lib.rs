pub mod custom_type;
pub mod entities;

pub use custom_type::StringVec;
pub use entities::*;
