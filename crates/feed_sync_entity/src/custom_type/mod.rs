mod string_vec;

pub use string_vec::StringVec;
