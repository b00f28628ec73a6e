pub mod buffer;
pub mod heap;
pub mod page;
pub mod tuple;
