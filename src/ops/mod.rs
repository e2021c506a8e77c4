pub mod sort;
pub mod store;
pub mod sync;
