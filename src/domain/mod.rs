pub mod library;
pub mod method;
pub mod pagination;
