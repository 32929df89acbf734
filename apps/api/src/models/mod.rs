pub mod resume;
pub mod screening;
