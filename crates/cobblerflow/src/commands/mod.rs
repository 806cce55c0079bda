pub mod apply;
pub mod list;
pub mod plan;
pub mod validate;
