pub mod input;
mod list;
pub mod mode;
pub mod view;
