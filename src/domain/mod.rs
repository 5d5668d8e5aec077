pub mod entities;
pub mod process;
