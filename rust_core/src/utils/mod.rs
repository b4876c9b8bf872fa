pub mod odds;
pub mod text;
pub mod time;
