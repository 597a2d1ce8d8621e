pub mod spot;
pub mod user;
