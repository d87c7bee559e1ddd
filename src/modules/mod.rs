pub mod background;
pub mod health;
