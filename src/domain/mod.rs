pub mod health;
pub mod probe;
