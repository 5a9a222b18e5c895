pub mod bias;
pub mod health;
