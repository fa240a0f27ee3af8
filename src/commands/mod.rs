pub mod score;
pub mod status;
