pub mod commentary;
pub mod config;
pub mod error;
pub mod games;
pub mod high_score;
pub mod logger;
