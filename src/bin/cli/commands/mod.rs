pub mod add;
pub mod config;
pub mod due;
pub mod list;
pub mod practice;
pub mod remove;
pub mod review;
pub mod show;
pub mod stats;
