// Core data models for TaskBuddy

pub mod task;

pub use task::*;
