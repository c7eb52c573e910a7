//! TaskBuddy - a command-line task manager
//!
//! This library provides the core functionality for TaskBuddy, including:
//! - The task model and its status lifecycle
//! - A repository contract with CSV and SQLite backends
//! - The task service holding the business rules
//! - A registry wiring configured backends to the service
//! - Configuration, logging setup and the CLI
//!
//! # Example
//!
//! ```no_run
//! use taskbuddy::config::Config;
//! use taskbuddy::container::RepositoryRegistry;
//!
//! let config = Config::load(None).unwrap();
//! let service = RepositoryRegistry::with_defaults().resolve_service(&config).unwrap();
//! for task in service.get_all_tasks() {
//!     println!("{}", task);
//! }
//! ```

pub mod cli;
pub mod config;
pub mod container;
pub mod db;
pub mod logging;
pub mod models;
pub mod repo;
pub mod service;
