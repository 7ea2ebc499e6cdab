#![forbid(unsafe_code)]

pub mod app_services;
pub mod config;
pub mod error;
pub mod problem_service;
pub mod progress_service;

pub use practice_core::Clock;

pub use app_services::AppServices;
pub use config::PracticeConfig;
pub use error::{AppServicesError, ConfigError, ProblemServiceError, ProgressServiceError};
pub use problem_service::{AttemptResult, ProblemService};
pub use progress_service::ProgressService;
