//! Client library for the PVForecast solar irradiance service.
//!
//! This crate defines:
//! - The forecast client (request validation, HTTP call, response parsing)
//! - Typed request options and forecast records
//! - The error taxonomy returned by every call
//! - Configuration & credentials handling
//!
//! It is used by `pvforecast-cli`, but can also be reused by other binaries or services.

pub mod client;
pub mod config;
pub mod error;
pub mod model;
pub mod options;

pub use client::{DEFAULT_BASE_URL, ForecastClient, IrradianceForecaster};
pub use config::{Config, Location};
pub use error::ForecastError;
pub use model::{DailyForecast, DailyForecastData, HourlyForecast, HourlyForecastData};
pub use options::{Dst, ForecastKind, ForecastRequest, Start, ValidatedQuery};
