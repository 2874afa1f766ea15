//! Vehicle data types and catalog management.
//!
//! - [`attributes`] - Vehicle range, capacity and derived consumption
//! - [`catalog`] - Built-in model list and CSV catalog loading
//!
//! # Example
//!
//! ```
//! use evroute_lib::vehicle::VehicleCatalog;
//!
//! let catalog = VehicleCatalog::builtin();
//! let vehicle = catalog.require("VinFast VF8").unwrap();
//! assert!(vehicle.consumption_kwh_per_km() > 0.0);
//! ```

pub mod attributes;
pub mod catalog;

pub use attributes::Vehicle;
pub use catalog::VehicleCatalog;
