use std::fmt;

use thiserror::Error;

/// Convenient result alias for the route planner library.
pub type Result<T> = std::result::Result<T, Error>;

/// Off-network leg that could not be driven on the available range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InfeasibleLeg {
    /// True start coordinate to the snapped first station.
    FirstStation,
    /// Snapped last station to the true destination coordinate.
    Destination,
}

impl fmt::Display for InfeasibleLeg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = match self {
            InfeasibleLeg::FirstStation => "first-station",
            InfeasibleLeg::Destination => "destination",
        };
        f.write_str(value)
    }
}

/// Top-level library error type.
#[derive(Debug, Error)]
pub enum Error {
    /// Latitude outside [-90, 90] or longitude outside [-180, 180].
    #[error("invalid coordinate ({latitude}, {longitude})")]
    InvalidCoordinate { latitude: f64, longitude: f64 },

    /// The station table had no usable station to snap an endpoint onto.
    #[error("no charging station found near the {endpoint} point")]
    NoStationNearby { endpoint: String },

    /// Range is insufficient for one of the off-network legs.
    #[error(
        "insufficient range for the {leg} leg: need {required_km:.1} km, have {available_km:.1} km"
    )]
    Infeasible {
        leg: InfeasibleLeg,
        required_km: f64,
        available_km: f64,
    },

    /// Search timed out or exhausted its frontier without reaching the goal.
    #[error("no feasible path found between {start} and {goal}")]
    NoFeasiblePath { start: String, goal: String },

    /// Raised when a trip request carries out-of-range values.
    #[error("invalid trip request: {message}")]
    InvalidRequest { message: String },

    /// Raised when the planner configuration fails validation.
    #[error("invalid planner configuration: {message}")]
    InvalidConfig { message: String },

    /// Raised when vehicle data fails validation.
    #[error("invalid vehicle data: {message}")]
    VehicleDataValidation { message: String },

    /// Raised when duplicate vehicle names are encountered during catalog load.
    #[error("duplicate vehicle name encountered: {name}")]
    DuplicateVehicleName { name: String },

    /// Raised when a vehicle name could not be found in the catalog.
    #[error("unknown vehicle: {name}{}", format_suggestions(.suggestions))]
    UnknownVehicle {
        name: String,
        suggestions: Vec<String>,
    },

    /// Raised when station data fails validation.
    #[error("invalid station data: {message}")]
    StationDataValidation { message: String },

    /// Raised when two stations share a name.
    #[error("duplicate station name encountered: {name}")]
    DuplicateStationName { name: String },

    /// Wrapper for IO errors.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Wrapper for CSV parsing errors.
    #[error(transparent)]
    Csv(#[from] csv::Error),
}

impl Error {
    /// Missing range for an [`Error::Infeasible`] failure, `None` for every other variant.
    pub fn shortfall_km(&self) -> Option<f64> {
        match self {
            Error::Infeasible {
                required_km,
                available_km,
                ..
            } => Some((required_km - available_km).max(0.0)),
            _ => None,
        }
    }
}

fn format_suggestions(suggestions: &[String]) -> String {
    if suggestions.is_empty() {
        String::new()
    } else if suggestions.len() == 1 {
        format!(". Did you mean '{}'?", suggestions[0])
    } else {
        format!(
            ". Did you mean one of: {}?",
            suggestions
                .iter()
                .map(|s| format!("'{}'", s))
                .collect::<Vec<_>>()
                .join(", ")
        )
    }
}
