pub mod api;
#[cfg(feature = "desktop")]
mod commands;
pub mod config;
pub mod creation;
pub mod dashboard;
pub mod geocoding;
pub mod location;
pub mod models;
pub mod search;
pub mod store;
pub mod view;

use tracing_subscriber::{fmt, EnvFilter};

pub use api::{ApiError, EventApi, EventBackend};
pub use config::AppConfig;
pub use creation::{CreationFlow, FormField, Step, ValidationError};
pub use dashboard::{Dashboard, DashboardSnapshot, FetchState, Notification, Severity};
pub use geocoding::{GeocodeError, Geocoder, GeocodingClient};
pub use location::{decode, encode, Coordinates};
pub use models::{Event, EventDraft, EventId, EventPatch, Role};
pub use search::{LocationSearch, SearchOutcome};
pub use store::EventStore;
pub use view::ViewMode;

const DEFAULT_LOG_FILTER: &str = "info,eventra_lib=debug";

/// Installs the global tracing subscriber. Safe to call more than once.
pub fn init_logging() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let _ = fmt().with_env_filter(filter).try_init();
}

#[cfg(feature = "desktop")]
pub use commands::run;
