use std::sync::Arc;

use chrono::{Local, NaiveDate};
use tauri::{AppHandle, Manager, State};
use tauri_plugin_opener::OpenerExt;
use tokio::sync::Mutex;
use tracing::info;

use crate::api::{EventApi, EventBackend};
use crate::config::AppConfig;
use crate::creation::{CreationFlow, FormField};
use crate::dashboard::{Dashboard, DashboardSnapshot};
use crate::geocoding::{Geocoder, GeocodingClient};
use crate::location::{self, Coordinates};
use crate::models::{EventId, ReverseGeocodeResult, Role};
use crate::search::{LocationSearch, SearchOutcome};
use crate::view::ViewMode;

pub struct AppState {
    dashboard: Mutex<Dashboard>,
    api: EventApi,
    search: LocationSearch<GeocodingClient>,
}

impl AppState {
    fn from_config(config: &AppConfig) -> Self {
        let geocoder = GeocodingClient::new(
            config.geocoder_base_url.clone(),
            config.geocoder_user_agent.clone(),
        );
        Self {
            dashboard: Mutex::new(Dashboard::new(config.default_view)),
            api: EventApi::new(config.api_base_url.clone()),
            search: LocationSearch::new(Arc::new(geocoder), config.search_debounce()),
        }
    }
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// The lock is released while the listing is in flight.
async fn refresh_dashboard(state: &AppState) -> DashboardSnapshot {
    let ticket = state.dashboard.lock().await.begin_refresh();
    let result = state.api.list_events().await;
    let mut dashboard = state.dashboard.lock().await;
    dashboard.finish_refresh(ticket, result);
    dashboard.snapshot(today())
}

#[tauri::command]
async fn dashboard_snapshot(state: State<'_, AppState>) -> Result<DashboardSnapshot, String> {
    Ok(state.dashboard.lock().await.snapshot(today()))
}

#[tauri::command]
async fn refresh_events(state: State<'_, AppState>) -> Result<DashboardSnapshot, String> {
    Ok(refresh_dashboard(&state).await)
}

#[tauri::command]
async fn set_view_mode(
    mode: ViewMode,
    state: State<'_, AppState>,
) -> Result<DashboardSnapshot, String> {
    let mut dashboard = state.dashboard.lock().await;
    dashboard.set_view_mode(mode);
    Ok(dashboard.snapshot(today()))
}

#[tauri::command]
async fn select_event(event_id: String, state: State<'_, AppState>) -> Result<bool, String> {
    Ok(state
        .dashboard
        .lock()
        .await
        .select_by_id(&EventId::new(event_id)))
}

#[tauri::command]
async fn dismiss_error(state: State<'_, AppState>) -> Result<(), String> {
    state.dashboard.lock().await.dismiss_error();
    Ok(())
}

#[tauri::command]
async fn dismiss_notification(state: State<'_, AppState>) -> Result<(), String> {
    state.dashboard.lock().await.dismiss_notification();
    Ok(())
}

#[tauri::command]
async fn creation_open(state: State<'_, AppState>) -> Result<CreationFlow, String> {
    let mut dashboard = state.dashboard.lock().await;
    dashboard.open_creation();
    Ok(dashboard.creation().clone())
}

#[tauri::command]
async fn creation_close(state: State<'_, AppState>) -> Result<(), String> {
    state.dashboard.lock().await.close_creation();
    state.search.cancel();
    Ok(())
}

#[tauri::command]
async fn creation_update_field(
    field: FormField,
    value: String,
    state: State<'_, AppState>,
) -> Result<CreationFlow, String> {
    let mut dashboard = state.dashboard.lock().await;
    dashboard.creation_mut().set_field(field, value);
    Ok(dashboard.creation().clone())
}

#[tauri::command]
async fn creation_set_role(
    role: Role,
    state: State<'_, AppState>,
) -> Result<CreationFlow, String> {
    let mut dashboard = state.dashboard.lock().await;
    dashboard.creation_mut().set_role(role);
    Ok(dashboard.creation().clone())
}

/// Guard failures are reported inside the returned flow.
#[tauri::command]
async fn creation_next(state: State<'_, AppState>) -> Result<CreationFlow, String> {
    let mut dashboard = state.dashboard.lock().await;
    let _ = dashboard.creation_mut().next();
    Ok(dashboard.creation().clone())
}

#[tauri::command]
async fn creation_back(state: State<'_, AppState>) -> Result<CreationFlow, String> {
    let mut dashboard = state.dashboard.lock().await;
    dashboard.creation_mut().back();
    Ok(dashboard.creation().clone())
}

#[tauri::command]
async fn creation_select_location(
    lat: f64,
    lng: f64,
    name: Option<String>,
    state: State<'_, AppState>,
) -> Result<CreationFlow, String> {
    state.search.cancel();
    let mut dashboard = state.dashboard.lock().await;
    let flow = dashboard.creation_mut();
    if !flow.select_location(Coordinates::new(lat, lng), name) {
        if let Some(message) = flow.error() {
            return Err(message.to_string());
        }
    }
    Ok(dashboard.creation().clone())
}

#[tauri::command]
async fn submit_event(state: State<'_, AppState>) -> Result<DashboardSnapshot, String> {
    let (ticket, draft) = state
        .dashboard
        .lock()
        .await
        .begin_submission()
        .map_err(|err| err.to_string())?;

    let result = state.api.create_event(&draft).await;

    let mut dashboard = state.dashboard.lock().await;
    dashboard.finish_submission(ticket, result);
    Ok(dashboard.snapshot(today()))
}

#[tauri::command]
async fn search_location(
    query: String,
    state: State<'_, AppState>,
) -> Result<SearchOutcome, String> {
    state.search.search(&query).await.map_err(|e| e.to_string())
}

#[tauri::command]
async fn reverse_geocode(
    lat: f64,
    lon: f64,
    state: State<'_, AppState>,
) -> Result<ReverseGeocodeResult, String> {
    state
        .search
        .geocoder()
        .reverse_geocode(lat, lon)
        .await
        .map_err(|e| e.to_string())
}

/// Opens directions in the system's map handler. Events whose location does
/// not decode have nothing to open, so this returns `false`.
#[tauri::command]
async fn navigate_to_event(
    event_id: String,
    app: AppHandle,
    state: State<'_, AppState>,
) -> Result<bool, String> {
    let url = {
        let dashboard = state.dashboard.lock().await;
        dashboard
            .store()
            .find(&EventId::new(event_id))
            .and_then(|event| location::navigation_url(&event.location))
    };
    let Some(url) = url else {
        return Ok(false);
    };
    app.opener()
        .open_url(url, None::<&str>)
        .map_err(|e| e.to_string())?;
    Ok(true)
}

#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    dotenvy::dotenv().ok();
    crate::init_logging();
    let config = AppConfig::from_env().expect("invalid EVENTRA_* configuration");
    info!(api = %config.api_base_url, "starting eventra");

    tauri::Builder::default()
        .manage(AppState::from_config(&config))
        .plugin(tauri_plugin_opener::init())
        .invoke_handler(tauri::generate_handler![
            dashboard_snapshot,
            refresh_events,
            set_view_mode,
            select_event,
            dismiss_error,
            dismiss_notification,
            creation_open,
            creation_close,
            creation_update_field,
            creation_set_role,
            creation_next,
            creation_back,
            creation_select_location,
            submit_event,
            search_location,
            reverse_geocode,
            navigate_to_event
        ])
        .setup(|app| {
            let handle = app.handle().clone();
            tauri::async_runtime::spawn(async move {
                let state = handle.state::<AppState>();
                let snapshot = refresh_dashboard(&state).await;
                info!(state = ?snapshot.fetch_state, "initial load finished");
            });
            Ok(())
        })
        .on_window_event(|window, event| {
            if let tauri::WindowEvent::Destroyed = event {
                let handle = window.app_handle().clone();
                tauri::async_runtime::spawn(async move {
                    let state = handle.state::<AppState>();
                    state.search.cancel();
                    state.dashboard.lock().await.detach();
                    info!("main window destroyed; dropping in-flight results");
                });
            }
        })
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}
