//! Raw store rows.
//!
//! These types mirror the columns of the network tables. List-valued
//! columns (`location_list`, `used_routes`, `routes_affected`) are stored
//! as JSON-encoded text, so each is decoded exactly once here and never
//! seen as a string past this module.

use chrono::{DateTime, NaiveDateTime, NaiveTime, Utc};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::warn;

use crate::domain::{
    Alert, AlertId, Coordinate, DomainError, Location, LocationId, LocationKind, OperatingHours,
    Route, RouteAssignment, RouteId, StopEntry, Vehicle, VehicleId,
};

/// A whole network export: one array per table.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub locations: Vec<LocationRow>,
    #[serde(default)]
    pub routes: Vec<RouteRow>,
    #[serde(default)]
    pub vehicles: Vec<VehicleRow>,
    #[serde(default)]
    pub alerts: Vec<AlertRow>,
}

/// A list column that is either JSON-encoded text or already a JSON array.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Encoded<T> {
    Text(String),
    Inline(T),
}

impl<T: DeserializeOwned> Encoded<T> {
    pub fn decode(self) -> Result<T, serde_json::Error> {
        match self {
            Encoded::Text(text) => serde_json::from_str(&text),
            Encoded::Inline(value) => Ok(value),
        }
    }
}

/// Decode an optional list column, logging and emptying it when malformed.
fn decode_list<T: DeserializeOwned>(
    column: Option<Encoded<Vec<T>>>,
    table: &'static str,
    field: &'static str,
    row_id: u32,
) -> Vec<T> {
    match column.map(Encoded::decode) {
        None => Vec::new(),
        Some(Ok(items)) => items,
        Some(Err(e)) => {
            warn!(table, field, row_id, error = %e, "malformed list column, treating as empty");
            Vec::new()
        }
    }
}

fn default_status() -> String {
    "approved".to_string()
}

fn is_approved(status: &str) -> bool {
    status.eq_ignore_ascii_case("approved")
}

/// Row of the `locations` table.
#[derive(Debug, Clone, Deserialize)]
pub struct LocationRow {
    pub location_id: u32,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(rename = "type", default)]
    pub kind: Option<LocationKind>,
    #[serde(default = "default_status")]
    pub status: String,
}

impl LocationRow {
    pub fn is_approved(&self) -> bool {
        is_approved(&self.status)
    }

    pub fn into_domain(self) -> Result<Location, DomainError> {
        let id = LocationId::new(self.location_id)?;
        let coord = Coordinate::new(self.latitude, self.longitude)?;
        Ok(Location::new(
            id,
            self.name,
            coord,
            self.kind.unwrap_or(LocationKind::Stop),
        ))
    }
}

/// One element of a route's `location_list`.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct StopEntryRow {
    #[serde(default)]
    pub index: i64,
    pub location_id: u32,
}

/// Row of the `routes` table.
#[derive(Debug, Clone, Deserialize)]
pub struct RouteRow {
    pub route_id: u32,
    pub name: String,
    #[serde(default)]
    pub location_list: Option<Encoded<Vec<StopEntryRow>>>,
    #[serde(default = "default_status")]
    pub status: String,
}

impl RouteRow {
    pub fn is_approved(&self) -> bool {
        is_approved(&self.status)
    }

    pub fn into_domain(self) -> Result<Route, DomainError> {
        let id = RouteId::new(self.route_id)?;
        let stops = decode_list(self.location_list, "routes", "location_list", self.route_id)
            .into_iter()
            .filter_map(|entry| match LocationId::new(entry.location_id) {
                Ok(location) => Some(StopEntry {
                    index: entry.index,
                    location,
                }),
                Err(_) => {
                    warn!(route_id = self.route_id, "dropping stop entry with zero location id");
                    None
                }
            })
            .collect();
        Ok(Route::new(id, self.name, stops))
    }
}

fn default_count() -> u32 {
    1
}

/// One element of a vehicle's `used_routes`.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct UsedRouteRow {
    pub route_id: u32,
    #[serde(default = "default_count")]
    pub count: u32,
}

/// Row of the `vehicles` table.
#[derive(Debug, Clone, Deserialize)]
pub struct VehicleRow {
    pub vehicle_id: u32,
    pub name: String,
    #[serde(default)]
    pub image_path: Option<String>,
    #[serde(default)]
    pub starts_at: Option<String>,
    #[serde(default)]
    pub stops_at: Option<String>,
    #[serde(default)]
    pub used_routes: Option<Encoded<Vec<UsedRouteRow>>>,
    #[serde(default = "default_status")]
    pub status: String,
}

impl VehicleRow {
    pub fn is_approved(&self) -> bool {
        is_approved(&self.status)
    }

    pub fn into_domain(self) -> Result<Vehicle, DomainError> {
        let id = VehicleId::new(self.vehicle_id)?;

        let operating_hours = match (
            self.starts_at.as_deref().and_then(parse_time),
            self.stops_at.as_deref().and_then(parse_time),
        ) {
            (Some(starts_at), Some(stops_at)) => Some(OperatingHours { starts_at, stops_at }),
            _ => None,
        };

        let assignments = decode_list(self.used_routes, "vehicles", "used_routes", self.vehicle_id)
            .into_iter()
            .filter_map(|used| {
                RouteId::new(used.route_id).ok().map(|route| RouteAssignment {
                    route,
                    count: used.count,
                })
            })
            .collect();

        Ok(Vehicle {
            id,
            name: self.name,
            image_path: self.image_path.filter(|p| !p.is_empty()),
            operating_hours,
            assignments,
        })
    }
}

/// Row of the `alerts` table.
#[derive(Debug, Clone, Deserialize)]
pub struct AlertRow {
    pub alert_id: u32,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub routes_affected: Option<Encoded<Vec<u32>>>,
    #[serde(default)]
    pub expires_at: Option<String>,
}

impl AlertRow {
    pub fn into_domain(self) -> Result<Alert, DomainError> {
        let id = AlertId::new(self.alert_id)?;

        let affected_routes = decode_list(self.routes_affected, "alerts", "routes_affected", self.alert_id)
            .into_iter()
            .filter_map(|raw| RouteId::new(raw).ok())
            .collect();

        let expires_at = match self.expires_at.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => {
                let parsed = parse_timestamp(raw);
                if parsed.is_none() {
                    warn!(alert_id = self.alert_id, expires_at = raw, "unparseable expiry, alert kept active");
                }
                parsed
            }
        };

        Ok(Alert {
            id,
            name: self.name,
            description: self.description.filter(|d| !d.is_empty()),
            affected_routes,
            expires_at,
        })
    }
}

/// Parse a wall-clock time as `HH:MM:SS` or `HH:MM`.
fn parse_time(s: &str) -> Option<NaiveTime> {
    let s = s.trim();
    NaiveTime::parse_from_str(s, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M"))
        .ok()
}

/// Parse an RFC 3339 timestamp, or a zone-less `YYYY-MM-DD HH:MM:SS` taken as UTC.
fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
        .ok()
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn location_list_as_encoded_text() {
        let row: RouteRow = serde_json::from_str(
            r#"{"route_id": 4, "name": "Ring Road",
                "location_list": "[{\"index\":1,\"location_id\":20},{\"index\":0,\"location_id\":10}]",
                "status": "approved"}"#,
        )
        .unwrap();

        let route = row.into_domain().unwrap();
        assert_eq!(
            route.ordered_stops(),
            vec![LocationId::new(10).unwrap(), LocationId::new(20).unwrap()]
        );
    }

    #[test]
    fn location_list_inline() {
        let row: RouteRow = serde_json::from_str(
            r#"{"route_id": 4, "name": "Ring Road",
                "location_list": [{"index": 0, "location_id": 10}, {"location_id": 0}]}"#,
        )
        .unwrap();

        let route = row.into_domain().unwrap();
        assert_eq!(route.stops.len(), 1);
    }

    #[test]
    fn malformed_location_list_is_empty() {
        let row: RouteRow = serde_json::from_str(
            r#"{"route_id": 4, "name": "Ring Road", "location_list": "not json"}"#,
        )
        .unwrap();

        assert!(row.into_domain().unwrap().stops.is_empty());
    }

    #[test]
    fn status_defaults_to_approved() {
        let row: LocationRow = serde_json::from_str(
            r#"{"location_id": 1, "name": "Ratnapark", "latitude": 27.7041, "longitude": 85.3145}"#,
        )
        .unwrap();
        assert!(row.is_approved());
        assert_eq!(row.into_domain().unwrap().kind, LocationKind::Stop);

        let row: LocationRow = serde_json::from_str(
            r#"{"location_id": 1, "name": "Ratnapark", "latitude": 27.7, "longitude": 85.3,
                "type": "landmark", "status": "pending"}"#,
        )
        .unwrap();
        assert!(!row.is_approved());
    }

    #[test]
    fn location_out_of_range_is_error() {
        let row: LocationRow = serde_json::from_str(
            r#"{"location_id": 1, "name": "Nowhere", "latitude": 127.0, "longitude": 85.3}"#,
        )
        .unwrap();
        assert!(matches!(row.into_domain(), Err(DomainError::InvalidCoordinate(_))));
    }

    #[test]
    fn vehicle_used_routes_count_defaults_to_one() {
        let row: VehicleRow = serde_json::from_str(
            r#"{"vehicle_id": 2, "name": "Mahanagar Yatayat", "image_path": "",
                "starts_at": "06:00", "stops_at": "20:30:00",
                "used_routes": "[{\"route_id\":1,\"count\":6},{\"route_id\":3}]"}"#,
        )
        .unwrap();

        let vehicle = row.into_domain().unwrap();
        assert_eq!(vehicle.image_path, None);
        assert_eq!(vehicle.count_on(RouteId::new(1).unwrap()), 6);
        assert_eq!(vehicle.count_on(RouteId::new(3).unwrap()), 1);

        let hours = vehicle.operating_hours.unwrap();
        assert_eq!(hours.starts_at, NaiveTime::from_hms_opt(6, 0, 0).unwrap());
        assert_eq!(hours.stops_at, NaiveTime::from_hms_opt(20, 30, 0).unwrap());
    }

    #[test]
    fn alert_expiry_formats() {
        let row: AlertRow = serde_json::from_str(
            r#"{"alert_id": 1, "name": "Road works", "routes_affected": "[3,5,9]",
                "expires_at": "2026-12-01 10:00:00"}"#,
        )
        .unwrap();
        let alert = row.into_domain().unwrap();
        assert_eq!(alert.affected_routes.len(), 3);
        assert_eq!(
            alert.expires_at,
            Some(Utc.with_ymd_and_hms(2026, 12, 1, 10, 0, 0).unwrap())
        );

        let row: AlertRow = serde_json::from_str(
            r#"{"alert_id": 1, "name": "Strike", "expires_at": "2026-12-01T10:00:00+05:45"}"#,
        )
        .unwrap();
        assert_eq!(
            row.into_domain().unwrap().expires_at,
            Some(Utc.with_ymd_and_hms(2026, 12, 1, 4, 15, 0).unwrap())
        );
    }

    #[test]
    fn alert_without_expiry() {
        let row: AlertRow = serde_json::from_str(
            r#"{"alert_id": 1, "name": "Strike", "expires_at": null, "routes_affected": [1]}"#,
        )
        .unwrap();
        let alert = row.into_domain().unwrap();
        assert_eq!(alert.expires_at, None);
        assert_eq!(alert.affected_routes, vec![RouteId::new(1).unwrap()]);
    }
}
