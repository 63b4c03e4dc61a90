//! OSRM HTTP client.
//!
//! Talks to the OSRM route service: one request per origin/destination
//! pair, GeoJSON geometry, no retries. The request timeout is the only
//! bound on how long a provider call may take.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use tracing::debug;

use crate::domain::Coordinate;

use super::error::RoutingError;
use super::types::OsrmResponse;
use super::{Profile, RoutedPath, RoutingProvider};

/// Default base URL: the public OSRM demo server.
const DEFAULT_BASE_URL: &str = "https://router.project-osrm.org";

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 5;

/// Configuration for the OSRM client.
#[derive(Debug, Clone)]
pub struct OsrmConfig {
    /// Base URL of the OSRM server
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// User-Agent header sent with every request
    pub user_agent: String,
}

impl OsrmConfig {
    /// Create a config pointing at the public demo server.
    pub fn new() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            user_agent: concat!("transit-server/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }

    /// Set a custom base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Set the User-Agent header.
    pub fn with_user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = agent.into();
        self
    }
}

impl Default for OsrmConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// OSRM route service client.
#[derive(Debug, Clone)]
pub struct OsrmClient {
    http: reqwest::Client,
    base_url: String,
}

impl OsrmClient {
    /// Create a new client with the given configuration.
    pub fn new(config: OsrmConfig) -> Result<Self, RoutingError> {
        let mut headers = HeaderMap::new();
        let agent = HeaderValue::from_str(&config.user_agent).map_err(|_| RoutingError::ApiError {
            status: 0,
            message: "invalid User-Agent header".to_string(),
        })?;
        headers.insert(USER_AGENT, agent);

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// URL of the route request between two points.
    ///
    /// OSRM takes positions as `lng,lat`.
    pub fn route_url(&self, profile: Profile, from: Coordinate, to: Coordinate) -> String {
        let mut url = format!(
            "{}/route/v1/{}/{},{};{},{}?overview=full&geometries=geojson",
            self.base_url,
            profile.as_str(),
            from.lng,
            from.lat,
            to.lng,
            to.lat
        );
        if profile == Profile::Driving {
            url.push_str("&continue_straight=true");
        }
        url
    }
}

impl RoutingProvider for OsrmClient {
    async fn route(
        &self,
        profile: Profile,
        from: Coordinate,
        to: Coordinate,
    ) -> Result<RoutedPath, RoutingError> {
        let url = self.route_url(profile, from, to);
        debug!(%url, "requesting route");

        let response = self.http.get(&url).send().await?;
        let status = response.status();
        let body = response.text().await?;

        let parsed: Result<OsrmResponse, _> = serde_json::from_str(&body);

        if !status.is_success() {
            // OSRM reports routing failures as 400 with a JSON error code
            return match parsed {
                Ok(osrm) if osrm.code != "Ok" => Err(RoutingError::NoRoute { code: osrm.code }),
                _ => Err(RoutingError::ApiError {
                    status: status.as_u16(),
                    message: body.chars().take(200).collect(),
                }),
            };
        }

        let osrm = parsed.map_err(|e| RoutingError::Json {
            message: e.to_string(),
            body: Some(body.chars().take(500).collect()),
        })?;

        osrm.into_path()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coord(lat: f64, lng: f64) -> Coordinate {
        Coordinate::new(lat, lng).unwrap()
    }

    #[test]
    fn foot_url_is_lng_lat() {
        let client = OsrmClient::new(OsrmConfig::new().with_base_url("http://osrm.local/")).unwrap();
        let url = client.route_url(Profile::Foot, coord(27.7, 85.3), coord(27.71, 85.31));

        assert_eq!(
            url,
            "http://osrm.local/route/v1/foot/85.3,27.7;85.31,27.71?overview=full&geometries=geojson"
        );
    }

    #[test]
    fn driving_url_continues_straight() {
        let client = OsrmClient::new(OsrmConfig::new()).unwrap();
        let url = client.route_url(Profile::Driving, coord(27.7, 85.3), coord(27.71, 85.31));

        assert!(url.starts_with("https://router.project-osrm.org/route/v1/driving/"));
        assert!(url.ends_with("&continue_straight=true"));
    }

    #[test]
    fn config_builder() {
        let config = OsrmConfig::new()
            .with_timeout(2)
            .with_user_agent("test-agent/1.0");
        assert_eq!(config.timeout_secs, 2);
        assert_eq!(config.user_agent, "test-agent/1.0");
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn invalid_user_agent_rejected() {
        let result = OsrmClient::new(OsrmConfig::new().with_user_agent("bad\nagent"));
        assert!(matches!(result, Err(RoutingError::ApiError { .. })));
    }

    #[tokio::test]
    async fn unreachable_server_is_http_error() {
        let client =
            OsrmClient::new(OsrmConfig::new().with_base_url("http://127.0.0.1:9").with_timeout(1)).unwrap();
        let result = client
            .route(Profile::Foot, coord(27.7, 85.3), coord(27.71, 85.31))
            .await;
        assert!(matches!(result, Err(RoutingError::Http(_))));
    }
}
