//! Weather agent: current conditions and air quality from Open-Meteo,
//! place lookup from Nominatim

use std::time::Duration;

use async_trait::async_trait;
use kora_llm::ToolDefinition;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::instrument;

use crate::error::{ToolError, ToolResult};
use crate::http;
use crate::tool::{Tool, ToolKind, ToolRequest};

/// Open-Meteo forecast endpoint
pub const FORECAST_URL: &str = "https://api.open-meteo.com/v1/forecast";

/// Open-Meteo air-quality endpoint
pub const AIR_QUALITY_URL: &str = "https://air-quality-api.open-meteo.com/v1/air-quality";

/// Nominatim search endpoint
pub const GEOCODE_URL: &str = "https://nominatim.openstreetmap.org/search";

const SERVICE: &str = "weather";

const POLLUTANTS: &[(&str, &str)] = &[
    ("pm2_5", "pm2_5"),
    ("pm10", "pm10"),
    ("nitrogen_dioxide", "no2"),
    ("ozone", "o3"),
    ("carbon_monoxide", "co"),
    ("sulphur_dioxide", "so2"),
];

#[derive(Deserialize)]
struct Coordinates {
    lat: f64,
    lon: f64,
}

impl Coordinates {
    fn validate(&self, function: &str) -> ToolResult<()> {
        if !(-90.0..=90.0).contains(&self.lat) {
            return Err(ToolError::invalid(function, format!("latitude {} out of range", self.lat)));
        }
        if !(-180.0..=180.0).contains(&self.lon) {
            return Err(ToolError::invalid(function, format!("longitude {} out of range", self.lon)));
        }
        Ok(())
    }
}

#[derive(Deserialize)]
struct PlaceArgs {
    place: String,
}

#[derive(Deserialize)]
struct ForecastResponse {
    current_weather: Option<CurrentWeather>,
}

#[derive(Deserialize)]
struct CurrentWeather {
    temperature: f64,
    windspeed: f64,
    winddirection: f64,
    weathercode: i64,
    time: String,
}

#[derive(Deserialize)]
struct AirQualityResponse {
    hourly: Option<serde_json::Map<String, Value>>,
}

#[derive(Deserialize)]
struct Place {
    lat: String,
    lon: String,
    display_name: String,
}

/// Endpoints used by [`WeatherTool`]
#[derive(Debug, Clone)]
pub struct WeatherEndpoints {
    /// Forecast API
    pub forecast: String,
    /// Air-quality API
    pub air_quality: String,
    /// Geocoding API
    pub geocode: String,
}

impl Default for WeatherEndpoints {
    fn default() -> Self {
        Self {
            forecast: FORECAST_URL.to_string(),
            air_quality: AIR_QUALITY_URL.to_string(),
            geocode: GEOCODE_URL.to_string(),
        }
    }
}

/// Weather agent
pub struct WeatherTool {
    http: reqwest::Client,
    endpoints: WeatherEndpoints,
}

impl WeatherTool {
    /// Agent using the public endpoints
    pub fn new(timeout: Duration) -> Self {
        Self::with_endpoints(WeatherEndpoints::default(), timeout)
    }

    /// Agent using custom endpoints
    pub fn with_endpoints(endpoints: WeatherEndpoints, timeout: Duration) -> Self {
        Self {
            http: http::client(timeout),
            endpoints,
        }
    }

    #[instrument(skip(self, at), fields(lat = at.lat, lon = at.lon))]
    async fn current_weather(&self, at: Coordinates) -> ToolResult<String> {
        at.validate("get_current_weather")?;
        let response = self
            .http
            .get(&self.endpoints.forecast)
            .query(&[("latitude", at.lat), ("longitude", at.lon)])
            .query(&[("current_weather", "true")])
            .send()
            .await?;
        let forecast: ForecastResponse = http::json(SERVICE, response).await?;

        let current = forecast
            .current_weather
            .ok_or_else(|| ToolError::service(SERVICE, 200, "weather data unavailable"))?;
        Ok(json!({
            "temperature_c": current.temperature,
            "windspeed_kmh": current.windspeed,
            "wind_direction": current.winddirection,
            "weather_code": current.weathercode,
            "time": current.time,
        })
        .to_string())
    }

    #[instrument(skip(self, at), fields(lat = at.lat, lon = at.lon))]
    async fn air_quality(&self, at: Coordinates) -> ToolResult<String> {
        at.validate("get_air_quality")?;
        let hourly = POLLUTANTS.iter().map(|(k, _)| *k).collect::<Vec<_>>().join(",");
        let response = self
            .http
            .get(&self.endpoints.air_quality)
            .query(&[("latitude", at.lat), ("longitude", at.lon)])
            .query(&[
                ("hourly", hourly.as_str()),
                ("timezone", "auto"),
                ("past_days", "1"),
            ])
            .send()
            .await?;
        let body: AirQualityResponse = http::json(SERVICE, response).await?;

        let unavailable = || ToolError::service(SERVICE, 200, "air quality data unavailable");
        let hourly = body.hourly.ok_or_else(unavailable)?;
        latest_sample(&hourly)
            .map(|v| v.to_string())
            .ok_or_else(unavailable)
    }

    #[instrument(skip(self))]
    async fn geo_details(&self, place: &str) -> ToolResult<String> {
        if place.trim().is_empty() {
            return Err(ToolError::invalid("get_geo_details", "place is empty"));
        }
        let response = self
            .http
            .get(&self.endpoints.geocode)
            .query(&[("q", place), ("format", "json"), ("limit", "1")])
            .send()
            .await?;
        let places: Vec<Place> = http::json(SERVICE, response).await?;

        let found = places
            .into_iter()
            .next()
            .ok_or_else(|| ToolError::invalid("get_geo_details", format!("location '{place}' not found")))?;
        let parse = |s: &str| {
            s.parse::<f64>()
                .map_err(|_| ToolError::service(SERVICE, 200, format!("bad coordinate '{s}'")))
        };
        let country = found
            .display_name
            .rsplit(',')
            .next()
            .unwrap_or_default()
            .trim()
            .to_string();

        Ok(json!({
            "place": place,
            "latitude": parse(&found.lat)?,
            "longitude": parse(&found.lon)?,
            "display_name": found.display_name,
            "country": country,
        })
        .to_string())
    }
}

/// The most recent hour with at least one pollutant reading
fn latest_sample(hourly: &serde_json::Map<String, Value>) -> Option<Value> {
    let times = hourly.get("time")?.as_array()?;
    let value_at = |key: &str, i: usize| -> Value {
        hourly
            .get(key)
            .and_then(Value::as_array)
            .and_then(|series| series.get(i))
            .cloned()
            .unwrap_or(Value::Null)
    };

    let index = (0..times.len())
        .rev()
        .find(|&i| POLLUTANTS.iter().any(|(key, _)| !value_at(key, i).is_null()))?;

    let mut sample = serde_json::Map::new();
    for (key, short) in POLLUTANTS {
        sample.insert(short.to_string(), value_at(key, index));
    }
    sample.insert("timestamp".to_string(), times[index].clone());
    Some(Value::Object(sample))
}

#[async_trait]
impl Tool for WeatherTool {
    fn kind(&self) -> ToolKind {
        ToolKind::Weather
    }

    fn definitions(&self) -> Vec<ToolDefinition> {
        let coordinates = json!({
            "type": "object",
            "properties": {
                "lat": { "type": "number", "description": "Latitude" },
                "lon": { "type": "number", "description": "Longitude" }
            },
            "required": ["lat", "lon"]
        });
        vec![
            ToolDefinition::function(
                "get_current_weather",
                "Current temperature, wind and weather code at a latitude/longitude",
                coordinates.clone(),
            ),
            ToolDefinition::function(
                "get_air_quality",
                "Latest pollutant levels (PM2.5, PM10, NO2, O3, CO, SO2) at a latitude/longitude",
                coordinates,
            ),
            ToolDefinition::function(
                "get_geo_details",
                "Latitude, longitude and country of a place name",
                json!({
                    "type": "object",
                    "properties": {
                        "place": { "type": "string", "description": "Place name, e.g. 'Delhi, India'" }
                    },
                    "required": ["place"]
                }),
            ),
        ]
    }

    async fn invoke(&self, request: ToolRequest) -> ToolResult<String> {
        match request.function.as_str() {
            "get_current_weather" => self.current_weather(request.parse()?).await,
            "get_air_quality" => self.air_quality(request.parse()?).await,
            "get_geo_details" => {
                let args: PlaceArgs = request.parse()?;
                self.geo_details(&args.place).await
            }
            _ => Err(request.unknown()),
        }
    }
}
