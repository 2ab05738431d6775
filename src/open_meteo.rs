//! Open-Meteo adapters for current weather and air quality.

use std::time::Duration;

use serde::Deserialize;

use crate::error::ProviderError;
use crate::models::Coordinate;
use crate::traits::{AirQualityProvider, AirQualityReport, WeatherProvider, WeatherReport};

const WEATHER: &str = "weather";
const AIR_QUALITY: &str = "air-quality";

#[derive(Debug, Clone)]
pub struct OpenMeteoConfig {
    pub forecast_url: String,
    pub air_quality_url: String,
    pub timeout_secs: u64,
}

impl Default for OpenMeteoConfig {
    fn default() -> Self {
        Self {
            forecast_url: "https://api.open-meteo.com/v1/forecast".to_string(),
            air_quality_url: "https://air-quality-api.open-meteo.com/v1/air-quality".to_string(),
            timeout_secs: 10,
        }
    }
}

/// One client serving both the weather and air-quality traits.
#[derive(Debug, Clone)]
pub struct OpenMeteoClient {
    config: OpenMeteoConfig,
    client: reqwest::blocking::Client,
}

impl OpenMeteoClient {
    pub fn new(config: OpenMeteoConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { config, client })
    }

    fn get<T>(&self, provider: &'static str, url: &str, at: Coordinate, current: &str) -> Result<T, ProviderError>
    where
        T: for<'de> Deserialize<'de>,
    {
        let response = self
            .client
            .get(url)
            .query(&[
                ("latitude", format!("{:.4}", at.latitude)),
                ("longitude", format!("{:.4}", at.longitude)),
                ("current", current.to_string()),
            ])
            .send()
            .map_err(|source| ProviderError::Http { provider, source })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::Status {
                provider,
                status: status.as_u16(),
            });
        }

        response
            .json::<T>()
            .map_err(|source| ProviderError::Http { provider, source })
    }
}

impl WeatherProvider for OpenMeteoClient {
    fn current(&self, at: Coordinate) -> Result<WeatherReport, ProviderError> {
        let body: ForecastResponse = self.get(
            WEATHER,
            &self.config.forecast_url,
            at,
            "temperature_2m,relative_humidity_2m,weather_code,uv_index",
        )?;
        weather_report(body)
    }
}

impl AirQualityProvider for OpenMeteoClient {
    fn current(&self, at: Coordinate) -> Result<AirQualityReport, ProviderError> {
        let body: AirQualityResponse =
            self.get(AIR_QUALITY, &self.config.air_quality_url, at, "us_aqi")?;
        air_quality_report(body)
    }
}

fn weather_report(body: ForecastResponse) -> Result<WeatherReport, ProviderError> {
    let current = body
        .current
        .ok_or_else(|| ProviderError::invalid(WEATHER, "missing current block"))?;
    let temperature = current
        .temperature_2m
        .ok_or_else(|| ProviderError::invalid(WEATHER, "missing temperature"))?;

    Ok(WeatherReport {
        temperature,
        condition: weather_condition(current.weather_code.unwrap_or(0)).to_string(),
        humidity: current.relative_humidity_2m.unwrap_or(0.0),
        uv_index: current.uv_index,
    })
}

fn air_quality_report(body: AirQualityResponse) -> Result<AirQualityReport, ProviderError> {
    let aqi = body
        .current
        .and_then(|current| current.us_aqi)
        .ok_or_else(|| ProviderError::invalid(AIR_QUALITY, "missing us_aqi"))?;
    if !aqi.is_finite() || aqi < 0.0 {
        return Err(ProviderError::invalid(AIR_QUALITY, format!("aqi out of range: {}", aqi)));
    }
    let index = aqi.round() as u32;

    Ok(AirQualityReport {
        index,
        category: aqi_category(index).to_string(),
    })
}

/// US EPA category name for an AQI value.
pub fn aqi_category(index: u32) -> &'static str {
    match index {
        0..=50 => "Good",
        51..=100 => "Moderate",
        101..=150 => "Unhealthy for Sensitive Groups",
        151..=200 => "Unhealthy",
        201..=300 => "Very Unhealthy",
        _ => "Hazardous",
    }
}

/// Short description of a WMO weather interpretation code.
fn weather_condition(code: u16) -> &'static str {
    match code {
        0 => "Clear",
        1 | 2 => "Partly Cloudy",
        3 => "Overcast",
        45 | 48 => "Fog",
        51..=57 => "Drizzle",
        61..=67 | 80..=82 => "Rain",
        71..=77 | 85 | 86 => "Snow",
        95..=99 => "Thunderstorm",
        _ => "Unknown",
    }
}

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    current: Option<ForecastCurrent>,
}

#[derive(Debug, Deserialize)]
struct ForecastCurrent {
    temperature_2m: Option<f64>,
    relative_humidity_2m: Option<f64>,
    weather_code: Option<u16>,
    uv_index: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct AirQualityResponse {
    current: Option<AirQualityCurrent>,
}

#[derive(Debug, Deserialize)]
struct AirQualityCurrent {
    us_aqi: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weather_report_from_body() {
        let body: ForecastResponse = serde_json::from_str(
            r#"{"current": {"time": "2026-10-18T08:00", "temperature_2m": 14.3,
                "relative_humidity_2m": 81, "weather_code": 61, "uv_index": 1.5}}"#,
        )
        .unwrap();
        let report = weather_report(body).unwrap();
        assert_eq!(report.temperature, 14.3);
        assert_eq!(report.humidity, 81.0);
        assert_eq!(report.condition, "Rain");
        assert_eq!(report.uv_index, Some(1.5));
    }

    #[test]
    fn test_weather_report_requires_temperature() {
        let body: ForecastResponse =
            serde_json::from_str(r#"{"current": {"weather_code": 0}}"#).unwrap();
        assert!(matches!(
            weather_report(body),
            Err(ProviderError::InvalidResponse { provider: "weather", .. })
        ));
    }

    #[test]
    fn test_air_quality_report_from_body() {
        let body: AirQualityResponse =
            serde_json::from_str(r#"{"current": {"us_aqi": 112.4}}"#).unwrap();
        let report = air_quality_report(body).unwrap();
        assert_eq!(report.index, 112);
        assert_eq!(report.category, "Unhealthy for Sensitive Groups");
    }

    #[test]
    fn test_air_quality_missing_value() {
        let body: AirQualityResponse = serde_json::from_str(r#"{"current": {}}"#).unwrap();
        assert!(air_quality_report(body).is_err());
    }

    #[test]
    fn test_aqi_category_bands() {
        assert_eq!(aqi_category(0), "Good");
        assert_eq!(aqi_category(50), "Good");
        assert_eq!(aqi_category(51), "Moderate");
        assert_eq!(aqi_category(201), "Very Unhealthy");
        assert_eq!(aqi_category(420), "Hazardous");
    }
}
