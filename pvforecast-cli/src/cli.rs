use anyhow::{Context, anyhow};
use clap::{Args, Parser, Subcommand};
use inquire::{CustomType, Password};
use pvforecast_core::{Config, ForecastKind, ForecastRequest, IrradianceForecaster};
use tracing::debug;

use crate::output;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "pvforecast", version, about = "Solar irradiance forecasts from PVForecast")]
pub struct Cli {
    /// API key; overrides the one stored by `pvforecast configure`.
    #[arg(long, global = true, env = "PVFORECAST_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the API key and a default location.
    Configure,

    /// Hourly irradiance in W/m².
    Hourly(ForecastArgs),

    /// Daily irradiance totals in Wh/m².
    Daily(ForecastArgs),
}

#[derive(Debug, Args)]
pub struct ForecastArgs {
    /// Latitude in degrees; defaults to the configured location.
    #[arg(long, allow_negative_numbers = true)]
    pub lat: Option<f64>,

    /// Longitude in degrees; defaults to the configured location.
    #[arg(long, allow_negative_numbers = true)]
    pub lon: Option<f64>,

    /// Hours (24, 48, 72) or days (1, 2, 3) to forecast.
    #[arg(long)]
    pub length: Option<u32>,

    /// Daylight saving time: 1 for automatic, 0 for disabled.
    #[arg(long, default_value_t = 1)]
    pub dst: u8,

    /// Forecast start: today, tomorrow or auto.
    #[arg(long, default_value = "auto")]
    pub start: String,

    /// Print the forecast as JSON.
    #[arg(long)]
    pub json: bool,
}

impl ForecastArgs {
    /// Turn the arguments into a request, falling back to the configured location.
    pub fn request(&self, kind: ForecastKind, config: &Config) -> anyhow::Result<ForecastRequest> {
        let (lat, lon) = match (self.lat, self.lon, config.location) {
            (Some(lat), Some(lon), _) => (lat, lon),
            (None, None, Some(loc)) => (loc.latitude, loc.longitude),
            (Some(_), None, _) | (None, Some(_), _) => {
                return Err(anyhow!("Both --lat and --lon must be given together."));
            }
            (None, None, None) => {
                return Err(anyhow!(
                    "No location given.\n\
                     Hint: pass --lat and --lon, or run `pvforecast configure` to store a default."
                ));
            }
        };

        let request = match kind {
            ForecastKind::Hour => ForecastRequest::hourly(lat, lon),
            ForecastKind::Day => ForecastRequest::daily(lat, lon),
        };
        let request = match self.length {
            Some(length) => request.length(length),
            None => request,
        };

        Ok(request.dst(self.dst).start(self.start.as_str()))
    }
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        let mut config = Config::load()?;

        match self.command {
            Command::Configure => configure(&mut config),
            Command::Hourly(args) => {
                let client = match &self.api_key {
                    Some(key) => config.client_with_key(key)?,
                    None => config.client()?,
                };
                let request = args.request(ForecastKind::Hour, &config)?;
                let text =
                    fetch_and_render(&client, ForecastKind::Hour, &request, args.json).await?;
                println!("{text}");
                Ok(())
            }
            Command::Daily(args) => {
                let client = match &self.api_key {
                    Some(key) => config.client_with_key(key)?,
                    None => config.client()?,
                };
                let request = args.request(ForecastKind::Day, &config)?;
                let text =
                    fetch_and_render(&client, ForecastKind::Day, &request, args.json).await?;
                println!("{text}");
                Ok(())
            }
        }
    }
}

/// Run one forecast call and format the result for the terminal.
pub async fn fetch_and_render(
    forecaster: &dyn IrradianceForecaster,
    kind: ForecastKind,
    request: &ForecastRequest,
    json: bool,
) -> anyhow::Result<String> {
    debug!(%kind, lat = request.latitude, lon = request.longitude, "Fetching forecast");

    match kind {
        ForecastKind::Hour => {
            let data = forecaster.fetch_hourly(request).await?;
            if json {
                serde_json::to_string_pretty(&data).context("Failed to serialize forecast")
            } else {
                Ok(output::render_hourly(&data))
            }
        }
        ForecastKind::Day => {
            let data = forecaster.fetch_daily(request).await?;
            if json {
                serde_json::to_string_pretty(&data).context("Failed to serialize forecast")
            } else {
                Ok(output::render_daily(&data))
            }
        }
    }
}

fn configure(config: &mut Config) -> anyhow::Result<()> {
    let api_key = Password::new("PVForecast API key:")
        .without_confirmation()
        .prompt()
        .context("Failed to read API key")?;
    let api_key = api_key.trim();
    if api_key.is_empty() {
        return Err(anyhow!("API key must not be empty."));
    }
    config.set_api_key(api_key.to_string());

    let mut lat_prompt = CustomType::<f64>::new("Default latitude (empty to skip):");
    let mut lon_prompt = CustomType::<f64>::new("Default longitude (empty to skip):");
    if let Some(loc) = config.location {
        lat_prompt = lat_prompt.with_default(loc.latitude);
        lon_prompt = lon_prompt.with_default(loc.longitude);
    }

    let lat = lat_prompt.prompt_skippable().context("Failed to read latitude")?;
    if let Some(lat) = lat {
        let lon = lon_prompt.prompt().context("Failed to read longitude")?;
        config.set_location(lat, lon);
    }

    let path = config.save()?;
    println!("Configuration saved to {}", path.display());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use pvforecast_core::{
        DailyForecast, DailyForecastData, ForecastError, HourlyForecast, HourlyForecastData,
    };

    #[derive(Debug)]
    struct StubForecaster;

    #[async_trait]
    impl IrradianceForecaster for StubForecaster {
        async fn fetch_hourly(
            &self,
            request: &ForecastRequest,
        ) -> Result<HourlyForecastData, ForecastError> {
            request.validate(ForecastKind::Hour)?;
            Ok(HourlyForecastData {
                forecasts: vec![HourlyForecast {
                    timestamp: "2023-10-01 12:00".into(),
                    irradiance: Some(700),
                }],
            })
        }

        async fn fetch_daily(
            &self,
            request: &ForecastRequest,
        ) -> Result<DailyForecastData, ForecastError> {
            request.validate(ForecastKind::Day)?;
            Ok(DailyForecastData {
                forecasts: vec![DailyForecast {
                    timestamp: "2023-10-02".into(),
                    total_irradiance: None,
                }],
            })
        }
    }

    fn args(lat: Option<f64>, lon: Option<f64>) -> ForecastArgs {
        ForecastArgs {
            lat,
            lon,
            length: None,
            dst: 1,
            start: "auto".into(),
            json: false,
        }
    }

    #[test]
    fn explicit_location_wins_over_config() {
        let mut cfg = Config::default();
        cfg.set_location(1.0, 2.0);

        let request = args(Some(50.0), Some(14.0)).request(ForecastKind::Hour, &cfg).unwrap();
        assert_eq!((request.latitude, request.longitude), (50.0, 14.0));
        assert_eq!(request.length, 24);
    }

    #[test]
    fn configured_location_is_fallback() {
        let mut cfg = Config::default();
        cfg.set_location(49.2, 16.6);

        let request = args(None, None).request(ForecastKind::Day, &cfg).unwrap();
        assert_eq!((request.latitude, request.longitude), (49.2, 16.6));
        assert_eq!(request.length, 1);
    }

    #[test]
    fn missing_location_is_an_error() {
        let err = args(None, None)
            .request(ForecastKind::Hour, &Config::default())
            .unwrap_err();
        assert!(err.to_string().contains("No location given"));

        let err = args(Some(50.0), None)
            .request(ForecastKind::Hour, &Config::default())
            .unwrap_err();
        assert!(err.to_string().contains("--lat and --lon"));
    }

    #[test]
    fn cli_parses_forecast_flags() {
        let argv = "pvforecast daily --lat -33.9 --lon 18.4 --length 3 --dst 0 --start tomorrow";
        let cli = Cli::try_parse_from(argv.split_whitespace().chain(["--json"]))
            .expect("valid arguments");

        let Command::Daily(args) = cli.command else {
            panic!("expected daily subcommand");
        };
        let request = args.request(ForecastKind::Day, &Config::default()).unwrap();
        let expected = ForecastRequest::daily(-33.9, 18.4).length(3).dst(0).start("tomorrow");
        assert_eq!(request, expected);
        assert!(args.json);
    }

    #[tokio::test]
    async fn renders_json_when_requested() {
        let request = ForecastRequest::daily(50.0, 14.0);
        let text = fetch_and_render(&StubForecaster, ForecastKind::Day, &request, true)
            .await
            .unwrap();

        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["forecasts"][0]["timestamp"], "2023-10-02");
        assert!(value["forecasts"][0]["total_irradiance"].is_null());
    }

    #[tokio::test]
    async fn invalid_options_surface_as_errors() {
        let request = ForecastRequest::hourly(50.0, 14.0).length(12);
        let err = fetch_and_render(&StubForecaster, ForecastKind::Hour, &request, false)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Invalid length"));
    }
}
