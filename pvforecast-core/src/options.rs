use std::{fmt, str::FromStr};

use crate::error::ForecastError;

/// Granularity of a forecast call; maps to the `type` query parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ForecastKind {
    Hour,
    Day,
}

impl ForecastKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ForecastKind::Hour => "hour",
            ForecastKind::Day => "day",
        }
    }

    /// Values accepted for `length` (hours for hourly, days for daily).
    pub const fn allowed_lengths(&self) -> &'static [u32] {
        match self {
            ForecastKind::Hour => &[24, 48, 72],
            ForecastKind::Day => &[1, 2, 3],
        }
    }

    pub const fn default_length(&self) -> u32 {
        match self {
            ForecastKind::Hour => 24,
            ForecastKind::Day => 1,
        }
    }

    fn allowed_lengths_text(&self) -> &'static str {
        match self {
            ForecastKind::Hour => "24, 48 or 72",
            ForecastKind::Day => "1, 2 or 3",
        }
    }
}

impl fmt::Display for ForecastKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Daylight saving time handling, resolved by the service.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Dst {
    Disabled,
    #[default]
    Auto,
}

impl Dst {
    pub fn as_u8(&self) -> u8 {
        match self {
            Dst::Disabled => 0,
            Dst::Auto => 1,
        }
    }
}

impl TryFrom<u8> for Dst {
    type Error = ForecastError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Dst::Disabled),
            1 => Ok(Dst::Auto),
            _ => Err(ForecastError::invalid("dst", value, "0 or 1")),
        }
    }
}

/// Anchor for the first entry of the forecast window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Start {
    Today,
    Tomorrow,
    #[default]
    Auto,
}

impl Start {
    pub fn as_str(&self) -> &'static str {
        match self {
            Start::Today => "today",
            Start::Tomorrow => "tomorrow",
            Start::Auto => "auto",
        }
    }

    pub const fn all() -> &'static [Start] {
        &[Start::Today, Start::Tomorrow, Start::Auto]
    }
}

impl fmt::Display for Start {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Start {
    type Err = ForecastError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Start::all()
            .iter()
            .find(|start| start.as_str() == s)
            .copied()
            .ok_or_else(|| ForecastError::invalid("start", s, "'today', 'tomorrow' or 'auto'"))
    }
}

/// Parameters of a single forecast call.
///
/// Values are stored as given and only checked when the call is made, so a
/// bad value never reaches the network.
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastRequest {
    pub latitude: f64,
    pub longitude: f64,
    pub length: u32,
    pub dst: u8,
    pub start: String,
}

impl ForecastRequest {
    /// Hourly request with the service defaults: 24 hours, DST on, start `auto`.
    pub fn hourly(latitude: f64, longitude: f64) -> Self {
        Self::with_defaults(ForecastKind::Hour, latitude, longitude)
    }

    /// Daily request with the service defaults: 1 day, DST on, start `auto`.
    pub fn daily(latitude: f64, longitude: f64) -> Self {
        Self::with_defaults(ForecastKind::Day, latitude, longitude)
    }

    fn with_defaults(kind: ForecastKind, latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            length: kind.default_length(),
            dst: Dst::default().as_u8(),
            start: Start::default().as_str().to_string(),
        }
    }

    pub fn length(mut self, length: u32) -> Self {
        self.length = length;
        self
    }

    pub fn dst(mut self, dst: u8) -> Self {
        self.dst = dst;
        self
    }

    pub fn start(mut self, start: impl Into<String>) -> Self {
        self.start = start.into();
        self
    }

    /// Check every option against what `kind` accepts.
    ///
    /// Coordinates are passed through; the service decides whether they are
    /// in range.
    pub fn validate(&self, kind: ForecastKind) -> Result<ValidatedQuery, ForecastError> {
        if !kind.allowed_lengths().contains(&self.length) {
            return Err(ForecastError::invalid(
                "length",
                self.length,
                kind.allowed_lengths_text(),
            ));
        }
        let dst = Dst::try_from(self.dst)?;
        let start = self.start.parse::<Start>()?;

        Ok(ValidatedQuery {
            kind,
            latitude: self.latitude,
            longitude: self.longitude,
            length: self.length,
            dst,
            start,
        })
    }
}

/// A request whose options have passed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedQuery {
    pub kind: ForecastKind,
    pub latitude: f64,
    pub longitude: f64,
    pub length: u32,
    pub dst: Dst,
    pub start: Start,
}

impl ValidatedQuery {
    /// Query string parameters in wire order.
    pub fn query_pairs(&self, api_key: &str) -> Vec<(&'static str, String)> {
        vec![
            ("key", api_key.to_string()),
            ("lat", self.latitude.to_string()),
            ("lon", self.longitude.to_string()),
            ("forecast", "pv".to_string()),
            ("format", "json".to_string()),
            ("type", self.kind.as_str().to_string()),
            ("number", self.length.to_string()),
            ("dst", self.dst.as_u8().to_string()),
            ("start", self.start.as_str().to_string()),
        ]
    }
}
