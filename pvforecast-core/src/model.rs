use serde::{Deserialize, Serialize};

/// One hour of forecast irradiance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HourlyForecast {
    /// Timestamp exactly as sent by the service.
    pub timestamp: String,
    /// Irradiance in W/m², `None` when the service has no value for the hour.
    pub irradiance: Option<u32>,
}

/// One day of forecast irradiance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyForecast {
    pub timestamp: String,
    /// Total irradiance in Wh/m², `None` when the service has no total for the day.
    pub total_irradiance: Option<u32>,
}

/// Hourly forecasts in the order the service returned them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HourlyForecastData {
    pub forecasts: Vec<HourlyForecast>,
}

impl HourlyForecastData {
    pub fn len(&self) -> usize {
        self.forecasts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.forecasts.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, HourlyForecast> {
        self.forecasts.iter()
    }

    /// Hour with the highest irradiance. Hours without a value are skipped
    /// and the earliest one wins a tie.
    pub fn peak(&self) -> Option<(&HourlyForecast, u32)> {
        self.forecasts
            .iter()
            .filter_map(|f| f.irradiance.map(|v| (f, v)))
            .fold(None, |best, (f, v)| match best {
                Some((_, b)) if b >= v => best,
                _ => Some((f, v)),
            })
    }
}

impl IntoIterator for HourlyForecastData {
    type Item = HourlyForecast;
    type IntoIter = std::vec::IntoIter<HourlyForecast>;

    fn into_iter(self) -> Self::IntoIter {
        self.forecasts.into_iter()
    }
}

impl<'a> IntoIterator for &'a HourlyForecastData {
    type Item = &'a HourlyForecast;
    type IntoIter = std::slice::Iter<'a, HourlyForecast>;

    fn into_iter(self) -> Self::IntoIter {
        self.forecasts.iter()
    }
}

/// Daily forecasts in the order the service returned them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyForecastData {
    pub forecasts: Vec<DailyForecast>,
}

impl DailyForecastData {
    pub fn len(&self) -> usize {
        self.forecasts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.forecasts.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, DailyForecast> {
        self.forecasts.iter()
    }

    /// Sum of the days that have a total, or `None` if none of them do.
    pub fn total(&self) -> Option<u64> {
        self.forecasts
            .iter()
            .filter_map(|f| f.total_irradiance)
            .fold(None, |acc, v| Some(acc.unwrap_or(0) + u64::from(v)))
    }
}

impl IntoIterator for DailyForecastData {
    type Item = DailyForecast;
    type IntoIter = std::vec::IntoIter<DailyForecast>;

    fn into_iter(self) -> Self::IntoIter {
        self.forecasts.into_iter()
    }
}

impl<'a> IntoIterator for &'a DailyForecastData {
    type Item = &'a DailyForecast;
    type IntoIter = std::slice::Iter<'a, DailyForecast>;

    fn into_iter(self) -> Self::IntoIter {
        self.forecasts.iter()
    }
}
