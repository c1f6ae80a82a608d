use std::path::PathBuf;

use thiserror::Error;

/// Every way a fetch or export can fail. The `Display` text is what the user sees.
#[derive(Debug, Error)]
pub enum WeatherError {
    #[error("Please enter a city name!")]
    InvalidInput,

    #[error(
        "Invalid API key.\n\
         Hint: get a free API key from openweathermap.org and run `weather-dashboard configure`."
    )]
    AuthenticationFailure,

    #[error("City '{city}' not found!")]
    CityNotFound { city: String },

    #[error("Failed to fetch data: {0}")]
    NetworkFailure(String),

    #[error("Malformed response from weather API: {0}")]
    MalformedResponse(String),

    #[error("An error occurred: {0}")]
    UnexpectedFailure(String),

    #[error("No weather data to save yet. Fetch a city first.")]
    NoDataAvailable,

    #[error("Failed to write snapshot {}: {source}", path.display())]
    SnapshotWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl WeatherError {
    /// Short label for a status line.
    pub fn status_label(&self) -> &'static str {
        match self {
            WeatherError::InvalidInput => "Error: No city entered",
            WeatherError::AuthenticationFailure => "Error: Invalid API Key",
            WeatherError::CityNotFound { .. } => "Error: City not found",
            WeatherError::NetworkFailure(_) => "Error: Network request failed",
            WeatherError::MalformedResponse(_) | WeatherError::UnexpectedFailure(_) => {
                "Error occurred"
            }
            WeatherError::NoDataAvailable => "Error: Nothing to save",
            WeatherError::SnapshotWrite { .. } => "Error: Save failed",
        }
    }
}

pub type WeatherResult<T> = Result<T, WeatherError>;
