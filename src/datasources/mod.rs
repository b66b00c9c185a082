pub mod nominatim;
pub mod openmeteo;
pub mod openweathermap;
pub mod weatherapi;

pub use nominatim::NominatimClient;
pub use openmeteo::{OpenMeteoClient, SoilMoistureSeries};
pub use openweathermap::{OpenWeatherMapClient, OwmCurrent, OwmForecastPoint};
pub use weatherapi::{WeatherApiClient, WeatherApiCurrent};
