/// OpenWeatherMap endpoints
pub const CURRENT_WEATHER: &str = "https://api.openweathermap.org/data/2.5/weather";
