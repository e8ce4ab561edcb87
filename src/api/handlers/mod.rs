pub mod health;
pub mod time_series;
