// Public library interface for sales-insights-back-end
pub mod api;
pub mod sales_time_series;
pub mod schema;
pub mod seed;
pub mod utils;
