pub mod chart_service;
pub mod refresh_service;
pub mod transform_service;
