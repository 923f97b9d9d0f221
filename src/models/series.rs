/// Parallel label/value columns for one chart series
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Series {
    pub labels: Vec<String>,
    pub values: Vec<f64>,
}

/// System history projected for the two fixed charts: one shared label
/// axis, one value column per chart
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SystemSeries {
    pub labels: Vec<String>,
    pub cpu: Vec<f64>,
    pub memory: Vec<f64>,
}
