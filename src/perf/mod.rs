pub mod observer;
pub mod timing;

pub use observer::{MetricsSink, PerformanceObserver, TracingMetricsSink};
pub use timing::{
    InitiatorType, ManualTimingSource, NavigationTiming, PerformanceSnapshot, ResourceEntry,
    TimingSource,
};
