pub mod cache;
pub mod delta;
pub mod error;
pub mod kill;
pub mod mock;
pub mod monitor;
pub mod platform;
pub mod sampler;
pub mod snapshot;
pub mod source;

pub use error::CollectError;
pub use monitor::{Monitor, OsControl, ProcessControl};
pub use snapshot::{ExtraProcessDetail, ProcessSample, Snapshot, SystemSample, ThreadSample};
pub use source::{EntitySource, OsSource};
