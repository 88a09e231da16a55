pub mod app;
pub mod cancel;
pub mod display;
pub mod driver;
pub mod scaler;
pub mod sink;
pub mod store;
pub mod update;

pub use cancel::CancelToken;
pub use driver::{CycleDriver, DriverError};
pub use store::{FrameStore, StoreError};
