pub mod record;
pub mod shipper;


pub use record::{Level, LogRecord};
pub use shipper::{LogShipper, LogWorker};
