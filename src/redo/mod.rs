pub mod record;
pub mod shipper;

#[cfg(test)]
mod tests;

pub use record::{decode_value, encode_value, Change, RedoRecord};
pub use shipper::RedoShipper;
