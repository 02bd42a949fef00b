pub mod address;
pub mod amount;
pub mod fee;
pub mod percentage;
pub mod pool_id;
pub mod price;

pub use address::{Address, AddressError};
pub use amount::{format_units, mul_decimal_floor, parse_units};
pub use fee::SwapFee;
pub use percentage::Percentage;
pub use pool_id::PoolId;
pub use price::Price;
