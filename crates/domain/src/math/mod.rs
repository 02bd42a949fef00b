//! AMM math kernel. Everything here is pure integer arithmetic.

pub mod concentrated_liquidity;
pub mod full_math;
pub mod precise;
pub mod scaling;
pub mod sqrt_price_math;
pub mod stable;
pub mod swap_math;
pub mod tick_math;
pub mod weighted;
