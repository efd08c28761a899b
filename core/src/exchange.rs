//! Conversion rates between stardust, CFX and credits.
//!
//! CFX amounts are in wei (10^18 per CFX). Divisions floor.

use crate::types::Quantity;

/// Stardust that buys one CFX.
pub const STARDUST_PER_CFX: u64 = 10_000;

/// Credits granted per CFX spent.
pub const CREDITS_PER_CFX: u64 = 1_000;

const WEI_PER_CFX: u64 = 1_000_000_000_000_000_000;

/// Wei of CFX a stardust balance converts into.
pub fn stardust_to_cfx(stardust: &Quantity) -> Quantity {
    stardust * WEI_PER_CFX / STARDUST_PER_CFX
}

/// Credits bought with `wei` of CFX.
pub fn cfx_to_credits(wei: &Quantity) -> Quantity {
    wei * CREDITS_PER_CFX / WEI_PER_CFX
}
