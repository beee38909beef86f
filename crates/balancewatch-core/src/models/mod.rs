//! Data models for BalanceWatch

mod balance;
mod threshold;

pub use balance::*;
pub use threshold::*;
