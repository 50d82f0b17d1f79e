#![no_std]
extern crate alloc;

pub mod double_checked;
pub mod eager;
pub mod holder;
pub mod locked;
pub mod racy;
pub mod spin;

pub use double_checked::DoubleCheckedSingleton;
pub use eager::EagerSingleton;
pub use holder::HolderSingleton;
pub use locked::LockedSingleton;
pub use racy::RacySingleton;
pub use spin::SpinGuard;
pub use spin::SpinLock;
