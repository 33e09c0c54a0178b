// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

mod clock_trait;
mod host_clock;
mod manual_clock;
mod timebase;

pub use clock_trait::Clock;
pub use host_clock::HostClock;
pub use manual_clock::ManualClock;
pub use timebase::Timebase;
