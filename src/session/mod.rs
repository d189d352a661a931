// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Session lifecycle
//!
//! A session is one transport bound to one origin. The registry keeps the
//! current one alive across requests and swaps it out when the origin moves.

mod origin;
mod registry;
mod session;

pub use origin::Origin;
pub use registry::{SessionRegistry, DEFAULT_WARMUP_TIMEOUT};
pub use session::{is_clearance_cookie, Session, WarmupOutcome};
