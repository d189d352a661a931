// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Authentication: deciding whether to log in, and doing it

mod credentials;
mod csrf;
mod login;
mod policy;

pub use credentials::{Credentials, LoginCredentials};
pub use csrf::{fetch_csrf_token, try_fetch_csrf_token, CSRF_PATH, DEFAULT_CSRF_TIMEOUT};
pub use login::{login, LoginSuccess, LoginTimeouts, DEFAULT_LOGIN_TIMEOUT, LOGIN_PATH};
pub use policy::{LoginDecider, LoginDecision, PublicEndpoints, SessionCookieNames};
