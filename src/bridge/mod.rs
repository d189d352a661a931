// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! The bridge: wire protocol, request execution and body decoding

mod decode;
mod executor;
mod protocol;

pub use decode::{charset_label, decode_body, BodyDecoder, DecodeStrategy, DecodedBody};
pub use executor::Executor;
pub use protocol::{
    to_ascii_json, BridgeRequest, BridgeResponse, FailureBody, SuccessBody,
};
