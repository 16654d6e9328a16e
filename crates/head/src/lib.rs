// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! strata-head: the rank ↔ head offload channel and the head's listen loop

pub mod barrier;
pub mod link;
pub mod listener;
pub mod protocol;
#[cfg(unix)]
pub mod socket;
pub mod wire;

pub use barrier::{Barrier, LinkBarrier, NullBarrier};
pub use link::{HeadLink, LocalNode, RankLink};
pub use listener::{listen, HeadError, ListenSummary};
pub use protocol::{Envelope, HeadReply, ProtocolError, RankMessage, MAX_MESSAGE_SIZE};
#[cfg(unix)]
pub use socket::{SocketHeadLink, SocketNode, SocketRankLink};
