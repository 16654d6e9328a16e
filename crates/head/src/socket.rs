// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Unix-socket node link for heads running as separate processes.
//!
//! The head binds one socket per node; each rank connects and frames
//! envelopes over it. One reader thread per connection feeds the head's
//! single blocking queue, so the listen loop stays a sequential
//! dispatcher. The reader threads are transport plumbing, not library
//! state; they exit when their rank closes its end.

use crate::protocol::{Envelope, HeadReply, ProtocolError, RankMessage};
use crate::wire;
use crate::{HeadLink, RankLink};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::os::unix::net::{UnixListener, UnixStream};
use std::path::Path;
use std::sync::{mpsc, Arc};
use std::thread;
use tracing::{debug, warn};

pub struct SocketNode;

impl SocketNode {
    /// Bind the node socket and start accepting rank connections.
    pub fn bind(path: &Path) -> std::io::Result<SocketHeadLink> {
        if path.exists() {
            std::fs::remove_file(path)?;
        }
        let listener = UnixListener::bind(path)?;
        let (tx, rx) = mpsc::channel();
        let peers: Arc<Mutex<HashMap<u32, UnixStream>>> = Arc::new(Mutex::new(HashMap::new()));
        let accept_peers = Arc::clone(&peers);
        thread::spawn(move || {
            for stream in listener.incoming() {
                match stream {
                    Ok(stream) => {
                        let tx = tx.clone();
                        let peers = Arc::clone(&accept_peers);
                        thread::spawn(move || read_loop(stream, tx, peers));
                    }
                    Err(err) => {
                        warn!(%err, "accept failed on node socket");
                        break;
                    }
                }
            }
        });
        Ok(SocketHeadLink { rx, peers })
    }

    /// Connect an application rank to its node's head.
    pub fn connect(path: &Path, rank: u32) -> std::io::Result<SocketRankLink> {
        let stream = UnixStream::connect(path)?;
        Ok(SocketRankLink {
            rank,
            stream: Mutex::new(stream),
        })
    }
}

fn read_loop(
    mut stream: UnixStream,
    tx: mpsc::Sender<Envelope>,
    peers: Arc<Mutex<HashMap<u32, UnixStream>>>,
) {
    loop {
        match wire::read_frame::<_, Envelope>(&mut stream) {
            Ok(envelope) => {
                // Register the write half on first contact so replies can
                // be routed back.
                if !peers.lock().contains_key(&envelope.rank) {
                    match stream.try_clone() {
                        Ok(writer) => {
                            peers.lock().insert(envelope.rank, writer);
                        }
                        Err(err) => {
                            warn!(rank = envelope.rank, %err, "cannot clone rank stream");
                            return;
                        }
                    }
                }
                if tx.send(envelope).is_err() {
                    return; // head link dropped
                }
            }
            Err(ProtocolError::ConnectionClosed) => {
                debug!("rank connection closed");
                return;
            }
            Err(err) => {
                warn!(%err, "dropping rank connection");
                return;
            }
        }
    }
}

pub struct SocketHeadLink {
    rx: mpsc::Receiver<Envelope>,
    peers: Arc<Mutex<HashMap<u32, UnixStream>>>,
}

impl HeadLink for SocketHeadLink {
    fn recv(&self) -> Result<Envelope, ProtocolError> {
        self.rx.recv().map_err(|_| ProtocolError::Disconnected)
    }

    fn send(&self, rank: u32, reply: HeadReply) -> Result<(), ProtocolError> {
        let mut peers = self.peers.lock();
        let stream = peers.get_mut(&rank).ok_or(ProtocolError::Disconnected)?;
        wire::write_frame(stream, &reply)
    }
}

pub struct SocketRankLink {
    rank: u32,
    stream: Mutex<UnixStream>,
}

impl RankLink for SocketRankLink {
    fn send(&self, msg: RankMessage) -> Result<(), ProtocolError> {
        let mut stream = self.stream.lock();
        wire::write_frame(
            &mut *stream,
            &Envelope {
                rank: self.rank,
                msg,
            },
        )
    }

    fn recv(&self) -> Result<HeadReply, ProtocolError> {
        let mut stream = self.stream.lock();
        wire::read_frame(&mut *stream)
    }
}

#[cfg(test)]
#[path = "socket_tests.rs"]
mod tests;
