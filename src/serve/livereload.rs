// src/serve/livereload.rs

//! Live-reload push channel.
//!
//! Two dedicated threads: one accepts incoming WebSocket connections from
//! browser tabs, the other broadcasts a `"reload"` message to every
//! connected client whenever a build finishes successfully. Broken
//! connections are pruned on send.

use std::net::{TcpListener, TcpStream};
use std::sync::mpsc::{channel, Sender};
use std::sync::{Arc, Mutex, MutexGuard};

use tracing::{debug, info, warn};
use tungstenite::WebSocket;

use crate::errors::Result;

/// Oldest connections beyond this are closed; stale tabs accumulate sockets.
const MAX_CLIENTS: usize = 10;

type Clients = Arc<Mutex<Vec<WebSocket<TcpStream>>>>;

/// Cloneable handle used by the engine to announce a finished build.
#[derive(Clone)]
pub struct ReloadHandle {
    tx: Sender<()>,
}

impl ReloadHandle {
    /// Notify all connected clients. Never fails; a stopped broadcaster
    /// just means nobody is listening.
    pub fn notify(&self) {
        let _ = self.tx.send(());
    }
}

/// Bind the live-reload listener and start the acceptor and broadcaster
/// threads. A bind failure is fatal: live reload was requested and cannot
/// be provided.
pub fn spawn(host: &str, port: u16) -> Result<ReloadHandle> {
    let listener = TcpListener::bind((host, port))?;
    info!(port, "live-reload endpoint listening");

    let clients: Clients = Arc::new(Mutex::new(Vec::new()));

    spawn_acceptor(listener, Arc::clone(&clients));
    let tx = spawn_broadcaster(clients);

    Ok(ReloadHandle { tx })
}

fn lock_clients(clients: &Clients) -> MutexGuard<'_, Vec<WebSocket<TcpStream>>> {
    match clients.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

fn spawn_acceptor(listener: TcpListener, clients: Clients) {
    std::thread::spawn(move || {
        for stream in listener.incoming() {
            let stream = match stream {
                Ok(stream) => stream,
                Err(e) => {
                    warn!(error = %e, "live-reload accept failed");
                    continue;
                }
            };

            match tungstenite::accept(stream) {
                Ok(socket) => {
                    debug!("live-reload client connected");
                    let mut clients = lock_clients(&clients);
                    clients.push(socket);

                    let len = clients.len();
                    if len > MAX_CLIENTS {
                        for mut socket in clients.drain(0..len - MAX_CLIENTS) {
                            socket.close(None).ok();
                        }
                    }
                }
                Err(e) => warn!(error = %e, "live-reload handshake failed"),
            }
        }
    });
}

fn spawn_broadcaster(clients: Clients) -> Sender<()> {
    let (tx, rx) = channel();

    std::thread::spawn(move || {
        while rx.recv().is_ok() {
            let mut clients = lock_clients(&clients);
            let mut broken = Vec::new();

            for (i, socket) in clients.iter_mut().enumerate() {
                match socket.send("reload".into()) {
                    Ok(()) => {}
                    Err(tungstenite::error::Error::Io(e))
                        if matches!(
                            e.kind(),
                            std::io::ErrorKind::BrokenPipe | std::io::ErrorKind::ConnectionReset
                        ) =>
                    {
                        broken.push(i);
                    }
                    Err(e) => {
                        warn!(error = %e, "live-reload send failed");
                    }
                }
            }

            for i in broken.into_iter().rev() {
                clients.remove(i);
            }

            debug!(clients = clients.len(), "reload notification sent");
        }
    });

    tx
}
