//! Listening socket and worker pool.
//!
//! One socket is bound up front and shared by `workers` threads. Each thread
//! runs its own blocking accept, read, handle, write, close cycle; the kernel
//! accept queue decides which worker gets which connection, so no locking is
//! involved. Connections carry exactly one request.
//!
//! Reads are a single `read` of at most `buffer_size` bytes. Anything the
//! client sends beyond that is ignored. There is no read timeout either, so a
//! client that connects and stays silent ties up its worker.

use std::fmt::Display;
use std::io::{self, Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream, ToSocketAddrs};
use std::sync::Arc;
use std::thread;

use futures::future::poll_fn;
use futures_executor::block_on;
use log::{debug, error, info, warn};
use socket2::{Domain, Protocol, Socket, Type};

use crate::config::ServerConfig;
use crate::error::{Error, Result};
use crate::http::{Response, parse};
use crate::service::Service;

pub struct Server<S> {
    listener: Arc<TcpListener>,
    local_addr: SocketAddr,
    workers: usize,
    buffer_size: usize,
    service: S,
}

impl<S> Server<S>
where
    S: Service<Response = Response> + Clone + Send + 'static,
    S::Error: Display,
{
    /// Binds and starts listening. No connection is accepted until `run`.
    pub fn bind(config: &ServerConfig, service: S) -> Result<Self> {
        let listener = bind_listener(config)?;
        let local_addr = listener.local_addr()?;

        Ok(Server {
            listener: Arc::new(listener),
            local_addr,
            workers: config.workers.max(1),
            buffer_size: config.buffer_size.max(1),
            service,
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Spawns the workers and waits for all of them. Workers loop forever, so
    /// this only returns if a worker cannot be started or dies.
    pub fn run(self) -> Result<()> {
        let mut workers = Vec::with_capacity(self.workers);

        for id in 0..self.workers {
            let name = format!("worker-{id}");
            let listener = Arc::clone(&self.listener);
            let mut service = self.service.clone();
            let buffer_size = self.buffer_size;

            let handle = thread::Builder::new()
                .name(name.clone())
                .spawn(move || worker_loop(&listener, &mut service, buffer_size))?;

            info!("Running {} on {}", name, self.local_addr);
            workers.push((name, handle));
        }

        let mut result = Ok(());
        for (name, handle) in workers {
            if handle.join().is_err() {
                error!("{} panicked", name);
                result = Err(Error::WorkerPanicked(name));
            }
        }
        result
    }
}

fn bind_listener(config: &ServerConfig) -> Result<TcpListener> {
    let addr = config.address();
    // Resolve from the parts so IPv6 literals need no brackets
    let host = config.host.trim_start_matches('[').trim_end_matches(']');
    let socket_addr = (host, config.port)
        .to_socket_addrs()
        .ok()
        .and_then(|mut addrs| addrs.next())
        .ok_or_else(|| Error::Resolve(addr.clone()))?;

    let socket = Socket::new(
        Domain::for_address(socket_addr),
        Type::STREAM,
        Some(Protocol::TCP),
    )?;

    // SO_REUSEADDR - allow binding to address in TIME_WAIT
    socket.set_reuse_address(true)?;

    let bind_error = |source: io::Error| Error::Bind {
        addr: addr.clone(),
        source,
    };
    socket.bind(&socket_addr.into()).map_err(bind_error)?;
    socket
        .listen(i32::try_from(config.backlog).unwrap_or(i32::MAX))
        .map_err(bind_error)?;

    Ok(socket.into())
}

fn worker_loop<S>(listener: &TcpListener, service: &mut S, buffer_size: usize)
where
    S: Service<Response = Response>,
    S::Error: Display,
{
    loop {
        match listener.accept() {
            Ok((stream, peer)) => {
                debug!("accepted {}", peer);
                if let Err(e) = handle_connection(stream, service, buffer_size) {
                    warn!("Error handling client {}: {}", peer, e);
                }
            }
            Err(e) => warn!("Connection failed: {}", e),
        }
    }
}

/// Serves one request on `stream` and closes it.
///
/// A blank read or an unparseable one closes the connection without writing
/// anything. Only transport errors are returned.
pub fn handle_connection<S>(mut stream: TcpStream, service: &mut S, buffer_size: usize) -> io::Result<()>
where
    S: Service<Response = Response>,
    S::Error: Display,
{
    let mut buffer = vec![0; buffer_size];
    let bytes_read = stream.read(&mut buffer)?;
    let data = &buffer[..bytes_read];

    if data.trim_ascii().is_empty() {
        debug!("empty request, closing");
        return Ok(());
    }

    let request = match parse(data) {
        Ok(request) => request,
        Err(e) => {
            warn!("Failed to parse request: {}", e);
            return Ok(());
        }
    };

    if let Err(e) = block_on(poll_fn(|cx| service.poll_ready(cx))) {
        warn!("Service not ready: {}", e);
        return Ok(());
    }

    let response = match block_on(service.call(request)) {
        Ok(response) => response,
        Err(e) => {
            error!("Error processing request: {}", e);
            return Ok(());
        }
    };

    stream.write_all(&response.to_bytes())?;
    stream.flush()
}
