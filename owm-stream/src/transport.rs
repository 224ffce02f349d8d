// SPDX-License-Identifier: Apache-2.0

//! Byte transport and time source used by the client.

/// A byte stream to the weather service.
///
/// Calls are expected to return promptly; the client polls in a loop and
/// relies on [`Clock`] to give up on a silent peer.
pub trait Transport {
    /// Connects to `host:port`, returning `false` on failure.
    fn open(&mut self, host: &str, port: u16) -> bool;

    /// Whether the peer may still send data.
    fn is_alive(&mut self) -> bool;

    /// Whether [`Self::read_byte`] would return a byte right now.
    fn has_buffered_data(&mut self) -> bool;

    fn read_byte(&mut self) -> Option<u8>;

    /// Sends all of `data`, returning `false` on failure.
    fn write(&mut self, data: &[u8]) -> bool;

    fn close(&mut self);

    /// Called once per poll iteration so the platform can run other work.
    fn yield_now(&mut self) {}
}

/// Monotonic millisecond counter.
pub trait Clock {
    fn now_ms(&self) -> u64;
}

impl<T: Transport + ?Sized> Transport for &mut T {
    fn open(&mut self, host: &str, port: u16) -> bool {
        (**self).open(host, port)
    }
    fn is_alive(&mut self) -> bool {
        (**self).is_alive()
    }
    fn has_buffered_data(&mut self) -> bool {
        (**self).has_buffered_data()
    }
    fn read_byte(&mut self) -> Option<u8> {
        (**self).read_byte()
    }
    fn write(&mut self, data: &[u8]) -> bool {
        (**self).write(data)
    }
    fn close(&mut self) {
        (**self).close()
    }
    fn yield_now(&mut self) {
        (**self).yield_now()
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now_ms(&self) -> u64 {
        (**self).now_ms()
    }
}

#[cfg(feature = "std")]
pub use self::tcp::{SystemClock, TcpTransport};

#[cfg(feature = "std")]
mod tcp {
    use std::io::{ErrorKind, Read, Write};
    use std::net::{TcpStream, ToSocketAddrs};
    use std::time::{Duration, Instant};

    use log::{info, warn};

    use super::{Clock, Transport};
    use crate::config::DEFAULT_IDLE_TIMEOUT_MS;

    const READ_BUFFER_LEN: usize = 512;

    /// Plain TCP over `std::net`.
    ///
    /// The socket is switched to non-blocking mode once the request is sent,
    /// so polling never stalls the loop. Connecting is bounded by
    /// [`Self::with_connect_timeout`] per resolved address.
    pub struct TcpTransport {
        stream: Option<TcpStream>,
        connect_timeout: Duration,
        buffer: [u8; READ_BUFFER_LEN],
        start: usize,
        end: usize,
        peer_closed: bool,
    }

    impl Default for TcpTransport {
        fn default() -> Self {
            Self::new()
        }
    }

    impl TcpTransport {
        pub fn new() -> Self {
            Self {
                stream: None,
                connect_timeout: Duration::from_millis(DEFAULT_IDLE_TIMEOUT_MS),
                buffer: [0; READ_BUFFER_LEN],
                start: 0,
                end: 0,
                peer_closed: false,
            }
        }

        pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
            self.connect_timeout = timeout;
            self
        }

        fn connect(&self, host: &str, port: u16) -> Option<TcpStream> {
            let addrs = match (host, port).to_socket_addrs() {
                Ok(addrs) => addrs,
                Err(e) => {
                    warn!("Cannot resolve {host}: {e}");
                    return None;
                }
            };
            for addr in addrs {
                match TcpStream::connect_timeout(&addr, self.connect_timeout) {
                    Ok(stream) => return Some(stream),
                    Err(e) => warn!("Connection to {addr} failed: {e}"),
                }
            }
            None
        }

        fn fill(&mut self) {
            if self.start < self.end || self.peer_closed {
                return;
            }
            let Some(stream) = self.stream.as_mut() else {
                return;
            };
            match stream.read(&mut self.buffer) {
                Ok(0) => self.peer_closed = true,
                Ok(n) => {
                    self.start = 0;
                    self.end = n;
                }
                Err(e) if e.kind() == ErrorKind::WouldBlock || e.kind() == ErrorKind::Interrupted => {}
                Err(e) => {
                    warn!("Read failed: {e}");
                    self.peer_closed = true;
                }
            }
        }
    }

    impl Transport for TcpTransport {
        fn open(&mut self, host: &str, port: u16) -> bool {
            self.close();
            let Some(stream) = self.connect(host, port) else {
                return false;
            };
            info!("Connected to {host}:{port}");
            self.stream = Some(stream);
            self.peer_closed = false;
            true
        }

        fn is_alive(&mut self) -> bool {
            self.fill();
            self.stream.is_some() && !self.peer_closed
        }

        fn has_buffered_data(&mut self) -> bool {
            self.fill();
            self.start < self.end
        }

        fn read_byte(&mut self) -> Option<u8> {
            self.fill();
            if self.start < self.end {
                let byte = self.buffer[self.start];
                self.start += 1;
                Some(byte)
            } else {
                None
            }
        }

        fn write(&mut self, data: &[u8]) -> bool {
            let Some(stream) = self.stream.as_mut() else {
                return false;
            };
            match stream.write_all(data).and_then(|()| stream.set_nonblocking(true)) {
                Ok(()) => true,
                Err(e) => {
                    warn!("Write failed: {e}");
                    false
                }
            }
        }

        fn close(&mut self) {
            self.stream = None;
            self.start = 0;
            self.end = 0;
            self.peer_closed = false;
        }

        fn yield_now(&mut self) {
            std::thread::sleep(Duration::from_millis(1));
        }
    }

    /// Milliseconds since construction.
    pub struct SystemClock {
        origin: Instant,
    }

    impl Default for SystemClock {
        fn default() -> Self {
            Self::new()
        }
    }

    impl SystemClock {
        pub fn new() -> Self {
            Self {
                origin: Instant::now(),
            }
        }
    }

    impl Clock for SystemClock {
        fn now_ms(&self) -> u64 {
            u64::try_from(self.origin.elapsed().as_millis()).unwrap_or(u64::MAX)
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use std::net::TcpListener;
        use test_log::test;

        #[test]
        fn test_reads_until_peer_closes() {
            let listener = TcpListener::bind("127.0.0.1:0").unwrap();
            let port = listener.local_addr().unwrap().port();
            let server = std::thread::spawn(move || {
                let (mut peer, _) = listener.accept().unwrap();
                let mut request = [0u8; 4];
                peer.read_exact(&mut request).unwrap();
                peer.write_all(b"pong").unwrap();
                request
            });

            let mut transport =
                TcpTransport::new().with_connect_timeout(Duration::from_millis(500));
            assert!(transport.open("127.0.0.1", port));
            assert!(transport.write(b"ping"));
            let mut received = Vec::new();
            while transport.is_alive() || transport.has_buffered_data() {
                while let Some(byte) = transport.read_byte() {
                    received.push(byte);
                }
                transport.yield_now();
            }
            assert_eq!(received, b"pong");
            assert_eq!(&server.join().unwrap(), b"ping");
            transport.close();
            assert!(!transport.is_alive());
        }

        #[test]
        fn test_refused_connection() {
            let port = {
                let listener = TcpListener::bind("127.0.0.1:0").unwrap();
                listener.local_addr().unwrap().port()
            };
            let mut transport =
                TcpTransport::new().with_connect_timeout(Duration::from_millis(500));
            assert!(!transport.open("127.0.0.1", port));
            assert!(!transport.is_alive());
            assert!(!transport.write(b"ping"));
        }
    }
}
