//! Serial transport (§2 item 1): byte-level read/write with a configurable
//! bitrate and read timeout.
//!
//! Named out of scope by spec.md §1 ("the serial-port driver" is an
//! external collaborator) but required for the crate to be usable end to
//! end. [`Transport`] is the seam the request/confirm engine, the
//! indication pump, and `dualmcu-harness`'s in-process mock node all sit
//! behind; [`SerialTransport`] is the one real implementation, over the
//! `serialport` crate.

use std::{
    io::{self, Read, Write},
    time::Duration,
};

/// A byte-level, timeout-capable, full-duplex transport.
///
/// Reads are expected to honor `set_timeout`: a call to [`Read::read`]
/// that receives no bytes within the configured timeout should return
/// `Ok(0)` or an [`io::ErrorKind::TimedOut`] error, not block forever.
/// Every caller in this crate treats both the same way.
pub trait Transport: Read + Write + Send {
    /// Sets the timeout applied to subsequent reads.
    fn set_timeout(&mut self, timeout: Duration) -> io::Result<()>;
}

/// A real serial port, backed by the `serialport` crate.
pub struct SerialTransport {
    port: Box<dyn serialport::SerialPort>,
}

impl SerialTransport {
    /// Opens `port_name` at `bitrate`, with an initial read timeout.
    pub fn open(port_name: &str, bitrate: u32, timeout: Duration) -> io::Result<Self> {
        let port = serialport::new(port_name, bitrate)
            .timeout(timeout)
            .open()
            .map_err(to_io_error)?;
        Ok(Self { port })
    }
}

impl Read for SerialTransport {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self.port.read(buf) {
            Ok(n) => Ok(n),
            Err(e) if e.kind() == io::ErrorKind::TimedOut => Ok(0),
            Err(e) => Err(e),
        }
    }
}

impl Write for SerialTransport {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.port.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.port.flush()
    }
}

impl Transport for SerialTransport {
    fn set_timeout(&mut self, timeout: Duration) -> io::Result<()> {
        self.port.set_timeout(timeout).map_err(to_io_error)
    }
}

fn to_io_error(e: serialport::Error) -> io::Error {
    io::Error::other(e)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// A fixed byte source/sink used to exercise [`Transport`] consumers
    /// without a real port. `dualmcu-harness` provides the full in-process
    /// mock node; this is just enough to unit-test the tick-based read
    /// loop in `framed_io`.
    #[derive(Default)]
    pub struct ChannelTransport {
        pub inbox: std::collections::VecDeque<u8>,
        pub outbox: Vec<u8>,
    }

    impl Read for ChannelTransport {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            let mut n = 0;
            while n < buf.len() {
                let Some(b) = self.inbox.pop_front() else { break };
                buf[n] = b;
                n += 1;
            }
            Ok(n)
        }
    }

    impl Write for ChannelTransport {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.outbox.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl Transport for ChannelTransport {
        fn set_timeout(&mut self, _timeout: Duration) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn channel_transport_echoes_writes_into_outbox() {
        let mut t = ChannelTransport::default();
        t.write_all(&[1, 2, 3]).unwrap();
        assert_eq!(t.outbox, vec![1, 2, 3]);
    }
}
