//! An in-process, full-duplex byte pipe implementing [`Transport`] on both
//! ends, so [`crate::MockNode`] and [`dualmcu_core::Engine`] can be wired
//! together without a real serial port.
//!
//! Grounded in `dualmcu-core`'s own `transport::tests::ChannelTransport`
//! (a one-sided fixed buffer used to unit-test `framed_io`): this is the
//! same idea generalized to two live ends connected by channels, the way
//! an integration harness needs.

use std::{
    io::{self, Read, Write},
    sync::mpsc::{Receiver, Sender, TryRecvError, channel, RecvTimeoutError},
    time::Duration,
};

use dualmcu_core::Transport;

/// One end of an in-process duplex byte pipe.
pub struct DuplexTransport {
    tx: Sender<u8>,
    rx: Receiver<u8>,
    timeout: Duration,
}

/// Creates a connected pair of [`DuplexTransport`]s: bytes written to one
/// are read from the other, in both directions.
#[must_use]
pub fn pair() -> (DuplexTransport, DuplexTransport) {
    let (a_tx, a_rx) = channel();
    let (b_tx, b_rx) = channel();
    let default_timeout = Duration::from_millis(100);
    (
        DuplexTransport { tx: a_tx, rx: b_rx, timeout: default_timeout },
        DuplexTransport { tx: b_tx, rx: a_rx, timeout: default_timeout },
    )
}

impl Read for DuplexTransport {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        let first = match self.rx.recv_timeout(self.timeout) {
            Ok(byte) => byte,
            Err(RecvTimeoutError::Timeout) => return Ok(0),
            Err(RecvTimeoutError::Disconnected) => return Ok(0),
        };
        buf[0] = first;
        let mut n = 1;
        while n < buf.len() {
            match self.rx.try_recv() {
                Ok(byte) => {
                    buf[n] = byte;
                    n += 1;
                }
                Err(TryRecvError::Empty | TryRecvError::Disconnected) => break,
            }
        }
        Ok(n)
    }
}

impl Write for DuplexTransport {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        for &byte in buf {
            self.tx.send(byte).map_err(|_| io::Error::other("peer disconnected"))?;
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Transport for DuplexTransport {
    fn set_timeout(&mut self, timeout: Duration) -> io::Result<()> {
        self.timeout = timeout;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_on_one_end_arrive_on_the_other() {
        let (mut a, mut b) = pair();
        a.write_all(&[1, 2, 3]).unwrap();
        let mut buf = [0u8; 8];
        let n = b.read(&mut buf).unwrap();
        assert_eq!(&buf[..n], &[1, 2, 3]);
    }

    #[test]
    fn read_times_out_when_nothing_arrives() {
        let (_a, mut b) = pair();
        b.set_timeout(Duration::from_millis(20)).unwrap();
        let mut buf = [0u8; 8];
        assert_eq!(b.read(&mut buf).unwrap(), 0);
    }

    #[test]
    fn both_directions_are_independent() {
        let (mut a, mut b) = pair();
        a.write_all(&[9]).unwrap();
        b.write_all(&[7]).unwrap();
        let mut buf = [0u8; 1];
        assert_eq!(b.read(&mut buf).unwrap(), 1);
        assert_eq!(buf[0], 9);
        assert_eq!(a.read(&mut buf).unwrap(), 1);
        assert_eq!(buf[0], 7);
    }
}
