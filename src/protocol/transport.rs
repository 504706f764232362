//! Byte channel to the dome controller.
//!
//! The production implementation is the serial port adapter
//! ([`SerialTransport`](crate::adapters::serial::SerialTransport)); tests
//! use in-memory scripted transports.  The [`SerialLink`](super::link::SerialLink)
//! is generic over `Transport`, so framing never depends on the port type.

/// Byte-oriented transport channel.
pub trait Transport {
    /// Error type for this transport.
    type Error: core::fmt::Debug;

    /// Read whatever is available, up to `buf.len()` bytes.
    /// Returns 0 when nothing arrived before the port timeout.
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error>;

    /// Write all of `data`.
    fn write_all(&mut self, data: &[u8]) -> Result<(), Self::Error>;

    /// Flush any buffered output.
    fn flush(&mut self) -> Result<(), Self::Error>;
}
