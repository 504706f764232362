//! Serial port transport.
//!
//! Wraps a `serialport` handle as a [`Transport`].  The dome controller
//! runs at 9600 baud, 8 data bits, no parity, one stop bit.  Reads only
//! take what the driver has already buffered, so the control loop never
//! blocks on an idle line.

use std::io::{self, Read, Write};
use std::time::Duration;

use log::info;
use serialport::{DataBits, Parity, SerialPort, StopBits};

use crate::config::SerialConfig;
use crate::protocol::transport::Transport;

pub struct SerialTransport {
    port: Box<dyn SerialPort>,
}

impl SerialTransport {
    /// Open the port named in `config`.
    pub fn open(config: &SerialConfig) -> Result<Self, serialport::Error> {
        let port = serialport::new(&config.port, config.baud)
            .data_bits(DataBits::Eight)
            .parity(Parity::None)
            .stop_bits(StopBits::One)
            .timeout(Duration::from_millis(config.timeout_ms))
            .open()?;
        info!("serial: opened {} at {} baud", config.port, config.baud);
        Ok(Self { port })
    }
}

impl Transport for SerialTransport {
    type Error = io::Error;

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, io::Error> {
        let available = usize::try_from(self.port.bytes_to_read()?).unwrap_or(usize::MAX);
        if available == 0 {
            return Ok(0);
        }
        let len = available.min(buf.len());
        match self.port.read(&mut buf[..len]) {
            Ok(n) => Ok(n),
            Err(e) if e.kind() == io::ErrorKind::TimedOut => Ok(0),
            Err(e) => Err(e),
        }
    }

    fn write_all(&mut self, data: &[u8]) -> Result<(), io::Error> {
        self.port.write_all(data)
    }

    fn flush(&mut self) -> Result<(), io::Error> {
        self.port.flush()
    }
}
