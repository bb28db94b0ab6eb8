//! Trait abstraction for serial port operations to enable testing

use async_trait::async_trait;
use std::io;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio_serial::{SerialPort, SerialPortBuilderExt};

/// Byte transport a receiver link runs over
///
/// Reads never wait for data that has not arrived yet: callers ask how many
/// bytes are available and read exactly those.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SerialPortIO: Send {
    /// Number of received bytes ready to be read without waiting
    fn bytes_available(&self) -> io::Result<usize>;

    /// Read up to `max` already received bytes
    async fn read_available(&mut self, max: usize) -> io::Result<Vec<u8>>;

    /// Write all data to the port
    async fn write_all(&mut self, data: &[u8]) -> io::Result<()>;

    /// Flush the output buffer
    async fn flush(&mut self) -> io::Result<()>;
}

/// Wrapper around tokio_serial::SerialStream that implements SerialPortIO
pub struct TokioSerialPort {
    port: tokio_serial::SerialStream,
    path: String,
}

impl std::fmt::Debug for TokioSerialPort {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokioSerialPort")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl TokioSerialPort {
    /// Open a serial device 8N1 without flow control and drop anything
    /// already sitting in its hardware buffers
    pub fn open(path: &str, baud_rate: u32, timeout: Duration) -> io::Result<Self> {
        let port = tokio_serial::new(path, baud_rate)
            .data_bits(tokio_serial::DataBits::Eight)
            .parity(tokio_serial::Parity::None)
            .stop_bits(tokio_serial::StopBits::One)
            .flow_control(tokio_serial::FlowControl::None)
            .timeout(timeout)
            .open_native_async()?;

        port.clear(tokio_serial::ClearBuffer::All)?;

        Ok(Self {
            port,
            path: path.to_string(),
        })
    }

    /// Device path this port was opened on
    pub fn path(&self) -> &str {
        &self.path
    }
}

#[async_trait]
impl SerialPortIO for TokioSerialPort {
    fn bytes_available(&self) -> io::Result<usize> {
        Ok(self.port.bytes_to_read()? as usize)
    }

    async fn read_available(&mut self, max: usize) -> io::Result<Vec<u8>> {
        let mut buf = vec![0u8; max];
        let n = AsyncReadExt::read(&mut self.port, &mut buf).await?;
        buf.truncate(n);
        Ok(buf)
    }

    async fn write_all(&mut self, data: &[u8]) -> io::Result<()> {
        AsyncWriteExt::write_all(&mut self.port, data).await
    }

    async fn flush(&mut self) -> io::Result<()> {
        AsyncWriteExt::flush(&mut self.port).await
    }
}
