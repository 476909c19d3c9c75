//! Serial transport: port discovery, connection, and the read/write tasks.
//!
//! The macro-pad enumerates as a USB CDC serial device.  Discovery scans
//! the serial library's port listing for the configured VID/PID instead of
//! asking the user to pick a port; a fixed port name in the config skips
//! the scan.
//!
//! I/O is split into two Tokio tasks bridged to the session by channels:
//!
//! - the **read task** forwards raw byte chunks exactly as they arrive
//!   (the session's `LineFramer` owns reassembly), and closes its channel
//!   on error or EOF, which the session loop treats as a disconnect;
//! - the **write task** drains outbound lines and appends the `'\n'`
//!   terminator.  Writes are fire-and-forget; the port's own send
//!   buffering is the backstop beyond the protocol's ACK discipline.

use thiserror::Error;
use tokio::io::{AsyncReadExt, AsyncWriteExt, ReadHalf, WriteHalf};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_serial::{SerialPort, SerialPortBuilderExt, SerialPortType, SerialStream};
use tracing::{debug, info, warn};

/// Error type for transport operations.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("failed to enumerate serial ports: {0}")]
    Enumerate(#[source] tokio_serial::Error),

    #[error("no serial device found with VID {vid:04X} PID {pid:04X}")]
    DeviceNotFound { vid: u16, pid: u16 },

    #[error("failed to open {port}: {source}")]
    Open {
        port: String,
        #[source]
        source: tokio_serial::Error,
    },
}

/// Scans the system port list for a USB serial device with the given
/// VID/PID and returns its port name.
///
/// # Errors
///
/// Returns [`TransportError::Enumerate`] if the port list cannot be read;
/// an empty scan result is `Ok(None)`, not an error.
pub fn find_port(vid: u16, pid: u16) -> Result<Option<String>, TransportError> {
    let ports = tokio_serial::available_ports().map_err(TransportError::Enumerate)?;
    for port in ports {
        if let SerialPortType::UsbPort(usb) = &port.port_type {
            if usb.vid == vid && usb.pid == pid {
                debug!(port = %port.port_name, "matched device by VID/PID");
                return Ok(Some(port.port_name));
            }
        }
    }
    Ok(None)
}

/// Opens the port and asserts DTR/RTS, which the board's CDC stack needs
/// before it starts talking.
///
/// # Errors
///
/// Returns [`TransportError::Open`] when the port cannot be opened or the
/// control lines cannot be set.
pub fn connect(port: &str, baud: u32) -> Result<SerialStream, TransportError> {
    let mut stream = tokio_serial::new(port, baud)
        .open_native_async()
        .map_err(|source| TransportError::Open {
            port: port.to_string(),
            source,
        })?;

    stream
        .write_data_terminal_ready(true)
        .and_then(|()| stream.write_request_to_send(true))
        .map_err(|source| TransportError::Open {
            port: port.to_string(),
            source,
        })?;

    info!(port, baud, "serial port opened");
    Ok(stream)
}

/// The channel ends the session loop talks to.
pub struct SerialLink {
    /// Raw inbound byte chunks.  Closed by the read task on disconnect.
    pub inbound: mpsc::UnboundedReceiver<Vec<u8>>,
    /// Outbound protocol lines (without terminators).
    pub outbound: mpsc::UnboundedSender<String>,
}

/// Splits the stream and spawns the read and write tasks.
pub fn start_io(stream: SerialStream) -> (SerialLink, JoinHandle<()>, JoinHandle<()>) {
    let (read_half, write_half) = tokio::io::split(stream);
    let (inbound_tx, inbound_rx) = mpsc::unbounded_channel();
    let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();

    let reader = tokio::spawn(read_loop(read_half, inbound_tx));
    let writer = tokio::spawn(write_loop(write_half, outbound_rx));

    (
        SerialLink {
            inbound: inbound_rx,
            outbound: outbound_tx,
        },
        reader,
        writer,
    )
}

async fn read_loop(
    mut reader: ReadHalf<SerialStream>,
    inbound: mpsc::UnboundedSender<Vec<u8>>,
) {
    let mut buf = [0u8; 256];
    loop {
        match reader.read(&mut buf).await {
            Ok(0) => {
                debug!("serial stream reached EOF");
                break;
            }
            Ok(n) => {
                if inbound.send(buf[..n].to_vec()).is_err() {
                    // Session gone; nothing left to feed.
                    break;
                }
            }
            Err(e) => {
                warn!(error = %e, "serial read failed");
                break;
            }
        }
    }
    // Dropping `inbound` closes the channel, which the session loop
    // observes as a disconnect.
}

async fn write_loop(
    mut writer: WriteHalf<SerialStream>,
    mut outbound: mpsc::UnboundedReceiver<String>,
) {
    while let Some(line) = outbound.recv().await {
        debug!(line = %line, "serial write");
        let result = async {
            writer.write_all(line.as_bytes()).await?;
            writer.write_all(b"\n").await
        }
        .await;
        if let Err(e) = result {
            warn!(error = %e, "serial write failed");
            break;
        }
    }
}
