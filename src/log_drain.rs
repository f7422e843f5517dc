//! Log drain: moves queued records from the log streams to a byte sink.
//!
//! On target the sink is UART1 TX (TX-only, external USB-UART adapter):
//!
//! ```text
//! ESP32-S3 GPIO43 (TX) ──────▶ USB-UART RX ──▶ serial monitor
//! ```
//!
//! Runs in the control context between button polls; never on the audio core.

use crate::logging::{LogEntry, LogStream, SliceWriter};

/// Longest formatted line: prefix + message + newline.
pub const LINE_LEN: usize = crate::logging::MAX_MSG_LEN + 40;

/// Format one record as `[timestamp_us] LEVEL src: message\n`.
pub fn format_log_entry(entry: &LogEntry, source: &str, buf: &mut [u8]) -> usize {
    use core::fmt::Write;

    let mut writer = SliceWriter::new(buf);
    let _ = write!(
        writer,
        "[{:10}] {:5} {}: {}\n",
        entry.timestamp_us,
        entry.level.as_str(),
        source,
        entry.message()
    );
    writer.len()
}

/// Drain every pending record of `stream` into `sink`. Returns the count.
///
/// A drop report line is emitted first if the stream overflowed since the
/// last drain.
pub fn drain_stream<const N: usize>(
    stream: &LogStream<N>,
    source: &str,
    sink: &mut impl FnMut(&[u8]),
) -> usize {
    let mut line = [0u8; LINE_LEN];

    let dropped = stream.take_dropped();
    if dropped > 0 {
        let len = crate::logging::format_to_buffer(
            &mut line,
            format_args!("[WARN] {}: {} log records dropped\n", source, dropped),
        );
        sink(&line[..len]);
    }

    let mut count = 0;
    while let Some(entry) = stream.drain() {
        let len = format_log_entry(&entry, source, &mut line);
        sink(&line[..len]);
        count += 1;
    }
    count
}

/// Drain both global streams, control first.
pub fn drain_all(sink: &mut impl FnMut(&[u8])) -> usize {
    drain_stream(&crate::log_globals::CTRL_LOG, "ctrl", sink)
        + drain_stream(&crate::log_globals::AUDIO_LOG, "audio", sink)
}

#[cfg(target_os = "espidf")]
pub use target::{init_uart_logger, UartLoggerConfig};

#[cfg(target_os = "espidf")]
mod target {
    use esp_idf_svc::hal::gpio;
    use esp_idf_svc::hal::peripheral::Peripheral;
    use esp_idf_svc::hal::uart::{self, UartTxDriver};
    use esp_idf_svc::hal::units::Hertz;
    use esp_idf_svc::sys::EspError;

    /// UART configuration for the log drain.
    pub struct UartLoggerConfig {
        pub baud_rate: u32,
    }

    impl Default for UartLoggerConfig {
        fn default() -> Self {
            Self { baud_rate: 115_200 }
        }
    }

    /// Bring up UART1 in TX-only mode for log output.
    pub fn init_uart_logger<'d>(
        uart: impl Peripheral<P = uart::UART1> + 'd,
        tx_pin: impl Peripheral<P = impl gpio::OutputPin> + 'd,
        config: &UartLoggerConfig,
    ) -> Result<UartTxDriver<'d>, EspError> {
        let uart_config = uart::config::Config::default().baudrate(Hertz(config.baud_rate));

        UartTxDriver::new(
            uart,
            tx_pin,
            Option::<gpio::AnyIOPin>::None, // CTS
            Option::<gpio::AnyIOPin>::None, // RTS
            &uart_config,
        )
    }
}
