//! codec-audio - firmware entry point
//!
//! 1. UART log drain, board report
//! 2. Audio task on core 1 (I2S full duplex, one callback per buffer)
//! 3. Codec bring-up on core 0; stall with a fast LED toggle on failure
//! 4. Control loop: LED pattern, mode button, log drain

#![cfg_attr(target_os = "espidf", no_std, no_main)]

/// Host builds only compile the library; the firmware runs on ESP-IDF.
#[cfg(not(target_os = "espidf"))]
fn main() {}

#[cfg(target_os = "espidf")]
#[no_mangle]
fn main() {
    firmware::run();
}

#[cfg(target_os = "espidf")]
mod firmware {
    use core::ffi::c_void;

    use esp_idf_svc::hal::delay::{Delay, FreeRtos};
    use esp_idf_svc::hal::gpio::{AnyIOPin, AnyOutputPin, Input, Output, PinDriver, Pull};
    use esp_idf_svc::hal::peripherals::Peripherals;
    use esp_idf_svc::hal::uart::UartTxDriver;
    use esp_idf_svc::nvs::EspDefaultNvsPartition;
    use esp_idf_svc::sys as esp_idf_sys;

    use codec_audio_fw::audio::{AudioEngine, AudioLockout, AudioMode, ModeController, ModeRequest};
    use codec_audio_fw::codec::{
        Aic3101, Codec, CodecError, CodecKind, Es8311, Nau88c22, SequenceReport, Sgtl5000, Uda1345,
        Wm8731,
    };
    use codec_audio_fw::config::{nvs, FirmwareConfig, CONFIG};
    use codec_audio_fw::fault::{FaultCode, FaultState};
    use codec_audio_fw::hal::{EspI2cBus, I2sPort};
    use codec_audio_fw::log_drain::{self, UartLoggerConfig};
    use codec_audio_fw::logging::timestamp_us;
    use codec_audio_fw::panel::{Blinker, ButtonEdge, FAULT_TOGGLE_US};
    use codec_audio_fw::{ctrl_error, ctrl_info, ctrl_warn};

    const SAMPLES_PER_BUFFER: usize = CONFIG.samples_per_buffer();
    const AUDIO_TASK_STACK: u32 = 8192;
    const AUDIO_TASK_PRIORITY: u32 = 20;
    const AUDIO_CORE: i32 = 1;

    static MODES: ModeController = ModeController::new(FirmwareConfig::MODE_COUNT);
    static LOCKOUT: AudioLockout = AudioLockout::new();
    static FAULT_STATE: FaultState = FaultState::new();

    type Led = PinDriver<'static, AnyOutputPin, Output>;
    type Button = PinDriver<'static, AnyIOPin, Input>;

    pub fn run() {
        esp_idf_sys::link_patches();

        let Ok(peripherals) = Peripherals::take() else {
            return;
        };

        let uart_config = UartLoggerConfig {
            baud_rate: CONFIG.log_baud,
        };
        // SAFETY: the log TX GPIO is claimed nowhere else.
        let tx_pin = unsafe { AnyOutputPin::new(CONFIG.log_tx_pin) };
        let mut uart = log_drain::init_uart_logger(peripherals.uart1, tx_pin, &uart_config).ok();

        ctrl_info!("{}", env!("VERSION_STRING"));
        ctrl_info!("Codec: {}", CONFIG.codec.name());
        drain(&mut uart);

        let (mut led, button) = match panel_pins() {
            Ok(pins) => pins,
            Err(_) => {
                FAULT_STATE.set(FaultCode::Hardware, 0);
                return;
            }
        };

        start_audio_task();

        match bring_up_codec(CONFIG.codec, &mut uart) {
            Ok(report) if report.is_clean() => {
                ctrl_info!(
                    "{} initialized: {} writes, {} attempts",
                    CONFIG.codec.name(),
                    report.writes,
                    report.attempts
                );
            }
            Ok(report) => {
                ctrl_error!(
                    "{} init failed: {} of {} registers",
                    CONFIG.codec.name(),
                    report.failures,
                    report.writes
                );
                FAULT_STATE.set(FaultCode::CodecInit, report.failures);
            }
            Err(e) => {
                ctrl_error!("{} init failed: {}", CONFIG.codec.name(), e);
                FAULT_STATE.set(FaultCode::CodecInit, 0);
            }
        }

        if FAULT_STATE.is_active() {
            stall(&mut led, &mut uart);
        }

        let nvs_partition = EspDefaultNvsPartition::take().ok();
        let stored = match &nvs_partition {
            Some(partition) => nvs::load_mode(partition),
            None => Ok(nvs::LoadResult::FreshInstall),
        };
        if let Err(e) = &stored {
            ctrl_warn!("NVS load failed: {:?}, using defaults", e);
        }
        let mut mode = nvs::startup_mode(&stored, CONFIG.initial_mode);
        apply_mode(mode);

        control_loop(&mut mode, &mut led, &button, &mut uart, nvs_partition.as_ref());
    }

    fn panel_pins() -> Result<(Led, Button), esp_idf_sys::EspError> {
        // SAFETY: the LED and button GPIOs are claimed nowhere else.
        let (led_pin, button_pin) = unsafe {
            (
                AnyOutputPin::new(CONFIG.led_pin),
                AnyIOPin::new(CONFIG.button_pin),
            )
        };
        let led = PinDriver::output(led_pin)?;
        let mut button = PinDriver::input(button_pin)?;
        button.set_pull(Pull::Up)?;
        Ok((led, button))
    }

    fn control_loop(
        mode: &mut AudioMode,
        led: &mut Led,
        button: &Button,
        uart: &mut Option<UartTxDriver<'static>>,
        nvs_partition: Option<&EspDefaultNvsPartition>,
    ) -> ! {
        let mut blinker = Blinker::new(*mode, timestamp_us());
        let mut edge = ButtonEdge::new();
        let _ = led.set_high();

        loop {
            let now = timestamp_us();

            if let Some(lit) = blinker.poll(now) {
                let _ = led.set_level(lit.into());
            }

            if edge.update(button.is_low()) {
                let next = mode.next();
                if apply_mode(next) {
                    *mode = next;
                    blinker.restart(next, timestamp_us());
                    let _ = led.set_high();

                    if let Some(partition) = nvs_partition {
                        match nvs::save_mode(partition, &LOCKOUT, CONFIG.handoff, next) {
                            Ok(()) => {}
                            Err(nvs::NvsError::Lockout(e)) => {
                                ctrl_error!("Audio lockout failed: {}", e);
                                FAULT_STATE.set(FaultCode::Lockout, u8::from(next) as u32);
                            }
                            Err(e) => ctrl_warn!("NVS save failed: {:?}", e),
                        }
                    }
                }
            }

            if FAULT_STATE.is_active() {
                stall(led, uart);
            }

            drain(uart);
            FreeRtos::delay_ms(CONFIG.poll_ms);
        }
    }

    /// Hand `mode` to the audio core. Returns `false` and latches a fault if
    /// the audio core did not take it.
    fn apply_mode(mode: AudioMode) -> bool {
        match MODES.request_with(mode.into(), CONFIG.handoff, || FreeRtos::delay_ms(1)) {
            Ok(ModeRequest::Applied { polls }) => {
                ctrl_info!("State {} ({:?}) after {} polls", u8::from(mode), mode, polls);
                true
            }
            Ok(ModeRequest::Unchanged) => true,
            Err(e) => {
                ctrl_error!("Mode change failed: {}", e);
                FAULT_STATE.set(FaultCode::ModeHandoff, u8::from(mode) as u32);
                false
            }
        }
    }

    /// Fault: no more bus traffic, toggle the LED every 50 ms until reset.
    fn stall(led: &mut Led, uart: &mut Option<UartTxDriver<'static>>) -> ! {
        let fault = FAULT_STATE.snapshot();
        ctrl_error!("Stalled: {:?} data {}", fault.code, fault.data);
        loop {
            let _ = led.toggle();
            drain(uart);
            FreeRtos::delay_ms((FAULT_TOGGLE_US / 1000) as u32);
        }
    }

    fn drain(uart: &mut Option<UartTxDriver<'static>>) {
        if let Some(uart) = uart.as_mut() {
            log_drain::drain_all(&mut |bytes: &[u8]| {
                let _ = uart.write(bytes);
            });
        }
    }

    // ---- Codec bring-up (control context, core 0) ----

    fn bring_up_codec(
        kind: CodecKind,
        uart: &mut Option<UartTxDriver<'static>>,
    ) -> Result<SequenceReport, CodecError> {
        let delay = Delay::new_default();

        match kind {
            CodecKind::Wm8731 => init(&mut Wm8731::new(i2c_bus()?, delay)),
            CodecKind::Aic3101 => {
                let reset = output_pin(CONFIG.codec_reset_pin)?;
                let mut codec = Aic3101::new(i2c_bus()?, reset, delay);
                let report = init(&mut codec)?;
                // Flush init lines before the 109-register dump.
                drain(uart);
                codec.dump_registers()?;
                Ok(report)
            }
            CodecKind::Nau88c22 => {
                let mut codec = Nau88c22::new(i2c_bus()?, delay);
                let report = init(&mut codec)?;
                if let (Ok(id), Ok(rev)) = (codec.chip_id(), codec.revision()) {
                    ctrl_info!("NAU88C22 ID = 0x{:03X}, Rev = 0x{:03X}", id, rev);
                }
                Ok(report)
            }
            CodecKind::Sgtl5000 => {
                let mut codec = Sgtl5000::new(i2c_bus()?, delay);
                let report = init(&mut codec)?;
                if let Ok(id) = codec.chip_id() {
                    ctrl_info!("SGTL5000 ID = 0x{:04X}", id);
                }
                Ok(report)
            }
            CodecKind::Uda1345 => {
                let mut codec = Uda1345::new(
                    output_pin(CONFIG.l3.data_pin)?,
                    output_pin(CONFIG.l3.clock_pin)?,
                    output_pin(CONFIG.l3.mode_pin)?,
                    delay,
                );
                init(&mut codec)
            }
            CodecKind::Es8311 => {
                let mut codec = Es8311::new(i2c_bus()?, delay);
                let report = init(&mut codec)?;
                if let Ok(id) = codec.chip_id() {
                    ctrl_info!("ES8311 ID = 0x{:04X}", id);
                }
                Ok(report)
            }
        }
    }

    fn i2c_bus() -> Result<EspI2cBus, CodecError> {
        EspI2cBus::new(&CONFIG.i2c).map_err(|e| {
            ctrl_error!("I2C init failed: {}", e);
            CodecError::Transport
        })
    }

    fn output_pin(gpio: i32) -> Result<PinDriver<'static, AnyOutputPin, Output>, CodecError> {
        // SAFETY: codec control GPIOs are each claimed once, here.
        let pin = unsafe { AnyOutputPin::new(gpio) };
        PinDriver::output(pin).map_err(|_| CodecError::Transport)
    }

    fn init(codec: &mut dyn Codec) -> Result<SequenceReport, CodecError> {
        ctrl_info!("Initializing {}", codec.name());
        codec.init()
    }

    // ---- Audio task (core 1) ----

    fn start_audio_task() {
        // SAFETY: the task entry never returns to its caller and takes no
        // argument; the name is a static C string.
        let created = unsafe {
            esp_idf_sys::xTaskCreatePinnedToCore(
                Some(audio_task),
                c"audio".as_ptr(),
                AUDIO_TASK_STACK,
                core::ptr::null_mut(),
                AUDIO_TASK_PRIORITY,
                core::ptr::null_mut(),
                AUDIO_CORE,
            )
        };
        if created != 1 {
            ctrl_error!("Audio task creation failed");
            FAULT_STATE.set(FaultCode::Hardware, 1);
        }
    }

    unsafe extern "C" fn audio_task(_arg: *mut c_void) {
        audio_loop();
        // SAFETY: deleting the calling task (null handle) is always valid.
        unsafe { esp_idf_sys::vTaskDelete(core::ptr::null_mut()) };
    }

    fn audio_loop() {
        let mut port = match I2sPort::<SAMPLES_PER_BUFFER>::new(&CONFIG.i2s, CONFIG.sample_rate) {
            Ok(port) => port,
            Err(_) => {
                FAULT_STATE.set(FaultCode::Hardware, 2);
                return;
            }
        };

        let mut engine = AudioEngine::new(CONFIG.tone_hz, CONFIG.sample_rate, &MODES, &LOCKOUT);

        loop {
            let result = port.transfer(|output, input| {
                engine.process_with(output, input, || FreeRtos::delay_ms(1));
            });
            if result.is_err() {
                FAULT_STATE.set(FaultCode::Hardware, 3);
                return;
            }
        }
    }
}
