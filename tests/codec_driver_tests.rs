//! Per-codec framing, reset sequencing and error handling over a mock bus

mod common;

use codec_audio_fw::codec::{
    aic3101, es8311, nau88c22, sgtl5000, wm8731, Aic3101, BusPhase, Codec, CodecError, Es8311,
    Nau88c22, RegisterBus, Sgtl5000, Wm8731,
};
use codec_audio_fw::codec::table::write_count;
use common::{count, trace, writes, Event, MockBus, MockDelay, MockPin};

fn is_reset(e: &Event) -> bool {
    matches!(e, Event::BusReset)
}

// ============================================================================
// WM8731
// ============================================================================

#[test]
fn test_wm8731_init_frames() {
    let t = trace();
    let mut codec = Wm8731::new(MockBus::new(&t), MockDelay::new(&t));

    let report = codec.init().unwrap();
    assert!(report.is_clean());
    assert_eq!(report.writes, write_count(wm8731::INIT_TABLE) as u32);

    let frames = writes(&t);
    assert_eq!(frames.len(), 11);
    assert_eq!(frames[0], vec![0x1E, 0x00]); // soft reset, reg 0x0F
    assert_eq!(frames[5], vec![0x08, 0x12]); // APATH
    assert_eq!(frames[10], vec![0x12, 0x01]); // ACT
    assert!(t
        .borrow()
        .iter()
        .all(|e| !matches!(e, Event::Write { device, .. } if *device != wm8731::WM8731_ADDR)));
}

#[test]
fn test_wm8731_is_write_only() {
    let t = trace();
    let mut codec = Wm8731::new(MockBus::new(&t), MockDelay::new(&t));

    assert_eq!(codec.read_register(wm8731::regs::LLIN), Err(CodecError::WriteOnly));
    assert!(t.borrow().is_empty());
}

#[test]
fn test_wm8731_rejects_wide_values_before_bus() {
    let t = trace();
    let mut codec = Wm8731::new(MockBus::new(&t), MockDelay::new(&t));

    assert_eq!(
        codec.write_register(0x80, 0),
        Err(CodecError::InvalidRegister { register: 0x80, value: 0 })
    );
    assert!(codec.write_register(0x04, 0x200).is_err());
    assert!(t.borrow().is_empty());
}

#[test]
fn test_wm8731_shadow_follows_acknowledged_writes_only() {
    let t = trace();
    // LHP frames start with 0x05 once bit 8 (both channels) is set.
    let bus = MockBus::new(&t).fail_frames(&[0x05], 1);
    let mut codec = Wm8731::new(bus, MockDelay::new(&t));
    codec.init().unwrap();
    assert_eq!(codec.shadow(wm8731::regs::LHP), Some(0x079));

    let err = codec.set_headphone_volume(0x50).unwrap_err();
    assert_eq!(
        err,
        CodecError::Bus {
            device: wm8731::WM8731_ADDR,
            register: wm8731::regs::LHP,
            phase: BusPhase::Write,
        }
    );
    assert_eq!(codec.shadow(wm8731::regs::LHP), Some(0x079));
    assert_eq!(count(&t, is_reset), 1);

    codec.set_headphone_volume(0x50).unwrap();
    assert_eq!(codec.shadow(wm8731::regs::LHP), Some(0x1D0));
}

#[test]
fn test_wm8731_field_update_uses_shadow() {
    let t = trace();
    let mut codec = Wm8731::new(MockBus::new(&t), MockDelay::new(&t));
    codec.init().unwrap();

    codec.set_input_source(wm8731::InputSource::Mic).unwrap();
    assert_eq!(writes(&t).last(), Some(&vec![0x08, 0x14]));

    codec.set_mic_boost(true).unwrap();
    assert_eq!(writes(&t).last(), Some(&vec![0x08, 0x15]));
}

#[test]
fn test_wm8731_mute_waits_for_ramp() {
    let t = trace();
    let mut codec = Wm8731::new(MockBus::new(&t), MockDelay::new(&t));

    codec.set_mute(true).unwrap();
    assert_eq!(
        *t.borrow(),
        vec![
            Event::Write {
                device: wm8731::WM8731_ADDR,
                bytes: vec![0x0A, 0x08],
            },
            Event::DelayMs(20),
        ]
    );
}

#[test]
fn test_wm8731_transient_fault_retried_with_bus_reset() {
    let t = trace();
    let bus = MockBus::new(&t).fail_frames(&[0x1E], 2);
    let mut codec = Wm8731::new(bus, MockDelay::new(&t));

    let report = codec.init().unwrap();
    assert!(report.is_clean());
    assert_eq!(report.attempts, 13);
    assert_eq!(count(&t, is_reset), 2);
}

#[test]
fn test_wm8731_dump_reports_shadow() {
    let t = trace();
    let mut codec = Wm8731::new(MockBus::new(&t), MockDelay::new(&t));

    let dump = codec.dump_registers().unwrap();
    assert_eq!(dump.read, wm8731::SHADOW_REGS as u32);
    assert_eq!(dump.failed, 0);
    assert!(t.borrow().is_empty());
}

// ============================================================================
// AIC3101
// ============================================================================

#[test]
fn test_aic3101_reset_strobe_precedes_table() {
    let t = trace();
    let mut codec = Aic3101::new(
        MockBus::new(&t),
        MockPin::new("reset", &t),
        MockDelay::new(&t),
    );

    let report = codec.init().unwrap();
    assert_eq!(report.writes, aic3101::INIT_TABLE.len() as u32);

    let events = t.borrow();
    assert_eq!(
        events[..5],
        [
            Event::Pin { name: "reset", high: true },
            Event::Pin { name: "reset", high: false },
            Event::DelayMs(1),
            Event::Pin { name: "reset", high: true },
            Event::DelayMs(1),
        ]
    );
    assert_eq!(
        events[5],
        Event::Write {
            device: aic3101::AIC3101_ADDR,
            bytes: vec![7, 0x0A],
        }
    );
}

#[test]
fn test_aic3101_broken_reset_pin_is_transport_error() {
    let t = trace();
    let mut codec = Aic3101::new(
        MockBus::new(&t),
        MockPin::broken("reset", &t),
        MockDelay::new(&t),
    );

    assert_eq!(codec.init(), Err(CodecError::Transport));
    assert!(writes(&t).is_empty());
}

#[test]
fn test_aic3101_read_and_dump() {
    let t = trace();
    let bus = MockBus::new(&t).respond(&[41], &[0x50]);
    let mut codec = Aic3101::new(bus, MockPin::new("reset", &t), MockDelay::new(&t));

    assert_eq!(codec.read_register(41), Ok(0x50));
    assert!(codec.read_register(0x100).is_err());

    let dump = codec.dump_registers().unwrap();
    assert_eq!(dump.read, aic3101::DUMP_REGS as u32);
    assert_eq!(dump.failed, 0);
}

// ============================================================================
// NAU88C22
// ============================================================================

#[test]
fn test_nau88c22_init_delays_after_bias() {
    let t = trace();
    let mut codec = Nau88c22::new(MockBus::new(&t), MockDelay::new(&t));

    let report = codec.init().unwrap();
    assert_eq!(report.writes, write_count(nau88c22::INIT_TABLE) as u32);
    assert_eq!(report.writes, 20);
    assert_eq!(report.delays, 1);

    let events = t.borrow();
    let dev = nau88c22::NAU88C22_ADDR;
    assert_eq!(
        events[..5],
        [
            Event::Write { device: dev, bytes: vec![0x00, 0x00] },
            Event::Write { device: dev, bytes: vec![0x02, 0xCD] },
            Event::Write { device: dev, bytes: vec![0x8A, 0x00] },
            Event::DelayMs(250),
            Event::Write { device: dev, bytes: vec![0x04, 0x3F] },
        ]
    );
}

#[test]
fn test_nau88c22_reads_nine_bit_values() {
    let t = trace();
    let bus = MockBus::new(&t)
        .respond(&[63 << 1], &[0x00, 0x1A])
        .respond(&[62 << 1], &[0x01, 0x02]);
    let mut codec = Nau88c22::new(bus, MockDelay::new(&t));

    assert_eq!(codec.chip_id(), Ok(0x01A));
    assert_eq!(codec.revision(), Ok(0x102));
    assert_eq!(
        t.borrow()[0],
        Event::Read {
            device: nau88c22::NAU88C22_ADDR,
            bytes: vec![0x7E],
            len: 2,
        }
    );
}

#[test]
fn test_nau88c22_read_fault_resets_bus() {
    let t = trace();
    let bus = MockBus::new(&t).fail_frames(&[0x7E], 1);
    let mut codec = Nau88c22::new(bus, MockDelay::new(&t));

    assert_eq!(
        codec.chip_id(),
        Err(CodecError::Bus {
            device: nau88c22::NAU88C22_ADDR,
            register: nau88c22::regs::DEVICE_ID,
            phase: BusPhase::Read,
        })
    );
    assert_eq!(count(&t, is_reset), 1);
    assert_eq!(codec.chip_id(), Ok(0));
}

#[test]
fn test_nau88c22_dead_device_bounds_attempts() {
    let t = trace();
    let mut codec = Nau88c22::new(MockBus::new(&t).failing(), MockDelay::new(&t));

    let report = codec.init().unwrap();
    let table_writes = write_count(nau88c22::INIT_TABLE);
    assert_eq!(report.failures, table_writes as u32);
    assert_eq!(report.attempts, table_writes as u32 * 5);
    assert_eq!(count(&t, is_reset), table_writes * 5);
    // The power-up delay is still honoured.
    assert_eq!(count(&t, |e| *e == Event::DelayMs(250)), 1);
}

// ============================================================================
// SGTL5000
// ============================================================================

#[test]
fn test_sgtl5000_sixteen_bit_framing() {
    let t = trace();
    let mut codec = Sgtl5000::new(MockBus::new(&t), MockDelay::new(&t));

    let report = codec.init().unwrap();
    assert!(report.is_clean());

    let frames = writes(&t);
    assert_eq!(frames.len(), write_count(sgtl5000::INIT_TABLE));
    assert_eq!(frames.len(), 14);
    assert!(frames.iter().all(|f| f.len() == 4));
    assert_eq!(frames[0], vec![0x00, 0x02, 0x00, 0x00]);
    assert_eq!(frames[2], vec![0x00, 0x30, 0x70, 0x60]);
    assert_eq!(t.borrow()[3], Event::DelayMs(20));
}

#[test]
fn test_sgtl5000_chip_id_and_dump() {
    let t = trace();
    let bus = MockBus::new(&t).respond(&[0x00, 0x00], &[0xA0, 0x11]);
    let mut codec = Sgtl5000::new(bus, MockDelay::new(&t));

    assert_eq!(codec.chip_id(), Ok(0xA011));
    assert_eq!(
        t.borrow()[0],
        Event::Read {
            device: sgtl5000::SGTL5000_ADDR,
            bytes: vec![0x00, 0x00],
            len: 2,
        }
    );

    let dump = codec.dump_registers().unwrap();
    assert_eq!(dump.read, sgtl5000::DUMP_END as u32 / 2);
}

// ============================================================================
// ES8311
// ============================================================================

#[test]
fn test_es8311_soft_reset_then_volume() {
    let t = trace();
    let mut codec = Es8311::new(MockBus::new(&t), MockDelay::new(&t));

    let report = codec.init().unwrap();
    assert_eq!(report.writes, 9);
    assert!(report.is_clean());

    let events = t.borrow();
    let dev = es8311::ES8311_ADDR;
    assert_eq!(
        events[..3],
        [
            Event::Write { device: dev, bytes: vec![0x00, 0x80] },
            Event::DelayMs(5),
            Event::Write { device: dev, bytes: vec![0x00, 0x00] },
        ]
    );
    assert_eq!(
        events.last(),
        Some(&Event::Write {
            device: dev,
            bytes: vec![0x32, es8311::volume_register(es8311::DEFAULT_VOLUME)],
        })
    );
}

#[test]
fn test_es8311_output_controls_target_dac_registers() {
    let t = trace();
    let mut codec = Es8311::new(MockBus::new(&t), MockDelay::new(&t));

    codec.init().unwrap();
    codec.set_volume(50).unwrap();
    codec.set_mute(true).unwrap();
    codec.set_mute(false).unwrap();

    let frames = writes(&t);
    assert!(frames.contains(&vec![0x31, 0x00]));
    assert_eq!(
        frames[frames.len() - 3..],
        [vec![0x32, 0x5F], vec![0x31, 0x60], vec![0x31, 0x00]]
    );
    // 0x17 and 0x18 are the ADC volume and ALC registers.
    assert!(frames.iter().all(|f| f[0] != 0x17 && f[0] != 0x18));
}

#[test]
fn test_es8311_volume_and_mute_state_follow_bus() {
    let t = trace();
    let bus = MockBus::new(&t).fail_frames(&[0x32], 1);
    let mut codec = Es8311::new(bus, MockDelay::new(&t));

    assert!(codec.set_volume(30).is_err());
    assert_eq!(codec.volume(), es8311::DEFAULT_VOLUME);
    codec.set_volume(130).unwrap();
    assert_eq!(codec.volume(), 100);
    assert_eq!(writes(&t).last(), Some(&vec![0x32, 0xBF]));

    codec.set_mute(true).unwrap();
    assert!(codec.is_muted());
    assert_eq!(writes(&t).last(), Some(&vec![0x31, 0x60]));

    codec.reset().unwrap();
    assert!(!codec.is_muted());
}

#[test]
fn test_es8311_chip_id_and_dump() {
    let t = trace();
    let bus = MockBus::new(&t)
        .respond(&[0xFD], &[0x83])
        .respond(&[0xFE], &[0x11]);
    let mut codec = Es8311::new(bus, MockDelay::new(&t));

    assert_eq!(codec.chip_id(), Ok(0x8311));

    let dump = codec.dump_registers().unwrap();
    assert_eq!(dump.read, es8311::DUMP_END as u32 + 2);
    assert_eq!(dump.failed, 0);
}

// ============================================================================
// Dynamic dispatch
// ============================================================================

fn bring_up(codec: &mut dyn Codec) -> Result<u32, CodecError> {
    let report = codec.init()?;
    Ok(report.writes)
}

#[test]
fn test_drivers_behind_trait_object() {
    let t = trace();
    let mut wm = Wm8731::new(MockBus::new(&t), MockDelay::new(&t));
    let mut sgtl = Sgtl5000::new(MockBus::new(&t), MockDelay::new(&t));

    assert_eq!(bring_up(&mut wm), Ok(write_count(wm8731::INIT_TABLE) as u32));
    assert_eq!(bring_up(&mut sgtl), Ok(write_count(sgtl5000::INIT_TABLE) as u32));
    assert_eq!(wm.name(), "WM8731");
    assert_eq!(sgtl.name(), "SGTL5000");
}
