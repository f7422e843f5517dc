//! Cross-core mode handoff tests

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use codec_audio_fw::audio::{HandoffWait, ModeController, ModeError, ModeRequest};

/// Simulated audio core: latches the mode once per "buffer" until stopped.
fn spawn_audio(modes: Arc<ModeController>, stop: Arc<AtomicBool>) -> thread::JoinHandle<u32> {
    thread::spawn(move || {
        let mut buffers = 0u32;
        while !stop.load(Ordering::Acquire) {
            let mode = modes.begin_buffer();
            assert!(mode < modes.mode_count());
            buffers = buffers.wrapping_add(1);
            thread::yield_now();
        }
        buffers
    })
}

#[test]
fn test_request_current_mode_is_noop() {
    let modes = ModeController::with_initial(3, 1);
    let result = modes.request_with(1, HandoffWait::Forever, || panic!("must not wait"));

    assert_eq!(result, Ok(ModeRequest::Unchanged));
    assert_eq!(modes.desired(), 1);
    assert_eq!(modes.active(), 1);
}

#[test]
fn test_out_of_range_rejected_without_side_effects() {
    let modes = ModeController::new(3);
    let result = modes.request_with(3, HandoffWait::Forever, || panic!("must not wait"));

    assert_eq!(
        result,
        Err(ModeError::OutOfRange {
            requested: 3,
            count: 3
        })
    );
    assert_eq!(modes.desired(), 0);
    assert_eq!(modes.active(), 0);
}

#[test]
fn test_timeout_leaves_request_pending() {
    let modes = ModeController::new(3);
    let result = modes.request(2, HandoffWait::Polls(100));

    assert_eq!(result, Err(ModeError::Timeout { desired: 2, active: 0 }));
    assert!(!modes.is_settled());

    // The next buffer picks it up.
    assert_eq!(modes.begin_buffer(), 2);
    assert!(modes.is_settled());
}

#[test]
fn test_handoff_with_running_audio_thread() {
    let modes = Arc::new(ModeController::new(3));
    let stop = Arc::new(AtomicBool::new(false));
    let audio = spawn_audio(modes.clone(), stop.clone());

    for id in [1u8, 2, 0, 2, 1] {
        let result = modes.request_with(id, HandoffWait::Forever, thread::yield_now);
        assert!(matches!(result, Ok(ModeRequest::Applied { .. })), "mode {}", id);
        // On return the audio side has latched the new mode.
        assert_eq!(modes.active(), id);
    }

    stop.store(true, Ordering::Release);
    assert!(audio.join().unwrap() > 0);
}

#[test]
fn test_cycling_all_modes_wraps() {
    let modes = Arc::new(ModeController::new(3));
    let stop = Arc::new(AtomicBool::new(false));
    let audio = spawn_audio(modes.clone(), stop.clone());

    let mut current = 0u8;
    for _ in 0..10 {
        current = (current + 1) % modes.mode_count();
        modes
            .request_with(current, HandoffWait::Forever, thread::yield_now)
            .unwrap();
    }
    assert_eq!(modes.active(), 10 % 3);

    stop.store(true, Ordering::Release);
    audio.join().unwrap();
}
