//! End-to-end bus transaction scenarios against the mock transport,
//! asserting the exact wire traffic the chip would see.

use ft260_driver::{DriverError, DriverResult, Ft260, Ft260I2cBus, I2cBus};
use ft260_hid_common::mock::MockTransport;
use hid_ft260_protocol::{PRODUCT_ID, VENDOR_ID};
use std::time::Duration;

fn mock_bus(name: &str) -> (MockTransport, Ft260I2cBus) {
    let mock = MockTransport::new(VENDOR_ID, PRODUCT_ID, name);
    let dev = Ft260::new(Box::new(mock.clone())).into_shared();
    (mock.clone(), Ft260I2cBus::new(name, dev))
}

#[test]
fn combined_write_then_read_wire_sequence() -> DriverResult<()> {
    let (mock, mut bus) = mock_bus("ft260-0");

    // EEPROM-style register-address-then-read: device will answer 4 bytes.
    let mut input = vec![0xD0, 0x04, 0x11, 0x22, 0x33, 0x44];
    input.resize(64, 0xEE);
    mock.queue_read(input);

    let mut read = [0u8; 4];
    bus.tx(0x50, &[0x10], &mut read)?;

    assert_eq!(
        mock.write_history(),
        vec![
            vec![0xD0, 0x50, 0x06, 0x01, 0x10], // write request, 1 byte, start+stop
            vec![0xC2, 0x50, 0x06, 0x04, 0x00], // read request, 4 bytes LE
        ]
    );
    assert_eq!(read, [0x11, 0x22, 0x33, 0x44]);
    Ok(())
}

#[test]
fn read_only_transaction_skips_write_phase() -> DriverResult<()> {
    let (mock, mut bus) = mock_bus("ft260-0");
    let mut input = vec![0xD0, 0x01, 0x99];
    input.resize(64, 0);
    mock.queue_read(input);

    let mut read = [0u8; 1];
    bus.tx(0x29, &[], &mut read)?;

    assert_eq!(mock.write_history(), vec![vec![0xC2, 0x29, 0x06, 0x01, 0x00]]);
    assert_eq!(read, [0x99]);
    Ok(())
}

#[test]
fn failed_write_phase_aborts_before_read_request() {
    let (mock, mut bus) = mock_bus("ft260-0");

    mock.disconnect();
    let mut read = [0u8; 2];
    let err = bus.tx(0x50, &[0x01], &mut read).expect_err("transport down");
    assert!(matches!(err, DriverError::Transport(_)));

    // The transaction aborted on the write; no read request followed.
    assert!(mock.write_history().is_empty());
}

#[test]
fn oversized_read_fails_validation_without_wire_traffic() {
    let (mock, mut bus) = mock_bus("ft260-0");

    let mut read = [0u8; 63];
    let err = bus.tx(0x50, &[], &mut read).expect_err("63 > ceiling");
    assert!(matches!(err, DriverError::Protocol(_)));
    assert!(mock.write_history().is_empty());
}

#[test]
fn configured_write_read_delay_is_honoured() -> DriverResult<()> {
    let (mock, bus) = mock_bus("ft260-0");
    let mut bus = bus.with_write_read_delay(Duration::from_millis(20));

    let mut input = vec![0xD0, 0x01, 0x42];
    input.resize(64, 0);
    mock.queue_read(input);

    let started = std::time::Instant::now();
    let mut read = [0u8; 1];
    bus.tx(0x50, &[0x00], &mut read)?;
    assert!(started.elapsed() >= Duration::from_millis(20));
    Ok(())
}

#[test]
fn bus_is_unusable_after_close() -> DriverResult<()> {
    let (_mock, mut bus) = mock_bus("ft260-0");
    bus.close()?;

    let err = bus.tx(0x50, &[0x01], &mut []).expect_err("closed");
    assert!(matches!(err, DriverError::Closed));

    let err = bus.set_speed(100_000).expect_err("closed");
    assert!(matches!(err, DriverError::Closed));
    Ok(())
}
