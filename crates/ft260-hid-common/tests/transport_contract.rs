//! Contract tests for the transport trait, driven through a boxed trait
//! object the way the chip driver consumes it.

use ft260_hid_common::mock::MockTransport;
use ft260_hid_common::{HidError, HidResult, HidTransport, ReportParser};
use std::time::Duration;

fn boxed(mock: &MockTransport) -> Box<dyn HidTransport> {
    Box::new(mock.clone())
}

#[test]
fn feature_get_fills_caller_buffer_by_report_id() -> HidResult<()> {
    let mock = MockTransport::new(0x0403, 0x6030, "mock0");
    mock.queue_feature_response(0xA1, vec![0xA1, 0x01, 0x02]);
    mock.queue_feature_response(0xA0, vec![0xA0, 0xAA]);

    let mut transport = boxed(&mock);

    let mut buf = [0u8; 26];
    buf[0] = 0xA1;
    let n = transport.get_feature_report(&mut buf)?;
    assert_eq!(n, 3);
    assert_eq!(&buf[..3], &[0xA1, 0x01, 0x02]);

    let mut buf = [0u8; 13];
    buf[0] = 0xA0;
    let n = transport.get_feature_report(&mut buf)?;
    assert_eq!(n, 2);
    assert_eq!(&buf[..2], &[0xA0, 0xAA]);
    Ok(())
}

#[test]
fn reads_are_fifo_per_transport_identity() -> HidResult<()> {
    let mock = MockTransport::new(0x0403, 0x6030, "mock0");
    mock.queue_read(vec![0xDE, 0x01, 0x11]);
    mock.queue_read(vec![0xDE, 0x01, 0x22]);

    let mut transport = boxed(&mock);
    let mut buf = [0u8; 64];

    transport.read(&mut buf)?;
    assert_eq!(buf[2], 0x11);
    transport.read_timeout(&mut buf, Some(Duration::from_millis(10)))?;
    assert_eq!(buf[2], 0x22);
    Ok(())
}

#[test]
fn timeout_and_disconnect_are_distinct_errors() {
    let mock = MockTransport::new(0x0403, 0x6030, "mock0");
    let mut transport = boxed(&mock);
    let mut buf = [0u8; 64];

    let err = transport
        .read_timeout(&mut buf, Some(Duration::from_millis(1)))
        .expect_err("nothing queued");
    assert!(err.is_timeout());

    mock.disconnect();
    let err = transport
        .read_timeout(&mut buf, Some(Duration::from_millis(1)))
        .expect_err("disconnected");
    assert!(matches!(err, HidError::Disconnected));
}

#[test]
fn written_reports_are_observable_for_wire_assertions() -> HidResult<()> {
    let mock = MockTransport::new(0x0403, 0x6030, "mock0");
    let mut transport = boxed(&mock);

    transport.write(&[0xC2, 0x50, 0x06, 0x04, 0x00])?;
    transport.send_feature_report(&[0xA1, 0x22, 0x90, 0x01])?;

    assert_eq!(mock.write_history(), vec![vec![0xC2, 0x50, 0x06, 0x04, 0x00]]);
    assert_eq!(mock.feature_history(), vec![vec![0xA1, 0x22, 0x90, 0x01]]);

    // A captured report parses back through the shared parser.
    let history = mock.write_history();
    let mut parser = ReportParser::from_slice(&history[0]);
    assert_eq!(parser.read_u8()?, 0xC2);
    assert_eq!(parser.read_u8()?, 0x50);
    assert_eq!(parser.read_u8()?, 0x06);
    assert_eq!(parser.read_u16_le()?, 4);
    Ok(())
}
