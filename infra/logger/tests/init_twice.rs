use arbor_logger::{Logger, LoggerError};
use serial_test::serial;

#[test]
#[serial]
fn second_init_reports_subscriber_error() {
    let _first = Logger::builder().name("arbor-init-once").init().expect("first init");

    let err = Logger::builder().name("arbor-init-twice").init().expect_err("second init fails");

    assert!(matches!(err, LoggerError::Subscriber { .. }));
}

#[test]
#[serial]
fn disabled_outputs_are_rejected_before_install() {
    let err = Logger::builder().name("arbor-silent").console(false).init().unwrap_err();

    assert!(matches!(err, LoggerError::InvalidConfiguration { .. }));
}
