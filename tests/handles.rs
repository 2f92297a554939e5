use std::sync::Arc;

use pinbroker::driver::sim::SimOp;
use pinbroker::driver::{GpioDriver, SimDriver};
use pinbroker::{
    BoardProfile, ClaimOptions, PinError, PinIdentifier, PinRegistry, Signal,
};

fn registry() -> (PinRegistry, Arc<SimDriver>) {
    let profile = Arc::new(BoardProfile::from_revision("a02082").unwrap());
    let driver = Arc::new(SimDriver::new());
    let registry = PinRegistry::new(profile, Arc::clone(&driver) as Arc<dyn GpioDriver>);
    (registry, driver)
}

#[test]
fn input_reads_raw_levels_directly() {
    let (registry, driver) = registry();
    let input = registry
        .claim_input(PinIdentifier::board(11), ClaimOptions::default())
        .unwrap();
    driver.set_input_value(11, 1);
    assert_eq!(input.read().unwrap(), Signal::High);
    driver.set_input_value(11, 0);
    assert_eq!(input.read().unwrap(), Signal::Low);
}

#[test]
fn active_low_input_inverts_raw_levels() {
    let (registry, driver) = registry();
    let input = registry
        .claim_input(PinIdentifier::board(11), ClaimOptions::active_low())
        .unwrap();
    driver.set_input_value(11, 0);
    assert_eq!(input.read().unwrap(), Signal::High);
    driver.set_input_value(11, 1);
    assert_eq!(input.read().unwrap(), Signal::Low);
}

#[test]
fn active_low_output_writes_inverted_raw_levels() {
    let (registry, driver) = registry();
    let mut output = registry
        .claim_output(PinIdentifier::board(11), ClaimOptions::active_low())
        .unwrap();
    output.write(Signal::High).unwrap();
    assert_eq!(driver.pin(11).value, 0);
    output.write(Signal::Low).unwrap();
    assert_eq!(driver.pin(11).value, 1);
    assert_eq!(output.last_written(), Some(Signal::Low));
}

#[test]
fn failed_write_leaves_last_written_untouched() {
    let (registry, driver) = registry();
    let mut output = registry
        .claim_output(PinIdentifier::board(11), ClaimOptions::default())
        .unwrap();
    output.write(Signal::High).unwrap();
    driver.fail_on(SimOp::Write);
    let err = output.write(Signal::Low).unwrap_err();
    assert!(matches!(err, PinError::Driver(_)));
    assert_eq!(output.last_written(), Some(Signal::High));
}

#[test]
fn duty_cycle_bounds_are_inclusive() {
    let (registry, _driver) = registry();
    let mut pwm = registry.claim_pwm(PinIdentifier::board(12)).unwrap();
    pwm.set_duty_cycle(0.0).unwrap();
    pwm.set_duty_cycle(1.0).unwrap();

    assert!(matches!(
        pwm.set_duty_cycle(1.5),
        Err(PinError::OutOfRange { .. })
    ));
    assert!(matches!(
        pwm.set_duty_cycle(-0.1),
        Err(PinError::OutOfRange { .. })
    ));
    assert!(matches!(
        pwm.set_duty_cycle(f64::NAN),
        Err(PinError::OutOfRange { .. })
    ));
    // rejected values never reach the handle's record
    assert_eq!(pwm.duty_cycle(), 1.0);
}

#[test]
fn output_release_drives_inactive_before_reverting_direction() {
    let (registry, driver) = registry();
    let mut output = registry
        .claim_output(PinIdentifier::board(11), ClaimOptions::default())
        .unwrap();
    output.write(Signal::High).unwrap();
    output.release();

    let journal = driver.journal();
    let tail = &journal[journal.len() - 3..];
    assert_eq!(tail, ["write 11 0", "direction 11 in", "unexport 11"]);
}

#[test]
fn active_low_output_rests_at_raw_high() {
    let (registry, driver) = registry();
    let mut output = registry
        .claim_output(PinIdentifier::board(11), ClaimOptions::active_low())
        .unwrap();
    // claim parks the pin at its inactive level, which is raw 1 here
    assert_eq!(driver.pin(11).value, 1);
    output.write(Signal::High).unwrap();
    output.release();
    assert_eq!(driver.pin(11).value, 1);
}

#[test]
fn pwm_release_turns_the_channel_off() {
    let (registry, driver) = registry();
    let mut pwm = registry.claim_pwm(PinIdentifier::board(12)).unwrap();
    pwm.set_duty_cycle(0.75).unwrap();
    pwm.release();
    assert_eq!(driver.pin(12).duty, 0.0);

    let journal = driver.journal();
    let tail = &journal[journal.len() - 3..];
    assert_eq!(tail, ["pwm 12 0.00", "direction 12 in", "unexport 12"]);
}

#[test]
fn released_handles_refuse_io() {
    let (registry, _driver) = registry();
    let mut input = registry
        .claim_input(PinIdentifier::board(11), ClaimOptions::default())
        .unwrap();
    input.release();
    assert!(matches!(input.read(), Err(PinError::Released { pin: 11 })));

    let mut output = registry
        .claim_output(PinIdentifier::board(13), ClaimOptions::default())
        .unwrap();
    output.release();
    assert!(matches!(
        output.write(Signal::High),
        Err(PinError::Released { pin: 13 })
    ));

    let mut pwm = registry.claim_pwm(PinIdentifier::board(12)).unwrap();
    pwm.release();
    assert!(matches!(
        pwm.set_duty_cycle(0.5),
        Err(PinError::Released { pin: 12 })
    ));
}

#[test]
fn handles_expose_all_three_numbers() {
    let (registry, _driver) = registry();
    let input = registry
        .claim_input(PinIdentifier::wired(0), ClaimOptions::default())
        .unwrap();
    assert_eq!(input.board_pin(), 11);
    assert_eq!(input.bcm_pin(), Some(17));
    assert_eq!(input.wired_pin(), 0);
}
