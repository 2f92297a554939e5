use std::sync::Arc;

use pinbroker::driver::sim::SimOp;
use pinbroker::driver::{GpioDriver, SimDriver};
use pinbroker::{
    BoardProfile, CapabilityMask, ClaimOptions, PinError, PinIdentifier, PinRegistry, Resistor,
    Signal, Usage,
};

fn registry() -> (PinRegistry, Arc<SimDriver>) {
    let profile = Arc::new(BoardProfile::from_revision("a02082").unwrap());
    let driver = Arc::new(SimDriver::new());
    let registry = PinRegistry::new(profile, Arc::clone(&driver) as Arc<dyn GpioDriver>);
    (registry, driver)
}

#[test]
fn second_claim_on_same_physical_pin_is_rejected() {
    let (registry, _driver) = registry();
    let _output = registry
        .claim_output(PinIdentifier::board(12), ClaimOptions::default())
        .unwrap();
    // wired 1 is the same physical pin under another name
    let err = registry
        .claim_input(PinIdentifier::wired(1), ClaimOptions::default())
        .unwrap_err();
    assert!(matches!(err, PinError::PinOccupied { pin: 12 }));
    // and so is BCM 18
    let err = registry.claim_pwm(PinIdentifier::bcm(18)).unwrap_err();
    assert!(matches!(err, PinError::PinOccupied { pin: 12 }));
}

#[test]
fn power_pins_are_never_claimable_and_never_touch_the_driver() {
    let (registry, driver) = registry();
    for board_pin in [1u8, 2, 6] {
        let err = registry
            .claim_input(PinIdentifier::board(board_pin), ClaimOptions::default())
            .unwrap_err();
        assert!(matches!(err, PinError::CapabilityMismatch { .. }));
    }
    assert!(driver.journal().is_empty());
}

#[test]
fn pwm_needs_a_hardware_channel() {
    let (registry, _driver) = registry();
    // physical 11 is plain GPIO
    let err = registry.claim_pwm(PinIdentifier::board(11)).unwrap_err();
    assert!(matches!(
        err,
        PinError::CapabilityMismatch { pin: 11, usage: Usage::Pwm }
    ));
    // physical 12 carries PWM0
    let pwm = registry.claim_pwm(PinIdentifier::board(12)).unwrap();
    assert_eq!(pwm.board_pin(), 12);
}

#[test]
fn release_frees_the_pin_for_a_different_usage() {
    let (registry, driver) = registry();
    let mut output = registry
        .claim_output(PinIdentifier::board(7), ClaimOptions::default())
        .unwrap();
    output.write(Signal::High).unwrap();
    assert!(registry.is_pin_used(7));
    output.release();
    assert!(!registry.is_pin_used(7));

    let input = registry
        .claim_input(
            PinIdentifier::board(7),
            ClaimOptions::with_resistor(Resistor::PullDown),
        )
        .unwrap();
    let registration = registry.describe(7).unwrap();
    assert_eq!(registration.usage, Usage::Input);
    assert_eq!(registration.resistor, Resistor::PullDown);
    assert!(!registration.active_low);
    // the pin was driven to its inactive level before the claim ended
    assert_eq!(driver.pin(7).value, 0);
    drop(input);
}

#[test]
fn failed_claim_rolls_back_and_leaves_the_pin_free() {
    let (registry, driver) = registry();
    driver.fail_on(SimOp::SetBias);

    let err = registry
        .claim_input(
            PinIdentifier::board(11),
            ClaimOptions::with_resistor(Resistor::PullUp),
        )
        .unwrap_err();
    assert!(matches!(err, PinError::Driver(_)));
    assert!(!registry.is_pin_used(11));
    assert!(!driver.pin(11).exported);
    assert!(driver.journal().iter().any(|entry| entry == "unexport 11"));

    driver.clear_failures();
    let input = registry
        .claim_input(
            PinIdentifier::board(11),
            ClaimOptions::with_resistor(Resistor::PullUp),
        )
        .unwrap();
    assert_eq!(input.board_pin(), 11);
}

#[test]
fn release_is_idempotent() {
    let (registry, driver) = registry();
    {
        let mut input = registry
            .claim_input(PinIdentifier::board(11), ClaimOptions::default())
            .unwrap();
        input.release();
        input.release();
        // drop fires after the explicit releases and must also be a no-op
    }
    let unexports = driver
        .journal()
        .iter()
        .filter(|entry| *entry == "unexport 11")
        .count();
    assert_eq!(unexports, 1);
    assert!(!registry.is_pin_used(11));
}

#[test]
fn queries_do_not_mutate() {
    let (registry, driver) = registry();
    assert!(!registry.is_pin_used(11));
    assert!(registry.describe(11).is_none());
    assert!(driver.journal().is_empty());

    let _input = registry
        .claim_input(PinIdentifier::board(11), ClaimOptions::default())
        .unwrap();
    let before = driver.journal().len();
    assert!(registry.is_pin_used(11));
    assert!(registry.describe(11).is_some());
    assert_eq!(driver.journal().len(), before);
}

#[test]
fn gpio_pin_without_wired_number_is_invalid_wiring() {
    let profile = BoardProfile::builder("bench0", "Bench Board")
        .pin(1, "AUX.0")
        .bcm(40, 1)
        .function(CapabilityMask::GPIO, &[1])
        .build();
    let driver = Arc::new(SimDriver::new());
    let registry = PinRegistry::new(Arc::new(profile), driver as Arc<dyn GpioDriver>);

    let err = registry
        .claim_input(PinIdentifier::board(1), ClaimOptions::default())
        .unwrap_err();
    assert!(matches!(err, PinError::InvalidWiring { pin: 1 }));
    assert!(!registry.is_pin_used(1));
}

#[test]
fn generic_claim_returns_the_matching_variant() {
    let (registry, _driver) = registry();
    let mut handle = registry
        .claim(PinIdentifier::wired(1), Usage::Pwm, ClaimOptions::default())
        .unwrap();
    assert_eq!(handle.usage(), Usage::Pwm);
    assert_eq!(handle.board_pin(), 12);
    assert!(matches!(handle, pinbroker::PinHandle::Pwm(_)));

    handle.release();
    assert!(!registry.is_pin_used(12));
}

#[test]
fn dropping_a_handle_releases_the_pin() {
    let (registry, _driver) = registry();
    {
        let _output = registry
            .claim_output(PinIdentifier::board(13), ClaimOptions::default())
            .unwrap();
        assert!(registry.is_pin_used(13));
    }
    assert!(!registry.is_pin_used(13));
}
