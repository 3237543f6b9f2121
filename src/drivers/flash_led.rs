//! Camera flash LED driver.
//!
//! The ESP32-CAM flash LED (GPIO 4, active high) doubles as the reset
//! indicator. Any `embedded-hal` output pin works: on ESP-IDF this is an
//! `esp_idf_hal::gpio::PinDriver`, in host tests a recording mock.
//!
//! Pin write errors are logged and otherwise ignored; the LED is a
//! best-effort signal and must never stall the reset sequence.

use embedded_hal::digital::OutputPin;
use log::warn;

use crate::app::ports::IndicatorPort;

pub struct FlashLed<P: OutputPin> {
    pin: P,
    lit: bool,
}

impl<P: OutputPin> FlashLed<P> {
    pub fn new(pin: P) -> Self {
        Self { pin, lit: false }
    }

    pub fn is_lit(&self) -> bool {
        self.lit
    }
}

impl<P: OutputPin> IndicatorPort for FlashLed<P> {
    fn set_on(&mut self) {
        match self.pin.set_high() {
            Ok(()) => self.lit = true,
            Err(e) => warn!("FlashLed: set_high failed ({:?})", e),
        }
    }

    fn set_off(&mut self) {
        match self.pin.set_low() {
            Ok(()) => self.lit = false,
            Err(e) => warn!("FlashLed: set_low failed ({:?})", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::convert::Infallible;
    use embedded_hal::digital::ErrorType;

    struct FakePin {
        high: bool,
    }

    impl ErrorType for FakePin {
        type Error = Infallible;
    }

    impl OutputPin for FakePin {
        fn set_low(&mut self) -> Result<(), Infallible> {
            self.high = false;
            Ok(())
        }

        fn set_high(&mut self) -> Result<(), Infallible> {
            self.high = true;
            Ok(())
        }
    }

    #[test]
    fn drives_pin_level() {
        let mut led = FlashLed::new(FakePin { high: false });
        led.set_on();
        assert!(led.is_lit());
        assert!(led.pin.high);
        led.set_off();
        assert!(!led.is_lit());
        assert!(!led.pin.high);
    }
}
