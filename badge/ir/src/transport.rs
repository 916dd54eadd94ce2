//! Physical link abstraction

use core::fmt::Debug;

/// Non-blocking frame transmitter.
///
/// `try_send` either takes the whole frame or refuses it. While a previous
/// frame is still going out it returns `Err(nb::Error::WouldBlock)`; the
/// channel keeps the frame and tries again on its next tick.
pub trait IrTransport {
    type Error: Debug;

    fn try_send(&mut self, frame: &[u8]) -> nb::Result<(), Self::Error>;
}

impl<T: IrTransport + ?Sized> IrTransport for &mut T {
    type Error = T::Error;

    fn try_send(&mut self, frame: &[u8]) -> nb::Result<(), Self::Error> {
        (**self).try_send(frame)
    }
}
