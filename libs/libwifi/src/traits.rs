use crate::frame::components::MacAddress;
use crate::frame::*;
use enum_dispatch::enum_dispatch;

/// Helper trait to easily access source, destination and bssid on frames.
///
/// The role of each header address depends on the frame type and the distribution
/// mode, see [MacHeader](crate::frame::components::MacHeader).
#[enum_dispatch]
pub trait Addresses {
    /// Returns the sender of the frame.
    /// This isn't known for every frame (e.g. CTS).
    fn src(&self) -> Option<&MacAddress>;

    /// Returns the destination of the frame.
    /// This is always present.
    fn dest(&self) -> &MacAddress;

    /// This isn't present in every frame (e.g. RTS).
    fn bssid(&self) -> Option<&MacAddress>;
}
