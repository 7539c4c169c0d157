pub mod preference;
pub mod price;
pub mod notification;

pub use preference::{Bound, DevicePreference, PreferenceWrite};
pub use price::{PriceUpdateEvent, QuantitySnapshot, QuantityUpdatedEvent, TrackedQuantity};
pub use notification::{DispatchOutcome, Notification, PushMessage};
