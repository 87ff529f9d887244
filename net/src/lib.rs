//! Message plumbing between the text producer and the narration side.
//!
//! Commands travel over a [`Transport`] and are wrapped by a [`Relay`] that
//! retries transient delivery failures. Events flow back over the
//! [`StreamBus`], a best-effort broadcast any UI can subscribe to.

pub mod channel;
pub mod relay;
pub mod stream_bus;
pub mod transport;

pub use channel::{ChannelTransport, Inbox, Incoming};
pub use relay::{Relay, RelayError, RetryPolicy};
pub use stream_bus::StreamBus;
pub use transport::{Transport, TransportError};
