// hexturn_net — TCP connection to the hexturn relay.
//
// Module overview:
// - `client.rs`: `connect`/`split` produce a `RelayInbox` (background reader
//                thread + `mpsc` channel, implements the reconciler's
//                `NetworkReader`) and a `RelayOutbox` (framed writes).
// - `error.rs`:  `NetError`.
//
// The relay itself is a separate service; this crate only speaks to it
// using `hexturn_protocol` framing. No async runtime: one blocking reader
// thread per connection keeps the simulation thread from ever waiting on
// the network.

pub mod client;
pub mod error;

pub use client::{RelayConnectConfig, RelayInbox, RelayOutbox, connect, split};
pub use error::NetError;
