/*!
Cooperative cancellation signals for ankurah

A [`Controller`] owns exactly one [`Signal`]. Consumers get the signal, check it
around synchronous sections and subscribe to be told when in-flight work should
stop. The controller is the only thing that can abort it.

# Semantics
- Aborting is synchronous: `trigger` returns only after every listener registered
  at that instant has run, in subscription order.
- Aborting is irreversible: the first reason sticks and later triggers do nothing.
- Late listeners are ignored: subscribing to an aborted signal never calls the listener.
- Dispatch iterates a snapshot taken at the transition. A listener that subscribes,
  unsubscribes or triggers during dispatch cannot change which of its siblings run.
- Dropping a controller or a signal never aborts anything.

# Basic usage

```rust
use ankurah_abort::*;

let controller = Controller::<String>::new();
let signal = controller.signal();
assert!(!signal.is_aborted());

let subscription = signal.subscribe(|reason: &String| println!("stopping: {reason}"));
controller.trigger("timeout".to_string()).unwrap();
// Should print:
// stopping: timeout

assert_eq!(signal.reason().map(String::as_str), Some("timeout"));
subscription.unsubscribe(); // no-op, already fired

controller.trigger("other".to_string()).unwrap();
assert_eq!(signal.reason().map(String::as_str), Some("timeout"));
```

# Composition

```rust
use ankurah_abort::*;

let user = Controller::<&'static str>::new();
let shutdown = Controller::<&'static str>::new();
let either = Signal::any(&[user.signal(), shutdown.signal()]);

shutdown.trigger("shutdown").unwrap();
assert_eq!(either.reason(), Some(&"shutdown"));
// the composite no longer listens to the other input
assert_eq!(user.signal().subscriber_count(), 0);
```

*/

mod any;
mod bridge;
mod controller;
mod error;
mod listener;
pub mod porcelain;
mod registry;
mod signal;
mod subscription;
mod traits;

pub use any::*;
pub use bridge::*;
pub use controller::*;
pub use error::*;
pub use listener::*;
pub use signal::Signal;
pub use subscription::*;
pub use traits::*;

#[cfg(feature = "tokio")]
pub use porcelain::Wait;
