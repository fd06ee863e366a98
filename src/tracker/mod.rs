pub mod clock;
pub mod controller;
pub mod reconcile;

pub use clock::{Clock, SystemClock};
pub use controller::SessionTracker;
pub use reconcile::{reconcile, Reconciler, TimerView};
