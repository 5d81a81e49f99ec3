//! The observable engine underneath depot stores.
//!
//! Everything here is single-threaded: handles are `Rc`-based and the
//! tracking/batching state lives in thread locals.
//!
//! - [`Signal`]: change marker that observers subscribe to
//! - [`Cell`]: mutable reactive cell holding a [`Value`]
//! - [`Computed`]: lazily evaluated, cached derived cell
//! - [`Reactive`]: keyed set of cells with a shape signal (a store slice)
//! - [`Scope`]: disposable grouping of watchers and derived cells
//! - [`watch`]: run a callback whenever the tracked source changes
//! - [`batch`]: coalesce watcher dispatch until the outermost batch ends
//!
//! # Example
//!
//! ```rust
//! use depot_observe::{batch, watch, Cell, Scope, WatchOptions};
//! use std::rc::Rc;
//!
//! let count = Cell::new(0);
//! let fired = Rc::new(std::cell::Cell::new(0));
//!
//! let scope = Scope::detached();
//! scope.run(|| {
//!     let count = count.clone();
//!     let fired = fired.clone();
//!     watch(move || count.get(), move |_, _| fired.set(fired.get() + 1), WatchOptions::default());
//! });
//!
//! batch(|| {
//!     count.set(1);
//!     count.set(2);
//! });
//! assert_eq!(fired.get(), 1);
//!
//! scope.stop();
//! count.set(3);
//! assert_eq!(fired.get(), 1);
//! ```

mod cell;
mod computed;
mod reactive;
mod runtime;
mod scope;
mod signal;
mod watch;

pub use cell::Cell;
pub use computed::Computed;
pub use depot_value::Value;
pub use reactive::Reactive;
pub use runtime::{batch, untracked};
pub use scope::Scope;
pub use signal::Signal;
pub use watch::{watch, WatchHandle, WatchOptions};
