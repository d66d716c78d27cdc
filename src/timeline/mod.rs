//! Time-travel over a snapshot: the display scale, the axis built from a
//! snapshot's bounds, and per-task state reconstruction.

pub mod axis;
pub mod resolver;
pub mod scale;

pub use axis::{TaskBar, TimeAxis};
pub use resolver::{resolve, resolve_all, TaskState};
pub use scale::{to_display, to_linear, TimeScale, DEFAULT_EXPONENT};
