//! Small shared helpers: the marketplace status-label table and friends.

mod status;

pub use status::{status_label, STATUS_UNKNOWN};
