//! Application-wide constants for tuning and configuration

/// Error message display duration in seconds before auto-dismiss.
pub const ERROR_TTL_SECS: u64 = 5;

/// Input poll timeout in milliseconds while a request is in flight.
pub const POLL_BUSY_MS: u64 = 50;

/// Input poll timeout in milliseconds when idle.
pub const POLL_IDLE_MS: u64 = 150;

/// Minimum terminal width to show editor and results side by side.
/// Below this width the focused pane takes the full frame.
pub const MIN_SPLIT_VIEW_WIDTH: u16 = 90;

/// Spinner animation frame duration in milliseconds.
pub const SPINNER_FRAME_MS: u128 = 80;

/// Maximum characters of an inbox snippet shown in the listing.
pub const SNIPPET_PREVIEW_LEN: usize = 80;
