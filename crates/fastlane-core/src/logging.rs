//! Logging facilities for Fastlane.
//!
//! Fastlane logs through the `tracing` crate. Install a subscriber in the
//! application to see output:
//!
//! ```ignore
//! tracing_subscriber::fmt()
//!     .with_env_filter("fastlane::handshake=debug,fastlane::dispatch=info")
//!     .init();
//! ```
//!
//! Dropped traffic is only visible here: unattributable datagrams and
//! duplicate CONNECTs log at `trace`, datagrams discarded mid-handshake at
//! `info`, decode failures at `warn`.

/// Target names for log filtering.
///
/// Use these with `tracing` directives to filter logs by subsystem.
pub mod targets {
    /// Per-datagram dispatch decisions.
    pub const DISPATCH: &str = "fastlane::dispatch";
    /// Connect handshake synthesis.
    pub const HANDSHAKE: &str = "fastlane::handshake";
    /// UDP listener lifecycle and receive loop.
    pub const LISTENER: &str = "fastlane::listener";
    /// Fast sender activity.
    pub const SENDER: &str = "fastlane::sender";
    /// Session event intake.
    pub const SESSION: &str = "fastlane::session";
    /// Session registry bindings.
    pub const REGISTRY: &str = "fastlane::registry";
}
