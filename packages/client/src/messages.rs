//! User-facing error messages.
//!
//! These deliberately leave out implementation details (status codes,
//! URLs, transport errors); the detailed error goes to the log instead.

/// The backend could not be reached.
pub const NETWORK: &str = "Unable to connect. Please check your connection.";

/// The backend answered with a server-side failure or an unusable body.
pub const SERVER: &str = "Service temporarily unavailable. Please try again later.";

/// Location access is missing.
pub const LOCATION: &str = "Location services are required for this feature.";

/// The request or position fix took too long.
pub const TIMEOUT: &str = "Request timed out. Please try again.";

/// An address search returned no images.
pub const NO_IMAGE: &str = "No image available for this camera";
