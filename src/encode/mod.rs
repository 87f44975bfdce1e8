//! Event wire encodings.
//!
//! Two independent encoders, one per injection backend:
//! - `message`: packed 32-bit window-message parameters (wparam/lparam);
//! - `stroke`: fixed-size little-endian byte buffers matching the kernel
//!   driver's C stroke structures.
//!
//! Both are pure and stateless; only the downstream delivery call can fail.

pub mod message;
pub mod stroke;
