//! Core types for the replica mirroring system.

/// Fingerprint: 256-bit content digest of a regular file
pub type Fingerprint = [u8; 32];

/// Render a fingerprint as lowercase hex for display and logging
pub fn fingerprint_hex(fingerprint: &Fingerprint) -> String {
    hex::encode(fingerprint)
}
