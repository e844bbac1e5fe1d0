//! The re-serialized render document and its release contract.

/// A serialized GeoJSON document handed to the map rendering collaborator.
///
/// The payload is an externally consumed resource with an explicit lifecycle:
/// the owner must call [`RenderDocument::release`] exactly once when the
/// dataset it belongs to is discarded. Dropping an unreleased document frees
/// the payload as a last resort and logs a warning, since it means an owner
/// skipped the explicit release on some path.
#[derive(Debug)]
pub struct RenderDocument {
    payload: Option<Vec<u8>>,
}

impl RenderDocument {
    pub(crate) const fn new(payload: Vec<u8>) -> Self {
        Self {
            payload: Some(payload),
        }
    }

    /// The serialized GeoJSON bytes, or `None` once released.
    #[must_use]
    pub fn as_bytes(&self) -> Option<&[u8]> {
        self.payload.as_deref()
    }

    /// Whether the payload has already been released.
    #[must_use]
    pub const fn is_released(&self) -> bool {
        self.payload.is_none()
    }

    /// Frees the payload.
    ///
    /// Returns `true` on the first call. A second call is a caller bug; it
    /// returns `false` and logs a warning instead of panicking.
    pub fn release(&mut self) -> bool {
        if self.payload.take().is_some() {
            true
        } else {
            log::warn!("render document released twice");
            false
        }
    }
}

impl Drop for RenderDocument {
    fn drop(&mut self) {
        if self.payload.is_some() {
            log::warn!("render document dropped without explicit release");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn release_frees_payload_once() {
        let mut doc = RenderDocument::new(b"{}".to_vec());
        assert!(!doc.is_released());
        assert_eq!(doc.as_bytes(), Some(b"{}".as_slice()));

        assert!(doc.release());
        assert!(doc.is_released());
        assert!(doc.as_bytes().is_none());

        assert!(!doc.release());
    }
}
