//! Single-owner GPU handles.
//!
//! [`Owned`] wraps a GPU object that must be destroyed exactly once. It is not
//! `Clone`. Ownership can be handed over with [`Owned::take`] (the source is
//! left empty) or [`Owned::assign`] (the destination destroys what it held,
//! then takes over the source). Dropping an empty handle does nothing.

/// A GPU object with an explicit destroy operation.
pub trait GpuResource {
    fn destroy(&mut self);
}

impl GpuResource for wgpu::Texture {
    fn destroy(&mut self) {
        wgpu::Texture::destroy(self);
    }
}

impl GpuResource for wgpu::Buffer {
    fn destroy(&mut self) {
        wgpu::Buffer::destroy(self);
    }
}

#[derive(Debug)]
pub struct Owned<R: GpuResource> {
    raw: Option<R>,
}

impl<R: GpuResource> Owned<R> {
    #[must_use]
    pub fn new(raw: R) -> Self {
        Self { raw: Some(raw) }
    }

    /// Handle that owns nothing.
    #[must_use]
    pub fn empty() -> Self {
        Self { raw: None }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.raw.is_none()
    }

    #[must_use]
    pub fn get(&self) -> Option<&R> {
        self.raw.as_ref()
    }

    /// Moves the object out into a new handle, leaving `self` empty.
    #[must_use]
    pub fn take(&mut self) -> Self {
        Self { raw: self.raw.take() }
    }

    /// Destroys the current object (if any) and takes over `source`, which is
    /// left empty. Assigning a handle to itself is impossible by borrowing.
    pub fn assign(&mut self, source: &mut Self) {
        self.release();
        self.raw = source.raw.take();
    }

    /// Destroys the object now and leaves the handle empty.
    pub fn release(&mut self) {
        if let Some(mut raw) = self.raw.take() {
            raw.destroy();
        }
    }
}

impl<R: GpuResource> Default for Owned<R> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<R: GpuResource> Drop for Owned<R> {
    fn drop(&mut self) {
        self.release();
    }
}
