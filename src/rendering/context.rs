//! Software rendering contexts and the current-context slot.
//!
//! Only one context is current at a time; making one current evicts whatever
//! was current before. Like GL, the slot is per thread.

use std::cell::RefCell;
use std::collections::BTreeSet;
use std::fmt;

use crate::{Dimensions, Error, Result};

use super::PixelBuffer;

/// Largest width or height a context binds by default.
pub const MAX_VIEWPORT: u32 = 16384;

/// Color layout of a context's color buffer.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ColorFormat {
    Rgba,
}

/// Requested context precision.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ContextConfig {
    pub color: ColorFormat,
    pub depth_bits: u8,
    pub stencil_bits: u8,
    pub accum_bits: u8,
}

impl ContextConfig {
    /// RGBA color, 16-bit depth, no stencil, no accumulation.
    pub const SOFTWARE: ContextConfig = ContextConfig {
        color: ColorFormat::Rgba,
        depth_bits: 16,
        stencil_bits: 0,
        accum_bits: 0,
    };
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self::SOFTWARE
    }
}

/// Effective precision of a bound context.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Capabilities {
    pub depth_bits: u8,
    pub stencil_bits: u8,
    pub accum_bits: u8,
}

/// Identity of a registered context (off-screen or on-screen).
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ContextId(u64);

impl fmt::Display for ContextId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ctx#{}", self.0)
    }
}

struct RegistryState {
    next_id: u64,
    current: Option<ContextId>,
    live: BTreeSet<ContextId>,
}

thread_local! {
    static REGISTRY: RefCell<RegistryState> = const {
        RefCell::new(RegistryState {
            next_id: 1,
            current: None,
            live: BTreeSet::new(),
        })
    };
}

/// The current-context slot plus the set of live contexts.
pub struct ContextRegistry;

impl ContextRegistry {
    /// Register a new live context. It does not become current.
    pub fn register() -> ContextId {
        REGISTRY.with(|r| {
            let mut r = r.borrow_mut();
            let id = ContextId(r.next_id);
            r.next_id += 1;
            r.live.insert(id);
            id
        })
    }

    /// Remove a context; clears the slot if it was current.
    pub fn release(id: ContextId) {
        REGISTRY.with(|r| {
            let mut r = r.borrow_mut();
            r.live.remove(&id);
            if r.current == Some(id) {
                r.current = None;
            }
        })
    }

    /// Make `id` current, evicting the previous context. Fails for dead ids.
    pub fn make_current(id: ContextId) -> bool {
        REGISTRY.with(|r| {
            let mut r = r.borrow_mut();
            if r.live.contains(&id) {
                r.current = Some(id);
                true
            } else {
                false
            }
        })
    }

    pub fn current() -> Option<ContextId> {
        REGISTRY.with(|r| r.borrow().current)
    }

    pub fn is_live(id: ContextId) -> bool {
        REGISTRY.with(|r| r.borrow().live.contains(&id))
    }

    /// Number of live contexts on this thread.
    pub fn live_count() -> usize {
        REGISTRY.with(|r| r.borrow().live.len())
    }
}

/// A software rendering context that draws into an owned [`PixelBuffer`].
///
/// Dropping the context destroys it: it leaves the registry and releases its
/// color and depth buffers together.
pub struct OffscreenContext {
    id: ContextId,
    config: ContextConfig,
    max_viewport: u32,
    buffer: Option<PixelBuffer>,
    depth: Vec<u16>,
}

impl OffscreenContext {
    /// Create a context with the requested precision.
    pub fn create(config: ContextConfig) -> Result<Self> {
        if !matches!(config.depth_bits, 0 | 16) {
            return Err(Error::ContextCreationFailed(format!(
                "unsupported depth precision: {} bits",
                config.depth_bits
            )));
        }
        if config.stencil_bits > 8 || config.accum_bits > 16 {
            return Err(Error::ContextCreationFailed(format!(
                "unsupported stencil/accumulation precision: {}/{} bits",
                config.stencil_bits, config.accum_bits
            )));
        }

        let id = ContextRegistry::register();
        log::debug!("created off-screen context {}", id);
        Ok(Self {
            id,
            config,
            max_viewport: MAX_VIEWPORT,
            buffer: None,
            depth: Vec::new(),
        })
    }

    pub fn with_max_viewport(mut self, max_viewport: u32) -> Self {
        self.max_viewport = max_viewport;
        self
    }

    pub fn id(&self) -> ContextId {
        self.id
    }

    pub fn config(&self) -> ContextConfig {
        self.config
    }

    /// Bind `buffer` as the color buffer and make this context current.
    ///
    /// Returns false when the buffer does not match the requested size or the
    /// size is outside what the context supports; the context is left unbound.
    pub fn bind(&mut self, buffer: PixelBuffer, width: u32, height: u32) -> bool {
        let dims = Dimensions::new(width, height);
        if dims.is_empty() || width > self.max_viewport || height > self.max_viewport {
            log::debug!("{}: refusing to bind {}x{}", self.id, width, height);
            return false;
        }
        if buffer.dimensions() != dims || Some(buffer.len()) != dims.rgba_len() {
            log::debug!(
                "{}: buffer is {}x{} ({} bytes), expected {}x{}",
                self.id,
                buffer.width(),
                buffer.height(),
                buffer.len(),
                width,
                height
            );
            return false;
        }

        let mut depth = Vec::new();
        if self.config.depth_bits > 0 {
            let n = width as usize * height as usize;
            if depth.try_reserve_exact(n).is_err() {
                return false;
            }
            depth.resize(n, u16::MAX);
        }

        self.buffer = Some(buffer);
        self.depth = depth;
        ContextRegistry::make_current(self.id)
    }

    pub fn is_bound(&self) -> bool {
        self.buffer.is_some()
    }

    pub fn is_current(&self) -> bool {
        ContextRegistry::current() == Some(self.id)
    }

    /// Make this context current again after another one displaced it.
    pub fn make_current(&self) -> bool {
        self.is_bound() && ContextRegistry::make_current(self.id)
    }

    /// Effective precision; `None` until a buffer is bound.
    pub fn capabilities(&self) -> Option<Capabilities> {
        self.buffer.as_ref().map(|_| Capabilities {
            depth_bits: if self.depth.is_empty() { 0 } else { 16 },
            stencil_bits: self.config.stencil_bits,
            accum_bits: self.config.accum_bits,
        })
    }

    pub fn dimensions(&self) -> Option<Dimensions> {
        self.buffer.as_ref().map(PixelBuffer::dimensions)
    }

    pub fn buffer(&self) -> Option<&PixelBuffer> {
        self.buffer.as_ref()
    }

    /// Color and depth buffers of a bound context.
    pub(crate) fn surfaces_mut(&mut self) -> Option<(&mut PixelBuffer, &mut [u16])> {
        let depth = &mut self.depth;
        self.buffer.as_mut().map(|b| (b, depth.as_mut_slice()))
    }

    /// Destroy the context, releasing its buffers.
    pub fn destroy(self) {
        drop(self)
    }
}

impl Drop for OffscreenContext {
    fn drop(&mut self) {
        ContextRegistry::release(self.id);
        log::debug!("destroyed off-screen context {}", self.id);
    }
}

impl fmt::Debug for OffscreenContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OffscreenContext")
            .field("id", &self.id)
            .field("config", &self.config)
            .field("dimensions", &self.dimensions())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_bind_destroy_lifecycle() {
        let before = ContextRegistry::live_count();
        let mut ctx = OffscreenContext::create(ContextConfig::SOFTWARE).unwrap();
        assert_eq!(ContextRegistry::live_count(), before + 1);
        assert!(ctx.capabilities().is_none());

        let buf = PixelBuffer::allocate(8, 4).unwrap();
        assert!(ctx.bind(buf, 8, 4));
        assert!(ctx.is_current());
        assert_eq!(
            ctx.capabilities(),
            Some(Capabilities {
                depth_bits: 16,
                stencil_bits: 0,
                accum_bits: 0
            })
        );

        let id = ctx.id();
        ctx.destroy();
        assert!(!ContextRegistry::is_live(id));
        assert_eq!(ContextRegistry::current(), None);
        assert_eq!(ContextRegistry::live_count(), before);
    }

    #[test]
    fn unsupported_precision_fails_creation() {
        let config = ContextConfig {
            depth_bits: 24,
            ..ContextConfig::SOFTWARE
        };
        assert!(matches!(
            OffscreenContext::create(config),
            Err(Error::ContextCreationFailed(_))
        ));
    }

    #[test]
    fn bind_rejects_mismatched_buffer() {
        let mut ctx = OffscreenContext::create(ContextConfig::SOFTWARE).unwrap();
        let buf = PixelBuffer::allocate(4, 4).unwrap();
        assert!(!ctx.bind(buf, 8, 4));
        assert!(!ctx.is_bound());
        assert!(!ctx.is_current());
    }

    #[test]
    fn bind_rejects_oversized_viewport() {
        let mut ctx = OffscreenContext::create(ContextConfig::SOFTWARE)
            .unwrap()
            .with_max_viewport(16);
        let buf = PixelBuffer::allocate(32, 8).unwrap();
        assert!(!ctx.bind(buf, 32, 8));
    }

    #[test]
    fn make_current_evicts_previous() {
        let onscreen = ContextRegistry::register();
        assert!(ContextRegistry::make_current(onscreen));

        let mut ctx = OffscreenContext::create(ContextConfig::SOFTWARE).unwrap();
        assert!(ctx.bind(PixelBuffer::allocate(2, 2).unwrap(), 2, 2));
        assert_eq!(ContextRegistry::current(), Some(ctx.id()));

        drop(ctx);
        assert_eq!(ContextRegistry::current(), None);
        assert!(ContextRegistry::make_current(onscreen));
        ContextRegistry::release(onscreen);
        assert!(!ContextRegistry::make_current(onscreen));
    }
}
