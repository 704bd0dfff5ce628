use std::sync::Arc;

use crate::{Direction, Size};

/// A handle to a host UI element (a DOM node, a widget, a test double).
///
/// The engine only needs three things from the host layer: the element's
/// laid-out size, and the ability to write/clear a translation transform on
/// the scroll axis. Everything else (event wiring, cloning the list content
/// `min_clones` times, rendering the virtual window) stays in the binding.
pub trait ElementHandle: Send + Sync {
    /// Current laid-out size, or `None` while the element is not measurable
    /// (e.g. not mounted yet).
    fn measure(&self) -> Option<Size>;

    /// Applies a translation of `px` along the axis for `direction`.
    ///
    /// The engine passes the negated scroll distance, so hosts can map this
    /// directly to `translateY(..px)` / `translateX(..px)`.
    fn set_translation(&self, direction: Direction, px: f64);

    /// Removes any translation previously applied by the engine.
    fn clear_translation(&self);
}

/// Resolves the current backing element.
///
/// Hosts that replace their nodes (e.g. a framework re-mounting the list)
/// implement this with a getter closure so the engine always sees the latest
/// element; hosts with stable nodes can pass the handle itself.
pub trait ElementProvider: Send + Sync {
    fn resolve(&self) -> Option<Arc<dyn ElementHandle>>;
}

impl ElementProvider for Arc<dyn ElementHandle> {
    fn resolve(&self) -> Option<Arc<dyn ElementHandle>> {
        Some(Arc::clone(self))
    }
}

impl<F> ElementProvider for F
where
    F: Fn() -> Option<Arc<dyn ElementHandle>> + Send + Sync,
{
    fn resolve(&self) -> Option<Arc<dyn ElementHandle>> {
        self()
    }
}

/// The three elements a scroll engine is attached to.
///
/// - `container`: the fixed-size viewport (measured for `container_size`).
/// - `content`: the wrapper that receives the translation transform.
/// - `real_list`: the authoritative, non-cloned list (measured for
///   `content_size` when virtualization is off).
pub struct ScrollElements {
    pub container: Box<dyn ElementProvider>,
    pub content: Box<dyn ElementProvider>,
    pub real_list: Box<dyn ElementProvider>,
}

impl ScrollElements {
    pub fn new(
        container: impl ElementProvider + 'static,
        content: impl ElementProvider + 'static,
        real_list: impl ElementProvider + 'static,
    ) -> Self {
        Self {
            container: Box::new(container),
            content: Box::new(content),
            real_list: Box::new(real_list),
        }
    }
}

impl core::fmt::Debug for ScrollElements {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ScrollElements")
            .field("container", &self.container.resolve().is_some())
            .field("content", &self.content.resolve().is_some())
            .field("real_list", &self.real_list.resolve().is_some())
            .finish()
    }
}
