//! Handler and middleware lookup
//!
//! Handlers are registered by id at startup together with the middleware
//! they declare. Middleware instances are constructed once per id and reused.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

/// Identifier of a route handler, e.g. "Blog\\Controllers\\PostController"
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HandlerId(pub String);

/// Identifier of a middleware, e.g. "auth_guard"
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MiddlewareId(pub String);

impl From<&str> for HandlerId {
    fn from(id: &str) -> Self {
        HandlerId(id.to_string())
    }
}

impl From<&str> for MiddlewareId {
    fn from(id: &str) -> Self {
        MiddlewareId(id.to_string())
    }
}

impl fmt::Display for MiddlewareId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Something that can handle a route and declares its middleware
pub trait HandlerDescriptor: Send + Sync {
    fn middlewares(&self) -> Vec<MiddlewareId>;
}

/// Descriptor with a fixed middleware list
#[derive(Debug, Clone, Default)]
pub struct StaticHandler {
    middlewares: Vec<MiddlewareId>,
}

impl StaticHandler {
    pub fn new<I, M>(middlewares: I) -> Self
    where
        I: IntoIterator<Item = M>,
        M: Into<MiddlewareId>,
    {
        Self {
            middlewares: middlewares.into_iter().map(Into::into).collect(),
        }
    }
}

impl HandlerDescriptor for StaticHandler {
    fn middlewares(&self) -> Vec<MiddlewareId> {
        self.middlewares.clone()
    }
}

/// Handler descriptors keyed by id, populated at startup
#[derive(Default)]
pub struct HandlerRegistry {
    descriptors: HashMap<HandlerId, Arc<dyn HandlerDescriptor>>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, id: impl Into<HandlerId>, descriptor: Arc<dyn HandlerDescriptor>) {
        self.descriptors.insert(id.into(), descriptor);
    }

    /// Registers a handler (builder)
    pub fn with_handler(mut self, id: impl Into<HandlerId>, descriptor: Arc<dyn HandlerDescriptor>) -> Self {
        self.register(id, descriptor);
        self
    }

    pub fn get(&self, id: &HandlerId) -> Option<Arc<dyn HandlerDescriptor>> {
        self.descriptors.get(id).cloned()
    }

    pub fn contains(&self, id: &HandlerId) -> bool {
        self.descriptors.contains_key(id)
    }

    /// Middleware declared by a handler
    ///
    /// `None` when the handler is unknown or declares no middleware.
    pub fn middlewares(&self, id: &HandlerId) -> Option<Vec<MiddlewareId>> {
        self.descriptors
            .get(id)
            .map(|descriptor| descriptor.middlewares())
            .filter(|middlewares| !middlewares.is_empty())
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}

/// A constructed middleware
///
/// Execution belongs to the dispatcher; the registry only needs identity.
pub trait Middleware: Send + Sync {
    fn id(&self) -> &MiddlewareId;
}

type MiddlewareFactory = Box<dyn Fn() -> Arc<dyn Middleware> + Send + Sync>;

/// Construct-once, reuse-by-key middleware instances
///
/// Owned by a [`RegistryContext`]; instances live as long as the pool.
#[derive(Default)]
pub struct MiddlewarePool {
    factories: HashMap<MiddlewareId, MiddlewareFactory>,
    instances: RwLock<HashMap<MiddlewareId, Arc<dyn Middleware>>>,
}

impl MiddlewarePool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_factory<F>(&mut self, id: impl Into<MiddlewareId>, factory: F)
    where
        F: Fn() -> Arc<dyn Middleware> + Send + Sync + 'static,
    {
        self.factories.insert(id.into(), Box::new(factory));
    }

    /// Registers a factory (builder)
    pub fn with_factory<F>(mut self, id: impl Into<MiddlewareId>, factory: F) -> Self
    where
        F: Fn() -> Arc<dyn Middleware> + Send + Sync + 'static,
    {
        self.register_factory(id, factory);
        self
    }

    /// Returns the pooled instance for `id`, constructing it on first use
    ///
    /// `None` when no factory is registered for `id`.
    pub async fn get_or_create(&self, id: &MiddlewareId) -> Option<Arc<dyn Middleware>> {
        if let Some(instance) = self.instances.read().await.get(id) {
            return Some(Arc::clone(instance));
        }

        let factory = self.factories.get(id)?;
        let mut instances = self.instances.write().await;
        let instance = instances
            .entry(id.clone())
            .or_insert_with(|| {
                tracing::debug!(middleware = %id, "constructing middleware instance");
                factory()
            });

        Some(Arc::clone(instance))
    }

    /// Number of constructed instances
    pub async fn size(&self) -> usize {
        self.instances.read().await.len()
    }
}

/// Process-level state shared by registries
#[derive(Default)]
pub struct RegistryContext {
    pub handlers: HandlerRegistry,
    pub middlewares: MiddlewarePool,
}

impl RegistryContext {
    pub fn new(handlers: HandlerRegistry, middlewares: MiddlewarePool) -> Self {
        Self {
            handlers,
            middlewares,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Named(MiddlewareId);

    impl Middleware for Named {
        fn id(&self) -> &MiddlewareId {
            &self.0
        }
    }

    #[test]
    fn test_handler_lookup() {
        let registry = HandlerRegistry::new()
            .with_handler("Blog", Arc::new(StaticHandler::new(["auth", "trace"])))
            .with_handler("Plain", Arc::new(StaticHandler::default()));

        assert_eq!(
            registry.middlewares(&"Blog".into()),
            Some(vec![MiddlewareId::from("auth"), MiddlewareId::from("trace")])
        );
        assert_eq!(registry.middlewares(&"Plain".into()), None);
        assert_eq!(registry.middlewares(&"Missing".into()), None);
        assert!(registry.contains(&"Plain".into()));
        assert_eq!(registry.len(), 2);
    }

    #[tokio::test]
    async fn test_pool_constructs_once() {
        let built = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&built);

        let pool = MiddlewarePool::new().with_factory("auth", move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Arc::new(Named("auth".into())) as Arc<dyn Middleware>
        });

        let first = pool.get_or_create(&"auth".into()).await.unwrap();
        let second = pool.get_or_create(&"auth".into()).await.unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(built.load(Ordering::SeqCst), 1);
        assert_eq!(first.id(), &MiddlewareId::from("auth"));
        assert_eq!(pool.size().await, 1);
    }

    #[tokio::test]
    async fn test_pool_unknown_id() {
        let pool = MiddlewarePool::new();
        assert!(pool.get_or_create(&"nope".into()).await.is_none());
        assert_eq!(pool.size().await, 0);
    }
}
