//! Append-only, type-keyed service registry.
//!
//! Each build tree owns one [`ServiceRegistry`]. During initialization it is
//! filled through `&mut` with singletons ([`ServiceRegistry::add`]) and lazy
//! factories ([`ServiceRegistry::add_factory`]); afterwards it is shared
//! read-only. A factory runs on first lookup and its product is memoized, so
//! every consumer observes the same instance.

use crate::error::RegistryError;
use fxhash::FxHashMap;
use std::any::{Any, TypeId, type_name};
use std::error::Error;
use std::fmt;
use std::sync::{Arc, OnceLock};
use tracing::trace;

/// An erased `Arc<T>`; `T` may be unsized, so trait objects are stored without extra boxing.
type Service = Box<dyn Any + Send + Sync>;
type Factory = Box<dyn Fn(&ServiceRegistry) -> Result<Service, RegistryError> + Send + Sync>;

enum Entry {
    Instance(Service),
    Lazy { factory: Factory, product: OnceLock<Service> },
}

struct Registration {
    name: &'static str,
    entry: Entry,
}

impl Registration {
    fn resolve<T: ?Sized + Send + Sync + 'static>(
        &self,
        registry: &ServiceRegistry,
    ) -> Result<Arc<T>, RegistryError> {
        let service = match &self.entry {
            Entry::Instance(service) => service,
            Entry::Lazy { factory, product } => {
                if let Some(service) = product.get() {
                    service
                } else {
                    trace!(service = self.name, "Creating service");
                    let created = factory(registry)?;
                    product.get_or_init(|| created)
                }
            },
        };

        service.downcast_ref::<Arc<T>>().map(Arc::clone).ok_or_else(|| {
            RegistryError::TypeMismatch { message: type_name::<T>().into(), context: None }
        })
    }

    fn is_created(&self) -> bool {
        match &self.entry {
            Entry::Instance(_) => true,
            Entry::Lazy { product, .. } => product.get().is_some(),
        }
    }
}

#[derive(Default)]
pub struct ServiceRegistry {
    services: FxHashMap<TypeId, Registration>,
}

impl ServiceRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a ready-made singleton.
    ///
    /// # Errors
    /// [`RegistryError::Duplicate`] if `T` is already registered.
    pub fn add<T: Send + Sync + 'static>(&mut self, service: T) -> Result<&mut Self, RegistryError> {
        self.add_shared(Arc::new(service))
    }

    /// Registers a singleton that is also held elsewhere.
    ///
    /// `T` may be a trait object, keying the service by the trait:
    ///
    /// ```rust
    /// use arbor_kernel::registry::ServiceRegistry;
    /// use std::fmt::Display;
    /// use std::sync::Arc;
    ///
    /// let mut registry = ServiceRegistry::new();
    /// registry.add_shared::<dyn Display + Send + Sync>(Arc::new(7)).unwrap();
    /// assert_eq!(registry.get::<dyn Display + Send + Sync>().unwrap().to_string(), "7");
    /// ```
    ///
    /// # Errors
    /// [`RegistryError::Duplicate`] if `T` is already registered.
    pub fn add_shared<T: ?Sized + Send + Sync + 'static>(
        &mut self,
        service: Arc<T>,
    ) -> Result<&mut Self, RegistryError> {
        self.insert::<T>(Entry::Instance(Box::new(service)))
    }

    /// Registers a factory that builds `T` on first lookup.
    ///
    /// The factory receives the registry to look up its own dependencies. Its
    /// error is reported as [`RegistryError::Factory`] with the service name as
    /// context, keeping the original error as the source.
    ///
    /// # Errors
    /// [`RegistryError::Duplicate`] if `T` is already registered.
    pub fn add_factory<T, E, F>(&mut self, factory: F) -> Result<&mut Self, RegistryError>
    where
        T: Send + Sync + 'static,
        E: Into<Box<dyn Error + Send + Sync>>,
        F: Fn(&Self) -> Result<T, E> + Send + Sync + 'static,
    {
        self.add_shared_factory::<T, E, _>(move |registry: &Self| factory(registry).map(Arc::new))
    }

    /// Like [`ServiceRegistry::add_factory`], for factories producing a shared,
    /// possibly unsized, `Arc<T>`.
    ///
    /// # Errors
    /// [`RegistryError::Duplicate`] if `T` is already registered.
    pub fn add_shared_factory<T, E, F>(&mut self, factory: F) -> Result<&mut Self, RegistryError>
    where
        T: ?Sized + Send + Sync + 'static,
        E: Into<Box<dyn Error + Send + Sync>>,
        F: Fn(&Self) -> Result<Arc<T>, E> + Send + Sync + 'static,
    {
        let factory: Factory = Box::new(move |registry: &Self| {
            factory(registry).map(|service| Box::new(service) as Service).map_err(|e| {
                RegistryError::Factory { source: e.into(), context: Some(type_name::<T>().into()) }
            })
        });
        self.insert::<T>(Entry::Lazy { factory, product: OnceLock::new() })
    }

    /// Looks up `T`, running its factory if needed.
    ///
    /// # Errors
    /// * [`RegistryError::Missing`] if nothing is registered for `T`.
    /// * [`RegistryError::Factory`] if the factory failed.
    pub fn get<T: ?Sized + Send + Sync + 'static>(&self) -> Result<Arc<T>, RegistryError> {
        self.find::<T>()?.ok_or_else(|| RegistryError::Missing {
            message: type_name::<T>().into(),
            context: None,
        })
    }

    /// Looks up an optional dependency: `Ok(None)` when `T` was never registered.
    ///
    /// # Errors
    /// [`RegistryError::Factory`] if `T` is registered but its factory failed.
    pub fn find<T: ?Sized + Send + Sync + 'static>(&self) -> Result<Option<Arc<T>>, RegistryError> {
        let Some(registration) = self.services.get(&TypeId::of::<T>()) else {
            return Ok(None);
        };
        registration.resolve::<T>(self).map(Some)
    }

    #[must_use]
    pub fn contains<T: ?Sized + 'static>(&self) -> bool {
        self.services.contains_key(&TypeId::of::<T>())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.services.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }

    /// Type names of every registered service, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.services.values().map(|r| r.name).collect();
        names.sort_unstable();
        names
    }

    /// Moves every registration of `other` into `self`, or none of them.
    ///
    /// # Errors
    /// [`RegistryError::Duplicate`] naming the first conflicting service; `self`
    /// is left untouched.
    pub fn merge(&mut self, other: Self) -> Result<&mut Self, RegistryError> {
        let conflict = other.services.iter().find(|(id, _)| self.services.contains_key(*id));
        if let Some((_, conflict)) = conflict {
            return Err(RegistryError::Duplicate { message: conflict.name.into(), context: None });
        }

        trace!(services = other.services.len(), "Merging registrations");
        self.services.extend(other.services);
        Ok(self)
    }

    fn insert<T: ?Sized + 'static>(&mut self, entry: Entry) -> Result<&mut Self, RegistryError> {
        let name = type_name::<T>();
        if self.services.contains_key(&TypeId::of::<T>()) {
            return Err(RegistryError::Duplicate { message: name.into(), context: None });
        }

        trace!(service = name, "Registered service");
        self.services.insert(TypeId::of::<T>(), Registration { name, entry });
        Ok(self)
    }
}

impl fmt::Debug for ServiceRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut registrations: Vec<_> = self.services.values().collect();
        registrations.sort_unstable_by_key(|r| r.name);

        let mut map = f.debug_map();
        for registration in registrations {
            let state = if registration.is_created() { "created" } else { "pending" };
            map.entry(&registration.name, &state);
        }
        map.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug, PartialEq, Eq)]
    struct Barrier(bool);

    #[derive(Debug)]
    struct Checker {
        barrier: Arc<Barrier>,
    }

    #[test]
    fn singletons_are_returned_as_registered() {
        let mut registry = ServiceRegistry::new();
        registry.add(Barrier(true)).unwrap();

        assert_eq!(*registry.get::<Barrier>().unwrap(), Barrier(true));
        assert!(registry.contains::<Barrier>());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn duplicates_are_rejected() {
        let mut registry = ServiceRegistry::new();
        registry.add(Barrier(true)).unwrap();

        let err = registry.add(Barrier(false)).unwrap_err();
        assert!(matches!(err, RegistryError::Duplicate { .. }));
        assert_eq!(*registry.get::<Barrier>().unwrap(), Barrier(true));
    }

    #[test]
    fn factories_run_once_on_first_lookup() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);

        let mut registry = ServiceRegistry::new();
        registry.add(Barrier(false)).unwrap();
        registry
            .add_factory(move |r: &ServiceRegistry| {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok::<_, RegistryError>(Checker { barrier: r.get::<Barrier>()? })
            })
            .unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 0);
        let first = registry.get::<Checker>().unwrap();
        let second = registry.get::<Checker>().unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(*first.barrier, Barrier(false));
    }

    #[test]
    fn factory_errors_name_the_service() {
        let mut registry = ServiceRegistry::new();
        registry
            .add_factory(|r: &ServiceRegistry| r.get::<Barrier>().map(|barrier| Checker { barrier }))
            .unwrap();

        let err = registry.get::<Checker>().unwrap_err();
        let RegistryError::Factory { source, context } = err else {
            panic!("expected a factory error");
        };
        assert!(context.unwrap().ends_with("Checker"));
        assert!(matches!(
            source.downcast_ref::<RegistryError>(),
            Some(RegistryError::Missing { .. })
        ));
    }

    #[test]
    fn optional_lookups_distinguish_absence() {
        let registry = ServiceRegistry::new();
        assert!(registry.find::<Barrier>().unwrap().is_none());
        assert!(matches!(registry.get::<Barrier>(), Err(RegistryError::Missing { .. })));
    }

    #[test]
    fn debug_lists_pending_factories() {
        let mut registry = ServiceRegistry::new();
        registry.add(Barrier(true)).unwrap();
        registry.add_factory(|_: &ServiceRegistry| Ok::<_, RegistryError>(7_u8)).unwrap();

        let rendered = format!("{registry:?}");
        assert!(rendered.contains("pending"));
        assert!(rendered.contains("created"));
    }

    trait Policy: Send + Sync {
        fn strict(&self) -> bool;
    }

    struct Strict;

    impl Policy for Strict {
        fn strict(&self) -> bool {
            true
        }
    }

    #[test]
    fn trait_objects_are_keyed_by_trait() {
        let mut registry = ServiceRegistry::new();
        registry.add_shared::<dyn Policy>(Arc::new(Strict)).unwrap();

        assert!(registry.contains::<dyn Policy>());
        assert!(!registry.contains::<Strict>());
        assert!(registry.get::<dyn Policy>().unwrap().strict());
    }

    #[test]
    fn shared_factories_produce_one_trait_object() {
        let mut registry = ServiceRegistry::new();
        registry
            .add_shared_factory(|_: &ServiceRegistry| {
                Ok::<_, RegistryError>(Arc::new(Strict) as Arc<dyn Policy>)
            })
            .unwrap();

        let first = registry.get::<dyn Policy>().unwrap();
        let second = registry.get::<dyn Policy>().unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn merge_moves_all_registrations() {
        let mut registry = ServiceRegistry::new();
        registry.add(Barrier(true)).unwrap();

        let mut staged = ServiceRegistry::new();
        staged.add(7_u8).unwrap();
        staged.add_factory(|_: &ServiceRegistry| Ok::<_, RegistryError>(9_u16)).unwrap();

        registry.merge(staged).unwrap();
        assert_eq!(registry.len(), 3);
        assert_eq!(*registry.get::<u16>().unwrap(), 9);
    }

    #[test]
    fn merge_with_a_conflict_changes_nothing() {
        let mut registry = ServiceRegistry::new();
        registry.add(Barrier(true)).unwrap();

        let mut staged = ServiceRegistry::new();
        staged.add(7_u8).unwrap();
        staged.add(Barrier(false)).unwrap();

        let err = registry.merge(staged).unwrap_err();
        assert!(matches!(err, RegistryError::Duplicate { .. }));
        assert_eq!(registry.len(), 1);
        assert!(!registry.contains::<u8>());
        assert_eq!(*registry.get::<Barrier>().unwrap(), Barrier(true));
    }
}
