//! System trait and registry
//!
//! Systems are user-defined objects that declare the component types and
//! queries they work with. The registry holds exactly one system per
//! concrete type and drives the three lifecycle phases in order:
//! component registration, query registration, initialization. Running
//! the per-frame update of a system stays user-driven.

use std::any::{Any, TypeId};

use rustc_hash::FxHashMap;
use tracing::warn;

use crate::world::World;

/// A unit of externally-owned logic over the container
pub trait System: Any + Send + Sync {
    /// Declare the component types this system will use
    fn register_components(&self, world: &mut World);

    /// Register archetype queries and keep their ids for later reads
    fn register_queries(&mut self, world: &mut World);

    /// Non-const setup; may create entities and seed components
    fn initialize(&mut self, world: &mut World) {
        let _ = world;
    }
}

/// Holds one system instance per concrete system type
#[derive(Default)]
pub struct SystemRegistry {
    systems: FxHashMap<TypeId, Box<dyn System>>,
    order: Vec<TypeId>,
}

impl SystemRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Construct and store a system of type `S`
    ///
    /// Returns a reference to the stored instance, or `None` when a
    /// system of this type is already registered.
    pub fn register<S: System + Default>(&mut self) -> Option<&mut S> {
        let type_id = TypeId::of::<S>();
        if self.systems.contains_key(&type_id) {
            warn!(?type_id, "system type already registered");
            return None;
        }

        self.systems.insert(type_id, Box::new(S::default()));
        self.order.push(type_id);
        self.get_mut::<S>()
    }

    pub fn get<S: System>(&self) -> Option<&S> {
        let boxed = self.systems.get(&TypeId::of::<S>())?;
        (&**boxed as &dyn Any).downcast_ref::<S>()
    }

    pub fn get_mut<S: System>(&mut self) -> Option<&mut S> {
        let boxed = self.systems.get_mut(&TypeId::of::<S>())?;
        (&mut **boxed as &mut dyn Any).downcast_mut::<S>()
    }

    /// Number of registered systems
    pub fn len(&self) -> usize {
        self.systems.len()
    }

    pub fn is_empty(&self) -> bool {
        self.systems.is_empty()
    }

    /// Phase 1: every system declares its component types
    pub fn register_components_all(&mut self, world: &mut World) {
        for type_id in &self.order {
            if let Some(system) = self.systems.get(type_id) {
                system.register_components(world);
            }
        }
    }

    /// Phase 2: every system registers its queries
    pub fn register_queries_all(&mut self, world: &mut World) {
        for type_id in &self.order {
            if let Some(system) = self.systems.get_mut(type_id) {
                system.register_queries(world);
            }
        }
    }

    /// Phase 3: every system runs its setup
    pub fn initialize_all(&mut self, world: &mut World) {
        for type_id in &self.order {
            if let Some(system) = self.systems.get_mut(type_id) {
                system.initialize(world);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct CounterSystem {
        initialized: bool,
    }

    impl System for CounterSystem {
        fn register_components(&self, world: &mut World) {
            world.register_component::<u32>();
        }

        fn register_queries(&mut self, _world: &mut World) {}

        fn initialize(&mut self, _world: &mut World) {
            self.initialized = true;
        }
    }

    #[derive(Default)]
    struct OtherSystem;

    impl System for OtherSystem {
        fn register_components(&self, _world: &mut World) {}

        fn register_queries(&mut self, _world: &mut World) {}
    }

    #[test]
    fn one_instance_per_type() {
        let mut registry = SystemRegistry::new();

        assert!(registry.register::<CounterSystem>().is_some());
        assert!(registry.register::<CounterSystem>().is_none());
        assert!(registry.register::<OtherSystem>().is_some());
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn typed_access_after_registration() {
        let mut registry = SystemRegistry::new();
        registry.register::<CounterSystem>();

        assert!(registry.get::<CounterSystem>().is_some());
        assert!(registry.get::<OtherSystem>().is_none());

        registry.get_mut::<CounterSystem>().unwrap().initialized = true;
        assert!(registry.get::<CounterSystem>().unwrap().initialized);
    }

    #[test]
    fn phases_reach_every_system() {
        let mut world = World::new();
        let mut registry = SystemRegistry::new();
        registry.register::<CounterSystem>();

        registry.register_components_all(&mut world);
        registry.register_queries_all(&mut world);
        registry.initialize_all(&mut world);

        assert!(registry.get::<CounterSystem>().unwrap().initialized);
    }
}
