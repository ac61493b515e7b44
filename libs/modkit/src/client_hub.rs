//! Typed registry of inter-module clients.
//!
//! Providers publish an `Arc<dyn Api>` once during `init`; consumers fetch it by
//! interface type with `hub.get::<dyn Api>()`. Re-registering replaces the entry;
//! Arcs already handed out stay valid.

use parking_lot::RwLock;
use std::{
    any::{Any, TypeId},
    collections::HashMap,
    sync::Arc,
};

#[derive(Debug, thiserror::Error)]
pub enum ClientHubError {
    #[error("client not registered: {type_name}")]
    NotFound { type_name: &'static str },
}

struct Slot {
    type_name: &'static str,
    value: Box<dyn Any + Send + Sync>,
}

#[derive(Default)]
pub struct ClientHub {
    map: RwLock<HashMap<TypeId, Slot>>,
}

impl ClientHub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<T>(&self, client: Arc<T>)
    where
        T: ?Sized + Send + Sync + 'static,
    {
        let slot = Slot {
            type_name: std::any::type_name::<T>(),
            value: Box::new(client),
        };
        if let Some(prev) = self.map.write().insert(TypeId::of::<T>(), slot) {
            tracing::debug!(client = prev.type_name, "client replaced in hub");
        }
    }

    pub fn get<T>(&self) -> Result<Arc<T>, ClientHubError>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        self.map
            .read()
            .get(&TypeId::of::<T>())
            .and_then(|slot| slot.value.downcast_ref::<Arc<T>>())
            .cloned()
            .ok_or(ClientHubError::NotFound {
                type_name: std::any::type_name::<T>(),
            })
    }

    pub fn contains<T>(&self) -> bool
    where
        T: ?Sized + Send + Sync + 'static,
    {
        self.map.read().contains_key(&TypeId::of::<T>())
    }

    pub fn len(&self) -> usize {
        self.map.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[async_trait::async_trait]
    trait Lookup: Send + Sync {
        async fn id(&self) -> usize;
    }

    struct Fixed(usize);

    #[async_trait::async_trait]
    impl Lookup for Fixed {
        async fn id(&self) -> usize {
            self.0
        }
    }

    #[tokio::test]
    async fn register_and_fetch_by_trait_object() {
        let hub = ClientHub::new();
        let api: Arc<dyn Lookup> = Arc::new(Fixed(7));
        hub.register::<dyn Lookup>(api.clone());

        let got = hub.get::<dyn Lookup>().unwrap();
        assert_eq!(got.id().await, 7);
        assert!(Arc::ptr_eq(&api, &got));
        assert_eq!(hub.len(), 1);
    }

    #[tokio::test]
    async fn re_registering_replaces_the_client() {
        let hub = ClientHub::new();
        hub.register::<dyn Lookup>(Arc::new(Fixed(1)));
        let old = hub.get::<dyn Lookup>().unwrap();
        hub.register::<dyn Lookup>(Arc::new(Fixed(2)));

        assert_eq!(hub.get::<dyn Lookup>().unwrap().id().await, 2);
        assert_eq!(old.id().await, 1);
        assert_eq!(hub.len(), 1);
    }

    #[test]
    fn missing_client_reports_its_type() {
        let hub = ClientHub::new();
        let err = hub.get::<dyn Lookup>().err().unwrap();
        assert!(err.to_string().contains("Lookup"));
        assert!(!hub.contains::<dyn Lookup>());
        assert!(hub.is_empty());
    }
}
