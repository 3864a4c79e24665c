use std::sync::{Arc, Mutex};

use tracing::{debug, error};

use crate::{
    error::{Result, SysEventError},
    registry::{ListenerIdentity, ListenerProxy, ServiceLocator, SubscribeCallback},
    rules::{ListenerRule, convert_listener_rules},
};

/// Active subscriptions, kept in step with the rule set held by the service.
///
/// One mutex guards the listener list, and it stays held across the service
/// round-trips of add, remove and debug-mode calls. Operations on the same
/// identity therefore apply in lock order, at the cost of a slow service
/// stalling every other registry call.
pub struct SubscriptionRegistry {
    locator: Arc<dyn ServiceLocator>,
    listeners: Mutex<Vec<Arc<ListenerProxy>>>,
}

impl SubscriptionRegistry {
    pub fn new(locator: Arc<dyn ServiceLocator>) -> Self {
        Self {
            locator,
            listeners: Mutex::new(Vec::new()),
        }
    }

    /// Subscribes `callback` with `rules`, reusing the proxy already registered
    /// for the same `(callback, factor)`.
    ///
    /// Returns the service's result code unchanged.
    pub fn add_event_listener(
        &self,
        callback: Arc<dyn SubscribeCallback>,
        rules: &[ListenerRule],
        factor: u64,
    ) -> Result<i32> {
        let Some(service) = self.locator.get_service() else {
            error!("fail to get service, listener not added");
            return Err(SysEventError::ServiceUnavailable);
        };
        let event_rules = convert_listener_rules(rules)?;

        let mut listeners = self.listeners.lock().expect("listener registry poisoned");
        let existing = listeners
            .iter()
            .find(|p| p.compare(&callback, factor))
            .cloned();
        let (proxy, is_new) = match existing {
            Some(existing) => {
                debug!("add_event_listener old handle id={}", existing.id());
                (existing, false)
            }
            None => {
                let proxy = ListenerProxy::new(ListenerIdentity::new(callback, factor));
                debug!("add_event_listener new handle id={}", proxy.id());
                (proxy, true)
            }
        };
        debug!("add_event_listener subscribe {}", listeners.len());

        // the service handle may have been replaced since the proxy was created
        let recipient = proxy.death_recipient();
        service.remove_death_recipient(&recipient);
        service.add_death_recipient(recipient);

        let result = service.add_listener(&event_rules, Arc::clone(&proxy));
        if is_new {
            listeners.push(proxy);
        }
        Ok(result)
    }

    /// Drops the subscription of `(callback, factor)`. Unknown identities are a no-op.
    ///
    /// When the service cannot be reached the registry is left unchanged.
    /// Otherwise the entry is erased whatever the service answers.
    pub fn remove_listener(&self, callback: &Arc<dyn SubscribeCallback>, factor: u64) {
        let mut listeners = self.listeners.lock().expect("listener registry poisoned");
        let Some(index) = listeners.iter().position(|p| p.compare(callback, factor)) else {
            debug!("remove_listener: listener not registered");
            return;
        };
        let Some(service) = self.locator.get_service() else {
            error!(
                "fail to get service, listener id={} not removed",
                listeners[index].id()
            );
            return;
        };

        service.remove_listener(&listeners[index]);
        service.remove_death_recipient(&listeners[index].death_recipient());
        let proxy = listeners.remove(index);
        proxy.deactivate();
    }

    pub fn set_debug_mode(
        &self,
        callback: &Arc<dyn SubscribeCallback>,
        mode: bool,
        factor: u64,
    ) -> bool {
        let listeners = self.listeners.lock().expect("listener registry poisoned");
        let Some(proxy) = listeners.iter().find(|p| p.compare(callback, factor)) else {
            debug!("set_debug_mode: listener not registered");
            return false;
        };

        let Some(service) = self.locator.get_service() else {
            error!("fail to get service, debug mode unchanged");
            return false;
        };
        service.set_debug_mode(proxy, mode)
    }

    pub fn contains(&self, callback: &Arc<dyn SubscribeCallback>, factor: u64) -> bool {
        self.listeners
            .lock()
            .expect("listener registry poisoned")
            .iter()
            .any(|p| p.compare(callback, factor))
    }

    pub fn len(&self) -> usize {
        self.listeners.lock().expect("listener registry poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
