use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use tracing::debug;
use uuid::Uuid;

use crate::{
    events::EventType,
    registry::{ListenerIdentity, QueryCallback, SubscribeCallback},
};

/// Remote-facing handle of one subscription.
///
/// The service only dispatches to it or reports its own death through the
/// [`DeathRecipient`]. Once the registry drops the subscription the proxy
/// is deactivated and late deliveries are discarded.
pub struct ListenerProxy {
    id: Uuid,
    identity: ListenerIdentity,
    death_recipient: Arc<DeathRecipient>,
    active: Arc<AtomicBool>,
}

impl ListenerProxy {
    pub fn new(identity: ListenerIdentity) -> Arc<Self> {
        let id = Uuid::new_v4();
        let active = Arc::new(AtomicBool::new(true));
        Arc::new(Self {
            id,
            death_recipient: Arc::new(DeathRecipient {
                id,
                callback: Arc::clone(identity.callback()),
                active: Arc::clone(&active),
            }),
            identity,
            active,
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn identity(&self) -> &ListenerIdentity {
        &self.identity
    }

    pub fn compare(&self, callback: &Arc<dyn SubscribeCallback>, factor: u64) -> bool {
        self.identity.matches(callback, factor)
    }

    pub fn death_recipient(&self) -> Arc<DeathRecipient> {
        Arc::clone(&self.death_recipient)
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    pub(crate) fn deactivate(&self) {
        self.active.store(false, Ordering::Release);
    }

    /// Returns false when the event was dropped because the proxy is no longer registered.
    pub fn on_event(
        &self,
        domain: &str,
        event_name: &str,
        event_type: EventType,
        event_detail: &str,
    ) -> bool {
        if !self.is_active() {
            debug!("drop event {}/{} for removed listener id={}", domain, event_name, self.id);
            return false;
        }
        self.identity
            .callback()
            .on_event(domain, event_name, event_type, event_detail);
        true
    }
}

/// Death watch attached to the service on behalf of one [`ListenerProxy`].
pub struct DeathRecipient {
    id: Uuid,
    callback: Arc<dyn SubscribeCallback>,
    active: Arc<AtomicBool>,
}

impl DeathRecipient {
    /// Same id as the owning proxy.
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn on_remote_died(&self) {
        if !self.active.load(Ordering::Acquire) {
            debug!("service died after listener id={} was removed", self.id);
            return;
        }
        self.callback.on_service_died();
    }
}

/// Remote-facing wrapper of a query callback, alive for a single query.
pub struct QueryProxy {
    callback: Arc<dyn QueryCallback>,
}

impl QueryProxy {
    pub fn new(callback: Arc<dyn QueryCallback>) -> Arc<Self> {
        Arc::new(Self { callback })
    }

    pub fn on_query(&self, records: &[String]) {
        self.callback.on_query(records);
    }

    pub fn on_complete(&self, reason: i32, total: i32) {
        self.callback.on_complete(reason, total);
    }
}
