use std::{fmt, sync::Arc};

use crate::events::EventType;

/// Receiver of live events for one subscription.
pub trait SubscribeCallback: Send + Sync + 'static {
    fn on_event(&self, domain: &str, event_name: &str, event_type: EventType, event_detail: &str);
    fn on_service_died(&self);
}

/// Receiver of one historical query's results.
pub trait QueryCallback: Send + Sync + 'static {
    fn on_query(&self, records: &[String]);
    fn on_complete(&self, reason: i32, total: i32);
}

/// Identity of a subscription: the callback allocation plus a caller-chosen factor.
///
/// Equality is by pointer, so two clones of the same `Arc` are one identity
/// and two equal-valued callbacks are not. The factor lets one callback back
/// several independent subscriptions.
#[derive(Clone)]
pub struct ListenerIdentity {
    callback: Arc<dyn SubscribeCallback>,
    factor: u64,
}

impl ListenerIdentity {
    pub fn new(callback: Arc<dyn SubscribeCallback>, factor: u64) -> Self {
        Self { callback, factor }
    }

    pub fn callback(&self) -> &Arc<dyn SubscribeCallback> {
        &self.callback
    }

    pub fn factor(&self) -> u64 {
        self.factor
    }

    pub fn matches(&self, callback: &Arc<dyn SubscribeCallback>, factor: u64) -> bool {
        self.factor == factor && std::ptr::addr_eq(Arc::as_ptr(&self.callback), Arc::as_ptr(callback))
    }
}

impl PartialEq for ListenerIdentity {
    fn eq(&self, other: &Self) -> bool {
        self.matches(&other.callback, other.factor)
    }
}

impl Eq for ListenerIdentity {}

impl fmt::Debug for ListenerIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerIdentity")
            .field("callback", &Arc::as_ptr(&self.callback).cast::<()>())
            .field("factor", &self.factor)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Noop;

    impl SubscribeCallback for Noop {
        fn on_event(&self, _: &str, _: &str, _: EventType, _: &str) {}
        fn on_service_died(&self) {}
    }

    #[test]
    fn identity_is_pointer_and_factor() {
        let a: Arc<dyn SubscribeCallback> = Arc::new(Noop);
        let b: Arc<dyn SubscribeCallback> = Arc::new(Noop);

        assert_eq!(ListenerIdentity::new(Arc::clone(&a), 1), ListenerIdentity::new(Arc::clone(&a), 1));
        assert_ne!(ListenerIdentity::new(Arc::clone(&a), 1), ListenerIdentity::new(Arc::clone(&a), 2));
        assert_ne!(ListenerIdentity::new(a, 1), ListenerIdentity::new(b, 1));
    }
}
