use std::sync::Arc;

use crate::{
    registry::{DeathRecipient, ListenerProxy, QueryProxy},
    rules::{SysEventQueryRule, SysEventRule},
};

/// The remote event service, as seen through the transport.
///
/// Calls are synchronous and may block until the transport answers.
pub trait SysEventService: Send + Sync {
    fn add_listener(&self, rules: &[SysEventRule], listener: Arc<ListenerProxy>) -> i32;

    fn remove_listener(&self, listener: &Arc<ListenerProxy>) -> i32;

    fn set_debug_mode(&self, listener: &Arc<ListenerProxy>, mode: bool) -> bool;

    fn query(
        &self,
        begin_time: i64,
        end_time: i64,
        max_events: i32,
        rules: &[SysEventQueryRule],
        callback: Arc<QueryProxy>,
    ) -> bool;

    fn add_death_recipient(&self, recipient: Arc<DeathRecipient>) -> bool;

    fn remove_death_recipient(&self, recipient: &Arc<DeathRecipient>) -> bool;
}

/// Resolves the current service handle; `None` when it cannot be reached.
pub trait ServiceLocator: Send + Sync {
    fn get_service(&self) -> Option<Arc<dyn SysEventService>>;
}
