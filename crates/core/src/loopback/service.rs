use std::{
    collections::VecDeque,
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, Ordering},
    },
};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::{
    error::Result,
    events::EventRecord,
    registry::{DeathRecipient, ListenerProxy, QueryProxy, SysEventService},
    rules::{SysEventQueryRule, SysEventRule},
};

pub const ERR_SERVICE_DEAD: i32 = -1;
pub const ERR_LISTENER_NOT_EXIST: i32 = -2;

/// Tag reserved for events only debug-mode listeners receive.
pub const DEBUG_TAG: &str = "debug";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoopbackConfig {
    /// Oldest events are dropped once the history is full.
    pub history_capacity: usize,
    /// Cap applied to every query, including unbounded ones.
    pub max_query_events: usize,
    pub query_batch_size: usize,
}

impl Default for LoopbackConfig {
    fn default() -> Self {
        Self {
            history_capacity: 10_000,
            max_query_events: 1_000,
            query_batch_size: 50,
        }
    }
}

struct Subscriber {
    proxy: Arc<ListenerProxy>,
    rules: Vec<SysEventRule>,
    debug: bool,
}

/// In-process event service: keeps a bounded history, dispatches published
/// events to matching listeners and answers queries from the history.
pub struct LoopbackService {
    config: LoopbackConfig,
    history: Mutex<VecDeque<EventRecord>>,
    subscribers: Mutex<Vec<Subscriber>>,
    recipients: Mutex<Vec<Arc<DeathRecipient>>>,
    alive: AtomicBool,
}

impl LoopbackService {
    pub fn new(config: LoopbackConfig) -> Self {
        Self {
            history: Mutex::new(VecDeque::with_capacity(config.history_capacity.min(1024))),
            config,
            subscribers: Mutex::new(Vec::new()),
            recipients: Mutex::new(Vec::new()),
            alive: AtomicBool::new(true),
        }
    }

    pub fn is_alive(&self) -> bool {
        self.alive.load(Ordering::Acquire)
    }

    /// Stores `record` and delivers it to every matching listener.
    ///
    /// Returns the number of listeners that received it.
    pub fn publish(&self, record: EventRecord) -> usize {
        if !self.is_alive() {
            warn!("publish on dead service dropped {}/{}", record.domain(), record.event_name());
            return 0;
        }

        let targets: Vec<Arc<ListenerProxy>> = {
            let subscribers = self.subscribers.lock().expect("subscribers poisoned");
            subscribers
                .iter()
                .filter(|s| s.debug || record.tag() != DEBUG_TAG)
                .filter(|s| {
                    s.rules
                        .iter()
                        .any(|r| r.matches(record.domain(), record.event_name(), record.tag()))
                })
                .map(|s| Arc::clone(&s.proxy))
                .collect()
        };

        // deliver outside the lock so callbacks may call back into the service
        let delivered = targets
            .iter()
            .filter(|proxy| {
                proxy.on_event(
                    record.domain(),
                    record.event_name(),
                    record.event_type(),
                    record.as_json(),
                )
            })
            .count();

        let mut history = self.history.lock().expect("history poisoned");
        if history.len() >= self.config.history_capacity {
            history.pop_front();
        }
        if self.config.history_capacity > 0 {
            history.push_back(record);
        }
        delivered
    }

    pub fn publish_json(&self, json: &str) -> Result<usize> {
        Ok(self.publish(EventRecord::from_json(json)?))
    }

    /// Simulates the service process dying: every death recipient is notified once.
    pub fn kill(&self) {
        if !self.alive.swap(false, Ordering::AcqRel) {
            return;
        }
        let recipients =
            std::mem::take(&mut *self.recipients.lock().expect("recipients poisoned"));
        self.subscribers.lock().expect("subscribers poisoned").clear();
        info!("service died, notifying {} recipients", recipients.len());
        for recipient in recipients {
            recipient.on_remote_died();
        }
    }

    pub fn listener_count(&self) -> usize {
        self.subscribers.lock().expect("subscribers poisoned").len()
    }

    pub fn death_recipient_count(&self) -> usize {
        self.recipients.lock().expect("recipients poisoned").len()
    }

    pub fn history_len(&self) -> usize {
        self.history.lock().expect("history poisoned").len()
    }
}

fn in_window(time: u64, begin_time: i64, end_time: i64) -> bool {
    let time = i128::from(time);
    (begin_time < 0 || time >= i128::from(begin_time)) && (end_time < 0 || time <= i128::from(end_time))
}

impl SysEventService for LoopbackService {
    fn add_listener(&self, rules: &[SysEventRule], listener: Arc<ListenerProxy>) -> i32 {
        if !self.is_alive() {
            return ERR_SERVICE_DEAD;
        }
        let mut subscribers = self.subscribers.lock().expect("subscribers poisoned");
        match subscribers.iter_mut().find(|s| s.proxy.id() == listener.id()) {
            Some(existing) => {
                debug!("replace rules of listener id={}", listener.id());
                existing.rules = rules.to_vec();
            }
            None => {
                debug!("add listener id={} with {} rules", listener.id(), rules.len());
                subscribers.push(Subscriber {
                    proxy: listener,
                    rules: rules.to_vec(),
                    debug: false,
                });
            }
        }
        0
    }

    fn remove_listener(&self, listener: &Arc<ListenerProxy>) -> i32 {
        if !self.is_alive() {
            return ERR_SERVICE_DEAD;
        }
        let mut subscribers = self.subscribers.lock().expect("subscribers poisoned");
        let before = subscribers.len();
        subscribers.retain(|s| s.proxy.id() != listener.id());
        if subscribers.len() == before {
            return ERR_LISTENER_NOT_EXIST;
        }
        0
    }

    fn set_debug_mode(&self, listener: &Arc<ListenerProxy>, mode: bool) -> bool {
        if !self.is_alive() {
            return false;
        }
        let mut subscribers = self.subscribers.lock().expect("subscribers poisoned");
        match subscribers.iter_mut().find(|s| s.proxy.id() == listener.id()) {
            Some(subscriber) => {
                subscriber.debug = mode;
                true
            }
            None => false,
        }
    }

    fn query(
        &self,
        begin_time: i64,
        end_time: i64,
        max_events: i32,
        rules: &[SysEventQueryRule],
        callback: Arc<QueryProxy>,
    ) -> bool {
        if !self.is_alive() {
            return false;
        }
        let limit = usize::try_from(max_events)
            .map(|max| max.min(self.config.max_query_events))
            .unwrap_or(self.config.max_query_events);

        let matched: Vec<String> = {
            let history = self.history.lock().expect("history poisoned");
            history
                .iter()
                .filter(|r| in_window(r.time(), begin_time, end_time))
                .filter(|r| rules.is_empty() || rules.iter().any(|q| q.matches(r.domain(), r.event_name())))
                .take(limit)
                .map(|r| r.as_json().to_string())
                .collect()
        };

        for batch in matched.chunks(self.config.query_batch_size.max(1)) {
            callback.on_query(batch);
        }
        callback.on_complete(0, i32::try_from(matched.len()).unwrap_or(i32::MAX));
        true
    }

    fn add_death_recipient(&self, recipient: Arc<DeathRecipient>) -> bool {
        if !self.is_alive() {
            return false;
        }
        let mut recipients = self.recipients.lock().expect("recipients poisoned");
        if recipients.iter().any(|r| r.id() == recipient.id()) {
            return false;
        }
        recipients.push(recipient);
        true
    }

    fn remove_death_recipient(&self, recipient: &Arc<DeathRecipient>) -> bool {
        let mut recipients = self.recipients.lock().expect("recipients poisoned");
        let before = recipients.len();
        recipients.retain(|r| r.id() != recipient.id());
        recipients.len() != before
    }
}
