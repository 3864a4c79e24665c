#![allow(dead_code)]

use std::sync::{
    Arc, Mutex,
    mpsc::{Receiver, Sender},
};

use sysevent_core::{
    EventType, QueryCallback, SubscribeCallback, SysEventService,
    registry::{DeathRecipient, ListenerProxy, QueryProxy},
    rules::{SysEventQueryRule, SysEventRule},
};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    AddListener { proxy: Uuid, rules: Vec<SysEventRule> },
    RemoveListener { proxy: Uuid },
    SetDebugMode { proxy: Uuid, mode: bool },
    Query { begin: i64, end: i64, max: i32, rules: usize },
    AddDeathRecipient { proxy: Uuid },
    RemoveDeathRecipient { proxy: Uuid },
}

/// Service double that records every call and answers with fixed results.
pub struct MockService {
    pub name: &'static str,
    pub calls: Mutex<Vec<Call>>,
    pub add_result: i32,
    pub proxies: Mutex<Vec<Arc<ListenerProxy>>>,
}

impl MockService {
    pub fn new(name: &'static str) -> Arc<Self> {
        Self::with_add_result(name, 0)
    }

    pub fn with_add_result(name: &'static str, add_result: i32) -> Arc<Self> {
        Arc::new(Self {
            name,
            calls: Mutex::new(Vec::new()),
            add_result,
            proxies: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

impl SysEventService for MockService {
    fn add_listener(&self, rules: &[SysEventRule], listener: Arc<ListenerProxy>) -> i32 {
        self.record(Call::AddListener {
            proxy: listener.id(),
            rules: rules.to_vec(),
        });
        self.proxies.lock().unwrap().push(listener);
        self.add_result
    }

    fn remove_listener(&self, listener: &Arc<ListenerProxy>) -> i32 {
        self.record(Call::RemoveListener { proxy: listener.id() });
        0
    }

    fn set_debug_mode(&self, listener: &Arc<ListenerProxy>, mode: bool) -> bool {
        self.record(Call::SetDebugMode {
            proxy: listener.id(),
            mode,
        });
        true
    }

    fn query(
        &self,
        begin_time: i64,
        end_time: i64,
        max_events: i32,
        rules: &[SysEventQueryRule],
        callback: Arc<QueryProxy>,
    ) -> bool {
        self.record(Call::Query {
            begin: begin_time,
            end: end_time,
            max: max_events,
            rules: rules.len(),
        });
        callback.on_query(&["{}".to_string()]);
        callback.on_complete(0, 1);
        true
    }

    fn add_death_recipient(&self, recipient: Arc<DeathRecipient>) -> bool {
        self.record(Call::AddDeathRecipient {
            proxy: recipient.id(),
        });
        true
    }

    fn remove_death_recipient(&self, recipient: &Arc<DeathRecipient>) -> bool {
        self.record(Call::RemoveDeathRecipient {
            proxy: recipient.id(),
        });
        true
    }
}

/// Forwards to a [`MockService`], but `add_listener` reports entry on
/// `entered` and then waits for a message on `release`.
pub struct GatedService {
    pub inner: Arc<MockService>,
    entered: Mutex<Sender<()>>,
    release: Mutex<Receiver<()>>,
}

impl GatedService {
    pub fn new(inner: Arc<MockService>, entered: Sender<()>, release: Receiver<()>) -> Arc<Self> {
        Arc::new(Self {
            inner,
            entered: Mutex::new(entered),
            release: Mutex::new(release),
        })
    }
}

impl SysEventService for GatedService {
    fn add_listener(&self, rules: &[SysEventRule], listener: Arc<ListenerProxy>) -> i32 {
        let _ = self.entered.lock().unwrap().send(());
        let _ = self.release.lock().unwrap().recv();
        self.inner.add_listener(rules, listener)
    }

    fn remove_listener(&self, listener: &Arc<ListenerProxy>) -> i32 {
        self.inner.remove_listener(listener)
    }

    fn set_debug_mode(&self, listener: &Arc<ListenerProxy>, mode: bool) -> bool {
        self.inner.set_debug_mode(listener, mode)
    }

    fn query(
        &self,
        begin_time: i64,
        end_time: i64,
        max_events: i32,
        rules: &[SysEventQueryRule],
        callback: Arc<QueryProxy>,
    ) -> bool {
        self.inner
            .query(begin_time, end_time, max_events, rules, callback)
    }

    fn add_death_recipient(&self, recipient: Arc<DeathRecipient>) -> bool {
        self.inner.add_death_recipient(recipient)
    }

    fn remove_death_recipient(&self, recipient: &Arc<DeathRecipient>) -> bool {
        self.inner.remove_death_recipient(recipient)
    }
}

#[derive(Default)]
pub struct RecordingListener {
    pub events: Mutex<Vec<(String, String, EventType, String)>>,
    pub deaths: Mutex<u32>,
}

impl RecordingListener {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn event_names(&self) -> Vec<String> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .map(|(_, name, _, _)| name.clone())
            .collect()
    }

    pub fn deaths(&self) -> u32 {
        *self.deaths.lock().unwrap()
    }
}

impl SubscribeCallback for RecordingListener {
    fn on_event(&self, domain: &str, event_name: &str, event_type: EventType, event_detail: &str) {
        self.events.lock().unwrap().push((
            domain.to_string(),
            event_name.to_string(),
            event_type,
            event_detail.to_string(),
        ));
    }

    fn on_service_died(&self) {
        *self.deaths.lock().unwrap() += 1;
    }
}

#[derive(Default)]
pub struct RecordingQuery {
    pub records: Mutex<Vec<String>>,
    pub batches: Mutex<usize>,
    pub completed: Mutex<Option<(i32, i32)>>,
}

impl RecordingQuery {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }
}

impl QueryCallback for RecordingQuery {
    fn on_query(&self, records: &[String]) {
        *self.batches.lock().unwrap() += 1;
        self.records.lock().unwrap().extend_from_slice(records);
    }

    fn on_complete(&self, reason: i32, total: i32) {
        *self.completed.lock().unwrap() = Some((reason, total));
    }
}
