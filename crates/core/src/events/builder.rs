use crate::{
    error::Result,
    events::{
        EventRecord, EventType,
        record::{
            DOMAIN_KEY, LEVEL_KEY, NAME_KEY, PID_KEY, PSPAN_ID_KEY, SPAN_ID_KEY, TAG_KEY,
            TID_KEY, TIME_KEY, TRACE_FLAG_KEY, TRACE_ID_KEY, TYPE_KEY, TZ_KEY, UID_KEY,
        },
    },
    json::{FlatJsonParser, escape, print_identity},
};

/// Producer-side assembly of an event payload.
pub struct EventRecordBuilder {
    domain: String,
    event_name: String,
    event_type: EventType,
    time: u64,
    tz: String,
    pid: i64,
    tid: i64,
    uid: i64,
    trace: Option<(u64, u64, u64, i32)>,
    level: String,
    tag: String,
    params: FlatJsonParser,
}

impl EventRecordBuilder {
    pub fn new(domain: &str, event_name: &str, event_type: EventType) -> Self {
        Self {
            domain: domain.to_string(),
            event_name: event_name.to_string(),
            event_type,
            time: 0,
            tz: String::new(),
            pid: 0,
            tid: 0,
            uid: 0,
            trace: None,
            level: String::new(),
            tag: String::new(),
            params: FlatJsonParser::new(),
        }
    }

    pub fn time(mut self, time: u64, tz: &str) -> Self {
        self.time = time;
        self.tz = tz.to_string();
        self
    }

    pub fn process(mut self, pid: i64, tid: i64, uid: i64) -> Self {
        self.pid = pid;
        self.tid = tid;
        self.uid = uid;
        self
    }

    pub fn trace(mut self, trace_id: u64, span_id: u64, pspan_id: u64, trace_flag: i32) -> Self {
        self.trace = Some((trace_id, span_id, pspan_id, trace_flag));
        self
    }

    pub fn level(mut self, level: &str) -> Self {
        self.level = level.to_string();
        self
    }

    pub fn tag(mut self, tag: &str) -> Self {
        self.tag = tag.to_string();
        self
    }

    pub fn param_str(mut self, key: &str, value: &str) -> Self {
        self.params.append_string_value(&escape(key), &escape(value));
        self
    }

    pub fn param_u64(mut self, key: &str, value: u64) -> Self {
        self.params.append_u64_value(&escape(key), value);
        self
    }

    pub fn param_i64(mut self, key: &str, value: i64) -> Self {
        self.params.append_i64_value(&escape(key), value);
        self
    }

    /// Header first, then custom params in insertion order.
    pub fn to_json(&self) -> String {
        let mut out = FlatJsonParser::new();
        out.append_string_value(DOMAIN_KEY, &escape(&self.domain));
        out.append_string_value(NAME_KEY, &escape(&self.event_name));
        out.append_i64_value(TYPE_KEY, i64::from(self.event_type.as_i32()));
        out.append_u64_value(TIME_KEY, self.time);
        out.append_string_value(TZ_KEY, &escape(&self.tz));
        out.append_i64_value(PID_KEY, self.pid);
        out.append_i64_value(TID_KEY, self.tid);
        out.append_i64_value(UID_KEY, self.uid);
        if let Some((trace_id, span_id, pspan_id, trace_flag)) = self.trace {
            out.append_string_value(TRACE_ID_KEY, &format!("{trace_id:x}"));
            out.append_string_value(SPAN_ID_KEY, &format!("{span_id:x}"));
            out.append_string_value(PSPAN_ID_KEY, &format!("{pspan_id:x}"));
            out.append_i64_value(TRACE_FLAG_KEY, i64::from(trace_flag));
        }
        if !self.level.is_empty() {
            out.append_string_value(LEVEL_KEY, &escape(&self.level));
        }
        if !self.tag.is_empty() {
            out.append_string_value(TAG_KEY, &escape(&self.tag));
        }

        let header = out.print(print_identity);
        let mut params = self.params.clone();
        let body = params.print(print_identity);
        if params.is_empty() {
            return header;
        }
        // splice "{header}" and "{body}" into one object
        format!("{},{}", &header[..header.len() - 1], &body[1..])
    }

    pub fn build(&self) -> Result<EventRecord> {
        EventRecord::from_json(&self.to_json())
    }
}
