use serde::{Deserialize, Serialize};

use crate::{
    error::{Result, SysEventError},
    json::{FlatJsonParser, KeyValue, ValueKind},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
#[repr(i32)]
pub enum EventType {
    Fault = 1,
    Statistic = 2,
    Security = 3,
    Behavior = 4,
}

impl EventType {
    pub fn as_i32(&self) -> i32 {
        *self as i32
    }
}

impl TryFrom<i64> for EventType {
    type Error = SysEventError;

    fn try_from(value: i64) -> Result<Self> {
        match value {
            1 => Ok(EventType::Fault),
            2 => Ok(EventType::Statistic),
            3 => Ok(EventType::Security),
            4 => Ok(EventType::Behavior),
            _ => Err(malformed("unknown event type")),
        }
    }
}

pub(crate) const DOMAIN_KEY: &str = "domain_";
pub(crate) const NAME_KEY: &str = "name_";
pub(crate) const TYPE_KEY: &str = "type_";
pub(crate) const TIME_KEY: &str = "time_";
pub(crate) const TZ_KEY: &str = "tz_";
pub(crate) const PID_KEY: &str = "pid_";
pub(crate) const TID_KEY: &str = "tid_";
pub(crate) const UID_KEY: &str = "uid_";
pub(crate) const TRACE_ID_KEY: &str = "traceid_";
pub(crate) const SPAN_ID_KEY: &str = "spanid_";
pub(crate) const PSPAN_ID_KEY: &str = "pspanid_";
pub(crate) const TRACE_FLAG_KEY: &str = "trace_flag_";
pub(crate) const LEVEL_KEY: &str = "level_";
pub(crate) const TAG_KEY: &str = "tag_";

const RESERVED_KEYS: [&str; 14] = [
    DOMAIN_KEY,
    NAME_KEY,
    TYPE_KEY,
    TIME_KEY,
    TZ_KEY,
    PID_KEY,
    TID_KEY,
    UID_KEY,
    TRACE_ID_KEY,
    SPAN_ID_KEY,
    PSPAN_ID_KEY,
    TRACE_FLAG_KEY,
    LEVEL_KEY,
    TAG_KEY,
];

fn malformed(reason: &'static str) -> SysEventError {
    SysEventError::MalformedPayload { offset: 0, reason }
}

/// A system event as delivered by the service: header fields plus the raw payload.
#[derive(Debug, Clone)]
pub struct EventRecord {
    json: String,
    domain: String,
    event_name: String,
    event_type: EventType,
    time: u64,
    tz: String,
    pid: i64,
    tid: i64,
    uid: i64,
    trace_id: u64,
    span_id: u64,
    pspan_id: u64,
    trace_flag: i32,
    level: String,
    tag: String,
    params: Vec<KeyValue>,
}

impl EventRecord {
    pub fn from_json(json: &str) -> Result<Self> {
        let parser = FlatJsonParser::from_json(json)?;

        let domain = string_field(&parser, DOMAIN_KEY)?.ok_or(malformed("missing domain_"))?;
        let event_name = string_field(&parser, NAME_KEY)?.ok_or(malformed("missing name_"))?;
        let event_type = int_field(&parser, TYPE_KEY)?
            .ok_or(malformed("missing type_"))
            .and_then(EventType::try_from)?;

        let params = parser
            .pairs()
            .iter()
            .filter(|kv| !RESERVED_KEYS.contains(&kv.key.as_str()))
            .cloned()
            .collect();

        Ok(Self {
            json: json.to_string(),
            domain,
            event_name,
            event_type,
            time: unsigned_field(&parser, TIME_KEY)?.unwrap_or(0),
            tz: string_field(&parser, TZ_KEY)?.unwrap_or_default(),
            pid: int_field(&parser, PID_KEY)?.unwrap_or(0),
            tid: int_field(&parser, TID_KEY)?.unwrap_or(0),
            uid: int_field(&parser, UID_KEY)?.unwrap_or(0),
            trace_id: id_field(&parser, TRACE_ID_KEY)?.unwrap_or(0),
            span_id: id_field(&parser, SPAN_ID_KEY)?.unwrap_or(0),
            pspan_id: id_field(&parser, PSPAN_ID_KEY)?.unwrap_or(0),
            trace_flag: int_field(&parser, TRACE_FLAG_KEY)?
                .map(|v| i32::try_from(v).map_err(|_| malformed("trace_flag_ out of range")))
                .transpose()?
                .unwrap_or(0),
            level: string_field(&parser, LEVEL_KEY)?.unwrap_or_default(),
            tag: string_field(&parser, TAG_KEY)?.unwrap_or_default(),
            params,
        })
    }

    pub fn as_json(&self) -> &str {
        &self.json
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    pub fn event_name(&self) -> &str {
        &self.event_name
    }

    pub fn event_type(&self) -> EventType {
        self.event_type
    }

    /// Milliseconds since the epoch.
    pub fn time(&self) -> u64 {
        self.time
    }

    pub fn time_zone(&self) -> &str {
        &self.tz
    }

    pub fn pid(&self) -> i64 {
        self.pid
    }

    pub fn tid(&self) -> i64 {
        self.tid
    }

    pub fn uid(&self) -> i64 {
        self.uid
    }

    pub fn trace_id(&self) -> u64 {
        self.trace_id
    }

    pub fn span_id(&self) -> u64 {
        self.span_id
    }

    pub fn pspan_id(&self) -> u64 {
        self.pspan_id
    }

    pub fn trace_flag(&self) -> i32 {
        self.trace_flag
    }

    pub fn level(&self) -> &str {
        &self.level
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn get_param_names(&self) -> Vec<&str> {
        self.params.iter().map(|kv| kv.key.as_str()).collect()
    }

    /// Literal text of a custom parameter, escapes kept as written.
    pub fn get_param_value(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|kv| kv.key == key)
            .map(|kv| kv.value.as_str())
    }

    pub fn get_u64_value(&self, key: &str) -> Option<u64> {
        self.params
            .iter()
            .find(|kv| kv.key == key && kv.kind == ValueKind::Number)
            .and_then(|kv| kv.value.parse().ok())
    }

    pub fn get_i64_value(&self, key: &str) -> Option<i64> {
        self.params
            .iter()
            .find(|kv| kv.key == key && kv.kind == ValueKind::Number)
            .and_then(|kv| kv.value.parse().ok())
    }
}

fn string_field(parser: &FlatJsonParser, key: &str) -> Result<Option<String>> {
    match parser.get(key) {
        None => Ok(None),
        Some(kv) if kv.kind == ValueKind::String => Ok(Some(kv.value.clone())),
        Some(_) => Err(malformed("header field must be a string")),
    }
}

fn int_field(parser: &FlatJsonParser, key: &str) -> Result<Option<i64>> {
    match parser.get(key) {
        None => Ok(None),
        Some(kv) if kv.kind == ValueKind::Number => kv
            .value
            .parse()
            .map(Some)
            .map_err(|_| malformed("header field must be an integer")),
        Some(_) => Err(malformed("header field must be a number")),
    }
}

fn unsigned_field(parser: &FlatJsonParser, key: &str) -> Result<Option<u64>> {
    match parser.get(key) {
        None => Ok(None),
        Some(kv) if kv.kind == ValueKind::Number => kv
            .value
            .parse()
            .map(Some)
            .map_err(|_| malformed("header field must be an unsigned integer")),
        Some(_) => Err(malformed("header field must be a number")),
    }
}

/// Trace identifiers travel as hex strings; bare decimal numbers are accepted too.
fn id_field(parser: &FlatJsonParser, key: &str) -> Result<Option<u64>> {
    match parser.get(key) {
        None => Ok(None),
        Some(kv) => {
            let parsed = match kv.kind {
                ValueKind::String => u64::from_str_radix(&kv.value, 16),
                ValueKind::Number => kv.value.parse(),
                ValueKind::Raw => return Err(malformed("trace id must be a scalar")),
            };
            parsed
                .map(Some)
                .map_err(|_| malformed("trace id is not a valid integer"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{"domain_":"AAFWK","name_":"APP_CRASH","type_":1,"time_":1700000000123,"tz_":"+0800","pid_":1234,"tid_":1240,"uid_":20010,"traceid_":"a92ab1","spanid_":"1f","pspanid_":"0","trace_flag_":3,"level_":"CRITICAL","tag_":"ability","PACKAGE":"com.example","COUNT":7,"STACK":[1,2]}"#;

    #[test]
    fn header_fields_are_read() {
        let record = EventRecord::from_json(SAMPLE).expect("record");
        assert_eq!(record.domain(), "AAFWK");
        assert_eq!(record.event_name(), "APP_CRASH");
        assert_eq!(record.event_type(), EventType::Fault);
        assert_eq!(record.time(), 1_700_000_000_123);
        assert_eq!(record.time_zone(), "+0800");
        assert_eq!(record.pid(), 1234);
        assert_eq!(record.tid(), 1240);
        assert_eq!(record.uid(), 20010);
        assert_eq!(record.trace_id(), 0xa92ab1);
        assert_eq!(record.span_id(), 0x1f);
        assert_eq!(record.trace_flag(), 3);
        assert_eq!(record.level(), "CRITICAL");
        assert_eq!(record.tag(), "ability");
        assert_eq!(record.as_json(), SAMPLE);
    }

    #[test]
    fn custom_params_exclude_header() {
        let record = EventRecord::from_json(SAMPLE).expect("record");
        assert_eq!(record.get_param_names(), vec!["PACKAGE", "COUNT", "STACK"]);
        assert_eq!(record.get_param_value("PACKAGE"), Some("com.example"));
        assert_eq!(record.get_u64_value("COUNT"), Some(7));
        assert_eq!(record.get_u64_value("PACKAGE"), None);
        assert_eq!(record.get_param_value("STACK"), Some("[1,2]"));
        assert_eq!(record.get_param_value("domain_"), None);
    }

    #[test]
    fn missing_header_is_rejected() {
        let err = EventRecord::from_json(r#"{"name_":"X","type_":1}"#).expect_err("no domain");
        assert_eq!(
            err,
            SysEventError::MalformedPayload {
                offset: 0,
                reason: "missing domain_"
            }
        );
    }

    #[test]
    fn unknown_event_type_is_rejected() {
        assert!(EventRecord::from_json(r#"{"domain_":"D","name_":"N","type_":9}"#).is_err());
    }

    #[test]
    fn optional_header_fields_default() {
        let record = EventRecord::from_json(r#"{"domain_":"D","name_":"N","type_":4}"#)
            .expect("record");
        assert_eq!(record.event_type(), EventType::Behavior);
        assert_eq!(record.level(), "");
        assert_eq!(record.tag(), "");
        assert_eq!(record.trace_id(), 0);
    }
}
