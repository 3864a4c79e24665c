use std::ffi::{CStr, CString};

pub const MAX_DOMAIN_LEN: usize = 16;
pub const MAX_EVENT_NAME_LEN: usize = 32;
pub const MAX_TZ_LEN: usize = 5;
/// Upper bound of a single event payload (384 KiB).
pub const MAX_JSON_LEN: usize = 384 * 1024;

/// Fixed-layout event record handed out of this crate.
///
/// The fixed buffers reserve one extra byte so they always stay
/// nul-terminated. `level`, `tag` and `json_str` are owned by the record and
/// released by [`delete_record`](super::delete_record) or on drop.
#[derive(Debug, Clone)]
#[repr(C)]
pub struct CrossBoundaryRecord {
    pub domain: [u8; MAX_DOMAIN_LEN + 1],
    pub event_name: [u8; MAX_EVENT_NAME_LEN + 1],
    pub event_type: i32,
    pub time: u64,
    pub tz: [u8; MAX_TZ_LEN + 1],
    pub pid: i64,
    pub tid: i64,
    pub uid: i64,
    pub trace_id: u64,
    pub span_id: u64,
    pub pspan_id: u64,
    pub trace_flag: i32,
    pub level: Option<CString>,
    pub tag: Option<CString>,
    pub json_str: Option<CString>,
}

impl CrossBoundaryRecord {
    pub fn zeroed() -> Self {
        Self {
            domain: [0; MAX_DOMAIN_LEN + 1],
            event_name: [0; MAX_EVENT_NAME_LEN + 1],
            event_type: 0,
            time: 0,
            tz: [0; MAX_TZ_LEN + 1],
            pid: 0,
            tid: 0,
            uid: 0,
            trace_id: 0,
            span_id: 0,
            pspan_id: 0,
            trace_flag: 0,
            level: None,
            tag: None,
            json_str: None,
        }
    }

    pub fn domain_str(&self) -> &str {
        fixed_str(&self.domain)
    }

    pub fn event_name_str(&self) -> &str {
        fixed_str(&self.event_name)
    }

    pub fn tz_str(&self) -> &str {
        fixed_str(&self.tz)
    }

    pub fn level_str(&self) -> Option<&str> {
        self.level.as_deref().and_then(|s| s.to_str().ok())
    }

    pub fn tag_str(&self) -> Option<&str> {
        self.tag.as_deref().and_then(|s| s.to_str().ok())
    }

    pub fn json_str(&self) -> Option<&str> {
        self.json_str.as_deref().and_then(|s| s.to_str().ok())
    }

    /// True when none of the heap-owned fields is populated.
    pub fn is_released(&self) -> bool {
        self.level.is_none() && self.tag.is_none() && self.json_str.is_none()
    }
}

impl Default for CrossBoundaryRecord {
    fn default() -> Self {
        Self::zeroed()
    }
}

fn fixed_str(buf: &[u8]) -> &str {
    CStr::from_bytes_until_nul(buf)
        .ok()
        .and_then(|s| s.to_str().ok())
        .unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fields_keep_declaration_order() {
        use std::mem::offset_of;

        assert_eq!(offset_of!(CrossBoundaryRecord, domain), 0);
        assert_eq!(
            offset_of!(CrossBoundaryRecord, event_name),
            MAX_DOMAIN_LEN + 1
        );
        assert!(
            offset_of!(CrossBoundaryRecord, event_type)
                >= offset_of!(CrossBoundaryRecord, event_name) + MAX_EVENT_NAME_LEN + 1
        );
        assert!(offset_of!(CrossBoundaryRecord, time) < offset_of!(CrossBoundaryRecord, tz));
        assert!(
            offset_of!(CrossBoundaryRecord, trace_flag) < offset_of!(CrossBoundaryRecord, level)
        );
        assert!(offset_of!(CrossBoundaryRecord, tag) < offset_of!(CrossBoundaryRecord, json_str));
    }

    #[test]
    fn zeroed_record_is_empty() {
        let record = CrossBoundaryRecord::zeroed();
        assert_eq!(record.domain_str(), "");
        assert_eq!(record.event_name_str(), "");
        assert_eq!(record.tz_str(), "");
        assert!(record.domain.iter().all(|b| *b == 0));
        assert!(record.is_released());
    }

    #[test]
    fn fixed_buffers_leave_room_for_terminator() {
        let record = CrossBoundaryRecord::zeroed();
        assert_eq!(record.domain.len(), MAX_DOMAIN_LEN + 1);
        assert_eq!(record.event_name.len(), MAX_EVENT_NAME_LEN + 1);
        assert_eq!(record.tz.len(), MAX_TZ_LEN + 1);
    }
}
