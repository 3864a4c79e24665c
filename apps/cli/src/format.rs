use console::style;
use sysevent_core::{CrossBoundaryRecord, EventRecord, EventType};

/// Format epoch milliseconds as `seconds.millis`
pub fn format_timestamp(time_ms: u64) -> String {
    format!("{}.{:03}", time_ms / 1000, time_ms % 1000)
}

pub fn format_event_type(event_type: EventType) -> &'static str {
    match event_type {
        EventType::Fault => "FAULT",
        EventType::Statistic => "STATISTIC",
        EventType::Security => "SECURITY",
        EventType::Behavior => "BEHAVIOR",
    }
}

/// One-line summary of a record followed by its custom params
pub fn format_record(record: &EventRecord) -> String {
    let mut output = format!(
        "{} {}/{} {} pid={} uid={}",
        style(format!("[{} {}]", format_timestamp(record.time()), record.time_zone())).dim(),
        style(record.domain()).cyan().bold(),
        style(record.event_name()).cyan(),
        style(format_event_type(record.event_type())).yellow(),
        record.pid(),
        record.uid(),
    );
    if !record.tag().is_empty() {
        output.push_str(&format!(" tag={}", record.tag()));
    }
    for name in record.get_param_names() {
        let value = record.get_param_value(name).unwrap_or_default();
        output.push_str(&format!("\n    {} = {}", style(name).dim(), value));
    }
    output
}

pub fn format_boundary_record(record: &CrossBoundaryRecord) -> String {
    format!(
        "domain={} eventName={} type={} time={} tz={} pid={} tid={} uid={} traceId={:x} spanId={:x} pspanId={:x} traceFlag={} level={} tag={} jsonStr={} bytes",
        record.domain_str(),
        record.event_name_str(),
        record.event_type,
        record.time,
        record.tz_str(),
        record.pid,
        record.tid,
        record.uid,
        record.trace_id,
        record.span_id,
        record.pspan_id,
        record.trace_flag,
        record.level_str().unwrap_or_default(),
        record.tag_str().unwrap_or_default(),
        record.json_str().map(str::len).unwrap_or(0),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timestamp_keeps_millis() {
        assert_eq!(format_timestamp(1_700_000_000_123), "1700000000.123");
        assert_eq!(format_timestamp(5), "0.005");
    }
}
