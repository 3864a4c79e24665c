use std::ffi::CString;

use tracing::error;

use crate::{
    error::{RecordField, Result, SysEventError},
    events::EventRecord,
    marshal::record::{
        CrossBoundaryRecord, MAX_DOMAIN_LEN, MAX_EVENT_NAME_LEN, MAX_JSON_LEN, MAX_TZ_LEN,
    },
};

/// Bounded copy into a fixed buffer; a source longer than `max_len` is an error, never truncated.
fn copy_c_string<const N: usize>(
    dst: &mut [u8; N],
    src: &str,
    max_len: usize,
    field: RecordField,
) -> Result<()> {
    let bytes = src.as_bytes();
    if bytes.len() > max_len || bytes.len() >= N {
        return Err(SysEventError::FieldTooLong {
            field,
            len: bytes.len(),
            max: max_len,
        });
    }
    if bytes.contains(&0) {
        return Err(SysEventError::InteriorNul { field });
    }
    dst.fill(0);
    dst[..bytes.len()].copy_from_slice(bytes);
    Ok(())
}

fn create_c_string(src: &str, max_len: Option<usize>, field: RecordField) -> Result<CString> {
    let bytes = src.as_bytes();
    if let Some(max) = max_len
        && bytes.len() > max
    {
        return Err(SysEventError::FieldTooLong {
            field,
            len: bytes.len(),
            max,
        });
    }
    let mut buf = Vec::new();
    buf.try_reserve_exact(bytes.len() + 1)
        .map_err(|_| SysEventError::AllocationFailure { field })?;
    buf.extend_from_slice(bytes);
    CString::new(buf).map_err(|_| SysEventError::InteriorNul { field })
}

pub fn convert_domain(src: &EventRecord, dst: &mut CrossBoundaryRecord) -> Result<()> {
    copy_c_string(&mut dst.domain, src.domain(), MAX_DOMAIN_LEN, RecordField::Domain)
}

pub fn convert_event_name(src: &EventRecord, dst: &mut CrossBoundaryRecord) -> Result<()> {
    copy_c_string(
        &mut dst.event_name,
        src.event_name(),
        MAX_EVENT_NAME_LEN,
        RecordField::EventName,
    )
}

pub fn convert_time_zone(src: &EventRecord, dst: &mut CrossBoundaryRecord) -> Result<()> {
    copy_c_string(&mut dst.tz, src.time_zone(), MAX_TZ_LEN, RecordField::TimeZone)
}

pub fn convert_level(src: &EventRecord, dst: &mut CrossBoundaryRecord) -> Result<()> {
    dst.level = Some(create_c_string(src.level(), None, RecordField::Level)?);
    Ok(())
}

pub fn convert_tag(src: &EventRecord, dst: &mut CrossBoundaryRecord) -> Result<()> {
    dst.tag = Some(create_c_string(src.tag(), None, RecordField::Tag)?);
    Ok(())
}

pub fn convert_json_str(src: &EventRecord, dst: &mut CrossBoundaryRecord) -> Result<()> {
    dst.json_str = Some(create_c_string(
        src.as_json(),
        Some(MAX_JSON_LEN),
        RecordField::JsonStr,
    )?);
    Ok(())
}

/// Fills `dst` from `src`, stopping at the first failing step.
///
/// Fields written before the failure are left in place; pass the record to
/// [`delete_record`] before dropping it on error.
pub fn convert_record(src: &EventRecord, dst: &mut CrossBoundaryRecord) -> Result<()> {
    if let Err(e) = convert_domain(src, dst) {
        error!("failed to convert domain={}", src.domain());
        return Err(e);
    }
    if let Err(e) = convert_event_name(src, dst) {
        error!("failed to convert name={}", src.event_name());
        return Err(e);
    }
    dst.event_type = src.event_type().as_i32();
    dst.time = src.time();
    if let Err(e) = convert_time_zone(src, dst) {
        error!("failed to convert tz={}", src.time_zone());
        return Err(e);
    }
    dst.pid = src.pid();
    dst.tid = src.tid();
    dst.uid = src.uid();
    dst.trace_id = src.trace_id();
    dst.span_id = src.span_id();
    dst.pspan_id = src.pspan_id();
    dst.trace_flag = src.trace_flag();
    if let Err(e) = convert_level(src, dst) {
        error!("failed to convert level={}", src.level());
        return Err(e);
    }
    if let Err(e) = convert_tag(src, dst) {
        error!("failed to convert tag={}", src.tag());
        return Err(e);
    }
    if let Err(e) = convert_json_str(src, dst) {
        error!("failed to convert jsonStr of {} bytes", src.as_json().len());
        return Err(e);
    }
    Ok(())
}

pub fn init_record(record: &mut CrossBoundaryRecord) {
    *record = CrossBoundaryRecord::zeroed();
}

/// Releases the heap-owned fields. Safe to call on an already released record.
pub fn delete_record(record: &mut CrossBoundaryRecord) {
    record.level = None;
    record.tag = None;
    record.json_str = None;
}

/// Releases every record and the array itself, leaving `records` empty.
pub fn delete_records(records: &mut Option<Vec<CrossBoundaryRecord>>) {
    let Some(mut array) = records.take() else {
        return;
    };
    for record in array.iter_mut() {
        delete_record(record);
    }
}

/// Converts a batch. All or nothing: on failure every record converted so
/// far is released and the failing step's error is returned.
pub fn convert_records(src: &[EventRecord]) -> Result<Vec<CrossBoundaryRecord>> {
    let mut out = Vec::with_capacity(src.len());
    for record in src {
        let mut dst = CrossBoundaryRecord::zeroed();
        if let Err(e) = convert_record(record, &mut dst) {
            delete_record(&mut dst);
            let mut partial = Some(out);
            delete_records(&mut partial);
            return Err(e);
        }
        out.push(dst);
    }
    Ok(out)
}
