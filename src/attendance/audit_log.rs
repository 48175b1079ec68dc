use chrono::NaiveDateTime;

use crate::model::attendance::AttendanceRecord;

pub const ACTION_DIRECT_CORRECTION: &str = "管理者修正";
pub const ACTION_REQUEST_APPROVED: &str = "申請承認";
pub const ACTION_RECORD_CREATED: &str = "管理者作成";

/// One line of a record's audit trail.
#[derive(Debug, Clone)]
pub struct AuditEntry<'a> {
    pub action: &'a str,
    pub actor: &'a str,
    pub reason: &'a str,
    pub request_id: Option<u64>,
    pub at: NaiveDateTime,
}

impl AuditEntry<'_> {
    /// `[action YYYY-MM-DD HH:MM by actor] [申請ID: id] reason`
    pub fn format(&self) -> String {
        let mut line = format!(
            "[{} {} by {}]",
            self.action,
            self.at.format("%Y-%m-%d %H:%M"),
            self.actor
        );
        if let Some(id) = self.request_id {
            line.push_str(&format!(" [申請ID: {id}]"));
        }
        let reason = self.reason.trim();
        if !reason.is_empty() {
            line.push(' ');
            line.push_str(reason);
        }
        line
    }
}

/// Appends `entry` to the record's log. Existing entries are never touched.
pub fn append(record: &mut AttendanceRecord, entry: &AuditEntry<'_>) {
    let line = entry.format();
    record.admin_log = Some(match record.admin_log.take() {
        Some(log) if !log.is_empty() => format!("{log}\n{line}"),
        _ => line,
    });
}
