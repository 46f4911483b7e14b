//! Small shared helpers

/// Current UTC timestamp in milliseconds
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Attendance record key: `{sessionDate}_{employeeId}`
///
/// Deterministic so that re-writing a record for the same employee and day
/// overwrites instead of duplicating.
pub fn attendance_key(session_date: &str, employee_id: &str) -> String {
    format!("{session_date}_{employee_id}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attendance_key_is_deterministic() {
        assert_eq!(attendance_key("2024-03-01", "emp42"), "2024-03-01_emp42");
        assert_eq!(
            attendance_key("2024-03-01", "emp42"),
            attendance_key("2024-03-01", "emp42")
        );
    }
}
