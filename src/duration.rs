use crate::types::EntryRecord;
use chrono::NaiveDateTime;

pub const MINUTES_PER_DAY: i64 = 24 * 60;
pub const MINUTES_PER_MONTH: i64 = 30 * MINUTES_PER_DAY;

// Open entries are measured against a fixed end-of-day cutoff on their start
// date. Display convention only, never persisted.
pub const OPEN_ENTRY_CUTOFF_HOUR: u32 = 20;

pub fn compose_budget(months: i64, days: i64, minutes: i64) -> i64 {
	months * MINUTES_PER_MONTH + days * MINUTES_PER_DAY + minutes
}

pub fn decompose_budget(total: i64) -> (i64, i64, i64) {
	let months = total / MINUTES_PER_MONTH;
	let days = total % MINUTES_PER_MONTH / MINUTES_PER_DAY;
	let minutes = total % MINUTES_PER_DAY;
	(months, days, minutes)
}

pub fn open_entry_cutoff(start: NaiveDateTime) -> NaiveDateTime {
	start.date().and_hms_opt(OPEN_ENTRY_CUTOFF_HOUR, 0, 0).unwrap()
}

// The end timestamp to display: the real end, or the cutoff for open entries.
pub fn effective_end(start: NaiveDateTime, end: Option<NaiveDateTime>) -> NaiveDateTime {
	end.unwrap_or_else(|| open_entry_cutoff(start))
}

// Minutes to display and aggregate for an entry. Closed entries prefer the
// backend-computed duration; open entries are estimated against the cutoff,
// which goes negative for entries started after it.
pub fn effective_minutes(start: NaiveDateTime, end: Option<NaiveDateTime>, stored: Option<i64>) -> i64 {
	match end {
		Some(end) => stored.unwrap_or_else(|| (end - start).num_minutes()),
		None => (open_entry_cutoff(start) - start).num_minutes(),
	}
}

pub fn total_minutes(records: &[EntryRecord]) -> i64 {
	records
		.iter()
		.map(|record| effective_minutes(record.start_time, record.end_time, record.duration_minutes))
		.sum()
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::types::timestamp;
	use crate::types::TaskStatus;

	fn datetime(value: &str) -> NaiveDateTime {
		timestamp::parse(value).unwrap()
	}

	#[test]
	fn budget_composes_with_fixed_constants() {
		assert_eq!(compose_budget(1, 0, 0), 43200);
		assert_eq!(compose_budget(0, 1, 0), 1440);
		assert_eq!(compose_budget(2, 3, 45), 2 * 43200 + 3 * 1440 + 45);
	}

	#[test]
	fn decompose_inverts_compose_for_canonical_triples() {
		for &(months, days, minutes) in &[(0, 0, 0), (0, 0, 1439), (0, 29, 0), (5, 29, 1439), (12, 1, 30)] {
			assert_eq!(decompose_budget(compose_budget(months, days, minutes)), (months, days, minutes));
		}
	}

	#[test]
	fn compose_inverts_decompose_for_any_total() {
		for total in (0..200_000).step_by(977) {
			let (months, days, minutes) = decompose_budget(total);
			assert_eq!(compose_budget(months, days, minutes), total);
			assert!((0..30).contains(&days));
			assert!((0..1440).contains(&minutes));
		}
	}

	#[test]
	fn open_entry_is_estimated_to_the_cutoff() {
		// 09:00 to 20:00 on the same day.
		assert_eq!(effective_minutes(datetime("2024-01-01T09:00"), None, None), 660);
	}

	#[test]
	fn entry_started_after_the_cutoff_goes_negative() {
		assert_eq!(effective_minutes(datetime("2024-01-01T21:00"), None, None), -60);
	}

	#[test]
	fn closed_entry_prefers_the_stored_duration() {
		let start = datetime("2024-01-01T09:00");
		let end = datetime("2024-01-01T10:30");
		assert_eq!(effective_minutes(start, Some(end), Some(95)), 95);
		assert_eq!(effective_minutes(start, Some(end), None), 90);
	}

	#[test]
	fn effective_end_falls_back_to_the_cutoff() {
		let start = datetime("2024-01-01T09:00");
		assert_eq!(effective_end(start, None), datetime("2024-01-01T20:00"));
		assert_eq!(effective_end(start, Some(datetime("2024-01-02T01:00"))), datetime("2024-01-02T01:00"));
	}

	#[test]
	fn totals_mix_closed_and_open_entries() {
		let record = EntryRecord {
			id: 1,
			task_number: 1,
			task_name: "x".to_string(),
			task_status: TaskStatus::Pendiente,
			user_name: None,
			start_time: datetime("2024-01-01T09:00"),
			end_time: Some(datetime("2024-01-01T10:00")),
			duration_minutes: Some(60),
			comment: None,
		};
		let open = EntryRecord {
			id: 2,
			start_time: datetime("2024-01-02T19:00"),
			end_time: None,
			duration_minutes: None,
			..record.clone()
		};
		assert_eq!(total_minutes(&[record, open]), 60 + 60);
	}
}
