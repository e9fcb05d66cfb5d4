use crate::api_client::ApiClient;
use crate::types::{Annotation, Task, TimeEntry, TimeEntryPayload};
use chrono::NaiveDateTime;
use std::collections::HashMap;

pub struct TaskDetail {
	pub task: Task,
	pub annotations: Vec<Annotation>,
	pub entries: Vec<TimeEntry>,
}

// Annotations and time entries are fetched concurrently. If either fetch
// fails, the whole load fails: the panel never renders from half the data.
pub async fn fetch_detail(api: &ApiClient, task: Task) -> Result<TaskDetail, String> {
	let task_id = task.id;
	let (annotations, entries) = tokio::join!(api.get_annotations(task_id), api.get_time_entries(task_id));
	Ok(TaskDetail {
		task,
		annotations: annotations?,
		entries: entries?,
	})
}

// Serializes panel loads: every load starts a new generation, and a result is
// only applied when no newer load started while it was in flight.
pub struct PanelLoader {
	generation: u64,
}

impl PanelLoader {
	pub fn new() -> Self {
		PanelLoader { generation: 0 }
	}

	pub fn begin(&mut self) -> u64 {
		self.generation += 1;
		self.generation
	}

	pub fn accept(&self, generation: u64, detail: TaskDetail) -> Option<TaskDetail> {
		if generation == self.generation {
			Some(detail)
		} else {
			None
		}
	}

	pub async fn load(&mut self, api: &ApiClient, task: Task) -> Result<Option<TaskDetail>, String> {
		let generation = self.begin();
		let detail = fetch_detail(api, task).await?;
		Ok(self.accept(generation, detail))
	}
}

#[derive(Debug, Clone, PartialEq)]
pub struct EntryDraft {
	pub start_time: NaiveDateTime,
	// Edit target for the end timestamp. For an open entry this defaults to
	// "now", but nothing is persisted until the draft is saved.
	pub end_time: NaiveDateTime,
	pub keep_open: bool,
	pub comment: Option<String>,
}

impl EntryDraft {
	pub fn from_entry(entry: &TimeEntry, now: NaiveDateTime) -> Self {
		EntryDraft {
			start_time: entry.start_time,
			end_time: entry.end_time.unwrap_or(now),
			keep_open: false,
			comment: entry.comment.clone(),
		}
	}

	pub fn payload(&self) -> TimeEntryPayload {
		TimeEntryPayload {
			start_time: self.start_time,
			end_time: if self.keep_open { None } else { Some(self.end_time) },
			comment: self.comment.clone().filter(|comment| !comment.is_empty()),
		}
	}
}

// Per-row edit state, keyed by entry id rather than by rendered element.
#[derive(Debug, Default)]
pub struct EditState {
	entries: HashMap<i64, EntryDraft>,
}

impl EditState {
	pub fn new() -> Self {
		EditState::default()
	}

	pub fn begin_entry(&mut self, entry: &TimeEntry, now: NaiveDateTime) -> &mut EntryDraft {
		self.entries.entry(entry.id).or_insert_with(|| EntryDraft::from_entry(entry, now))
	}

	pub fn is_editing_entry(&self, id: i64) -> bool {
		self.entries.contains_key(&id)
	}

	pub fn cancel_entry(&mut self, id: i64) {
		self.entries.remove(&id);
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::types::timestamp;

	fn datetime(value: &str) -> NaiveDateTime {
		timestamp::parse(value).unwrap()
	}

	fn entry(id: i64, start: &str, end: Option<&str>) -> TimeEntry {
		TimeEntry {
			id,
			task_id: 1,
			start_time: datetime(start),
			end_time: end.map(|value| datetime(value)),
			duration_minutes: None,
			comment: Some("initial".to_string()),
		}
	}

	#[test]
	fn stale_loads_are_discarded() {
		let mut loader = PanelLoader::new();
		let first = loader.begin();
		let second = loader.begin();

		let detail = TaskDetail {
			task: crate::types::Task {
				id: 1,
				task_number: 1,
				name: "x".to_string(),
				description: None,
				user_id: 1,
				max_time_minutes: 0,
				max_date: None,
				status: Default::default(),
			},
			annotations: Vec::new(),
			entries: Vec::new(),
		};

		// The first load resolved after the second one started.
		assert!(loader.accept(first, detail).is_none());

		let detail = TaskDetail {
			task: crate::types::Task {
				id: 2,
				task_number: 2,
				name: "y".to_string(),
				description: None,
				user_id: 1,
				max_time_minutes: 0,
				max_date: None,
				status: Default::default(),
			},
			annotations: Vec::new(),
			entries: Vec::new(),
		};
		assert!(loader.accept(second, detail).is_some());
	}

	#[test]
	fn open_entry_draft_defaults_the_end_to_now() {
		let now = datetime("2024-01-01T15:30");
		let draft = EntryDraft::from_entry(&entry(1, "2024-01-01T09:00", None), now);
		assert_eq!(draft.end_time, now);
		assert_eq!(draft.payload().end_time, Some(now));
	}

	#[test]
	fn closed_entry_draft_keeps_the_stored_end() {
		let now = datetime("2024-01-01T15:30");
		let draft = EntryDraft::from_entry(&entry(1, "2024-01-01T09:00", Some("2024-01-01T10:00")), now);
		assert_eq!(draft.end_time, datetime("2024-01-01T10:00"));
	}

	#[test]
	fn keep_open_clears_the_end_in_the_payload() {
		let now = datetime("2024-01-01T15:30");
		let mut draft = EntryDraft::from_entry(&entry(1, "2024-01-01T09:00", None), now);
		draft.keep_open = true;
		assert_eq!(draft.payload().end_time, None);
	}

	#[test]
	fn cancel_discards_the_draft() {
		let now = datetime("2024-01-01T15:30");
		let entry = entry(1, "2024-01-01T09:00", None);
		let mut edits = EditState::new();

		let draft = edits.begin_entry(&entry, now);
		draft.comment = Some("changed".to_string());
		assert!(edits.is_editing_entry(1));

		edits.cancel_entry(1);
		assert!(!edits.is_editing_entry(1));

		// A fresh edit starts over from the entry, not from the old draft.
		let draft = edits.begin_entry(&entry, now);
		assert_eq!(draft.comment, Some("initial".to_string()));
	}
}
