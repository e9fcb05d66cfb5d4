use crate::duration;
use crate::filters;
use crate::panel::TaskDetail;
use crate::types::{EntryRecord, Task, TaskStatus, TimeEntry, User};
use chrono::{NaiveDate, NaiveDateTime};

// All user-controlled text goes through this, on every screen.
pub fn escape(text: &str) -> String {
	let mut escaped = String::with_capacity(text.len());
	for character in text.chars() {
		match character {
			'&' => escaped.push_str("&amp;"),
			'<' => escaped.push_str("&lt;"),
			'>' => escaped.push_str("&gt;"),
			'"' => escaped.push_str("&quot;"),
			'\'' => escaped.push_str("&#039;"),
			other => escaped.push(other),
		}
	}
	escaped
}

pub fn format_date(date: NaiveDate) -> String {
	date.format("%d/%m/%Y").to_string()
}

pub fn format_date_time(time: NaiveDateTime) -> String {
	time.format("%d/%m/%Y %H:%M").to_string()
}

pub fn format_hours(minutes: i64) -> String {
	format!("{:.2}", minutes as f64 / 60.0)
}

fn status_class(status: TaskStatus) -> String {
	status.to_string().to_lowercase().replace(' ', "")
}

fn status_badge(status: TaskStatus) -> String {
	format!("<span class=\"badge badge-status {}\">{}</span>", status_class(status), status)
}

fn user_name(users: &[User], user_id: i64) -> Option<&str> {
	users.iter().find(|user| user.id == user_id).map(|user| user.name.as_str())
}

// The board: one section per non-empty status bucket, in fixed order. The
// `had_any` flag distinguishes an empty database from an empty filter result.
pub fn render_board(tasks: &[Task], users: &[User], had_any: bool) -> String {
	let mut output = String::new();
	output.push_str("<div class=\"task-board\">\n");
	if tasks.is_empty() {
		let message = if had_any {
			"No tasks match the active filters"
		} else {
			"No tasks yet"
		};
		output.push_str(&format!("  <div class=\"empty-state\">{}</div>\n", message));
	} else {
		for (status, bucket) in filters::group_by_status(tasks) {
			output.push_str("  <div class=\"status-section\">\n");
			output.push_str(&format!(
				"    <div class=\"status-section-title\">{} <span class=\"status-count\">{}</span></div>\n",
				status,
				bucket.len(),
			));
			for task in bucket {
				output.push_str(&render_task_card(task, users));
			}
			output.push_str("  </div>\n");
		}
	}
	output.push_str("</div>\n");
	output
}

fn render_task_card(task: &Task, users: &[User]) -> String {
	let mut card = String::new();
	card.push_str("    <div class=\"task-item\">\n");
	card.push_str(&format!("      <span class=\"task-number\">#{}</span>\n", task.task_number));
	card.push_str(&format!("      <div class=\"task-name\">{}</div>\n", escape(&task.name)));
	if let Some(description) = task.description.as_deref().filter(|text| !text.is_empty()) {
		card.push_str(&format!("      <div class=\"task-description\">{}</div>\n", escape(description)));
	}
	card.push_str("      <div class=\"task-meta\">\n");
	card.push_str(&format!("        {}\n", status_badge(task.status)));
	if let Some(name) = user_name(users, task.user_id) {
		card.push_str(&format!("        <span class=\"badge badge-user\">{}</span>\n", escape(name)));
	}
	if task.max_time_minutes > 0 {
		card.push_str(&format!("        <span class=\"badge badge-time\">{} min</span>\n", task.max_time_minutes));
	}
	if let Some(date) = task.max_date {
		card.push_str(&format!("        <span class=\"badge badge-date\">{}</span>\n", format_date(date)));
	}
	card.push_str("      </div>\n");
	card.push_str("    </div>\n");
	card
}

pub fn render_detail(detail: &TaskDetail, owner: Option<&User>) -> String {
	let task = &detail.task;
	let mut output = String::new();
	output.push_str("<div class=\"task-detail\">\n");
	output.push_str(&format!(
		"  <h2 class=\"task-title\">Task #{}: {}</h2>\n",
		task.task_number,
		escape(&task.name),
	));

	output.push_str("  <div class=\"task-meta\">\n");
	let owner_name = owner.map(|user| escape(&user.name)).unwrap_or_else(|| "Unassigned".to_string());
	output.push_str(&format!("    <span class=\"badge badge-user\">{}</span>\n", owner_name));
	output.push_str(&format!("    {}\n", status_badge(task.status)));
	if task.max_time_minutes > 0 {
		output.push_str(&format!("    <span class=\"badge badge-time\">{} min</span>\n", task.max_time_minutes));
	}
	if let Some(date) = task.max_date {
		output.push_str(&format!("    <span class=\"badge badge-date\">{}</span>\n", format_date(date)));
	}
	output.push_str("  </div>\n");
	if let Some(description) = task.description.as_deref().filter(|text| !text.is_empty()) {
		output.push_str(&format!("  <div class=\"task-description\">{}</div>\n", escape(description)));
	}

	output.push_str(&format!(
		"  <h3 class=\"section-title\">Time entries <span class=\"status-count\">{}</span></h3>\n",
		detail.entries.len(),
	));
	if detail.entries.is_empty() {
		output.push_str("  <div class=\"empty-state\">No time entries</div>\n");
	}
	for entry in &detail.entries {
		output.push_str(&render_time_entry(entry));
	}

	output.push_str(&format!(
		"  <h3 class=\"section-title\">Annotations <span class=\"status-count\">{}</span></h3>\n",
		detail.annotations.len(),
	));
	if detail.annotations.is_empty() {
		output.push_str("  <div class=\"empty-state\">No annotations</div>\n");
	}
	for annotation in &detail.annotations {
		output.push_str("  <div class=\"annotation-item\">\n");
		output.push_str(&format!("    <div class=\"annotation-text\">{}</div>\n", escape(&annotation.text)));
		output.push_str(&format!(
			"    <div class=\"annotation-date\">{}</div>\n",
			format_date_time(annotation.created_at),
		));
		output.push_str("  </div>\n");
	}

	output.push_str("</div>\n");
	output
}

fn render_time_entry(entry: &TimeEntry) -> String {
	let mut output = String::new();
	output.push_str("  <div class=\"time-entry\">\n");
	output.push_str(&format!("    <span class=\"time-start\">{}</span>\n", format_date_time(entry.start_time)));
	match entry.end_time {
		Some(end_time) => {
			let minutes = duration::effective_minutes(entry.start_time, entry.end_time, entry.duration_minutes);
			output.push_str(&format!("    <span class=\"time-end\">{}</span>\n", format_date_time(end_time)));
			output.push_str(&format!("    <span class=\"badge badge-time\">{} min</span>\n", minutes));
		},
		None => {
			output.push_str("    <span class=\"badge badge-warning\">In progress</span>\n");
		},
	}
	if let Some(comment) = entry.comment.as_deref().filter(|text| !text.is_empty()) {
		output.push_str(&format!("    <div class=\"time-comment\">{}</div>\n", escape(comment)));
	}
	output.push_str("  </div>\n");
	output
}

// The time-entry browser: count header, one card per record, running totals.
pub fn render_entries(records: &[EntryRecord]) -> String {
	let mut output = String::new();
	output.push_str("<div class=\"entry-list\">\n");
	output.push_str(&format!(
		"  <div class=\"entries-count\">{} record{}</div>\n",
		records.len(),
		if records.len() == 1 { "" } else { "s" },
	));
	if records.is_empty() {
		output.push_str("  <div class=\"empty-state\">No records found</div>\n");
	} else {
		for record in records {
			output.push_str(&render_entry_card(record));
		}
		let minutes = duration::total_minutes(records);
		output.push_str("  <div class=\"total-section\">\n");
		output.push_str(&format!("    <span class=\"total-minutes\">{} min</span>\n", minutes));
		output.push_str(&format!("    <span class=\"total-hours\">{} h</span>\n", format_hours(minutes)));
		output.push_str("  </div>\n");
	}
	output.push_str("</div>\n");
	output
}

fn render_entry_card(record: &EntryRecord) -> String {
	let open = record.end_time.is_none();
	let minutes = duration::effective_minutes(record.start_time, record.end_time, record.duration_minutes);
	let end_display = duration::effective_end(record.start_time, record.end_time);

	let mut card = String::new();
	card.push_str(&format!("  <div class=\"entry-card{}\">\n", if open { " no-end" } else { "" }));
	card.push_str(&format!(
		"    <div class=\"entry-header\"><span class=\"entry-id\">#{}</span> {}</div>\n",
		record.id,
		status_badge(record.task_status),
	));
	card.push_str(&format!(
		"    <div class=\"entry-task\">Task #{}: {}</div>\n",
		record.task_number,
		escape(&record.task_name),
	));
	card.push_str(&format!("    <span class=\"entry-start\">{}</span>\n", format_date_time(record.start_time)));
	card.push_str(&format!(
		"    <span class=\"entry-end{}\">{}</span>\n",
		if open { " no-end" } else { "" },
		format_date_time(end_display),
	));
	card.push_str(&format!(
		"    <span class=\"duration-badge\">{} min ({} h)</span>\n",
		minutes,
		format_hours(minutes),
	));
	card.push_str(&format!(
		"    <span class=\"entry-user\">{}</span>\n",
		record.user_name.as_deref().map(escape).unwrap_or_else(|| "N/A".to_string()),
	));
	if let Some(comment) = record.comment.as_deref().filter(|text| !text.is_empty()) {
		card.push_str(&format!("    <div class=\"entry-comment\">{}</div>\n", escape(comment)));
	}
	card.push_str("  </div>\n");
	card
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::types::timestamp;
	use crate::types::Annotation;

	fn task(number: i64, name: &str, status: TaskStatus) -> Task {
		Task {
			id: number,
			task_number: number,
			name: name.to_string(),
			description: None,
			user_id: 1,
			max_time_minutes: 0,
			max_date: None,
			status,
		}
	}

	fn record(id: i64, start: &str, end: Option<&str>, stored: Option<i64>) -> EntryRecord {
		EntryRecord {
			id,
			task_number: 1,
			task_name: "Task".to_string(),
			task_status: TaskStatus::EnProceso,
			user_name: Some("Ana".to_string()),
			start_time: timestamp::parse(start).unwrap(),
			end_time: end.map(|value| timestamp::parse(value).unwrap()),
			duration_minutes: stored,
			comment: None,
		}
	}

	#[test]
	fn escapes_the_usual_five() {
		assert_eq!(escape("a<b>&\"'"), "a&lt;b&gt;&amp;&quot;&#039;");
		assert_eq!(escape("plain"), "plain");
	}

	#[test]
	fn board_escapes_task_names_and_descriptions() {
		let mut task = task(1, "<script>alert(1)</script>", TaskStatus::Pendiente);
		task.description = Some("a & b".to_string());
		let html = render_board(&[task], &[], true);
		assert!(html.contains("&lt;script&gt;alert(1)&lt;/script&gt;"));
		assert!(html.contains("a &amp; b"));
		assert!(!html.contains("<script>"));
	}

	#[test]
	fn board_sections_follow_the_fixed_order() {
		let tasks = vec![
			task(1, "a", TaskStatus::Pendiente),
			task(2, "b", TaskStatus::Terminado),
			task(3, "c", TaskStatus::EnProceso),
		];
		let html = render_board(&tasks, &[], true);
		let in_progress = html.find("En proceso").unwrap();
		let pending = html.find("Pendiente").unwrap();
		let finished = html.find("Terminado").unwrap();
		assert!(in_progress < pending && pending < finished);
		assert!(!html.contains("Estancado"));
	}

	#[test]
	fn board_distinguishes_empty_states() {
		assert!(render_board(&[], &[], false).contains("No tasks yet"));
		assert!(render_board(&[], &[], true).contains("No tasks match the active filters"));
	}

	#[test]
	fn max_time_badge_only_shows_when_positive() {
		let mut with_budget = task(1, "a", TaskStatus::Pendiente);
		with_budget.max_time_minutes = 120;
		let html = render_board(&[with_budget], &[], true);
		assert!(html.contains("120 min"));

		let without_budget = task(2, "b", TaskStatus::Pendiente);
		let html = render_board(&[without_budget], &[], true);
		assert!(!html.contains("badge-time"));
	}

	#[test]
	fn detail_marks_open_entries_in_progress() {
		let detail = TaskDetail {
			task: task(1, "a", TaskStatus::EnProceso),
			annotations: vec![Annotation {
				id: 1,
				task_id: 1,
				text: "tighten <bolts>".to_string(),
				created_at: timestamp::parse("2024-01-01T12:00").unwrap(),
			}],
			entries: vec![TimeEntry {
				id: 1,
				task_id: 1,
				start_time: timestamp::parse("2024-01-01T09:00").unwrap(),
				end_time: None,
				duration_minutes: None,
				comment: None,
			}],
		};
		let html = render_detail(&detail, None);
		assert!(html.contains("In progress"));
		assert!(html.contains("Unassigned"));
		assert!(html.contains("tighten &lt;bolts&gt;"));
	}

	#[test]
	fn entry_card_shows_the_cutoff_for_open_entries() {
		let html = render_entries(&[record(1, "2024-01-01T09:00", None, None)]);
		assert!(html.contains("no-end"));
		assert!(html.contains("01/01/2024 20:00"));
		assert!(html.contains("660 min (11.00 h)"));
	}

	#[test]
	fn entry_totals_sum_displayed_records() {
		let records = vec![
			record(1, "2024-01-01T09:00", Some("2024-01-01T10:00"), Some(60)),
			record(2, "2024-01-02T19:00", None, None),
		];
		let html = render_entries(&records);
		assert!(html.contains("2 records"));
		assert!(html.contains("120 min"));
		assert!(html.contains("2.00 h"));
	}
}
