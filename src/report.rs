use crate::api_client::ApiClient;
use crate::types::TaskStatus;
use chrono::{NaiveDate, NaiveDateTime};
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ReportFormat {
	Excel,
	Pdf,
}

impl ReportFormat {
	pub fn path_segment(self) -> &'static str {
		match self {
			ReportFormat::Excel => "excel",
			ReportFormat::Pdf => "pdf",
		}
	}

	pub fn extension(self) -> &'static str {
		match self {
			ReportFormat::Excel => "xlsx",
			ReportFormat::Pdf => "pdf",
		}
	}
}

// Report over a task-number range.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskRangeReport {
	pub from_task: i64,
	pub to_task: i64,
	pub user_id: Option<i64>,
}

impl TaskRangeReport {
	pub fn validate(&self) -> Result<(), String> {
		if self.from_task > self.to_task {
			return Err(format!("invalid task range: from {} is greater than to {}", self.from_task, self.to_task));
		}
		Ok(())
	}

	pub fn relative_url(&self, format: ReportFormat) -> String {
		let mut url = format!("reports/{}?from={}&to={}", format.path_segment(), self.from_task, self.to_task);
		if let Some(user_id) = self.user_id {
			url.push_str(&format!("&user_id={}", user_id));
		}
		url
	}

	pub fn filename(&self, format: ReportFormat) -> String {
		format!(
			"tasks_report_{}-{}{}.{}",
			self.from_task,
			self.to_task,
			user_suffix(self.user_id),
			format.extension(),
		)
	}
}

// Report over a date range of time entries.
#[derive(Debug, Clone, PartialEq)]
pub struct DateRangeReport {
	pub from_date: NaiveDate,
	pub to_date: NaiveDate,
	pub user_id: Option<i64>,
}

impl DateRangeReport {
	pub fn validate(&self) -> Result<(), String> {
		if self.from_date > self.to_date {
			return Err(format!("invalid date range: from {} is after to {}", self.from_date, self.to_date));
		}
		Ok(())
	}

	pub fn relative_url(&self, format: ReportFormat) -> String {
		let mut url = format!("reports/date/{}?from={}&to={}", format.path_segment(), self.from_date, self.to_date);
		if let Some(user_id) = self.user_id {
			url.push_str(&format!("&user_id={}", user_id));
		}
		url
	}

	pub fn filename(&self, format: ReportFormat) -> String {
		format!(
			"date_report_{}_{}{}.{}",
			self.from_date,
			self.to_date,
			user_suffix(self.user_id),
			format.extension(),
		)
	}
}

// Report over unfinished tasks. No range, so the filename carries a timestamp.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingReport {
	pub user_id: Option<i64>,
	pub status: Option<TaskStatus>,
}

impl PendingReport {
	pub fn relative_url(&self, format: ReportFormat) -> String {
		let mut url = format!("reports/pending/{}", format.path_segment());
		let mut separator = '?';
		if let Some(user_id) = self.user_id {
			url.push(separator);
			url.push_str(&format!("user_id={}", user_id));
			separator = '&';
		}
		if let Some(status) = self.status {
			url.push(separator);
			url.push_str(&format!("status={}", urlencoding::encode(&status.to_string())));
		}
		url
	}

	pub fn filename(&self, format: ReportFormat, now: NaiveDateTime) -> String {
		format!(
			"pending_report_{}{}{}.{}",
			now.format("%Y-%m-%dT%H%M"),
			user_suffix(self.user_id),
			status_suffix(self.status),
			format.extension(),
		)
	}
}

fn user_suffix(user_id: Option<i64>) -> String {
	user_id.map(|id| format!("_user{}", id)).unwrap_or_default()
}

fn status_suffix(status: Option<TaskStatus>) -> String {
	status.map(|status| format!("_status{}", status.to_string().replace(' ', ""))).unwrap_or_default()
}

// Buffer the whole blob, then write it in one go.
pub async fn download(api: &ApiClient, relative_url: &str, target: &Path) -> Result<(), String> {
	let data = api.get_binary(relative_url).await?;
	std::fs::write(target, data)
		.map_err(|e| format!("failed to write {}: {}", target.display(), e))?;
	log::info!("saved {}", target.display());
	Ok(())
}
