use crate::api_client::{ApiClient, EntryFilter};
use crate::report::{self, ReportFormat};
use crate::types::EntryRecord;
use chrono::{Duration, NaiveDate};
use std::path::Path;

// The browser opens on the trailing week.
pub fn default_range(today: NaiveDate) -> (NaiveDate, NaiveDate) {
	(today - Duration::days(7), today)
}

pub fn check_range(from_date: NaiveDate, to_date: NaiveDate) -> Result<(), String> {
	if from_date > to_date {
		return Err(format!("invalid date range: from {} is after to {}", from_date, to_date));
	}
	Ok(())
}

pub async fn list(api: &ApiClient, filter: &EntryFilter) -> Result<Vec<EntryRecord>, String> {
	check_range(filter.from_date, filter.to_date)?;
	api.list_entries(filter).await
}

pub fn export_filename(filter: &EntryFilter, format: ReportFormat) -> String {
	let mut name = format!("entries_{}_to_{}", filter.from_date, filter.to_date);
	if let Some(user_id) = filter.user_id {
		name.push_str(&format!("_user{}", user_id));
	}
	match filter.has_end {
		Some(true) => name.push_str("_finished"),
		Some(false) => name.push_str("_open"),
		None => {},
	}
	if let Some(status) = filter.status {
		name.push_str(&format!("_status{}", status.to_string().replace(' ', "")));
	}
	format!("{}.{}", name, format.extension())
}

// Exports mirror the report requesters: same filters, same save pattern.
pub async fn export(api: &ApiClient, filter: &EntryFilter, format: ReportFormat, target: &Path) -> Result<(), String> {
	check_range(filter.from_date, filter.to_date)?;
	let relative_url = format!("timeentries/export/{}?{}", format.path_segment(), filter.query());
	report::download(api, &relative_url, target).await
}
