use crate::types;
use chrono::NaiveDate;

pub struct ApiClient {
	pub api_root: String,
	http: reqwest::Client,
}

// Filter for the cross-task entry listing and export endpoints.
#[derive(Debug, Clone, PartialEq)]
pub struct EntryFilter {
	pub from_date: NaiveDate,
	pub to_date: NaiveDate,
	pub user_id: Option<i64>,
	pub has_end: Option<bool>,
	pub status: Option<types::TaskStatus>,
}

impl EntryFilter {
	pub fn new(from_date: NaiveDate, to_date: NaiveDate) -> Self {
		EntryFilter {
			from_date,
			to_date,
			user_id: None,
			has_end: None,
			status: None,
		}
	}

	pub fn user_id(mut self, user_id: i64) -> Self {
		self.user_id = Some(user_id);
		self
	}

	pub fn has_end(mut self, has_end: bool) -> Self {
		self.has_end = Some(has_end);
		self
	}

	pub fn status(mut self, status: types::TaskStatus) -> Self {
		self.status = Some(status);
		self
	}

	pub fn query(&self) -> String {
		let mut query = format!("from_date={}&to_date={}", self.from_date, self.to_date);
		if let Some(user_id) = self.user_id {
			query.push_str(&format!("&user_id={}", user_id));
		}
		if let Some(has_end) = self.has_end {
			query.push_str(&format!("&has_end={}", if has_end { "yes" } else { "no" }));
		}
		if let Some(status) = self.status {
			query.push_str(&format!("&status={}", urlencoding::encode(&status.to_string())));
		}
		query
	}
}

impl ApiClient {
	pub fn new(api_root: String) -> Self {
		ApiClient {
			api_root,
			http: reqwest::Client::new(),
		}
	}

	pub async fn get_users(&self) -> Result<Vec<types::User>, String> {
		self.get_json("users").await
	}

	pub async fn add_user(&self, user: &types::UserPayload) -> Result<(), String> {
		self.post("users", user).await
	}

	pub async fn delete_user(&self, id: i64) -> Result<(), String> {
		self.delete(&format!("users/{}", id)).await
	}

	pub async fn get_tasks(&self) -> Result<Vec<types::Task>, String> {
		self.get_json("tasks").await
	}

	pub async fn add_task(&self, task: &types::TaskPayload) -> Result<(), String> {
		self.post("tasks", task).await
	}

	pub async fn update_task(&self, id: i64, task: &types::TaskPayload) -> Result<(), String> {
		self.put(&format!("tasks/{}", id), task).await
	}

	pub async fn delete_task(&self, id: i64) -> Result<(), String> {
		self.delete(&format!("tasks/{}", id)).await
	}

	pub async fn get_annotations(&self, task_id: i64) -> Result<Vec<types::Annotation>, String> {
		self.get_json(&format!("tasks/{}/annotations", task_id)).await
	}

	pub async fn add_annotation(&self, task_id: i64, annotation: &types::AnnotationPayload) -> Result<(), String> {
		self.post(&format!("tasks/{}/annotations", task_id), annotation).await
	}

	pub async fn update_annotation(&self, id: i64, annotation: &types::AnnotationPayload) -> Result<(), String> {
		self.put(&format!("annotations/{}", id), annotation).await
	}

	pub async fn delete_annotation(&self, id: i64) -> Result<(), String> {
		self.delete(&format!("annotations/{}", id)).await
	}

	pub async fn get_time_entries(&self, task_id: i64) -> Result<Vec<types::TimeEntry>, String> {
		self.get_json(&format!("tasks/{}/times", task_id)).await
	}

	pub async fn add_time_entry(&self, task_id: i64, entry: &types::TimeEntryPayload) -> Result<(), String> {
		self.post(&format!("tasks/{}/times", task_id), entry).await
	}

	pub async fn update_time_entry(&self, id: i64, entry: &types::TimeEntryPayload) -> Result<(), String> {
		self.put(&format!("times/{}", id), entry).await
	}

	pub async fn delete_time_entry(&self, id: i64) -> Result<(), String> {
		self.delete(&format!("times/{}", id)).await
	}

	pub async fn list_entries(&self, filter: &EntryFilter) -> Result<Vec<types::EntryRecord>, String> {
		self.get_json(&format!("timeentries/list?{}", filter.query())).await
	}

	// Buffers the whole response body; report endpoints return small files.
	pub async fn get_binary(&self, relative_url: &str) -> Result<Vec<u8>, String> {
		log::debug!("GET {}/{}", self.api_root, relative_url);
		let response = self.http.get(&format!("{}/{}", self.api_root, relative_url))
			.send()
			.await
			.map_err(|e| format!("failed to get {}: error sending request: {}", relative_url, e))?;

		let response = check_status(relative_url, response).await?;
		let body = response.bytes()
			.await
			.map_err(|e| format!("failed to get {}: error reading response: {}", relative_url, e))?;
		Ok(body.to_vec())
	}

	async fn get_json<T: serde::de::DeserializeOwned>(&self, relative_url: &str) -> Result<T, String> {
		log::debug!("GET {}/{}", self.api_root, relative_url);
		let response = self.http.get(&format!("{}/{}", self.api_root, relative_url))
			.send()
			.await
			.map_err(|e| format!("failed to get {}: error sending request: {}", relative_url, e))?;

		let response = check_status(relative_url, response).await?;
		response.json()
			.await
			.map_err(|e| format!("failed to get {}: error parsing response: {}", relative_url, e))
	}

	async fn post<B: serde::Serialize>(&self, relative_url: &str, body: &B) -> Result<(), String> {
		log::debug!("POST {}/{}", self.api_root, relative_url);
		let response = self.http.post(&format!("{}/{}", self.api_root, relative_url))
			.json(body)
			.send()
			.await
			.map_err(|e| format!("failed to post {}: error sending request: {}", relative_url, e))?;

		check_status(relative_url, response).await?;
		Ok(())
	}

	async fn put<B: serde::Serialize>(&self, relative_url: &str, body: &B) -> Result<(), String> {
		log::debug!("PUT {}/{}", self.api_root, relative_url);
		let response = self.http.put(&format!("{}/{}", self.api_root, relative_url))
			.json(body)
			.send()
			.await
			.map_err(|e| format!("failed to update {}: error sending request: {}", relative_url, e))?;

		check_status(relative_url, response).await?;
		Ok(())
	}

	async fn delete(&self, relative_url: &str) -> Result<(), String> {
		log::debug!("DELETE {}/{}", self.api_root, relative_url);
		let response = self.http.delete(&format!("{}/{}", self.api_root, relative_url))
			.send()
			.await
			.map_err(|e| format!("failed to delete {}: error sending request: {}", relative_url, e))?;

		check_status(relative_url, response).await?;
		Ok(())
	}
}

// Single attempt, fail fast: any non-success status becomes an error carrying
// the backend's own message when the body has one.
async fn check_status(relative_url: &str, response: reqwest::Response) -> Result<reqwest::Response, String> {
	let status = response.status();
	if status.is_success() {
		return Ok(response);
	}

	let body = response.text().await.unwrap_or_default();
	match backend_message(&body) {
		Some(message) => Err(format!("failed on {}: {}", relative_url, message)),
		None => Err(format!("failed on {}: server responded with status code {}", relative_url, status)),
	}
}

// The backend reports errors as {"error": ...} or {"detail": ...}.
fn backend_message(body: &str) -> Option<String> {
	let value: serde_json::Value = serde_json::from_str(body).ok()?;
	["error", "detail"]
		.iter()
		.find_map(|key| value.get(*key).and_then(|message| message.as_str()).map(String::from))
}
