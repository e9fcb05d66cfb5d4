use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
	pub id: i64,
	pub name: String,
	#[serde(default)]
	pub email: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskStatus {
	Pendiente,
	#[serde(rename = "En proceso")]
	EnProceso,
	Estancado,
	Terminado,
	// Catch-all for status strings the backend may still hold from legacy data.
	#[serde(other)]
	Unknown,
}

impl Default for TaskStatus {
	fn default() -> Self {
		TaskStatus::Pendiente
	}
}

impl std::fmt::Display for TaskStatus {
	fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
		f.write_str(match self {
			TaskStatus::Pendiente => "Pendiente",
			TaskStatus::EnProceso => "En proceso",
			TaskStatus::Estancado => "Estancado",
			TaskStatus::Terminado => "Terminado",
			TaskStatus::Unknown => "Desconocido",
		})
	}
}

impl TaskStatus {
	pub fn parse_cli(value: &str) -> Result<Self, String> {
		match value.to_lowercase().replace(['-', '_'], " ").as_str() {
			"pendiente" => Ok(TaskStatus::Pendiente),
			"en proceso" | "enproceso" => Ok(TaskStatus::EnProceso),
			"estancado" => Ok(TaskStatus::Estancado),
			"terminado" => Ok(TaskStatus::Terminado),
			_ => Err(format!("unknown status: {} (expected Pendiente, \"En proceso\", Estancado or Terminado)", value)),
		}
	}
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
	pub id: i64,
	pub task_number: i64,
	pub name: String,
	#[serde(default)]
	pub description: Option<String>,
	pub user_id: i64,
	#[serde(default, deserialize_with = "none_as_default")]
	pub max_time_minutes: i64,
	#[serde(default)]
	pub max_date: Option<NaiveDate>,
	#[serde(default, deserialize_with = "none_as_default")]
	pub status: TaskStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
	pub id: i64,
	pub task_id: i64,
	pub text: String,
	#[serde(with = "timestamp")]
	pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeEntry {
	pub id: i64,
	pub task_id: i64,
	#[serde(with = "timestamp")]
	pub start_time: NaiveDateTime,
	#[serde(default, with = "timestamp_opt")]
	pub end_time: Option<NaiveDateTime>,
	#[serde(default)]
	pub duration_minutes: Option<i64>,
	#[serde(default)]
	pub comment: Option<String>,
}

// Joined row returned by the filtered entry listing endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryRecord {
	pub id: i64,
	pub task_number: i64,
	pub task_name: String,
	#[serde(default, deserialize_with = "none_as_default")]
	pub task_status: TaskStatus,
	#[serde(default)]
	pub user_name: Option<String>,
	#[serde(with = "timestamp")]
	pub start_time: NaiveDateTime,
	#[serde(default, with = "timestamp_opt")]
	pub end_time: Option<NaiveDateTime>,
	#[serde(default)]
	pub duration_minutes: Option<i64>,
	#[serde(default)]
	pub comment: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserPayload {
	pub name: String,
	pub email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskPayload {
	pub name: String,
	pub description: Option<String>,
	pub user_id: i64,
	pub max_time_minutes: i64,
	pub max_date: Option<NaiveDate>,
	pub status: TaskStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnnotationPayload {
	pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeEntryPayload {
	#[serde(with = "timestamp")]
	pub start_time: NaiveDateTime,
	#[serde(with = "timestamp_opt")]
	pub end_time: Option<NaiveDateTime>,
	pub comment: Option<String>,
}

impl TimeEntryPayload {
	// Checked before any request is issued.
	pub fn validate(&self) -> Result<(), String> {
		if let Some(end_time) = self.end_time {
			if end_time <= self.start_time {
				return Err("end time must be after the start time".to_string());
			}
		}
		if let Some(comment) = &self.comment {
			if comment.chars().count() > 200 {
				return Err("comment is limited to 200 characters".to_string());
			}
		}
		Ok(())
	}
}

fn none_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
	D: serde::Deserializer<'de>,
	T: Default + Deserialize<'de>,
{
	Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// The backend emits both datetime-local strings ("2024-01-01T09:00") and SQLite
// timestamps ("2024-01-01 09:00:00"), so parsing has to accept either shape.
pub mod timestamp {
	use chrono::NaiveDateTime;
	use serde::de::Error;
	use serde::{Deserialize, Deserializer, Serializer};

	const FORMATS: [&str; 4] = [
		"%Y-%m-%dT%H:%M:%S%.f",
		"%Y-%m-%dT%H:%M",
		"%Y-%m-%d %H:%M:%S%.f",
		"%Y-%m-%d %H:%M",
	];

	pub fn parse(value: &str) -> Option<NaiveDateTime> {
		FORMATS.iter().find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
	}

	pub fn serialize<S: Serializer>(time: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error> {
		serializer.serialize_str(&time.format("%Y-%m-%dT%H:%M:%S").to_string())
	}

	pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDateTime, D::Error> {
		let value = String::deserialize(deserializer)?;
		parse(&value).ok_or_else(|| D::Error::custom(format!("invalid timestamp: {}", value)))
	}
}

pub mod timestamp_opt {
	use chrono::NaiveDateTime;
	use serde::de::Error;
	use serde::{Deserialize, Deserializer, Serializer};

	pub fn serialize<S: Serializer>(time: &Option<NaiveDateTime>, serializer: S) -> Result<S::Ok, S::Error> {
		match time {
			Some(time) => super::timestamp::serialize(time, serializer),
			None => serializer.serialize_none(),
		}
	}

	pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<NaiveDateTime>, D::Error> {
		match Option::<String>::deserialize(deserializer)? {
			None => Ok(None),
			Some(value) => super::timestamp::parse(&value)
				.map(Some)
				.ok_or_else(|| D::Error::custom(format!("invalid timestamp: {}", value))),
		}
	}
}
