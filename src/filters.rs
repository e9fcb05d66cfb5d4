use crate::types::{Task, TaskStatus};
use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum SortBy {
	Number,
	Name,
	Date,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum SortOrder {
	Asc,
	Desc,
}

// Display order of the status sections on the board. Unknown trails so legacy
// rows stay visible instead of disappearing from the board.
pub const BUCKET_ORDER: [TaskStatus; 5] = [
	TaskStatus::EnProceso,
	TaskStatus::Pendiente,
	TaskStatus::Estancado,
	TaskStatus::Terminado,
	TaskStatus::Unknown,
];

pub fn apply_filters_and_sort(tasks: &[Task], filter_user_id: Option<i64>, sort_by: SortBy, sort_order: SortOrder) -> Vec<Task> {
	let mut filtered: Vec<Task> = tasks
		.iter()
		.filter(|task| filter_user_id.map_or(true, |id| task.user_id == id))
		.cloned()
		.collect();
	filtered.sort_by(|a, b| compare(a, b, sort_by, sort_order));
	filtered
}

fn compare(a: &Task, b: &Task, sort_by: SortBy, sort_order: SortOrder) -> Ordering {
	match sort_by {
		SortBy::Number => directed(a.task_number.cmp(&b.task_number), sort_order),
		SortBy::Name => directed(compare_names(&a.name, &b.name), sort_order),
		// Tasks without a deadline sort last in both directions.
		SortBy::Date => match (a.max_date, b.max_date) {
			(None, None) => Ordering::Equal,
			(None, Some(_)) => Ordering::Greater,
			(Some(_), None) => Ordering::Less,
			(Some(a), Some(b)) => directed(a.cmp(&b), sort_order),
		},
	}
}

fn compare_names(a: &str, b: &str) -> Ordering {
	a.to_lowercase().cmp(&b.to_lowercase()).then_with(|| a.cmp(b))
}

fn directed(ordering: Ordering, sort_order: SortOrder) -> Ordering {
	match sort_order {
		SortOrder::Asc => ordering,
		SortOrder::Desc => ordering.reverse(),
	}
}

// Partition tasks into the fixed bucket order, dropping empty buckets.
pub fn group_by_status(tasks: &[Task]) -> Vec<(TaskStatus, Vec<&Task>)> {
	BUCKET_ORDER
		.iter()
		.map(|&status| (status, tasks.iter().filter(|task| task.status == status).collect::<Vec<_>>()))
		.filter(|(_, bucket)| !bucket.is_empty())
		.collect()
}

#[cfg(test)]
mod tests {
	use super::*;
	use chrono::NaiveDate;

	fn task(id: i64, number: i64, name: &str, user_id: i64, status: TaskStatus, max_date: Option<&str>) -> Task {
		Task {
			id,
			task_number: number,
			name: name.to_string(),
			description: None,
			user_id,
			max_time_minutes: 0,
			max_date: max_date.map(|date| date.parse::<NaiveDate>().unwrap()),
			status,
		}
	}

	fn numbers(tasks: &[Task]) -> Vec<i64> {
		tasks.iter().map(|task| task.task_number).collect()
	}

	#[test]
	fn filters_on_exact_user_id() {
		let tasks = vec![
			task(1, 1, "a", 2, TaskStatus::Pendiente, None),
			task(2, 2, "b", 3, TaskStatus::Pendiente, None),
			task(3, 3, "c", 2, TaskStatus::Pendiente, None),
		];
		let filtered = apply_filters_and_sort(&tasks, Some(2), SortBy::Number, SortOrder::Asc);
		assert_eq!(numbers(&filtered), [1, 3]);
		assert!(filtered.iter().all(|task| task.user_id == 2));

		let unfiltered = apply_filters_and_sort(&tasks, None, SortBy::Number, SortOrder::Asc);
		assert_eq!(numbers(&unfiltered), [1, 2, 3]);
	}

	#[test]
	fn sorts_by_number_in_both_directions() {
		let tasks = vec![
			task(1, 5, "a", 1, TaskStatus::Pendiente, None),
			task(2, 2, "b", 1, TaskStatus::Pendiente, None),
			task(3, 9, "c", 1, TaskStatus::Pendiente, None),
		];
		assert_eq!(numbers(&apply_filters_and_sort(&tasks, None, SortBy::Number, SortOrder::Asc)), [2, 5, 9]);
		assert_eq!(numbers(&apply_filters_and_sort(&tasks, None, SortBy::Number, SortOrder::Desc)), [9, 5, 2]);
	}

	#[test]
	fn sorts_by_name_case_insensitively() {
		let tasks = vec![
			task(1, 1, "cableado", 1, TaskStatus::Pendiente, None),
			task(2, 2, "Ajustes", 1, TaskStatus::Pendiente, None),
			task(3, 3, "Bancada", 1, TaskStatus::Pendiente, None),
		];
		assert_eq!(numbers(&apply_filters_and_sort(&tasks, None, SortBy::Name, SortOrder::Asc)), [2, 3, 1]);
	}

	#[test]
	fn dateless_tasks_sort_last_in_both_directions() {
		let tasks = vec![
			task(1, 1, "a", 1, TaskStatus::Pendiente, None),
			task(2, 2, "b", 1, TaskStatus::Pendiente, Some("2024-06-01")),
			task(3, 3, "c", 1, TaskStatus::Pendiente, Some("2024-01-15")),
		];
		assert_eq!(numbers(&apply_filters_and_sort(&tasks, None, SortBy::Date, SortOrder::Asc)), [3, 2, 1]);
		assert_eq!(numbers(&apply_filters_and_sort(&tasks, None, SortBy::Date, SortOrder::Desc)), [2, 3, 1]);
	}

	#[test]
	fn groups_in_fixed_section_order() {
		let tasks = vec![
			task(1, 1, "a", 1, TaskStatus::Pendiente, None),
			task(2, 2, "b", 1, TaskStatus::Terminado, None),
			task(3, 3, "c", 1, TaskStatus::EnProceso, None),
		];
		let groups = group_by_status(&tasks);
		let order: Vec<TaskStatus> = groups.iter().map(|(status, _)| *status).collect();
		assert_eq!(order, [TaskStatus::EnProceso, TaskStatus::Pendiente, TaskStatus::Terminado]);
		assert_eq!(groups[0].1[0].task_number, 3);
		assert_eq!(groups[1].1[0].task_number, 1);
		assert_eq!(groups[2].1[0].task_number, 2);
	}

	#[test]
	fn unknown_status_gets_its_own_trailing_bucket() {
		let tasks = vec![
			task(1, 1, "a", 1, TaskStatus::Unknown, None),
			task(2, 2, "b", 1, TaskStatus::EnProceso, None),
		];
		let groups = group_by_status(&tasks);
		let order: Vec<TaskStatus> = groups.iter().map(|(status, _)| *status).collect();
		assert_eq!(order, [TaskStatus::EnProceso, TaskStatus::Unknown]);
	}
}
