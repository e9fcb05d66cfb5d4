use chrono::{Local, NaiveDate, NaiveDateTime};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

mod api_client;
mod browser;
mod config;
mod duration;
mod filters;
mod panel;
mod render;
mod report;
mod types;

use api_client::{ApiClient, EntryFilter};
use config::Config;
use filters::{SortBy, SortOrder};
use panel::{EditState, PanelLoader, TaskDetail};
use report::{DateRangeReport, PendingReport, ReportFormat, TaskRangeReport};
use types::{AnnotationPayload, TaskPayload, TaskStatus, TimeEntryPayload, UserPayload};

const DEFAULT_API_ROOT: &str = "http://localhost:5000/api";

#[derive(Parser)]
#[command(name = "taskflow", version)]
struct Options {
	#[arg(long, value_name = "URL")]
	api_root: Option<String>,

	#[arg(long, value_name = "FILE")]
	config: Option<PathBuf>,

	#[command(subcommand)]
	command: Command,
}

#[derive(Subcommand)]
enum Command {
	#[command(subcommand)]
	Users(UserCommand),
	#[command(subcommand)]
	Tasks(TaskCommand),
	#[command(subcommand)]
	Annotations(AnnotationCommand),
	#[command(subcommand)]
	Times(TimeCommand),
	#[command(subcommand)]
	Report(ReportCommand),
	#[command(subcommand)]
	Entries(EntryCommand),
}

#[derive(Subcommand)]
enum UserCommand {
	List,
	Add {
		#[arg(long)]
		name: String,
		#[arg(long)]
		email: Option<String>,
	},
	Rm {
		id: i64,
	},
}

#[derive(Subcommand)]
enum TaskCommand {
	List {
		#[arg(long)]
		user: Option<i64>,
		#[arg(long, value_enum, default_value = "number")]
		sort_by: SortBy,
		#[arg(long, value_enum, default_value = "asc")]
		order: SortOrder,
		#[arg(long, value_name = "FILE")]
		out: Option<PathBuf>,
	},
	Show {
		id: i64,
		#[arg(long, value_name = "FILE")]
		out: Option<PathBuf>,
	},
	Add {
		#[arg(long)]
		name: String,
		#[arg(long)]
		description: Option<String>,
		#[arg(long)]
		user: i64,
		#[arg(long, default_value_t = 0)]
		months: i64,
		#[arg(long, default_value_t = 0)]
		days: i64,
		#[arg(long, default_value_t = 0)]
		minutes: i64,
		#[arg(long)]
		max_date: Option<NaiveDate>,
		#[arg(long, value_parser = TaskStatus::parse_cli)]
		status: Option<TaskStatus>,
	},
	Edit {
		id: i64,
		#[arg(long)]
		name: Option<String>,
		#[arg(long)]
		description: Option<String>,
		#[arg(long)]
		user: Option<i64>,
		#[arg(long)]
		months: Option<i64>,
		#[arg(long)]
		days: Option<i64>,
		#[arg(long)]
		minutes: Option<i64>,
		#[arg(long, conflicts_with = "clear_date")]
		max_date: Option<NaiveDate>,
		#[arg(long)]
		clear_date: bool,
		#[arg(long, value_parser = TaskStatus::parse_cli)]
		status: Option<TaskStatus>,
	},
	Rm {
		id: i64,
	},
}

#[derive(Subcommand)]
enum AnnotationCommand {
	Add {
		#[arg(long)]
		task: i64,
		#[arg(long)]
		text: String,
	},
	Edit {
		id: i64,
		#[arg(long)]
		task: i64,
		#[arg(long)]
		text: String,
	},
	Rm {
		id: i64,
		#[arg(long)]
		task: i64,
	},
}

#[derive(Subcommand)]
enum TimeCommand {
	Add {
		#[arg(long)]
		task: i64,
		#[arg(long, value_parser = parse_timestamp)]
		start: Option<NaiveDateTime>,
		#[arg(long, value_parser = parse_timestamp)]
		end: Option<NaiveDateTime>,
		#[arg(long)]
		comment: Option<String>,
	},
	Edit {
		id: i64,
		#[arg(long)]
		task: i64,
		#[arg(long, value_parser = parse_timestamp)]
		start: Option<NaiveDateTime>,
		#[arg(long, value_parser = parse_timestamp)]
		end: Option<NaiveDateTime>,
		#[arg(long, conflicts_with = "end")]
		open: bool,
		#[arg(long)]
		comment: Option<String>,
	},
	Rm {
		id: i64,
		#[arg(long)]
		task: i64,
	},
}

#[derive(Subcommand)]
enum ReportCommand {
	Tasks {
		#[arg(long)]
		from: i64,
		#[arg(long)]
		to: i64,
		#[arg(long)]
		user: Option<i64>,
		#[arg(long, value_enum, default_value = "excel")]
		format: ReportFormat,
		#[arg(long, value_name = "DIR")]
		out_dir: Option<PathBuf>,
	},
	Dates {
		#[arg(long)]
		from: NaiveDate,
		#[arg(long)]
		to: NaiveDate,
		#[arg(long)]
		user: Option<i64>,
		#[arg(long, value_enum, default_value = "excel")]
		format: ReportFormat,
		#[arg(long, value_name = "DIR")]
		out_dir: Option<PathBuf>,
	},
	Pending {
		#[arg(long)]
		user: Option<i64>,
		#[arg(long, value_parser = TaskStatus::parse_cli)]
		status: Option<TaskStatus>,
		#[arg(long, value_enum, default_value = "excel")]
		format: ReportFormat,
		#[arg(long, value_name = "DIR")]
		out_dir: Option<PathBuf>,
	},
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
enum HasEnd {
	Yes,
	No,
}

#[derive(Subcommand)]
enum EntryCommand {
	List {
		#[arg(long)]
		from: Option<NaiveDate>,
		#[arg(long)]
		to: Option<NaiveDate>,
		#[arg(long)]
		user: Option<i64>,
		#[arg(long, value_enum)]
		has_end: Option<HasEnd>,
		#[arg(long, value_parser = TaskStatus::parse_cli)]
		status: Option<TaskStatus>,
		#[arg(long, value_name = "FILE")]
		out: Option<PathBuf>,
	},
	Export {
		#[arg(long)]
		from: Option<NaiveDate>,
		#[arg(long)]
		to: Option<NaiveDate>,
		#[arg(long)]
		user: Option<i64>,
		#[arg(long, value_enum)]
		has_end: Option<HasEnd>,
		#[arg(long, value_parser = TaskStatus::parse_cli)]
		status: Option<TaskStatus>,
		#[arg(long, value_enum, default_value = "excel")]
		format: ReportFormat,
		#[arg(long, value_name = "DIR")]
		out_dir: Option<PathBuf>,
	},
}

#[tokio::main]
async fn main() {
	env_logger::init();
	if do_main(Options::parse()).await.is_err() {
		std::process::exit(1);
	}
}

async fn do_main(options: Options) -> Result<(), ()> {
	let config = match &options.config {
		Some(path) => Config::from_file(path)?,
		None => Config::default(),
	};

	let api_root = options.api_root
		.or(config.general.api_root)
		.unwrap_or_else(|| DEFAULT_API_ROOT.to_string());
	let api = ApiClient::new(api_root);
	let output_dir = config.general.output_dir.unwrap_or_else(|| PathBuf::from("."));

	match options.command {
		Command::Users(command) => run_users(&api, command).await,
		Command::Tasks(command) => run_tasks(&api, command).await,
		Command::Annotations(command) => run_annotations(&api, command).await,
		Command::Times(command) => run_times(&api, command).await,
		Command::Report(command) => run_report(&api, &output_dir, command).await,
		Command::Entries(command) => run_entries(&api, &output_dir, command).await,
	}
}

async fn run_users(api: &ApiClient, command: UserCommand) -> Result<(), ()> {
	match command {
		UserCommand::List => {
			let users = api.get_users().await.map_err(|e| eprintln!("{}", e))?;
			for user in &users {
				match &user.email {
					Some(email) => println!("{} ({}) <{}>", user.name, user.id, email),
					None => println!("{} ({})", user.name, user.id),
				}
			}
			Ok(())
		},
		UserCommand::Add { name, email } => {
			api.add_user(&UserPayload { name, email }).await.map_err(|e| eprintln!("{}", e))?;
			println!("User created");
			Ok(())
		},
		UserCommand::Rm { id } => {
			api.delete_user(id).await.map_err(|e| eprintln!("{}", e))?;
			println!("User {} deleted", id);
			Ok(())
		},
	}
}

async fn run_tasks(api: &ApiClient, command: TaskCommand) -> Result<(), ()> {
	match command {
		TaskCommand::List { user, sort_by, order, out } => {
			let tasks = api.get_tasks().await.map_err(|e| eprintln!("{}", e))?;
			let users = api.get_users().await.map_err(|e| eprintln!("{}", e))?;
			let filtered = filters::apply_filters_and_sort(&tasks, user, sort_by, order);
			write_view(&render::render_board(&filtered, &users, !tasks.is_empty()), out.as_deref())
		},
		TaskCommand::Show { id, out } => {
			let task = find_task(api, id).await?;
			let users = api.get_users().await.map_err(|e| eprintln!("{}", e))?;
			let mut loader = PanelLoader::new();
			let detail = loader.load(api, task).await.map_err(|e| eprintln!("{}", e))?;
			let detail = match detail {
				Some(detail) => detail,
				None => return Ok(()),
			};
			let owner = users.iter().find(|user| user.id == detail.task.user_id);
			write_view(&render::render_detail(&detail, owner), out.as_deref())
		},
		TaskCommand::Add { name, description, user, months, days, minutes, max_date, status } => {
			let payload = TaskPayload {
				name,
				description,
				user_id: user,
				max_time_minutes: duration::compose_budget(months, days, minutes),
				max_date,
				status: status.unwrap_or_default(),
			};
			api.add_task(&payload).await.map_err(|e| eprintln!("{}", e))?;
			println!("Task created");
			Ok(())
		},
		TaskCommand::Edit { id, name, description, user, months, days, minutes, max_date, clear_date, status } => {
			let task = find_task(api, id).await?;

			// Unspecified budget components keep their stored value.
			let (stored_months, stored_days, stored_minutes) = duration::decompose_budget(task.max_time_minutes);
			let max_time_minutes = duration::compose_budget(
				months.unwrap_or(stored_months),
				days.unwrap_or(stored_days),
				minutes.unwrap_or(stored_minutes),
			);

			let payload = TaskPayload {
				name: name.unwrap_or(task.name),
				description: description.or(task.description),
				user_id: user.unwrap_or(task.user_id),
				max_time_minutes,
				max_date: if clear_date { None } else { max_date.or(task.max_date) },
				status: status.unwrap_or(task.status),
			};
			api.update_task(id, &payload).await.map_err(|e| eprintln!("{}", e))?;
			println!("Task {} updated", id);
			Ok(())
		},
		TaskCommand::Rm { id } => {
			api.delete_task(id).await.map_err(|e| eprintln!("{}", e))?;
			println!("Task {} deleted", id);
			Ok(())
		},
	}
}

async fn run_annotations(api: &ApiClient, command: AnnotationCommand) -> Result<(), ()> {
	match command {
		AnnotationCommand::Add { task, text } => {
			let text = check_annotation_text(&text)?;
			api.add_annotation(task, &AnnotationPayload { text }).await.map_err(|e| eprintln!("{}", e))?;
			reload_panel(api, task).await
		},
		AnnotationCommand::Edit { id, task, text } => {
			let text = check_annotation_text(&text)?;
			api.update_annotation(id, &AnnotationPayload { text }).await.map_err(|e| eprintln!("{}", e))?;
			reload_panel(api, task).await
		},
		AnnotationCommand::Rm { id, task } => {
			api.delete_annotation(id).await.map_err(|e| eprintln!("{}", e))?;
			reload_panel(api, task).await
		},
	}
}

fn check_annotation_text(text: &str) -> Result<String, ()> {
	let text = text.trim();
	if text.is_empty() {
		eprintln!("annotation text must not be empty");
		return Err(());
	}
	Ok(text.to_string())
}

async fn run_times(api: &ApiClient, command: TimeCommand) -> Result<(), ()> {
	match command {
		TimeCommand::Add { task, start, end, comment } => {
			let payload = TimeEntryPayload {
				start_time: start.unwrap_or_else(now_local),
				end_time: end,
				comment: comment.filter(|comment| !comment.is_empty()),
			};
			payload.validate().map_err(|e| eprintln!("{}", e))?;
			api.add_time_entry(task, &payload).await.map_err(|e| eprintln!("{}", e))?;
			reload_panel(api, task).await
		},
		TimeCommand::Edit { id, task, start, end, open, comment } => {
			let detail = load_panel(api, task).await?;
			let entry = match detail.entries.iter().find(|entry| entry.id == id) {
				Some(entry) => entry,
				None => {
					eprintln!("no time entry with id {} on task {}", id, task);
					return Err(());
				},
			};

			let mut edits = EditState::new();
			let draft = edits.begin_entry(entry, now_local());
			if let Some(start) = start {
				draft.start_time = start;
			}
			if let Some(end) = end {
				draft.end_time = end;
			}
			if open {
				draft.keep_open = true;
			}
			if let Some(comment) = comment {
				draft.comment = Some(comment);
			}

			let payload = draft.payload();
			payload.validate().map_err(|e| eprintln!("{}", e))?;
			api.update_time_entry(id, &payload).await.map_err(|e| eprintln!("{}", e))?;
			edits.cancel_entry(id);
			reload_panel(api, task).await
		},
		TimeCommand::Rm { id, task } => {
			api.delete_time_entry(id).await.map_err(|e| eprintln!("{}", e))?;
			reload_panel(api, task).await
		},
	}
}

async fn run_report(api: &ApiClient, output_dir: &Path, command: ReportCommand) -> Result<(), ()> {
	match command {
		ReportCommand::Tasks { from, to, user, format, out_dir } => {
			let request = TaskRangeReport {
				from_task: from,
				to_task: to,
				user_id: user,
			};
			request.validate().map_err(|e| eprintln!("{}", e))?;
			let target = out_dir.unwrap_or_else(|| output_dir.to_path_buf()).join(request.filename(format));
			report::download(api, &request.relative_url(format), &target).await.map_err(|e| eprintln!("{}", e))?;
			println!("Saved {}", target.display());
			Ok(())
		},
		ReportCommand::Dates { from, to, user, format, out_dir } => {
			let request = DateRangeReport {
				from_date: from,
				to_date: to,
				user_id: user,
			};
			request.validate().map_err(|e| eprintln!("{}", e))?;
			let target = out_dir.unwrap_or_else(|| output_dir.to_path_buf()).join(request.filename(format));
			report::download(api, &request.relative_url(format), &target).await.map_err(|e| eprintln!("{}", e))?;
			println!("Saved {}", target.display());
			Ok(())
		},
		ReportCommand::Pending { user, status, format, out_dir } => {
			let request = PendingReport {
				user_id: user,
				status,
			};
			let target = out_dir.unwrap_or_else(|| output_dir.to_path_buf()).join(request.filename(format, now_local()));
			report::download(api, &request.relative_url(format), &target).await.map_err(|e| eprintln!("{}", e))?;
			println!("Saved {}", target.display());
			Ok(())
		},
	}
}

async fn run_entries(api: &ApiClient, output_dir: &Path, command: EntryCommand) -> Result<(), ()> {
	match command {
		EntryCommand::List { from, to, user, has_end, status, out } => {
			let filter = entry_filter(from, to, user, has_end, status);
			let records = browser::list(api, &filter).await.map_err(|e| eprintln!("{}", e))?;
			write_view(&render::render_entries(&records), out.as_deref())
		},
		EntryCommand::Export { from, to, user, has_end, status, format, out_dir } => {
			let filter = entry_filter(from, to, user, has_end, status);
			let target = out_dir.unwrap_or_else(|| output_dir.to_path_buf()).join(browser::export_filename(&filter, format));
			browser::export(api, &filter, format, &target).await.map_err(|e| eprintln!("{}", e))?;
			println!("Saved {}", target.display());
			Ok(())
		},
	}
}

fn entry_filter(
	from: Option<NaiveDate>,
	to: Option<NaiveDate>,
	user: Option<i64>,
	has_end: Option<HasEnd>,
	status: Option<TaskStatus>,
) -> EntryFilter {
	let (default_from, default_to) = browser::default_range(Local::now().date_naive());
	let mut filter = EntryFilter::new(from.unwrap_or(default_from), to.unwrap_or(default_to));
	filter.user_id = user;
	filter.has_end = has_end.map(|has_end| has_end == HasEnd::Yes);
	filter.status = status;
	filter
}

async fn find_task(api: &ApiClient, id: i64) -> Result<types::Task, ()> {
	let tasks = api.get_tasks().await.map_err(|e| eprintln!("{}", e))?;
	tasks.into_iter()
		.find(|task| task.id == id)
		.ok_or_else(|| eprintln!("no task with id {}", id))
}

async fn load_panel(api: &ApiClient, task_id: i64) -> Result<TaskDetail, ()> {
	let task = find_task(api, task_id).await?;
	panel::fetch_detail(api, task).await.map_err(|e| eprintln!("{}", e))
}

// Mutations do a full panel reload rather than patching local state.
async fn reload_panel(api: &ApiClient, task_id: i64) -> Result<(), ()> {
	let detail = load_panel(api, task_id).await?;
	println!(
		"Task #{} \"{}\": {} annotations, {} time entries",
		detail.task.task_number,
		detail.task.name,
		detail.annotations.len(),
		detail.entries.len(),
	);
	Ok(())
}

fn write_view(html: &str, out: Option<&Path>) -> Result<(), ()> {
	match out {
		Some(path) => std::fs::write(path, html)
			.map_err(|e| eprintln!("failed to write {}: {}", path.display(), e)),
		None => {
			print!("{}", html);
			Ok(())
		},
	}
}

fn now_local() -> NaiveDateTime {
	Local::now().naive_local()
}

fn parse_timestamp(value: &str) -> Result<NaiveDateTime, String> {
	types::timestamp::parse(value)
		.ok_or_else(|| format!("invalid timestamp: {} (expected e.g. 2024-01-31T09:00)", value))
}
