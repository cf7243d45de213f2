use std::sync::Arc;

use chrono::{NaiveDate, NaiveTime};
use clap::{Args, Parser, Subcommand};
use eyre::{Result, eyre};
use teewatch_core::{
    errors::WatchError,
    models::{
        CheckFrequency, NewWatchRequest, Notification, PreferencesUpdate, StatusEvent, StatusKind,
        TimeWindow, WatchRequest, schedule::cron_to_human, watch_request::hhmm,
    },
};
use teewatch_monitor::{
    build_runner, build_schedule_client,
    config::MonitorConfig,
    runner::RunSummary,
    schedules::{DEFAULT_LOG_LIMIT, ScheduleProxy, schedule_overview},
    status::{StatusBoard, StatusSink},
};
use teewatch_store::{WatchStore, create_store, repositories};
use tracing::info;

#[derive(Parser)]
#[command(
    name = "teewatch",
    version,
    about = "TeeWatch: watch golf courses for open tee times and get alerted"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// List watch requests
    List {
        /// Only show active requests
        #[arg(long)]
        active: bool,
    },
    /// Create a watch request
    Create {
        #[command(flatten)]
        form: RequestForm,
        /// Run a check right after saving
        #[arg(long)]
        check: bool,
    },
    /// Edit a watch request; omitted fields keep their value
    Edit {
        id: String,
        #[command(flatten)]
        form: RequestForm,
    },
    /// Pause an active request or resume a paused one
    Toggle { id: String },
    /// Delete a watch request (its notification history is kept)
    Delete { id: String },
    /// Check one watch request now
    Check { id: String },
    /// Check every active watch request
    CheckAll,
    /// Show sent notifications, newest first
    History {
        /// Only notifications for this watch request
        #[arg(long)]
        request: Option<String>,
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },
    /// Show or change preferences
    Settings {
        /// Default notification email for new requests
        #[arg(long)]
        email: Option<String>,
        /// Default check frequency in minutes (15, 30 or 60)
        #[arg(long)]
        frequency: Option<u32>,
        /// Enable or disable alert emails
        #[arg(long)]
        email_alerts: Option<bool>,
    },
    /// Manage the schedule that runs periodic checks
    #[command(subcommand)]
    Schedule(ScheduleCommand),
}

#[derive(Subcommand)]
pub enum ScheduleCommand {
    /// Show the check schedule
    List,
    /// Show recent executions
    Logs {
        #[arg(long, default_value_t = DEFAULT_LOG_LIMIT)]
        limit: usize,
    },
    Pause,
    Resume,
    /// Run the schedule once right away
    Trigger,
}

/// Watch request fields as command line options.
#[derive(Args, Default)]
pub struct RequestForm {
    /// Golf course name
    #[arg(long)]
    pub course: Option<String>,
    /// Booking page of the course
    #[arg(long)]
    pub url: Option<String>,
    /// Date to check (YYYY-MM-DD), repeatable
    #[arg(long = "date")]
    pub dates: Vec<NaiveDate>,
    /// Earliest tee time (HH:MM)
    #[arg(long, value_parser = hhmm::parse)]
    pub start: Option<NaiveTime>,
    /// Latest tee time (HH:MM)
    #[arg(long, value_parser = hhmm::parse)]
    pub end: Option<NaiveTime>,
    #[arg(long)]
    pub players: Option<u8>,
    /// Notification email, defaults to the one in settings
    #[arg(long)]
    pub email: Option<String>,
    /// Check frequency in minutes (15, 30 or 60)
    #[arg(long)]
    pub frequency: Option<u32>,
}

impl RequestForm {
    /// Fills the form's gaps from `base`.
    pub fn into_draft(self, base: NewWatchRequest) -> Result<NewWatchRequest> {
        let check_frequency = match self.frequency {
            Some(minutes) => CheckFrequency::from_minutes(minutes)?,
            None => base.check_frequency,
        };

        Ok(NewWatchRequest {
            course_name: self.course.unwrap_or(base.course_name),
            course_url: self.url.or(base.course_url),
            dates: if self.dates.is_empty() { base.dates } else { self.dates },
            time_window: TimeWindow {
                start: self.start.unwrap_or(base.time_window.start),
                end: self.end.unwrap_or(base.time_window.end),
            },
            players: self.players.unwrap_or(base.players),
            notify_email: self.email.unwrap_or(base.notify_email),
            check_frequency,
        })
    }
}

/// Prints status events as they arrive and keeps the latest per request.
struct ConsoleSink {
    board: StatusBoard,
}

impl StatusSink for ConsoleSink {
    fn publish(&self, event: StatusEvent) {
        let marker = match event.kind {
            StatusKind::Info => "..",
            StatusKind::Success => "ok",
            StatusKind::Error => "!!",
        };
        println!("[{}] {}: {}", marker, event.request_id, event.message);
        self.board.publish(event);
    }
}

pub struct App {
    config: MonitorConfig,
    store: Arc<dyn WatchStore>,
    board: StatusBoard,
}

impl App {
    pub fn new(config: MonitorConfig) -> Self {
        let store = create_store(config.data_file.clone());
        Self {
            config,
            store,
            board: StatusBoard::new(),
        }
    }

    pub async fn run(&self, command: Command) -> Result<()> {
        match command {
            Command::List { active } => self.list(active).await,
            Command::Create { form, check } => self.create(form, check).await,
            Command::Edit { id, form } => self.edit(&id, form).await,
            Command::Toggle { id } => {
                let request = self.store.toggle_request(&id).await?;
                println!("{} is now {:?}", request.id, request.status);
                Ok(())
            }
            Command::Delete { id } => {
                let request = self.store.delete_request(&id).await?;
                self.board.clear(&request.id);
                println!("Deleted {} ({})", request.id, request.course_name);
                Ok(())
            }
            Command::Check { id } => {
                self.runner()?.check_by_id(&id).await?;
                Ok(())
            }
            Command::CheckAll => self.check_all().await,
            Command::History { request, limit } => self.history(request.as_deref(), limit).await,
            Command::Settings {
                email,
                frequency,
                email_alerts,
            } => self.settings(email, frequency, email_alerts).await,
            Command::Schedule(command) => self.schedule(command).await,
        }
    }

    fn runner(&self) -> Result<teewatch_monitor::runner::CheckRunner> {
        let sink = ConsoleSink {
            board: self.board.clone(),
        };
        build_runner(&self.config, self.store.clone(), Arc::new(sink))
    }

    async fn list(&self, active_only: bool) -> Result<()> {
        let requests = if active_only {
            self.store.active_requests().await
        } else {
            self.store.load_all().await.alerts
        };

        if requests.is_empty() {
            println!("No watch requests");
        }
        for request in &requests {
            print_request(request);
        }
        Ok(())
    }

    async fn create(&self, form: RequestForm, check: bool) -> Result<()> {
        let preferences = self.store.preferences().await;
        let course_name = form
            .course
            .clone()
            .ok_or_else(|| eyre!("--course is required"))?;
        let start = form.start.ok_or_else(|| eyre!("--start is required"))?;
        let end = form.end.ok_or_else(|| eyre!("--end is required"))?;

        let base = NewWatchRequest {
            course_name,
            course_url: None,
            dates: Vec::new(),
            time_window: TimeWindow { start, end },
            players: 4,
            notify_email: preferences.default_email.clone(),
            check_frequency: preferences.default_check_frequency,
        };
        let request = WatchRequest::create(form.into_draft(base)?)?;
        let request = self.store.upsert_request(request).await;
        info!(request_id = %request.id, "Created watch request");
        print_request(&request);

        if check {
            self.runner()?.check(&request).await?;
        }
        Ok(())
    }

    async fn edit(&self, id: &str, form: RequestForm) -> Result<()> {
        let existing = self
            .store
            .find_request(id)
            .await
            .ok_or_else(|| {
                WatchError::NotFound(format!("Watch request with ID {} not found", id))
            })?;

        let draft = form.into_draft(existing.draft())?;
        let request = self.store.upsert_request(existing.apply_edit(draft)?).await;
        print_request(&request);
        Ok(())
    }

    async fn check_all(&self) -> Result<()> {
        let results = self.runner()?.check_all_active().await;
        let summary = RunSummary::from_results(&results);
        println!(
            "Checked {} request(s): {} with matches, {} errored, {} skipped",
            summary.checked, summary.with_matches, summary.errored, summary.skipped
        );
        Ok(())
    }

    async fn history(&self, request_id: Option<&str>, limit: usize) -> Result<()> {
        let document = self.store.load_all().await;
        let notifications: Vec<&Notification> = match request_id {
            Some(id) => repositories::notifications::for_request(&document, id),
            None => document.notifications.iter().collect(),
        };

        if notifications.is_empty() {
            println!("No notifications yet");
        }
        for notification in notifications.into_iter().take(limit) {
            println!(
                "{}  {} {} at {} ({} spots) {}{}",
                notification.sent_at.format("%Y-%m-%d %H:%M"),
                notification.course_name,
                notification.match_date,
                notification.match_time_slot,
                notification.available_spots,
                if notification.email_sent { "emailed" } else { "not emailed" },
                if notification.booking_link.is_empty() {
                    String::new()
                } else {
                    format!("  {}", notification.booking_link)
                },
            );
        }
        Ok(())
    }

    async fn settings(
        &self,
        email: Option<String>,
        frequency: Option<u32>,
        email_alerts: Option<bool>,
    ) -> Result<()> {
        let update = PreferencesUpdate {
            default_email: email,
            default_check_frequency: frequency.map(CheckFrequency::from_minutes).transpose()?,
            email_notifications_enabled: email_alerts,
        };

        let preferences = if update.is_empty() {
            self.store.preferences().await
        } else {
            self.store.update_preferences(update).await
        };

        println!("Default email:     {}", display_or(&preferences.default_email, "(not set)"));
        println!(
            "Default frequency: every {} minutes",
            preferences.default_check_frequency.minutes()
        );
        println!(
            "Email alerts:      {}",
            if preferences.email_notifications_enabled { "on" } else { "off" }
        );
        Ok(())
    }

    async fn schedule(&self, command: ScheduleCommand) -> Result<()> {
        let client = build_schedule_client(&self.config)?;
        let schedule_id = self.config.schedule_id.as_str();

        match command {
            ScheduleCommand::List => {
                let overview = schedule_overview(&client, schedule_id, DEFAULT_LOG_LIMIT).await?;
                let Some(schedule) = overview.schedule else {
                    println!("No schedule found");
                    return Ok(());
                };
                println!("Schedule {}", schedule.id);
                println!("  Status:   {}", if schedule.is_active { "active" } else { "paused" });
                println!("  Runs:     {}", cron_to_human(&schedule.cron_expression));
                println!("  Timezone: {}", schedule.timezone.as_deref().unwrap_or("N/A"));
                println!(
                    "  Next run: {}",
                    schedule
                        .next_run_time
                        .map(|at| at.format("%Y-%m-%d %H:%M UTC").to_string())
                        .unwrap_or_else(|| "N/A".to_string())
                );
            }
            ScheduleCommand::Logs { limit } => {
                let logs = client.logs(schedule_id, limit).await?;
                if logs.is_empty() {
                    println!("No executions yet");
                }
                for log in logs {
                    println!(
                        "{}  {}  attempt {}/{}{}",
                        log.executed_at.format("%Y-%m-%d %H:%M"),
                        if log.success { "success" } else { "failed" },
                        log.attempt,
                        log.max_attempts,
                        log.error_message
                            .map(|message| format!("  {}", message))
                            .unwrap_or_default(),
                    );
                }
            }
            ScheduleCommand::Pause => {
                client.pause(schedule_id).await?;
                println!("Schedule paused successfully.");
            }
            ScheduleCommand::Resume => {
                client.resume(schedule_id).await?;
                println!("Schedule resumed successfully.");
            }
            ScheduleCommand::Trigger => {
                client.trigger_now(schedule_id).await?;
                println!("Schedule triggered! Execution will start shortly.");
            }
        }
        Ok(())
    }
}

fn display_or<'a>(value: &'a str, fallback: &'a str) -> &'a str {
    if value.is_empty() { fallback } else { value }
}

fn print_request(request: &WatchRequest) {
    let dates = request
        .dates
        .iter()
        .map(|date| date.to_string())
        .collect::<Vec<_>>()
        .join(", ");
    println!(
        "{}  [{:?}] {} on {} between {} and {}, {} player(s), every {} min, alerts to {}",
        request.id,
        request.status,
        request.course_name,
        dates,
        request.time_window.start.format("%H:%M"),
        request.time_window.end.format("%H:%M"),
        request.players,
        request.check_frequency.minutes(),
        request.notify_email,
    );
}
