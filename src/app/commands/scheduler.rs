use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use chrono::{Local, NaiveDateTime, Utc};
use serde_json::Value;

use crate::adapters::{HttpHaloClient, JsonTaskLog, RetryPolicy, RetryingHaloClient};
use crate::app::AppContext;
use crate::app::commands::{claims, recalls, run_logged};
use crate::domain::{AppError, DailyTask, TaskLogEntry, TaskStatus};
use crate::ports::{LogReminderSender, SeedStore};

pub const RECALLS_TASK: &str = "daily_recalls";
pub const CLAIMS_TASK: &str = "daily_claims";

type TaskAction<'a> = Box<dyn Fn() -> Result<Value, AppError> + 'a>;

/// Daily task loop. Each registered task runs once per day at its configured
/// time; failures land in the task log and never stop the loop.
pub struct Scheduler<'a> {
    task_log: &'a JsonTaskLog,
    poll_interval: Duration,
    tasks: Vec<(DailyTask, TaskAction<'a>)>,
}

impl<'a> Scheduler<'a> {
    pub fn new(task_log: &'a JsonTaskLog, poll_interval: Duration) -> Self {
        Scheduler { task_log, poll_interval, tasks: Vec::new() }
    }

    pub fn register(&mut self, task: DailyTask, action: TaskAction<'a>) {
        self.tasks.push((task, action));
    }

    pub fn next_runs(&self) -> Vec<(String, NaiveDateTime)> {
        self.tasks.iter().map(|(task, _)| (task.name.clone(), task.next_run())).collect()
    }

    /// Run every task due at `now`; returns how many were attempted.
    pub fn run_pending(&mut self, now: NaiveDateTime) -> usize {
        let mut executed = 0;
        for (task, action) in &mut self.tasks {
            if !task.is_due(now) {
                continue;
            }
            executed += 1;
            // run_logged already recorded the outcome; the loop goes on.
            if let Err(error) = run_logged(self.task_log, &task.name, action) {
                eprintln!("Task {} failed: {error}", task.name);
            }
            task.mark_executed(now);
        }
        executed
    }

    /// Poll until `stop` is raised. Start and stop are recorded in the task
    /// log.
    pub fn run(&mut self, stop: &AtomicBool) -> Result<(), AppError> {
        self.task_log.append(
            &TaskLogEntry::new("scheduler", TaskStatus::Started, Utc::now())
                .with_message(format!("{} tasks registered", self.tasks.len())),
        )?;
        for (name, next_run) in self.next_runs() {
            println!("{name}: next run at {next_run}");
        }

        while !stop.load(Ordering::SeqCst) {
            self.run_pending(Local::now().naive_local());
            thread::sleep(self.poll_interval);
        }

        self.task_log
            .append(&TaskLogEntry::new("scheduler", TaskStatus::Stopped, Utc::now()))?;
        Ok(())
    }
}

/// Build the production scheduler: recalls each morning, claim submission
/// each evening.
///
/// The Halo client is constructed per claims run, so missing credentials
/// surface as a failed task entry instead of preventing startup.
pub fn build<'a, S: SeedStore>(ctx: &'a AppContext<S>) -> Scheduler<'a> {
    let schedule = &ctx.config().schedule;
    let now = Local::now().naive_local();
    let mut scheduler =
        Scheduler::new(ctx.task_log(), Duration::from_secs(schedule.poll_interval_secs));

    scheduler.register(
        DailyTask::new(RECALLS_TASK, schedule.recalls_at, now),
        Box::new(move || {
            recalls::execute(ctx, &LogReminderSender, Local::now().date_naive())
        }),
    );
    scheduler.register(
        DailyTask::new(CLAIMS_TASK, schedule.claims_at, now),
        Box::new(move || {
            let halo = &ctx.config().halo;
            let client = HttpHaloClient::from_env(halo)?;
            let client =
                RetryingHaloClient::new(Box::new(client), RetryPolicy::from_config(halo));
            claims::execute(ctx, &client)
        }),
    );
    scheduler
}

/// Execute the scheduler loop until `stop` is raised.
pub fn execute<S: SeedStore>(ctx: &AppContext<S>, stop: &AtomicBool) -> Result<(), AppError> {
    build(ctx).run(stop)
}
