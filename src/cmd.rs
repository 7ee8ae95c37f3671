//! Command implementations for the CLI interface.
//!
//! Each subcommand loads what it needs through a `Context`, calls into the
//! store and the projection core, and prints plain-text tables.

use std::io;
use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDate};
use clap::{Args, CommandFactory, Subcommand};
use clap_complete::{generate, Shell};

use crate::cli::Cli;
use crate::config::{resolve_home, Config, TASKS_FILE_NAME};
use crate::dates::{format_date, format_due_relative, parse_due_input};
use crate::error::{Error, Result};
use crate::fields::*;
use crate::filter::{distinct_assignees, distinct_clients, distinct_sectors, FilterCriteria};
use crate::projection::{is_overdue, project, sort_tasks, Projection};
use crate::session::{self, Session};
use crate::store::{JsonStore, TaskQuery, TaskStore};
use crate::task::{Task, TaskDraft, TaskPatch};
use crate::tui::run::run_board;
use crate::week::{initial_window, parse_anchor, shift_weeks, WeekWindow};

/// Exact-match filter flags shared by the listing commands.
#[derive(Args, Debug, Clone, Default)]
pub struct FilterArgs {
    /// Only tasks in this sector.
    #[arg(long)]
    pub sector: Option<String>,
    /// Only tasks with this priority.
    #[arg(long, value_enum)]
    pub priority: Option<Priority>,
    /// Only tasks whose responsible person has exactly this name.
    #[arg(long)]
    pub assignee: Option<String>,
    /// Only tasks for this client.
    #[arg(long)]
    pub client: Option<String>,
}

impl FilterArgs {
    pub fn criteria(&self) -> FilterCriteria {
        FilterCriteria::from_inputs(
            self.sector.clone(),
            self.priority,
            self.assignee.clone(),
            self.client.clone(),
        )
    }
}

/// Task fields settable from `add` and `update`.
#[derive(Args, Debug, Clone, Default)]
pub struct TaskFields {
    /// Longer description.
    #[arg(long)]
    pub desc: Option<String>,
    #[arg(long)]
    pub client: Option<String>,
    #[arg(long)]
    pub sector: Option<String>,
    /// Name of the responsible person.
    #[arg(long)]
    pub assignee: Option<String>,
    /// Account id of the responsible person, if they have one.
    #[arg(long)]
    pub assignee_id: Option<String>,
    /// Start date: YYYY-MM-DD, "today", "tomorrow", "in Nd", weekday names.
    #[arg(long)]
    pub start: Option<String>,
    /// Due date: YYYY-MM-DD, "today", "tomorrow", "in Nd", weekday names.
    #[arg(long)]
    pub due: Option<String>,
    #[arg(long, value_enum)]
    pub priority: Option<Priority>,
    #[arg(long, value_enum)]
    pub status: Option<Status>,
    /// Reference link (URL).
    #[arg(long)]
    pub link: Option<String>,
    /// Free-form note.
    #[arg(long)]
    pub note: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Add a new task.
    Add {
        /// Short title for the task.
        title: String,
        #[command(flatten)]
        fields: TaskFields,
    },

    /// List tasks as cards, completed ones included.
    List {
        #[command(flatten)]
        filters: FilterArgs,
        /// Sort key (defaults to config.json's default_sort).
        #[arg(long, value_enum)]
        sort: Option<SortKey>,
        /// Only overdue tasks.
        #[arg(long)]
        overdue: bool,
        /// Only tasks due from a week ago onwards.
        #[arg(long, conflicts_with_all = ["from", "to"])]
        recent: bool,
        /// Earliest due date to fetch.
        #[arg(long)]
        from: Option<String>,
        /// Latest due date to fetch.
        #[arg(long)]
        to: Option<String>,
        /// Only tasks assigned to this account id.
        #[arg(long)]
        assignee_id: Option<String>,
        /// Limit number of rows printed.
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Show one week as a calendar.
    Week {
        /// First day of the window (YYYY-MM-DD). Invalid input falls back to this week.
        #[arg(long)]
        anchor: Option<String>,
        /// Weeks to move from the anchor, e.g. 1 or -2.
        #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
        offset: i64,
        #[command(flatten)]
        filters: FilterArgs,
        /// calendar hides completed tasks; grid shows them.
        #[arg(long, value_enum, default_value_t = ViewKind::Calendar)]
        view: ViewKind,
    },

    /// View a single task by id, id prefix or title.
    View {
        id: String,
    },

    /// Update fields on a task.
    Update {
        /// Task id, id prefix or title.
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[command(flatten)]
        fields: TaskFields,
        #[command(flatten)]
        clears: Clears,
    },

    /// Flip a task between pending and completed.
    Toggle {
        id: String,
    },

    /// Mark a task completed.
    Complete {
        id: String,
    },

    /// Mark a task pending again.
    Reopen {
        id: String,
    },

    /// Delete a task.
    Delete {
        id: String,
    },

    /// List distinct clients.
    Clients,

    /// List distinct responsible names.
    Assignees,

    /// List distinct sectors.
    Sectors,

    /// Record the identity new tasks are created under.
    Login {
        user_id: String,
        /// Display name stored as the task's creator label.
        #[arg(long)]
        name: Option<String>,
    },

    /// Forget the signed-in identity.
    Logout,

    /// Show the signed-in identity.
    Whoami,

    /// Launch the interactive week board.
    Ui {
        /// First day of the window (YYYY-MM-DD).
        #[arg(long)]
        anchor: Option<String>,
        #[command(flatten)]
        filters: FilterArgs,
    },

    /// Generate shell completion scripts.
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Everything a command may need, loaded once per invocation.
pub struct Context {
    pub home: PathBuf,
    pub store: JsonStore,
    pub config: Config,
    pub session: Option<Session>,
    pub today: NaiveDate,
}

impl Context {
    pub fn load(home: PathBuf, db: Option<&Path>, week_start: Option<WeekStart>) -> Result<Self> {
        let db_path = db.map_or_else(|| home.join(TASKS_FILE_NAME), Path::to_path_buf);
        let mut config = Config::load(&home)?;
        if let Some(ws) = week_start {
            config.week_start = ws;
        }
        Ok(Context {
            store: JsonStore::open(&db_path)?,
            session: Session::load(&home)?,
            config,
            home,
            today: Local::now().date_naive(),
        })
    }

    fn session(&self) -> Result<&Session> {
        session::require(self.session.as_ref())
    }

    fn initial_window(&self) -> WeekWindow {
        initial_window(self.today, self.config.week_start)
    }
}

/// Parse the command line's intent and run it.
///
/// Session and completion commands never open the task file, so they keep
/// working when it is unreadable.
pub fn run(cli: Cli) -> Result<()> {
    let Cli { home, db, week_start, command } = cli;
    let home = resolve_home(home.as_deref());
    let open = || Context::load(home.clone(), db.as_deref(), week_start);

    match command {
        Commands::Completions { shell } => {
            cmd_completions(shell);
            Ok(())
        }
        Commands::Login { user_id, name } => cmd_login(&home, &user_id, name),
        Commands::Logout => cmd_logout(&home),
        Commands::Whoami => cmd_whoami(&home),

        Commands::Add { title, fields } => cmd_add(&mut open()?, title, fields),
        Commands::List { filters, sort, overdue, recent, from, to, assignee_id, limit } => {
            let ctx = open()?;
            let query = list_query(recent, from.as_deref(), to.as_deref(), assignee_id, ctx.today)?;
            cmd_list(&ctx, &query, &filters.criteria(), sort, overdue, limit)
        }
        Commands::Week { anchor, offset, filters, view } => {
            cmd_week(&open()?, anchor.as_deref(), offset, &filters.criteria(), view)
        }
        Commands::View { id } => cmd_view(&open()?, &id),
        Commands::Update { id, title, fields, clears } => {
            cmd_update(&mut open()?, &id, title, fields, clears)
        }
        Commands::Toggle { id } => cmd_set_status(&mut open()?, &id, None),
        Commands::Complete { id } => cmd_set_status(&mut open()?, &id, Some(Status::Completed)),
        Commands::Reopen { id } => cmd_set_status(&mut open()?, &id, Some(Status::Pending)),
        Commands::Delete { id } => cmd_delete(&mut open()?, &id),
        Commands::Clients => {
            print_values("clients", &distinct_clients(open()?.store.tasks()));
            Ok(())
        }
        Commands::Assignees => {
            print_values("responsible names", &distinct_assignees(open()?.store.tasks()));
            Ok(())
        }
        Commands::Sectors => {
            print_values("sectors", &distinct_sectors(open()?.store.tasks()));
            Ok(())
        }
        Commands::Ui { anchor, filters } => {
            let ctx = open()?;
            let window = parse_anchor(anchor.as_deref(), ctx.today, ctx.config.week_start);
            run_board(ctx, window, filters.criteria())
        }
    }
}

/// Store query for `list`. `--recent` replaces the date bounds but keeps the
/// assignee constraint.
pub fn list_query(
    recent: bool,
    from: Option<&str>,
    to: Option<&str>,
    assignee_id: Option<String>,
    today: NaiveDate,
) -> Result<TaskQuery> {
    let dates = if recent {
        TaskQuery::recent(today)
    } else {
        TaskQuery {
            date_from: from.map(|s| parse_due_input(s, today)).transpose()?,
            date_to: to.map(|s| parse_due_input(s, today)).transpose()?,
            ..Default::default()
        }
    };
    Ok(TaskQuery { assignee_id, ..dates })
}

/// Add a new task owned by the signed-in user.
pub fn cmd_add(ctx: &mut Context, title: String, fields: TaskFields) -> Result<()> {
    let today = ctx.today;
    let draft = TaskDraft {
        title,
        description: fields.desc,
        client: fields.client,
        sector: fields.sector,
        assignee_name: fields.assignee,
        assignee_id: fields.assignee_id,
        start_date: fields.start.as_deref().map(|s| parse_due_input(s, today)).transpose()?,
        due_date: fields.due.as_deref().map(|s| parse_due_input(s, today)).transpose()?,
        priority: fields.priority,
        status: fields.status,
        link: fields.link,
        observation: fields.note,
    };
    let session = ctx.session()?.clone();
    let task = ctx.store.create(&session, draft)?;
    println!("Added {} {}", task.short_id(), task.title);
    Ok(())
}

/// Print the card list: every filtered task, completed ones included.
pub fn cmd_list(
    ctx: &Context,
    query: &TaskQuery,
    criteria: &FilterCriteria,
    sort: Option<SortKey>,
    overdue_only: bool,
    limit: Option<usize>,
) -> Result<()> {
    let tasks = ctx.store.list(query)?;
    let window = ctx.initial_window();
    let p = project(&tasks, criteria, &window, ViewKind::Grid);

    let mut rows: Vec<&Task> = if overdue_only {
        p.overdue(ctx.today)
    } else {
        p.filtered.clone()
    };
    sort_tasks(&mut rows, sort.unwrap_or(ctx.config.default_sort));
    if let Some(n) = limit {
        rows.truncate(n);
    }

    if rows.is_empty() {
        println!("No tasks found.");
        return Ok(());
    }
    print_table(&rows, ctx.today);
    println!();
    println!(
        "{} shown, {} matching, {} due this week ({}), {} overdue. Filters: {}",
        rows.len(),
        p.filtered.len(),
        p.windowed.len(),
        window.label(),
        p.overdue(ctx.today).len(),
        criteria.describe()
    );
    Ok(())
}

/// Print one week as a day-by-day calendar.
pub fn cmd_week(
    ctx: &Context,
    anchor: Option<&str>,
    offset: i64,
    criteria: &FilterCriteria,
    view: ViewKind,
) -> Result<()> {
    let tasks = ctx.store.list(&TaskQuery::default())?;
    let window = shift_weeks(&parse_anchor(anchor, ctx.today, ctx.config.week_start), offset);
    let p = project(&tasks, criteria, &window, view);
    print_week(&p, &window, ctx.today);
    Ok(())
}

/// View a single task with all of its fields.
pub fn cmd_view(ctx: &Context, identifier: &str) -> Result<()> {
    let id = resolve_task_identifier(identifier, ctx.store.tasks())?;
    let t = ctx.store.get(&id)?;
    let dash = |v: &Option<String>| v.clone().unwrap_or_else(|| "-".into());
    let date = |d: Option<NaiveDate>| d.map(format_date).unwrap_or_else(|| "-".into());

    println!("{}", t.title);
    println!("  id:          {}", t.id);
    println!("  status:      {}", format_status(t.status));
    if let Some(at) = t.completed_at {
        println!("  completed:   {}", at.with_timezone(&Local).format("%d/%m/%Y %H:%M"));
    }
    println!("  priority:    {}", format_priority(t.priority));
    println!(
        "  due:         {} ({}){}",
        date(t.due_date),
        format_due_relative(t.due_date, ctx.today),
        if is_overdue(&t, ctx.today) { " OVERDUE" } else { "" }
    );
    println!("  start:       {}", date(t.start_date));
    println!("  client:      {}", dash(&t.client));
    println!("  sector:      {}", dash(&t.sector));
    println!("  responsible: {}", t.assignee_name.as_deref().unwrap_or("Unassigned"));
    println!("  link:        {}", dash(&t.link));
    println!("  created:     {} by {}", t.created_at.with_timezone(&Local).format("%d/%m/%Y %H:%M"),
        t.created_by.as_deref().unwrap_or(&t.creator_id));
    println!("  updated:     {}", t.updated_at.with_timezone(&Local).format("%d/%m/%Y %H:%M"));
    if let Some(desc) = &t.description {
        println!();
        println!("{desc}");
    }
    if let Some(note) = &t.observation {
        println!();
        println!("Note: {note}");
    }
    Ok(())
}

/// Which optional fields `update` should clear.
#[derive(Args, Debug, Clone, Copy, Default)]
pub struct Clears {
    /// Clear description.
    #[arg(long)]
    pub clear_desc: bool,
    #[arg(long)]
    pub clear_client: bool,
    #[arg(long)]
    pub clear_sector: bool,
    /// Clear the responsible name.
    #[arg(long)]
    pub clear_assignee: bool,
    #[arg(long)]
    pub clear_start: bool,
    #[arg(long)]
    pub clear_due: bool,
    #[arg(long)]
    pub clear_link: bool,
    /// Clear the note.
    #[arg(long)]
    pub clear_note: bool,
}

/// Update fields on a task.
pub fn cmd_update(
    ctx: &mut Context,
    identifier: &str,
    title: Option<String>,
    fields: TaskFields,
    clears: Clears,
) -> Result<()> {
    ctx.session()?;
    let id = resolve_task_identifier(identifier, ctx.store.tasks())?;
    let patch = build_patch(title, fields, clears, ctx.today)?;
    if patch.is_empty() {
        println!("Nothing to update.");
        return Ok(());
    }
    let task = ctx.store.update(&id, patch)?;
    println!("Updated {} {}", task.short_id(), task.title);
    Ok(())
}

/// Turn `update` flags into a patch. A clear flag wins over a value for the same field.
pub fn build_patch(
    title: Option<String>,
    fields: TaskFields,
    clears: Clears,
    today: NaiveDate,
) -> Result<TaskPatch> {
    let start = fields.start.as_deref().map(|s| parse_due_input(s, today)).transpose()?;
    let due = fields.due.as_deref().map(|s| parse_due_input(s, today)).transpose()?;

    Ok(TaskPatch {
        title,
        description: patch_field(fields.desc, clears.clear_desc),
        client: patch_field(fields.client, clears.clear_client),
        sector: patch_field(fields.sector, clears.clear_sector),
        assignee_name: patch_field(fields.assignee, clears.clear_assignee),
        assignee_id: fields.assignee_id.map(Some),
        start_date: patch_field(start, clears.clear_start),
        due_date: patch_field(due, clears.clear_due),
        priority: fields.priority,
        status: fields.status,
        link: patch_field(fields.link, clears.clear_link),
        observation: patch_field(fields.note, clears.clear_note),
    })
}

fn patch_field<T>(value: Option<T>, clear: bool) -> Option<Option<T>> {
    if clear {
        Some(None)
    } else {
        value.map(Some)
    }
}

/// Set or toggle a task's status.
pub fn cmd_set_status(ctx: &mut Context, identifier: &str, status: Option<Status>) -> Result<()> {
    ctx.session()?;
    let id = resolve_task_identifier(identifier, ctx.store.tasks())?;
    let task = match status {
        Some(s) => ctx.store.set_status(&id, s)?,
        None => ctx.store.toggle_status(&id)?,
    };
    println!("{} {} is now {}", task.short_id(), task.title, format_status(task.status));
    Ok(())
}

/// Delete a task.
pub fn cmd_delete(ctx: &mut Context, identifier: &str) -> Result<()> {
    ctx.session()?;
    let id = resolve_task_identifier(identifier, ctx.store.tasks())?;
    let title = ctx.store.get(&id)?.title;
    ctx.store.delete(&id)?;
    println!("Deleted {title}");
    Ok(())
}

pub fn cmd_login(home: &Path, user_id: &str, name: Option<String>) -> Result<()> {
    if user_id.trim().is_empty() {
        return Err(Error::Validation("user id cannot be empty".into()));
    }
    let session = Session::new(user_id, name);
    session.save(home)?;
    println!("Signed in as {}", session.label());
    Ok(())
}

pub fn cmd_logout(home: &Path) -> Result<()> {
    if Session::clear(home)? {
        println!("Signed out.");
    } else {
        println!("Not signed in.");
    }
    Ok(())
}

pub fn cmd_whoami(home: &Path) -> Result<()> {
    match Session::load(home)? {
        Some(s) => println!("{} ({})", s.label(), s.user_id),
        None => println!("Not signed in."),
    }
    Ok(())
}

/// Generate shell completion scripts.
pub fn cmd_completions(shell: Shell) {
    let mut cmd = Cli::command();
    generate(shell, &mut cmd, "tb", &mut io::stdout());
}

/// Resolve a task identifier (full id, id prefix or title) to a task id.
pub fn resolve_task_identifier(identifier: &str, tasks: &[Task]) -> Result<String> {
    if let Some(t) = tasks.iter().find(|t| t.id == identifier) {
        return Ok(t.id.clone());
    }

    let by_prefix: Vec<&Task> = if identifier.len() >= 4 {
        tasks.iter().filter(|t| t.id.starts_with(identifier)).collect()
    } else {
        Vec::new()
    };
    let matches = if by_prefix.is_empty() {
        let wanted = identifier.to_lowercase();
        tasks
            .iter()
            .filter(|t| t.title.to_lowercase() == wanted)
            .collect()
    } else {
        by_prefix
    };

    match matches.as_slice() {
        [] => Err(Error::NotFound(identifier.to_string())),
        [one] => Ok(one.id.clone()),
        many => Err(Error::Ambiguous {
            identifier: identifier.to_string(),
            candidates: many
                .iter()
                .map(|t| format!("{} ({})", t.short_id(), t.title))
                .collect::<Vec<_>>()
                .join(", "),
        }),
    }
}

/// Print tasks as a table, flagging overdue ones.
pub fn print_table(tasks: &[&Task], today: NaiveDate) {
    println!(
        "{:<8}  {:<9} {:<6} {:<10} {:<12} {:<10} {:<14} {}",
        "ID", "Status", "Pri", "Due", "Client", "Sector", "Responsible", "Title"
    );
    for t in tasks {
        let mut due = format_due_relative(t.due_date, today);
        if is_overdue(t, today) {
            due.insert(0, '!');
        }
        println!(
            "{:<8}  {:<9} {:<6} {:<10} {:<12} {:<10} {:<14} {}",
            t.short_id(),
            format_status(t.status),
            format_priority(t.priority),
            due,
            truncate(t.client.as_deref().unwrap_or("-"), 12),
            truncate(t.sector.as_deref().unwrap_or("-"), 10),
            truncate(t.assignee_name.as_deref().unwrap_or("-"), 14),
            t.title
        );
    }
}

/// Print a projection day by day.
pub fn print_week(p: &Projection<'_>, window: &WeekWindow, today: NaiveDate) {
    println!("{}", window.label());
    for day in window.days() {
        let marker = if day == today { "  <- today" } else { "" };
        println!();
        println!(
            "{} ({} pending){}",
            day.format("%a %d/%m"),
            p.pending_on(day),
            marker
        );
        let tasks = p.on(day);
        if tasks.is_empty() {
            println!("    no tasks");
        }
        for t in tasks {
            let check = if t.is_completed() { "x" } else { " " };
            println!(
                "  [{check}] {} {} · {} · {}",
                t.short_id(),
                t.title,
                t.assignee_name.as_deref().unwrap_or("Unassigned"),
                format_priority(t.priority)
            );
        }
    }
    let undated = p.filtered.iter().filter(|t| t.due_date.is_none()).count();
    if undated > 0 {
        println!();
        println!("{undated} matching task(s) have no due date and only appear in `tb list`.");
    }
}

fn print_values(what: &str, values: &[String]) {
    if values.is_empty() {
        println!("No {what} yet.");
    }
    for v in values {
        println!("{v}");
    }
}

/// Truncate a string to a maximum width, adding ellipsis if needed.
pub fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        return s.to_string();
    }
    let mut out: String = s.chars().take(width.saturating_sub(1)).collect();
    out.push('…');
    out
}
