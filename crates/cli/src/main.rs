//! Crewload CLI - capacity-aware task assignment for small teams.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use crewload_balance::RebalanceOutcome;
use crewload_core::{
    AssignmentEvent, MemberFilter, MemberId, OwnerId, Priority, Project, ProjectId, Task,
    TaskFilter, TaskId, TaskStatus, Team, TeamId,
};
use crewload_storage::JsonStorage;
use crewload_work::{
    MemberSpec, MemberUpdate, ProjectUpdate, TaskSpec, TaskUpdate, TeamWorkload, WorkloadManager,
};
use serde::Serialize;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "crewload")]
#[command(about = "Capacity-aware task assignment for small teams", long_about = None)]
struct Cli {
    /// Data directory
    #[arg(long, global = true, default_value = ".crewload")]
    data_dir: PathBuf,

    /// Acting owner
    #[arg(long, global = true, default_value = "local")]
    owner: String,

    /// Log level when RUST_LOG is unset
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage teams
    #[command(subcommand)]
    Team(TeamCommand),
    /// Manage team members
    #[command(subcommand)]
    Member(MemberCommand),
    /// Manage projects
    #[command(subcommand)]
    Project(ProjectCommand),
    /// Manage tasks
    #[command(subcommand)]
    Task(TaskCommand),
    /// Show a team's workload
    Workload {
        /// Team ID
        team: TeamId,
    },
    /// Move tasks off overloaded members
    Rebalance,
    /// Show totals, workloads and recent activity
    Dashboard,
    /// Show the assignment log
    Activity {
        /// Number of entries
        #[arg(long)]
        limit: Option<usize>,
    },
}

#[derive(Subcommand)]
enum TeamCommand {
    /// Create a team
    Create {
        /// Team name
        name: String,
        /// Member as NAME:ROLE[:CAPACITY], repeatable
        #[arg(long = "member", value_parser = parse_member)]
        members: Vec<MemberSpec>,
    },
    /// List teams
    List,
    /// Show team details
    Show {
        /// Team ID
        id: TeamId,
    },
    /// Rename a team
    Update {
        /// Team ID
        id: TeamId,
        /// New name
        #[arg(long)]
        name: String,
    },
    /// Delete a team
    Delete {
        /// Team ID
        id: TeamId,
    },
}

#[derive(Subcommand)]
enum MemberCommand {
    /// Add a member
    Add {
        /// Team ID
        team: TeamId,
        /// Member name
        name: String,
        /// Member role
        #[arg(long)]
        role: String,
        /// Concurrent task capacity (0-5)
        #[arg(long, allow_hyphen_values = true)]
        capacity: Option<i64>,
    },
    /// Change a member
    Update {
        /// Team ID
        team: TeamId,
        /// Member ID
        member: MemberId,
        /// New name
        #[arg(long)]
        name: Option<String>,
        /// New role
        #[arg(long)]
        role: Option<String>,
        /// New capacity (0-5)
        #[arg(long, allow_hyphen_values = true)]
        capacity: Option<i64>,
    },
    /// Remove a member, unassigning its tasks
    Remove {
        /// Team ID
        team: TeamId,
        /// Member ID
        member: MemberId,
    },
}

#[derive(Subcommand)]
enum ProjectCommand {
    /// Create a project
    Create {
        /// Project name
        name: String,
        /// Team working on the project
        #[arg(long)]
        team: TeamId,
        /// Description
        #[arg(long, default_value = "")]
        description: String,
    },
    /// List projects
    List,
    /// Show project details
    Show {
        /// Project ID
        id: ProjectId,
    },
    /// Edit a project or move it to another team
    Update {
        /// Project ID
        id: ProjectId,
        /// New name
        #[arg(long)]
        name: Option<String>,
        /// New description
        #[arg(long)]
        description: Option<String>,
        /// Team to move the project to
        #[arg(long)]
        team: Option<TeamId>,
    },
    /// Delete a project
    Delete {
        /// Project ID
        id: ProjectId,
    },
}

#[derive(Subcommand)]
enum TaskCommand {
    /// Add a task
    Add {
        /// Task title
        title: String,
        /// Project ID
        #[arg(long)]
        project: ProjectId,
        /// Description
        #[arg(long, default_value = "")]
        description: String,
        /// Low, Medium or High
        #[arg(long, default_value = "medium")]
        priority: Priority,
        /// Pending, In Progress or Done
        #[arg(long, default_value = "pending")]
        status: TaskStatus,
        /// Assign to this member
        #[arg(long)]
        assign: Option<MemberId>,
    },
    /// List tasks
    List {
        /// Filter by project
        #[arg(long)]
        project: Option<ProjectId>,
        /// Filter by assignee
        #[arg(long, conflicts_with = "unassigned")]
        member: Option<MemberId>,
        /// Only unassigned tasks
        #[arg(long)]
        unassigned: bool,
        /// Filter by status
        #[arg(long)]
        status: Option<TaskStatus>,
        /// Filter by priority
        #[arg(long)]
        priority: Option<Priority>,
    },
    /// Show task details
    Show {
        /// Task ID
        id: TaskId,
    },
    /// Edit a task
    Update {
        /// Task ID
        id: TaskId,
        /// New title
        #[arg(long)]
        title: Option<String>,
        /// New description
        #[arg(long)]
        description: Option<String>,
        /// New priority
        #[arg(long)]
        priority: Option<Priority>,
        /// New status
        #[arg(long)]
        status: Option<TaskStatus>,
    },
    /// Assign a task to a member
    Assign {
        /// Task ID
        id: TaskId,
        /// Member ID
        member: MemberId,
    },
    /// Clear a task's assignee
    Unassign {
        /// Task ID
        id: TaskId,
    },
    /// Give a task to the member with the most spare capacity
    AutoAssign {
        /// Task ID
        id: TaskId,
    },
    /// Delete a task
    Delete {
        /// Task ID
        id: TaskId,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&cli.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let storage = JsonStorage::new(&cli.data_dir).await?;
    debug!(data_dir = %cli.data_dir.display(), "opened storage");
    let manager = WorkloadManager::new(storage);
    let owner = OwnerId::new(cli.owner);
    let out = Output { json: cli.json };

    match cli.command {
        Commands::Team(command) => run_team(&manager, &owner, &out, command).await?,
        Commands::Member(command) => run_member(&manager, &owner, &out, command).await?,
        Commands::Project(command) => run_project(&manager, &owner, &out, command).await?,
        Commands::Task(command) => run_task(&manager, &owner, &out, command).await?,
        Commands::Workload { team } => {
            let workload = manager.team_workload(&owner, team).await?;
            out.show(&workload, print_workload)?;
        }
        Commands::Rebalance => {
            let report = manager.rebalance(&owner).await?;
            out.show(&report, |report| {
                println!("{}", report.message());
                for outcome in &report.outcomes {
                    print_outcome(outcome);
                }
            })?;
        }
        Commands::Dashboard => {
            let dashboard = manager.dashboard(&owner).await?;
            out.show(&dashboard, |dashboard| {
                println!("Crewload Dashboard");
                println!("  Projects: {}", dashboard.total_projects);
                println!("  Tasks: {}", dashboard.total_tasks);
                for (status, count) in &dashboard.tasks_by_status {
                    println!("    {}: {}", status, count);
                }
                for workload in &dashboard.teams {
                    print_workload(workload);
                }
                println!("Recent activity");
                for event in &dashboard.recent_activity {
                    print_event(event);
                }
            })?;
        }
        Commands::Activity { limit } => {
            let events = manager.activity(&owner, limit).await?;
            out.show(&events, |events| {
                println!("Activity ({})", events.len());
                for event in events {
                    print_event(event);
                }
            })?;
        }
    }

    Ok(())
}

/// Prints each result either as text or as pretty JSON.
struct Output {
    json: bool,
}

impl Output {
    fn show<T: Serialize + ?Sized>(&self, value: &T, text: impl FnOnce(&T)) -> Result<()> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(value)?);
        } else {
            text(value);
        }
        Ok(())
    }

    fn deleted(&self, kind: &str, id: impl std::fmt::Display) -> Result<()> {
        let id = id.to_string();
        self.show(&serde_json::json!({ "deleted": kind, "id": id }), |_| {
            println!("Deleted {}: {}", kind, id)
        })
    }
}

async fn run_team(
    manager: &WorkloadManager<JsonStorage>,
    owner: &OwnerId,
    out: &Output,
    command: TeamCommand,
) -> Result<()> {
    match command {
        TeamCommand::Create { name, members } => {
            let team = manager.create_team(owner, &name, members).await?;
            out.show(&team, |team| {
                println!("Created team: {} - {}", team.id, team.name);
                print_roster(team);
            })?;
        }
        TeamCommand::List => {
            let teams = manager.list_teams(owner).await?;
            out.show(&teams, |teams| {
                println!("Teams ({})", teams.len());
                for team in teams {
                    println!("  {} | {} | {} member(s)", team.id, team.name, team.members.len());
                }
            })?;
        }
        TeamCommand::Show { id } => {
            let team = manager.team(owner, id).await?;
            out.show(&team, print_team)?;
        }
        TeamCommand::Update { id, name } => {
            let team = manager.update_team(owner, id, &name).await?;
            out.show(&team, print_team)?;
        }
        TeamCommand::Delete { id } => {
            manager.delete_team(owner, id).await?;
            out.deleted("team", id)?;
        }
    }
    Ok(())
}

async fn run_member(
    manager: &WorkloadManager<JsonStorage>,
    owner: &OwnerId,
    out: &Output,
    command: MemberCommand,
) -> Result<()> {
    match command {
        MemberCommand::Add { team, name, role, capacity } => {
            let spec = MemberSpec { name, role, capacity };
            let team = manager.add_member(owner, team, spec).await?;
            out.show(&team, print_roster)?;
        }
        MemberCommand::Update { team, member, name, role, capacity } => {
            let update = MemberUpdate { name, role, capacity };
            let team = manager.update_member(owner, team, member, update).await?;
            out.show(&team, print_roster)?;
        }
        MemberCommand::Remove { team, member } => {
            let removed = manager.remove_member(owner, team, member).await?;
            out.show(&removed, |removed| {
                println!(
                    "Removed {} from {}; {} task(s) unassigned",
                    removed.member.name, removed.team.name, removed.unassigned
                )
            })?;
        }
    }
    Ok(())
}

async fn run_project(
    manager: &WorkloadManager<JsonStorage>,
    owner: &OwnerId,
    out: &Output,
    command: ProjectCommand,
) -> Result<()> {
    match command {
        ProjectCommand::Create { name, team, description } => {
            let project = manager.create_project(owner, &name, &description, team).await?;
            out.show(&project, |project| {
                println!("Created project: {} - {}", project.id, project.name)
            })?;
        }
        ProjectCommand::List => {
            let projects = manager.list_projects(owner).await?;
            out.show(&projects, |projects| {
                println!("Projects ({})", projects.len());
                for project in projects {
                    println!("  {} | team {} | {}", project.id, project.team, project.name);
                }
            })?;
        }
        ProjectCommand::Show { id } => {
            let project = manager.project(owner, id).await?;
            out.show(&project, print_project)?;
        }
        ProjectCommand::Update { id, name, description, team } => {
            let update = ProjectUpdate { name, description, team };
            let project = manager.update_project(owner, id, update).await?;
            out.show(&project, print_project)?;
        }
        ProjectCommand::Delete { id } => {
            manager.delete_project(owner, id).await?;
            out.deleted("project", id)?;
        }
    }
    Ok(())
}

async fn run_task(
    manager: &WorkloadManager<JsonStorage>,
    owner: &OwnerId,
    out: &Output,
    command: TaskCommand,
) -> Result<()> {
    match command {
        TaskCommand::Add { title, project, description, priority, status, assign } => {
            let mut spec = TaskSpec::new(title, project)
                .with_description(description)
                .with_priority(priority)
                .with_status(status);
            if let Some(member) = assign {
                spec = spec.assigned_to(member);
            }
            let created = manager.create_task(owner, spec).await?;
            out.show(&created, |created| {
                println!("Added task: {} - {}", created.task.id, created.task.title);
                if let Some(info) = &created.member_info {
                    println!(
                        "  Assigned to {} ({}/{} tasks before this one)",
                        info.name, info.current_tasks, info.capacity
                    );
                    if info.is_over_capacity {
                        println!("  Warning: {} is at or over capacity", info.name);
                    }
                }
            })?;
        }
        TaskCommand::List { project, member, unassigned, status, priority } => {
            let member = match (member, unassigned) {
                (Some(id), _) => Some(MemberFilter::Member(id)),
                (None, true) => Some(MemberFilter::Unassigned),
                (None, false) => None,
            };
            let filter = TaskFilter {
                projects: project.map(|p| vec![p]),
                member,
                status,
                priority,
                ..Default::default()
            };
            let tasks = newest_first(manager.list_tasks(owner, filter).await?);
            out.show(&tasks, |tasks| {
                println!("Tasks ({})", tasks.len());
                for task in tasks {
                    println!(
                        "  {} | {} | {} | {} - {}",
                        task.id, task.status, task.priority, task.assigned_member_name, task.title
                    );
                }
            })?;
        }
        TaskCommand::Show { id } => {
            let task = manager.task(owner, id).await?;
            out.show(&task, print_task)?;
        }
        TaskCommand::Update { id, title, description, priority, status } => {
            let update = TaskUpdate {
                title,
                description,
                priority,
                status,
                assigned_member: None,
            };
            let task = manager.update_task(owner, id, update).await?;
            out.show(&task, print_task)?;
        }
        TaskCommand::Assign { id, member } => {
            let task = manager.assign_task(owner, id, Some(member)).await?;
            out.show(&task, |task| {
                println!("Assigned {} to {}", task.title, task.assigned_member_name)
            })?;
        }
        TaskCommand::Unassign { id } => {
            let task = manager.assign_task(owner, id, None).await?;
            out.show(&task, |task| println!("Unassigned {}", task.title))?;
        }
        TaskCommand::AutoAssign { id } => {
            let result = manager.auto_assign(owner, id).await?;
            out.show(&result, |result| {
                println!(
                    "Auto-assigned {} to {} ({}/{} tasks)",
                    result.task.title,
                    result.member.name,
                    result.member.current_load,
                    result.member.capacity
                )
            })?;
        }
        TaskCommand::Delete { id } => {
            manager.delete_task(owner, id).await?;
            out.deleted("task", id)?;
        }
    }
    Ok(())
}

/// Display order for task listings. Storage keeps oldest first.
fn newest_first(mut tasks: Vec<Task>) -> Vec<Task> {
    tasks.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| b.id.cmp(&a.id)));
    tasks
}

fn parse_member(value: &str) -> std::result::Result<MemberSpec, String> {
    let mut parts = value.splitn(3, ':');
    let name = parts.next().unwrap_or_default();
    let role = parts
        .next()
        .ok_or_else(|| format!("expected NAME:ROLE[:CAPACITY], got `{}`", value))?;
    let mut spec = MemberSpec::new(name, role);
    if let Some(capacity) = parts.next() {
        let capacity = capacity
            .trim()
            .parse::<i64>()
            .map_err(|e| format!("invalid capacity `{}`: {}", capacity, e))?;
        spec = spec.with_capacity(capacity);
    }
    Ok(spec)
}

fn print_team(team: &Team) {
    println!("Team: {}", team.id);
    println!("  Name: {}", team.name);
    println!("  Created: {}", team.created_at);
    print_roster(team);
}

fn print_roster(team: &Team) {
    println!("  Members ({})", team.members.len());
    for member in &team.members {
        println!(
            "    {} | {} | {} | capacity {}",
            member.id, member.name, member.role, member.capacity
        );
    }
}

fn print_project(project: &Project) {
    println!("Project: {}", project.id);
    println!("  Name: {}", project.name);
    if !project.description.is_empty() {
        println!("  Description: {}", project.description);
    }
    println!("  Team: {}", project.team);
    println!("  Created: {}", project.created_at);
}

fn print_task(task: &Task) {
    println!("Task: {}", task.id);
    println!("  Title: {}", task.title);
    if !task.description.is_empty() {
        println!("  Description: {}", task.description);
    }
    println!("  Project: {}", task.project);
    println!("  Assignee: {}", task.assigned_member_name);
    println!("  Priority: {}", task.priority);
    println!("  Status: {}", task.status);
    println!("  Created: {}", task.created_at);
    println!("  Updated: {}", task.updated_at);
}

fn print_workload(workload: &TeamWorkload) {
    println!("Team {} ({})", workload.name, workload.team);
    for member in &workload.members {
        println!(
            "  {:<20} {:>2}/{} {}",
            member.name,
            member.current_tasks,
            member.capacity,
            if member.is_overloaded { "OVERLOADED" } else { "" }
        );
    }
}

fn print_outcome(outcome: &RebalanceOutcome) {
    for entry in &outcome.moves {
        println!(
            "  {}: {} -> {} ({})",
            outcome.team_name, entry.from.name, entry.to.name, entry.task_title
        );
    }
    for partial in &outcome.unresolved {
        println!(
            "  {}: {} still {} over capacity ({})",
            outcome.team_name,
            partial.member_name,
            partial.excess - partial.moved,
            partial.reason.describe()
        );
    }
}

fn print_event(event: &AssignmentEvent) {
    println!(
        "  {} | {} | {} | {} -> {}",
        event.timestamp.format("%Y-%m-%d %H:%M:%S"),
        event.action,
        event.task_title,
        event.from_member,
        event.to_member
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_member() {
        let spec = parse_member("Alice:Backend:4").unwrap();
        assert_eq!((spec.name.as_str(), spec.role.as_str(), spec.capacity), ("Alice", "Backend", Some(4)));

        let spec = parse_member("Bob:QA").unwrap();
        assert_eq!(spec.capacity, None);

        assert!(parse_member("Carol").is_err());
        assert!(parse_member("Dan:Dev:many").is_err());
    }

    #[test]
    fn test_task_listing_is_newest_first() {
        let project = ProjectId::new();
        let mut older = Task::new("older", "", project, OwnerId::local());
        let newer = Task::new("newer", "", project, OwnerId::local());
        older.created_at = newer.created_at - chrono::Duration::minutes(5);

        let titles: Vec<_> = newest_first(vec![older, newer])
            .into_iter()
            .map(|t| t.title)
            .collect();
        assert_eq!(titles, vec!["newer", "older"]);
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["crewload", "task", "list", "--json", "--owner", "ann"]).unwrap();
        assert!(cli.json);
        assert_eq!(cli.owner, "ann");
        assert!(matches!(cli.command, Commands::Task(TaskCommand::List { .. })));
    }

    #[test]
    fn test_project_update_takes_team() {
        let team = TeamId::new();
        let (project_arg, team_arg) = (ProjectId::new().to_string(), team.to_string());
        let args = ["crewload", "project", "update", project_arg.as_str(), "--team", team_arg.as_str()];
        let cli = Cli::try_parse_from(args).unwrap();
        match cli.command {
            Commands::Project(ProjectCommand::Update { team: Some(moved), name: None, .. }) => {
                assert_eq!(moved, team)
            }
            _ => panic!("expected project update"),
        }
    }
}
