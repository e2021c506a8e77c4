mod recovery;

use std::path::{Path, PathBuf};

use crate::cli::commands::*;
use crate::cli::output::*;
use crate::io::config_io;
use crate::io::paths;
use crate::io::storage::JsonFileStorage;
use crate::logging;
use crate::model::AppConfig;
use crate::ops::store::{TaskError, TaskStore};

/// Settings every command needs
struct Context {
    config: AppConfig,
    data_dir: PathBuf,
    json: bool,
}

impl Context {
    fn task_file(&self) -> PathBuf {
        paths::task_file(&self.data_dir, &self.config)
    }

    fn open_store(&self) -> TaskStore<JsonFileStorage> {
        TaskStore::open(JsonFileStorage::new(self.task_file()))
    }
}

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

pub fn dispatch(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let (config, config_error) = config_io::read_config();
    let data_dir = paths::resolve_data_dir(cli.data_dir.as_deref(), &config);
    let ctx = Context {
        config,
        data_dir,
        json: cli.json,
    };

    let Some(command) = cli.command else {
        // No subcommand: the terminal menu owns the screen, so log to a file
        let _guard = logging::init_file(&ctx.data_dir, &ctx.config.log.level);
        if let Some(e) = config_error {
            tracing::warn!("{}; using default settings", e);
        }
        return crate::tui::run(ctx.open_store(), &ctx.config.ui);
    };

    logging::init_stderr(&ctx.config.log.level);
    if let Some(e) = config_error {
        tracing::warn!("{}; using default settings", e);
    }

    match command {
        Commands::Add(args) => cmd_add(&ctx, args),
        Commands::List(args) => cmd_list(&ctx, args),
        Commands::Toggle(args) => cmd_toggle(&ctx, args),
        Commands::Delete(args) => cmd_delete(&ctx, args),
        Commands::Status => cmd_status(&ctx),
        Commands::Path => cmd_path(&ctx),
        Commands::Recovery(args) => recovery::cmd_recovery(&ctx.data_dir, args, ctx.json),
    }
}

// ---------------------------------------------------------------------------
// Task commands
// ---------------------------------------------------------------------------

fn cmd_add(ctx: &Context, args: AddArgs) -> Result<(), Box<dyn std::error::Error>> {
    let mut store = ctx.open_store();
    let text = args.text.join(" ");
    let task = match store.add_task(&text) {
        Ok(task) => task,
        // blank text is not an error, there is just nothing to add
        Err(TaskError::EmptyText) => return Ok(()),
        Err(e) => return Err(e.into()),
    };
    if ctx.json {
        println!("{}", serde_json::to_string_pretty(&task_to_json(&task))?);
    } else {
        println!("{}", task.id);
    }
    Ok(())
}

fn cmd_list(ctx: &Context, args: ListArgs) -> Result<(), Box<dyn std::error::Error>> {
    let store = ctx.open_store();
    let tasks: Vec<_> = store
        .list_sorted()
        .into_iter()
        .filter(|t| (!args.pending || !t.completed) && (!args.completed || t.completed))
        .collect();

    if ctx.json {
        let json: Vec<TaskJson> = tasks.iter().map(|t| task_to_json(t)).collect();
        println!("{}", serde_json::to_string_pretty(&json)?);
    } else {
        for task in tasks {
            println!("{}", format_task_line(task));
        }
    }
    Ok(())
}

fn cmd_toggle(ctx: &Context, args: IdArgs) -> Result<(), Box<dyn std::error::Error>> {
    let mut store = ctx.open_store();
    let task = store.toggle_task(args.id)?;
    print_task(ctx, &task)
}

fn cmd_delete(ctx: &Context, args: IdArgs) -> Result<(), Box<dyn std::error::Error>> {
    let mut store = ctx.open_store();
    let task = store.delete_task(args.id)?;
    print_task(ctx, &task)
}

fn print_task(ctx: &Context, task: &crate::model::Task) -> Result<(), Box<dyn std::error::Error>> {
    if ctx.json {
        println!("{}", serde_json::to_string_pretty(&task_to_json(task))?);
    } else {
        println!("{}", format_task_line(task));
    }
    Ok(())
}

fn cmd_status(ctx: &Context) -> Result<(), Box<dyn std::error::Error>> {
    let summary = ctx.open_store().summary();
    if ctx.json {
        println!("{}", serde_json::to_string_pretty(&summary_to_json(summary))?);
    } else {
        for line in format_status(summary) {
            println!("{}", line);
        }
    }
    Ok(())
}

fn cmd_path(ctx: &Context) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", display_path(&ctx.task_file()));
    Ok(())
}

fn display_path(path: &Path) -> String {
    std::path::absolute(path)
        .unwrap_or_else(|_| path.to_path_buf())
        .display()
        .to_string()
}
