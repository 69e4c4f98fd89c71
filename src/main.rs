use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info};
use tracing::Level;
use tracing_subscriber::EnvFilter;

use collab_panel::api::{CollaborationApi, HttpCollaborationApi};
use collab_panel::config::PanelConfig;
use collab_panel::dialog::{ConfirmDialog, NoConfirm, TerminalDialog};
use collab_panel::model::Permission;
use collab_panel::notify::ConsoleNotifier;
use collab_panel::render::Renderer;
use collab_panel::surface::{MemorySurface, Slot};
use collab_panel::{CollaborationPanel, Outcome};

#[derive(Parser)]
#[clap(author, version, about)]
struct Cli {
    #[clap(short, long, global = true)]
    log_level: Option<String>,
    /// YAML configuration file
    #[clap(short, long, global = true)]
    config: Option<PathBuf>,
    /// Overrides `api.base_url`
    #[clap(long, global = true)]
    base_url: Option<String>,
    /// Overrides `project_id`
    #[clap(short, long, global = true)]
    project: Option<i64>,
    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load the panel and print every fragment
    Show,
    /// Print the users that can be invited
    Candidates,
    Invite {
        #[clap(short, long)]
        user: i64,
        #[clap(long, default_value = "read")]
        permission: Permission,
    },
    Remove {
        #[clap(short, long)]
        user: i64,
        /// Do not ask for confirmation
        #[clap(short, long)]
        yes: bool,
    },
    Permission {
        #[clap(long)]
        collaboration: i64,
        #[clap(long)]
        permission: Permission,
    },
    /// Leave the project as the signed-in user
    Leave,
    /// List the projects the signed-in user collaborates on
    Projects,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();
    setup_logging(&args.log_level);

    let mut config = match &args.config {
        Some(path) => PanelConfig::from_file(path)?,
        None => PanelConfig::default(),
    };
    if let Some(base_url) = args.base_url {
        config.api.base_url = base_url;
    }
    if let Some(project) = args.project {
        config.project_id = Some(project);
    }
    debug!("Using backend {}", config.api.base_url);

    let api: Arc<dyn CollaborationApi> = Arc::new(
        HttpCollaborationApi::new(&config.api).context("Failed to create backend client")?,
    );

    if let Commands::Projects = args.command {
        return list_projects(api.as_ref()).await;
    }

    let project_id = config.project_id()?;
    let surface = Arc::new(MemorySurface::new());
    let renderer = Renderer::new(config.labels.clone(), &config.display)?;
    let mut panel = CollaborationPanel::new(project_id, api.clone(), surface.clone(), renderer)
        .with_notifier(Arc::new(ConsoleNotifier));

    let outcome = match args.command {
        Commands::Show => {
            info!("Loading collaboration panel for project {}", project_id);
            panel.load().await;
            print_slot(&surface, Slot::CollaboratorCount);
            print_slot(&surface, Slot::CollaboratorList);
            print_slot(&surface, Slot::CandidateSelect);
            Outcome::Success
        }
        Commands::Candidates => {
            let outcome = panel.fetch_candidate_users().await;
            for user in panel.offered_candidates().await {
                println!("{:>6}  {}", user.id, user.username);
            }
            outcome
        }
        Commands::Invite { user, permission } => {
            // Only users the panel has offered can be invited
            panel.fetch_candidate_users().await;
            let outcome = panel.submit_invite(user, permission).await;
            print_slot(&surface, Slot::CollaboratorList);
            outcome
        }
        Commands::Remove { user, yes } => {
            if config.confirm_removal {
                let dialog: Arc<dyn ConfirmDialog> = if yes {
                    Arc::new(NoConfirm)
                } else {
                    Arc::new(TerminalDialog)
                };
                panel = panel.with_confirmation(dialog);
            }
            let outcome = panel.remove_collaboration(project_id, user).await;
            print_slot(&surface, Slot::CollaboratorList);
            outcome
        }
        Commands::Permission {
            collaboration,
            permission,
        } => {
            let outcome = panel.change_permission(collaboration, permission).await;
            print_slot(&surface, Slot::CollaboratorList);
            outcome
        }
        Commands::Leave => panel.leave_project().await,
        Commands::Projects => {
            list_projects(api.as_ref()).await?;
            Outcome::Success
        }
    };

    match outcome {
        Outcome::Success => Ok(()),
        Outcome::Cancelled => {
            info!("Cancelled");
            Ok(())
        }
        Outcome::Failure(message) => bail!(message),
    }
}

async fn list_projects(api: &dyn CollaborationApi) -> Result<()> {
    let projects = api
        .collaborated_projects()
        .await
        .context("Failed to load collaborated projects")?;

    if projects.is_empty() {
        println!("Not collaborating on any project");
        return Ok(());
    }
    for project in projects {
        println!(
            "{:>6}  {}  {} ({})",
            project.id,
            project.name.bold(),
            project.owner_username,
            project.permission
        );
    }
    Ok(())
}

fn print_slot(surface: &MemorySurface, slot: Slot) {
    let state = surface.snapshot(slot);
    if let Some(content) = state.text.or(state.html) {
        println!("{}", format!("#{}", slot.element_id()).cyan());
        println!("{}", content.trim());
    }
}

fn setup_logging(log_level: &Option<String>) {
    let log_level = match log_level
        .as_ref()
        .unwrap_or(&"info".to_string())
        .to_lowercase()
        .as_str()
    {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(format!("handlebars=off,{}", log_level)))
        .without_time()
        .with_writer(std::io::stderr)
        .init();
}
