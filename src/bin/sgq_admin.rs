use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand};
use sea_orm::{ActiveModelTrait, IntoActiveModel, Set};
use serde::Serialize;
use sgq_api::{
    auth::{AuthConfig, AuthService, SignUpRequest},
    config::{self, AppConfig},
    db::{self, DbPool},
    events::EventSender,
    services::users::{PermissionSet, UserService},
};
use tokio::sync::mpsc;
use uuid::Uuid;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let context = AdminContext::initialize().await?;

    match cli.command {
        Commands::Migrate => {
            db::run_migrations(&context.db)
                .await
                .context("failed to run migrations")?;
            println!("Migrations applied");
        }
        Commands::CreateUser(args) => create_user(&context, args, cli.json).await?,
        Commands::ListUsers => {
            let users = context.users.list_users().await?;
            if cli.json {
                print_json(&users)?;
            } else {
                for user in users {
                    println!(
                        "{}\t{}\t{}{}",
                        user.id,
                        user.username,
                        user.display_name,
                        if user.is_admin { "\t(admin)" } else { "" }
                    );
                }
            }
        }
        Commands::Grant(args) => {
            let set = context
                .users
                .replace_permissions(
                    args.user_id,
                    PermissionSet {
                        permissions: args.permissions,
                    },
                )
                .await
                .context("failed to replace permissions")?;
            if cli.json {
                print_json(&set)?;
            } else {
                println!("{} now holds: {}", args.user_id, set.permissions.join(", "));
            }
        }
    }

    Ok(())
}

#[derive(Parser)]
#[command(name = "sgq-admin", about = "SGQ back-office administration", version)]
struct Cli {
    #[arg(
        long,
        global = true,
        action = ArgAction::SetTrue,
        help = "Render command output as pretty JSON when available"
    )]
    json: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply pending schema migrations
    Migrate,
    /// Create an account, optionally as administrator
    CreateUser(CreateUserArgs),
    /// List every account
    ListUsers,
    /// Replace a user's menu permissions
    Grant(GrantArgs),
}

#[derive(Args)]
struct CreateUserArgs {
    /// Login in `first.last` form
    #[arg(long)]
    username: String,
    #[arg(long)]
    display_name: String,
    #[arg(long)]
    password: String,
    #[arg(long, action = ArgAction::SetTrue)]
    admin: bool,
}

#[derive(Args)]
struct GrantArgs {
    #[arg(long)]
    user_id: Uuid,
    /// Permission identifiers such as `menu_cadastro_toners`
    #[arg(long = "permission", value_name = "ID")]
    permissions: Vec<String>,
}

struct AdminContext {
    db: Arc<DbPool>,
    auth: AuthService,
    users: UserService,
}

impl AdminContext {
    async fn initialize() -> Result<Self> {
        let cfg: AppConfig = config::load_config().context("failed to load configuration")?;
        config::init_tracing(cfg.log_level(), cfg.log_json);

        let db = Arc::new(
            db::establish_connection_from_app_config(&cfg)
                .await
                .context("failed to connect to the database")?,
        );

        // Admin commands emit events nobody consumes; drain them quietly.
        let (tx, mut rx) = mpsc::channel(64);
        tokio::spawn(async move { while rx.recv().await.is_some() {} });
        let events = Arc::new(EventSender::new(tx));

        Ok(Self {
            auth: AuthService::new(AuthConfig::from(&cfg), db.clone()),
            users: UserService::new(db.clone(), events),
            db,
        })
    }
}

async fn create_user(context: &AdminContext, args: CreateUserArgs, json: bool) -> Result<()> {
    let user = context
        .auth
        .sign_up(SignUpRequest {
            username: args.username,
            display_name: args.display_name,
            password: args.password,
        })
        .await
        .context("failed to create user")?;

    let user = if args.admin {
        let mut active = user.into_active_model();
        active.is_admin = Set(true);
        active
            .update(context.db.as_ref())
            .await
            .context("failed to promote user")?
    } else {
        user
    };

    if json {
        print_json(&sgq_api::services::users::UserSummary::from(user))?;
    } else {
        println!(
            "Created {} ({}){}",
            user.username,
            user.id,
            if user.is_admin { " as administrator" } else { "" }
        );
    }
    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
