use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use papershelf::cli::{
    StoreArgs, TeamCommands, UserCommands, run_access, run_init, run_team_add_member,
    run_team_create, run_team_delete, run_team_for_user, run_team_grant, run_team_list,
    run_team_remove_member, run_team_revoke, run_team_show, run_user_add, run_user_delete,
    run_user_list, run_user_own, run_user_show,
};

#[derive(Parser)]
#[command(name = "papershelf")]
#[command(about = "Users, teams and paper sharing on a fact store", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the data directory and store schema
    Init {
        #[command(flatten)]
        store: StoreArgs,
    },

    /// User management
    User {
        #[command(subcommand)]
        command: UserCommands,
    },

    /// Team management
    Team {
        #[command(subcommand)]
        command: TeamCommands,
    },

    /// Show the access a user holds on a paper
    Access {
        #[command(flatten)]
        store: StoreArgs,

        /// User ID
        user_id: i64,

        /// Paper ID
        paper_id: i64,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("papershelf=info".parse()?))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Init { store } => run_init(&store),
        Commands::User { command } => match command {
            UserCommands::Add {
                store,
                name,
                email,
                external_id,
                admin,
            } => run_user_add(&store, name, email, external_id, admin),
            UserCommands::List { store } => run_user_list(&store),
            UserCommands::Show { store, id } => run_user_show(&store, id),
            UserCommands::Own {
                store,
                user_id,
                paper_id,
            } => run_user_own(&store, user_id, paper_id),
            UserCommands::Delete {
                store,
                id,
                non_interactive,
                yes,
            } => run_user_delete(&store, id, non_interactive, yes),
        },
        Commands::Team { command } => match command {
            TeamCommands::Create {
                store,
                name,
                admins,
                members,
                see,
                edit,
            } => run_team_create(&store, name, admins, members, see, edit),
            TeamCommands::List { store } => run_team_list(&store),
            TeamCommands::Show { store, id } => run_team_show(&store, id),
            TeamCommands::ForUser { store, user_id } => run_team_for_user(&store, user_id),
            TeamCommands::AddMember {
                store,
                team_id,
                user_id,
                admin,
            } => run_team_add_member(&store, team_id, user_id, admin),
            TeamCommands::RemoveMember {
                store,
                team_id,
                user_id,
            } => run_team_remove_member(&store, team_id, user_id),
            TeamCommands::Grant {
                store,
                team_id,
                paper_id,
                edit,
            } => run_team_grant(&store, team_id, paper_id, edit),
            TeamCommands::Revoke {
                store,
                team_id,
                paper_id,
            } => run_team_revoke(&store, team_id, paper_id),
            TeamCommands::Delete {
                store,
                id,
                non_interactive,
                yes,
            } => run_team_delete(&store, id, non_interactive, yes),
        },
        Commands::Access {
            store,
            user_id,
            paper_id,
        } => run_access(&store, user_id, paper_id),
    }
}
