use clap::{Args, Subcommand};

/// Where to find the store. `--data-dir` wins over the config file.
#[derive(Args, Debug, Clone, Default)]
pub struct StoreArgs {
    /// Data directory holding papershelf.db
    #[arg(long)]
    pub data_dir: Option<String>,

    /// TOML config file providing data_dir
    #[arg(long)]
    pub config: Option<String>,
}

#[derive(Subcommand)]
pub enum UserCommands {
    /// Add a new user
    Add {
        #[command(flatten)]
        store: StoreArgs,

        /// Display name
        #[arg(long)]
        name: String,

        /// Email address (must be unique)
        #[arg(long)]
        email: String,

        /// External identity token
        #[arg(long)]
        external_id: Option<String>,

        /// Make the user a site admin
        #[arg(long)]
        admin: bool,
    },

    /// List all users
    List {
        #[command(flatten)]
        store: StoreArgs,
    },

    /// Show one user as JSON
    Show {
        #[command(flatten)]
        store: StoreArgs,

        /// User ID
        id: i64,
    },

    /// Mark a paper as owned by a user
    Own {
        #[command(flatten)]
        store: StoreArgs,

        /// User ID
        user_id: i64,

        /// Paper ID
        paper_id: i64,
    },

    /// Delete a user and every fact about them
    Delete {
        #[command(flatten)]
        store: StoreArgs,

        /// User ID
        id: i64,

        /// Skip interactive prompts (requires --yes)
        #[arg(long)]
        non_interactive: bool,

        /// Skip confirmation prompt
        #[arg(long, short = 'y')]
        yes: bool,
    },
}

#[derive(Subcommand)]
pub enum TeamCommands {
    /// Create a team
    Create {
        #[command(flatten)]
        store: StoreArgs,

        /// Team name
        #[arg(long)]
        name: String,

        /// User ID to add as team admin (repeatable)
        #[arg(long = "admin")]
        admins: Vec<i64>,

        /// User ID to add as plain member (repeatable)
        #[arg(long = "member")]
        members: Vec<i64>,

        /// Paper ID the team can see (repeatable)
        #[arg(long = "see")]
        see: Vec<i64>,

        /// Paper ID the team can edit; implies --see (repeatable)
        #[arg(long = "edit")]
        edit: Vec<i64>,
    },

    /// List all active teams
    List {
        #[command(flatten)]
        store: StoreArgs,
    },

    /// Show one team as JSON
    Show {
        #[command(flatten)]
        store: StoreArgs,

        /// Team ID
        id: i64,
    },

    /// List the teams a user belongs to
    ForUser {
        #[command(flatten)]
        store: StoreArgs,

        /// User ID
        user_id: i64,
    },

    /// Add a user to a team, or change their role
    AddMember {
        #[command(flatten)]
        store: StoreArgs,

        /// Team ID
        team_id: i64,

        /// User ID
        user_id: i64,

        /// Make the user a team admin
        #[arg(long)]
        admin: bool,
    },

    /// Remove a user from a team
    RemoveMember {
        #[command(flatten)]
        store: StoreArgs,

        /// Team ID
        team_id: i64,

        /// User ID
        user_id: i64,
    },

    /// Grant a team access to a paper
    Grant {
        #[command(flatten)]
        store: StoreArgs,

        /// Team ID
        team_id: i64,

        /// Paper ID
        paper_id: i64,

        /// Grant edit (and see) instead of see only
        #[arg(long)]
        edit: bool,
    },

    /// Revoke every grant a team holds on a paper
    Revoke {
        #[command(flatten)]
        store: StoreArgs,

        /// Team ID
        team_id: i64,

        /// Paper ID
        paper_id: i64,
    },

    /// Soft-delete a team
    Delete {
        #[command(flatten)]
        store: StoreArgs,

        /// Team ID
        id: i64,

        /// Skip interactive prompts (requires --yes)
        #[arg(long)]
        non_interactive: bool,

        /// Skip confirmation prompt
        #[arg(long, short = 'y')]
        yes: bool,
    },
}
