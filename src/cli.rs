use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "fitpal", version, about = "AI-guided workout sessions from the terminal")]
#[command(arg_required_else_help = true)]
pub struct Cli {
    /// Emit machine-readable JSON instead of colorful text.
    #[arg(global = true, long)]
    pub json: bool,

    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Open the trainer for one exercise (squats, pushups, bicep-curls)
    #[command(visible_alias = "t")]
    Train {
        /// Exercise to train
        exercise: String,
    },

    /// Show your most recent workouts
    #[command(visible_alias = "h")]
    History,

    /// Sign up, sign in and manage your account
    #[command(subcommand)]
    Auth(AuthCmd),

    /// View or edit fitpal config
    #[command(subcommand)]
    Config(ConfigCmd),
}

//
// Commands
//

#[derive(Subcommand)]
pub enum AuthCmd {
    /// Create an account and sign in
    Signup {
        email: String,
        /// Read from stdin when omitted
        #[arg(short, long)]
        password: Option<String>,
    },

    /// Sign in to an existing account
    #[command(visible_alias = "signin")]
    Login {
        email: String,
        /// Read from stdin when omitted
        #[arg(short, long)]
        password: Option<String>,
    },

    /// Sign out
    #[command(visible_alias = "signout")]
    Logout,

    /// Show who is signed in
    Whoami,

    /// Request a password reset token
    ResetPassword { email: String },

    /// Set a new password using a reset token
    ConfirmReset {
        token: String,
        /// Read from stdin when omitted
        #[arg(short, long)]
        password: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum ConfigCmd {
    /// Show all config keys
    List,

    /// Get the value of a key
    Get { key: String },

    /// Set or override a key
    Set { key: String, val: String },

    /// Remove a key
    Unset { key: String },
}
