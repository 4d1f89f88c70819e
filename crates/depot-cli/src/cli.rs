use clap::{ArgAction, Parser, Subcommand, ValueHint};

#[derive(Parser)]
#[command(
    author,
    version,
    about,
    help_template = "{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}",
    arg_required_else_help = true
)]
pub struct Args {
    /// Set output verbosity
    #[arg(short = 'v', long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress outputs
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output as json
    #[arg(short, long, global = true)]
    pub json: bool,

    /// Disable colors in output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Disable download progress bars
    #[arg(long, global = true)]
    pub no_progress: bool,

    /// Provide custom config file
    #[arg(short, long, global = true, value_hint = ValueHint::FilePath)]
    pub config: Option<String>,

    /// Set proxy
    #[arg(required = false, long, short = 'P', global = true)]
    pub proxy: Option<String>,

    /// Set user agent
    #[arg(required = false, long, short = 'A', global = true)]
    pub user_agent: Option<String>,

    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum UserAction {
    /// Create a user that can own packages
    #[command(arg_required_else_help = true)]
    Add {
        /// Login name
        #[arg(required = true)]
        username: String,

        /// Email address, matched against package maintainer emails
        #[arg(required = false, short, long)]
        email: Option<String>,
    },

    /// List users
    #[clap(name = "list", alias = "ls")]
    List,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Add distributions to the index
    ///
    /// Each label is a local archive path, a URL, or a requirement such as
    /// `foo`, `foo==1.0` or `foo>=1,<2` looked up on the configured index.
    #[command(arg_required_else_help = true)]
    #[clap(name = "add", visible_alias = "a")]
    Add {
        /// Paths, URLs or requirements to add
        #[arg(required = true, value_hint = ValueHint::AnyPath)]
        labels: Vec<String>,

        /// Owner for packages that do not exist yet
        #[arg(required = false, short, long)]
        owner: Option<String>,
    },

    /// List packages in the index
    #[clap(name = "list", alias = "ls")]
    List,

    /// Manage users
    User {
        #[clap(subcommand)]
        action: UserAction,
    },

    /// Generate default config
    #[clap(name = "defconfig")]
    DefConfig,

    /// View env
    #[clap(name = "env")]
    Env,
}
