use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueHint, builder::BoolishValueParser};

/// Command-line arguments for the SleekBlog binary.
#[derive(Debug, Parser)]
#[command(
    name = "sleekblog",
    version,
    about = "Browse and search a headless-CMS blog from the terminal"
)]
pub struct CliArgs {
    /// Optional path to a configuration file.
    #[arg(
        long = "config-file",
        env = "SLEEKBLOG_CONFIG_FILE",
        value_name = "PATH",
        value_hint = ValueHint::FilePath,
        global = true
    )]
    pub config_file: Option<PathBuf>,

    #[command(flatten)]
    pub overrides: Overrides,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Args, Default, Clone)]
pub struct Overrides {
    /// Override the CMS origin, e.g. `http://localhost:1337`.
    #[arg(long = "cms-origin", value_name = "URL", value_hint = ValueHint::Url, global = true)]
    pub cms_origin: Option<String>,

    /// Override the base log level (trace|debug|info|warn|error).
    #[arg(long = "log-level", value_name = "LEVEL", global = true)]
    pub log_level: Option<String>,

    /// Toggle JSON logging.
    #[arg(
        long = "log-json",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new(),
        global = true
    )]
    pub log_json: Option<bool>,
}

#[derive(Debug, Subcommand, Clone, PartialEq, Eq)]
pub enum Command {
    /// Latest posts for the home page.
    Home,
    /// The most recent posts, six unless `--limit` says otherwise.
    Latest {
        #[arg(long, value_name = "N")]
        limit: Option<u32>,
    },
    /// A single post.
    Post {
        #[arg(value_name = "SLUG")]
        slug: String,
    },
    /// Posts in a category.
    Category {
        #[arg(value_name = "SLUG")]
        slug: String,
    },
    /// Posts by an author.
    Author {
        #[arg(value_name = "ID")]
        id: u64,
    },
    /// Posts carrying a tag.
    Tag {
        #[arg(value_name = "SLUG")]
        slug: String,
    },
    /// All categories, alphabetically.
    Categories,
    /// Search post titles and content. Without QUERY, each stdin line is a
    /// new query.
    Search {
        #[arg(value_name = "QUERY")]
        query: Option<String>,
    },
}
