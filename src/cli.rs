use clap::{ArgAction, CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use std::io;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "macslang")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Interpreter for the macslang scripting language", long_about = None)]
#[command(subcommand_negates_reqs = true)]
pub struct Args {
    /// Program to run
    #[arg(value_name = "FILE", required = true)]
    pub file: Option<PathBuf>,

    #[arg(long = "color", value_name = "WHEN", default_value = "auto")]
    pub color: ColorChoice,

    /// Log interpreter activity to stderr (-vv for call tracing)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    pub verbose: u8,

    /// Maximum depth of nested function calls
    #[arg(long = "max-depth", value_name = "N")]
    pub max_depth: Option<usize>,

    /// Maximum parameters per function and arguments per call
    #[arg(long = "max-params", value_name = "N")]
    pub max_params: Option<usize>,

    /// Maximum nesting depth of a single expression
    #[arg(long = "max-expr-depth", value_name = "N")]
    pub max_expr_depth: Option<usize>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print shell completions
    Complete {
        #[arg(value_name = "SHELL")]
        shell: Shell,
    },
}

#[derive(Debug, Clone, Copy)]
pub enum ColorChoice {
    Auto,
    Always,
    Never,
}

impl std::str::FromStr for ColorChoice {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "auto" => Ok(ColorChoice::Auto),
            "always" => Ok(ColorChoice::Always),
            "never" => Ok(ColorChoice::Never),
            _ => Err(format!(
                "Invalid color choice: {}. Must be 'auto', 'always', or 'never'",
                s
            )),
        }
    }
}

pub fn generate_completions(shell: Shell) {
    let mut cmd = Args::command();
    let bin_name = cmd.get_name().to_string();
    generate(shell, &mut cmd, &bin_name, &mut io::stdout());
}
