use clap::Parser;

/// Keeps Gradle dependency lock files in sync with the resolved dependency graph.
#[derive(Debug, Parser)]
#[clap(version)]
pub struct CliArgs {
    #[clap(subcommand)]
    pub cmd: Command,
    /// Workspace root, defaults to the current directory
    #[clap(short, long)]
    pub root: Option<String>,
    /// Workspace snapshot written by the dependency resolver [default: relock.toml]
    #[clap(short, long)]
    pub snapshot: Option<String>,
    /// Lock file name inside each module directory [default: gradle.lockfile]
    #[clap(short, long)]
    pub lock_file: Option<String>,
}

#[derive(Debug, Parser)]
pub enum Command {
    /// Updates every module lock file that no longer matches the resolved dependencies
    Lock {
        /// Fail instead of writing when a lock file is out of date
        #[clap(long)]
        locked: bool,
    },
    /// Prints the reconciled lock file of a module without writing it
    Print { module: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        CliArgs::command().debug_assert();
    }

    #[test]
    fn parse_lock_locked() {
        let args = CliArgs::parse_from(["relock", "--lock-file", "deps.lockfile", "lock", "--locked"]);
        assert_eq!(args.lock_file.as_deref(), Some("deps.lockfile"));
        assert!(matches!(args.cmd, Command::Lock { locked: true }));
    }
}
