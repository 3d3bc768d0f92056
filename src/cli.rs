use clap::{builder::Styles, Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::path::PathBuf;

use crate::config::DEFAULT_LOG_LINES;
use crate::core::Manager;

/// Which package manager to drive
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum ManagerChoice {
	/// Detect (apt first, then pacman)
	#[default]
	Auto,
	/// Debian, Ubuntu and derivatives
	Apt,
	/// Arch Linux and derivatives
	Pacman,
}

impl ManagerChoice {
	/// `None` means detect
	pub fn manager(self) -> Option<Manager> {
		match self {
			ManagerChoice::Auto => None,
			ManagerChoice::Apt => Some(Manager::Apt),
			ManagerChoice::Pacman => Some(Manager::Pacman),
		}
	}
}

/// Sort order for `list`
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SortKey {
	/// Package name, case-insensitive
	Name,
	/// Installed size
	Size,
	/// Install date
	InstallDate,
	/// Last update date
	UpdateDate,
	/// User packages first, then by name
	Type,
}

fn styles() -> Styles {
	Styles::styled()
		.header(anstyle::Style::new().bold().fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Yellow))))
		.usage(anstyle::Style::new().bold().fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Yellow))))
		.literal(anstyle::Style::new().fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Magenta))))
		.placeholder(anstyle::Style::new().fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Cyan))))
		.valid(anstyle::Style::new().fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Green))))
		.invalid(anstyle::Style::new().fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Red))))
}

#[derive(Parser, Debug)]
#[command(
	name = "pactool",
	author,
	version,
	about = "A cross-distro package management helper for apt and pacman",
	styles = styles(),
	after_help = format!(
		"{title}
  {pactool} {list}      {list_args}   {list_desc}
  {pactool} {search}    {search_args}               {search_desc}
  {pactool} {why}       {why_args}                 {why_desc}
  {pactool} {mirrors}   {mirrors_args}                  {mirrors_desc}
  {pactool} {security}  {security_args}   {security_desc}",
		title = "Examples:".bright_yellow().bold(),
		pactool = "pactool".bright_yellow(),
		list = "list".magenta(),
		list_args = "--sort size --reverse -n 20",
		list_desc = "Twenty largest packages".dimmed(),
		search = "search".magenta(),
		search_args = "firefox",
		search_desc = "Search the repositories".dimmed(),
		why = "why".magenta(),
		why_args = "openssl",
		why_desc = "What depends on openssl".dimmed(),
		mirrors = "mirrors".magenta(),
		mirrors_args = "show",
		mirrors_desc = "Test every configured mirror".dimmed(),
		security = "security".magenta(),
		security_args = "vuln openssl --deep",
		security_desc = "Known CVEs with impact".dimmed(),
	),
)]
pub struct Cli {
	/// Enable verbose debug output
	#[arg(short = 'v', long = "verbose", global = true)]
	pub verbose: bool,

	/// Print privileged commands instead of running them
	#[arg(long = "dry-run", global = true)]
	pub dry_run: bool,

	/// Package manager: auto, apt, pacman
	#[arg(long = "manager", global = true, default_value = "auto", env = "PACTOOL_MANAGER")]
	pub manager: ManagerChoice,

	/// Directory for logs and mirror backups
	#[arg(long = "cache-dir", global = true, value_name = "DIR", env = "PACTOOL_CACHE_DIR")]
	pub cache_dir: Option<PathBuf>,

	#[command(subcommand)]
	pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
	/// List installed packages with size and dates
	List {
		/// Show N packages (0 shows all without paging)
		#[arg(short = 'n', long = "limit", value_name = "N")]
		limit: Option<usize>,

		/// Sort by name, size, install-date, update-date or type
		#[arg(long = "sort", value_name = "KEY")]
		sort: Option<SortKey>,

		/// Reverse the order
		#[arg(long = "reverse")]
		reverse: bool,

		/// Only explicitly installed packages
		#[arg(long = "user", conflicts_with = "system")]
		user: bool,

		/// Only packages pulled in as dependencies
		#[arg(long = "system")]
		system: bool,
	},

	/// Package count, size and date statistics
	Stats {
		/// Only consider the first N packages
		#[arg(short = 'n', long = "limit", value_name = "N")]
		limit: Option<usize>,
	},

	/// Files installed by a package
	Files {
		#[arg(value_name = "PACKAGE")]
		package: String,
	},

	/// Search the repositories
	Search {
		#[arg(value_name = "TERM")]
		term: String,

		/// Show N results (0 shows all without paging)
		#[arg(short = 'n', long = "limit", value_name = "N")]
		limit: Option<usize>,
	},

	/// Show what depends on a package
	Why {
		#[arg(value_name = "PACKAGE")]
		package: String,
	},

	/// Install a package
	Install {
		#[arg(value_name = "PACKAGE")]
		package: String,
	},

	/// Remove a package
	Uninstall {
		#[arg(value_name = "PACKAGE")]
		package: String,
	},

	/// Refresh package lists
	Update,

	/// Upgrade every package
	Upgrade,

	/// Clear the package cache
	Clean,

	/// Version, size, dates and dependencies of a package
	Info {
		#[arg(value_name = "PACKAGE")]
		package: String,
	},

	/// Packages carrying optional dependencies
	Bloat {
		#[arg(short = 'n', long = "limit", value_name = "N")]
		limit: Option<usize>,
	},

	/// Orphaned packages nothing depends on
	Unused {
		#[arg(short = 'n', long = "limit", value_name = "N")]
		limit: Option<usize>,
	},

	/// Packages with a newer version available
	Outdated {
		#[arg(short = 'n', long = "limit", value_name = "N")]
		limit: Option<usize>,
	},

	/// Install and upgrade history of a package
	History {
		#[arg(value_name = "PACKAGE")]
		package: String,
	},

	/// Versions available for a package
	Versions {
		#[arg(value_name = "PACKAGE")]
		package: String,

		/// Look up known CVEs for each version
		#[arg(long = "assess-risk")]
		assess_risk: bool,
	},

	/// List services, or inspect one
	Services {
		#[command(subcommand)]
		action: Option<ServiceAction>,
	},

	/// Inspect, rank and restore mirrors
	Mirrors {
		#[command(subcommand)]
		action: MirrorAction,
	},

	/// Remove old kernels or back up the running one
	Kernels {
		#[command(subcommand)]
		action: KernelAction,
	},

	/// Security upgrades, audits and CVE lookups
	Security {
		#[command(subcommand)]
		action: SecurityAction,
	},

	/// About pactool
	About,
}

#[derive(Subcommand, Debug)]
pub enum ServiceAction {
	/// `systemctl status` of a service
	Info {
		#[arg(value_name = "NAME")]
		name: String,
	},

	/// Recent journal entries of a service
	Logs {
		#[arg(value_name = "NAME")]
		name: String,

		/// Number of entries
		#[arg(short = 'l', long = "lines", default_value_t = DEFAULT_LOG_LINES)]
		lines: usize,
	},
}

#[derive(Subcommand, Debug)]
pub enum MirrorAction {
	/// Test every configured mirror
	Show,
	/// Replace the mirror list with the fastest mirrors
	Update,
	/// Restore a previous mirror list
	Revert,
	/// Back up the current mirror list
	Backup,
}

#[derive(Subcommand, Debug)]
pub enum KernelAction {
	/// Remove kernels other than the running one
	Cleanup,
	/// Copy the running kernel image to /boot/pactool/backup
	Backup,
}

#[derive(Subcommand, Debug)]
pub enum SecurityAction {
	/// Install security updates
	Upgrade,
	/// Show security packages (apt) or arch-audit findings (pacman)
	Packages,
	/// Known CVEs for a package
	Vuln {
		#[arg(value_name = "PACKAGE")]
		package: String,

		/// Show CVSS impact and references for each CVE
		#[arg(long = "deep")]
		deep: bool,

		/// Start with results filtered by this keyword
		#[arg(short = 'k', long = "keyword", value_name = "WORD")]
		keyword: Option<String>,

		/// Show N results (0 shows all without paging)
		#[arg(short = 'n', long = "limit", value_name = "N")]
		limit: Option<usize>,
	},
}

#[cfg(test)]
mod tests {
	use super::*;
	use clap::CommandFactory;

	#[test]
	fn test_cli_definition() {
		Cli::command().debug_assert();
	}

	#[test]
	fn test_parse_list_options() {
		let cli = Cli::try_parse_from(["pactool", "list", "--sort", "install-date", "--reverse", "-n", "0"]).unwrap();
		match cli.command {
			Some(Command::List { limit, sort, reverse, user, system }) => {
				assert_eq!(limit, Some(0));
				assert_eq!(sort, Some(SortKey::InstallDate));
				assert!(reverse && !user && !system);
			}
			other => panic!("unexpected command: {:?}", other),
		}
	}

	#[test]
	fn test_user_conflicts_with_system() {
		assert!(Cli::try_parse_from(["pactool", "list", "--user", "--system"]).is_err());
	}

	#[test]
	fn test_global_options() {
		let cli = Cli::try_parse_from(["pactool", "stats", "--manager", "pacman", "--dry-run"]).unwrap();
		assert_eq!(cli.manager.manager(), Some(Manager::Pacman));
		assert!(cli.dry_run);
	}

	#[test]
	fn test_service_logs_default_lines() {
		let cli = Cli::try_parse_from(["pactool", "services", "logs", "sshd"]).unwrap();
		match cli.command {
			Some(Command::Services { action: Some(ServiceAction::Logs { name, lines }) }) => {
				assert_eq!(name, "sshd");
				assert_eq!(lines, 20);
			}
			other => panic!("unexpected command: {:?}", other),
		}
	}

	#[test]
	fn test_no_subcommand() {
		let cli = Cli::try_parse_from(["pactool"]).unwrap();
		assert!(cli.command.is_none());
	}
}
