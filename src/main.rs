//! pactool - a cross-distro package management helper
//!
//! One set of subcommands over apt and pacman: listing, search, install,
//! mirrors, kernels, services and CVE lookups.

use anyhow::Result;
use clap::{CommandFactory, Parser};

use pactool::cli::{Cli, Command, KernelAction, MirrorAction, SecurityAction, ServiceAction};
use pactool::commands::{
	about, inspect, kernels, list, maintenance, manage, mirrors, search, security, services,
};
use pactool::core::package::PackageFilter;
use pactool::core::Manager;
use pactool::{config, logger, ui};

fn main() {
	let cli = Cli::parse();

	let Some(command) = cli.command else {
		if let Err(e) = Cli::command().print_help() {
			eprintln!("{}", e);
		}
		println!();
		return;
	};

	ui::Log::set_verbose(cli.verbose);
	config::set_dry_run(cli.dry_run);
	if let Some(dir) = cli.cache_dir {
		config::set_cache_dir(dir);
	}
	if let Some(path) = logger::init(cli.verbose) {
		ui::debug(&format!("Logging to {}", path.display()));
	}

	if let Err(e) = run(command, cli.manager.manager()) {
		ui::error(&format!("{:#}", e));
		std::process::exit(1);
	}
}

fn package_filter(user: bool, system: bool) -> PackageFilter {
	match (user, system) {
		(true, _) => PackageFilter::User,
		(_, true) => PackageFilter::System,
		_ => PackageFilter::All,
	}
}

fn run(command: Command, choice: Option<Manager>) -> Result<()> {
	let manager = || -> Result<Manager> {
		let manager = Manager::resolve(choice)?;
		ui::debug(&format!("Using {}", manager));
		Ok(manager)
	};

	match command {
		Command::List { limit, sort, reverse, user, system } => {
			list::run(manager()?, limit, sort, reverse, package_filter(user, system))
		}
		Command::Stats { limit } => list::stats(manager()?, limit),
		Command::Files { package } => inspect::files(manager()?, &package),
		Command::Search { term, limit } => search::run(manager()?, &term, limit),
		Command::Why { package } => inspect::why(manager()?, &package),
		Command::Install { package } => manage::install(manager()?, &package),
		Command::Uninstall { package } => manage::uninstall(manager()?, &package),
		Command::Update => manage::update(manager()?),
		Command::Upgrade => manage::upgrade(manager()?),
		Command::Clean => manage::clean(manager()?),
		Command::Info { package } => inspect::info(manager()?, &package),
		Command::Bloat { limit } => maintenance::bloat(manager()?, limit),
		Command::Unused { limit } => maintenance::unused(manager()?, limit),
		Command::Outdated { limit } => maintenance::outdated(manager()?, limit),
		Command::History { package } => inspect::history(manager()?, &package),
		Command::Versions { package, assess_risk } => inspect::versions(manager()?, &package, assess_risk),

		Command::Services { action } => match action {
			None => services::list(),
			Some(ServiceAction::Info { name }) => services::info(&name),
			Some(ServiceAction::Logs { name, lines }) => services::logs(&name, lines),
		},

		Command::Mirrors { action } => match action {
			MirrorAction::Show => mirrors::show(manager()?),
			MirrorAction::Update => mirrors::update(manager()?),
			MirrorAction::Revert => mirrors::revert(manager()?),
			MirrorAction::Backup => mirrors::backup(manager()?),
		},

		Command::Kernels { action } => match action {
			KernelAction::Cleanup => kernels::cleanup(manager()?),
			KernelAction::Backup => kernels::backup(),
		},

		Command::Security { action } => match action {
			SecurityAction::Upgrade => security::upgrade(manager()?),
			SecurityAction::Packages => security::packages(manager()?),
			SecurityAction::Vuln { package, deep, keyword, limit } => security::vuln(&package, deep, keyword, limit),
		},

		Command::About => {
			about::run();
			Ok(())
		}
	}
}
