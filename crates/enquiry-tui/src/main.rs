use anyhow::{Context, Result};
use clap::Parser;
use enquiry_core::{
    logging, EnquiryConfig, FormSeed, HttpTransport, PackageCatalogue, PackageOption,
    SubmissionCoordinator, Wizard,
};
use enquiry_tui::cli::{Cli, Command};
use enquiry_tui::{draft, terminal, SessionEnd};
use log::{info, warn};
use enquiry_core::config::DEFAULT_TIMEOUT_SECS;
use std::sync::{Arc, Mutex};
use std::time::Duration;

const EXIT_DRAIN_MARGIN_SECS: u64 = 5;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // The full-screen wizard owns stdout/stderr, so it logs to a file.
    let interactive = matches!(cli.command, None | Some(Command::Tui { .. }));
    logging::init(interactive);

    match &cli.command {
        Some(Command::Packages) => {
            print_packages();
            Ok(())
        }
        Some(Command::Submit { file, package }) => {
            let mut seed = draft::load_draft(file)?;
            if let Some(package) = package {
                seed.selected_package = Some(package.clone());
            }
            run_submit(&cli, seed)
        }
        Some(Command::Tui { package }) => run_tui(&cli, package.as_deref()),
        None => run_tui(&cli, None),
    }
}

fn load_config(cli: &Cli) -> Result<EnquiryConfig> {
    let config = EnquiryConfig::load(cli.config.as_deref()).context("Failed to load config")?;
    let config = match &cli.endpoint {
        Some(endpoint) => config.with_endpoint(endpoint)?,
        None => config,
    };
    info!("Enquiries go to {}", config.endpoint);
    Ok(config)
}

fn coordinator(config: &EnquiryConfig) -> Result<SubmissionCoordinator<HttpTransport>> {
    let transport = HttpTransport::new(config)?;
    Ok(SubmissionCoordinator::new(
        Arc::new(Mutex::new(Wizard::new())),
        transport,
    ))
}

fn run_tui(cli: &Cli, package: Option<&str>) -> Result<()> {
    let catalogue = PackageCatalogue::builtin();
    if let Some(id) = package {
        if !catalogue.is_known(id) {
            warn!("Package {} is not in the catalogue", id);
        }
    }

    let config = load_config(cli)?;
    let coordinator = Arc::new(coordinator(&config)?);
    coordinator.lock().open(package);

    // Past the transport timeout the request has already failed.
    let drain = Duration::from_secs(
        config.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS) + EXIT_DRAIN_MARGIN_SECS,
    );

    match terminal::run(coordinator, drain)? {
        SessionEnd::Sent(confirmation) => {
            println!(
                "Thank You, {}! We will be in touch at {}.",
                confirmation.first_name, confirmation.email
            );
        }
        SessionEnd::Closed | SessionEnd::Quit => println!("No enquiry sent."),
    }
    Ok(())
}

fn run_submit(cli: &Cli, seed: FormSeed) -> Result<()> {
    let coordinator = coordinator(&load_config(cli)?)?;
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let report = runtime.block_on(draft::submit_draft(&coordinator, seed))?;
    println!("{}", report);
    if !report.is_sent() {
        std::process::exit(1);
    }
    Ok(())
}

fn print_packages() {
    for option in PackageCatalogue::builtin().options() {
        match &option {
            PackageOption::Listed(pkg) => {
                println!("{:<24} {} ({}, {})", pkg.id, pkg.name, pkg.duration, pkg.price_label());
            }
            PackageOption::Custom => {
                println!("{:<24} {}", option.id(), option.name());
            }
        }
    }
}
