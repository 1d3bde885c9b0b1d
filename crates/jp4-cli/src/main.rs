use std::io;

use anyhow::Context;
use clap::Parser;
use jp4_cli::audit::AuditLogger;
use jp4_cli::cli::Args;
use jp4_cli::config::Config;
use jp4_cli::style::Style;
use jp4_cli::{ReadlineReader, Session, ShellOutput};
use jp4_dispatch::GrpcDispatcher;
use log::{debug, warn};
use tokio::runtime::Runtime;

fn main() {
    let args = Args::parse();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(args.log_filter()))
        .init();

    if let Err(e) = run(&args) {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

fn run(args: &Args) -> anyhow::Result<()> {
    let config = args.load_config().context("failed to load configuration")?;
    let catalog = config
        .catalog
        .build()
        .context("invalid command catalog")?;

    let runtime = Runtime::new().context("failed to create async runtime")?;
    let settings = config.agent.channel_settings();
    let dispatcher = if config.agent.fail_fast {
        GrpcDispatcher::connect(&settings, runtime.handle().clone())?
    } else {
        GrpcDispatcher::connect_lazy(&settings, runtime.handle().clone())?
    };
    debug!(
        "using {} catalog ({} verbs) against {}",
        config.catalog.variant,
        catalog.len(),
        dispatcher.address()
    );

    let reader = ReadlineReader::new(catalog.verbs()).context("failed to initialise line editor")?;
    let audit = open_audit(&config);
    let mut out = ShellOutput::new(io::stdout(), Style::with_preference(config.shell.color));

    let mut session = Session::new(dispatcher, reader, catalog)
        .with_prompt(config.shell.prompt.clone())
        .with_audit(audit);
    session.run(&mut out);
    Ok(())
}

fn open_audit(config: &Config) -> AuditLogger {
    if !config.audit.enabled {
        return AuditLogger::noop();
    }
    let path = config.audit.resolve_path();
    match AuditLogger::new(&path) {
        Ok(logger) => logger,
        Err(e) => {
            warn!("audit log disabled, cannot open {}: {e}", path.display());
            AuditLogger::noop()
        }
    }
}
