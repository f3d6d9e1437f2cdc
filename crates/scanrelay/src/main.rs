//! scanrelay CLI - printer scan delivery daemon.
//!
//! Polls a scanner's SMB share for new documents, delivers each one to
//! the configured destination (mail or WebDAV) and deletes the source
//! file afterwards so nothing is delivered twice.

mod error;
mod output;

use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use relay_config::{CliSettings, Config, Mode};
use relay_engine::{ScanCycle, Scheduler};
use relay_share::{FsShare, Share, mounted_scan_root};
use relay_store::{DocumentStore, MailConfig, MailStore, WebDavConfig, WebDavStore};
use tracing::warn;
use tracing_subscriber::EnvFilter;

use error::CliError;
use output::Output;

/// Fallback SMTP submission port when the config leaves it unset; the
/// config layer normally rejects that in mail mode.
const DEFAULT_SMTP_PORT: u16 = 587;

/// scanrelay - deliver scans from a printer share to mail or WebDAV.
#[derive(Parser)]
#[command(name = "scanrelay", version, about)]
struct Cli {
    /// Path to configuration file (default: auto-discover scanrelay.toml).
    #[arg(short, long, env = "CONFIG")]
    config: Option<PathBuf>,

    /// Printer hostname.
    #[arg(short = 'p', long, env = "PRINTER_HOST")]
    printer_host: Option<String>,

    /// Printer model family (determines the scan root on the share).
    #[arg(long, env = "PRINTER_MODEL")]
    printer_model: Option<String>,

    /// Operating mode: which delivery backend is active.
    #[arg(long, value_enum, env = "SCANRELAY_MODE")]
    mode: Option<ModeArg>,

    /// Run exactly one cycle and exit.
    #[arg(long)]
    once: bool,

    /// Seconds between cycle starts.
    #[arg(long, env = "SCAN_INTERVAL")]
    interval_secs: Option<u64>,

    /// Local mount point of the printer share (uses the filesystem
    /// backend instead of direct SMB).
    #[arg(long, env = "SHARE_MOUNT")]
    share_mount: Option<PathBuf>,

    /// SMTP server username.
    #[arg(long, env = "SMTP_USERNAME")]
    smtp_user: Option<String>,

    /// SMTP server password.
    #[arg(long, env = "SMTP_PASSWORD")]
    smtp_password: Option<String>,

    /// SMTP host.
    #[arg(long, env = "SMTP_HOST")]
    smtp_host: Option<String>,

    /// SMTP port.
    #[arg(long, env = "SMTP_PORT")]
    smtp_port: Option<u16>,

    /// Email recipients, comma-separated.
    #[arg(short = 't', long, env = "MAIL_TO")]
    mail_to: Option<String>,

    /// Email from address (defaults to the SMTP user).
    #[arg(short = 'f', long, env = "MAIL_FROM")]
    mail_from: Option<String>,

    /// WebDAV server URL.
    #[arg(long, env = "WEBDAV_HOST")]
    webdav_host: Option<String>,

    /// WebDAV username.
    #[arg(long, env = "WEBDAV_USERNAME")]
    webdav_user: Option<String>,

    /// WebDAV password.
    #[arg(long, env = "WEBDAV_PASSWORD")]
    webdav_password: Option<String>,

    /// WebDAV collection path uploads go into.
    #[arg(long, env = "WEBDAV_BASE_PATH")]
    webdav_base_path: Option<String>,

    /// Enable info-level logging.
    #[arg(short, long)]
    verbose: bool,
}

/// Operating mode as a CLI value.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum ModeArg {
    /// Deliver scans as email attachments.
    Mail,
    /// Upload scans to a WebDAV collection.
    Webdav,
}

impl From<ModeArg> for Mode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Mail => Self::Mail,
            ModeArg::Webdav => Self::Webdav,
        }
    }
}

impl Cli {
    /// Collect config overrides from the parsed arguments.
    fn settings(&self) -> CliSettings {
        CliSettings {
            printer_host: self.printer_host.clone(),
            printer_model: self.printer_model.clone(),
            mode: self.mode.map(Mode::from),
            once: self.once.then_some(true),
            interval_secs: self.interval_secs,
            share_mount: self.share_mount.clone(),
            smtp_user: self.smtp_user.clone(),
            smtp_password: self.smtp_password.clone(),
            smtp_host: self.smtp_host.clone(),
            smtp_port: self.smtp_port,
            mail_to: self.mail_to.clone(),
            mail_from: self.mail_from.clone(),
            webdav_host: self.webdav_host.clone(),
            webdav_user: self.webdav_user.clone(),
            webdav_password: self.webdav_password.clone(),
            webdav_base_path: self.webdav_base_path.clone(),
        }
    }
}

fn main() {
    let cli = Cli::parse();
    let output = Output::new();

    // --verbose enables INFO level, otherwise use RUST_LOG or default to WARN
    let filter = if cli.verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    if let Err(err) = run(&cli, &output) {
        output.error(&format!("Error: {err}"));
        std::process::exit(1);
    }
}

/// Load configuration, build the collaborators and run the scheduler.
fn run(cli: &Cli, output: &Output) -> Result<(), CliError> {
    let settings = cli.settings();
    let config = Config::load(cli.config.as_deref(), Some(&settings))?;
    config.validate()?;

    let store = build_store(&config)?;
    let (share, root) = build_share(&config)?;
    if root.is_empty() {
        output.warning(&format!(
            "unsupported printer model '{}'; no scans will be found",
            config.printer.model
        ));
    }

    output.info(&format!("Started! Looking for scans on {}", config.printer.host));

    let cycle = ScanCycle::new(share.as_ref(), store.as_ref(), &root);
    let run_cycle = || match cycle.run() {
        Ok(report) if report.delivered > 0 => {
            output.success(&format!("delivered {} scan(s)", report.delivered));
        }
        Ok(_) => {}
        Err(err) => {
            // A listing failure skips this cycle; the next tick retries.
            warn!(error = %err, "cycle aborted, share listing failed");
        }
    };

    if config.schedule.once {
        Scheduler::run_once(run_cycle);
    } else {
        static STOP: AtomicBool = AtomicBool::new(false);
        let interval = Duration::from_secs(config.schedule.interval_secs);
        Scheduler::new(interval).run(&STOP, run_cycle);
    }

    Ok(())
}

/// Build the one active delivery store for the configured mode.
fn build_store(config: &Config) -> Result<Box<dyn DocumentStore>, CliError> {
    match config.mode {
        Some(Mode::Mail) => {
            let mail = config.require_mail()?;
            Ok(Box::new(MailStore::new(MailConfig {
                from: mail.sender(),
                to: mail.recipients(),
                user: mail.user.clone(),
                password: mail.password.clone(),
                host: mail.host.clone(),
                port: mail.port.unwrap_or(DEFAULT_SMTP_PORT),
            })))
        }
        Some(Mode::Webdav) => {
            let webdav = config.require_webdav()?;
            Ok(Box::new(WebDavStore::new(WebDavConfig {
                host: webdav.host.clone(),
                user: webdav.user.clone(),
                password: webdav.password.clone(),
                base_path: webdav.base_path.clone(),
            })))
        }
        None => Err(CliError::Validation(
            "mode is required (mail or webdav)".to_owned(),
        )),
    }
}

/// Build the share backend and its scan root.
///
/// A configured mount point selects the filesystem backend; otherwise the
/// live SMB backend is used when compiled in.
fn build_share(config: &Config) -> Result<(Box<dyn Share>, String), CliError> {
    if let Some(mount) = &config.share.mount {
        let root = mounted_scan_root(&config.printer.model);
        return Ok((Box::new(FsShare::new(mount.clone())), root));
    }

    #[cfg(feature = "smb")]
    {
        let share = relay_share::SmbShare::connect(&config.printer.host)?;
        let root = relay_share::scan_root(&config.printer.host, &config.printer.model);
        Ok((Box::new(share), root))
    }

    #[cfg(not(feature = "smb"))]
    Err(CliError::Validation(
        "share.mount is required (this build has no direct SMB support)".to_owned(),
    ))
}
