/*!
 * minimalgap CLI
 *
 * `minimalgap` (or `minimalgap roundtrip`) uploads `out/upload.txt` and
 * downloads it back; `minimalgap reset-password <EMAIL>` sends the reset email.
 */

use clap::{Parser, Subcommand, ValueEnum};
use minimalgap::{
    commands::{run_reset_password, run_roundtrip},
    config::{LogLevel, Settings},
    credentials::{self, AwsContext},
    error::{MinimalgapError, Result, EXIT_SUCCESS},
    logging,
    protocol::{
        s3::{S3Client, StorageClient},
        ses::SesMailer,
    },
};
use std::path::PathBuf;
use tracing::debug;

#[derive(Parser)]
#[command(name = "minimalgap")]
#[command(version, about = "Upload a file to S3, download it back, send a reset email", long_about = None)]
struct Cli {
    /// TOML configuration file
    #[arg(long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Target bucket (overrides BUCKET)
    #[arg(long, global = true)]
    bucket: Option<String>,

    /// AWS region (overrides AWS_DEFAULT_REGION)
    #[arg(long, global = true)]
    region: Option<String>,

    /// Directory for upload.txt and download.txt
    #[arg(long, value_name = "DIR", global = true)]
    out_dir: Option<PathBuf>,

    /// Log level
    #[arg(long, value_enum, global = true)]
    log_level: Option<LogLevelArg>,

    /// Verbose output (debug logging)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Write JSON logs to this file instead of stderr
    #[arg(long, value_name = "FILE", global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Write out/upload.txt, upload it and download it to out/download.txt
    Roundtrip,

    /// Send the password reset email
    ResetPassword {
        /// Recipient address
        email: String,
    },
}

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevelArg> for LogLevel {
    fn from(arg: LogLevelArg) -> Self {
        match arg {
            LogLevelArg::Error => LogLevel::Error,
            LogLevelArg::Warn => LogLevel::Warn,
            LogLevelArg::Info => LogLevel::Info,
            LogLevelArg::Debug => LogLevel::Debug,
            LogLevelArg::Trace => LogLevel::Trace,
        }
    }
}

impl Cli {
    /// CLI flags are the last configuration layer
    fn apply_to(&self, settings: &mut Settings) {
        if let Some(ref bucket) = self.bucket {
            settings.bucket = bucket.clone();
        }
        if let Some(ref region) = self.region {
            settings.region = Some(region.clone());
        }
        if let Some(ref out_dir) = self.out_dir {
            settings.out_dir = out_dir.clone();
        }
        if let Some(level) = self.log_level {
            settings.log_level = level.into();
        }
        if self.log_file.is_some() {
            settings.log_file = self.log_file.clone();
        }
        settings.verbose |= self.verbose;
    }
}

fn main() {
    let code = match run() {
        Ok(()) => EXIT_SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            e.exit_code()
        }
    };
    std::process::exit(code);
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    let mut settings = Settings::load(cli.config.as_deref())?;
    cli.apply_to(&mut settings);
    settings.validate()?;

    if let Err(e) = logging::init_logging(&settings) {
        eprintln!("Warning: Failed to initialize logging: {}", e);
    }

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(MinimalgapError::Io)?;

    runtime.block_on(async {
        let resolved = credentials::resolve(&settings).await?;
        let context = AwsContext::load(resolved).await;
        debug!(source = ?context.source(), region = ?context.region(), "AWS context ready");

        match cli.command.unwrap_or(Commands::Roundtrip) {
            Commands::Roundtrip => {
                let storage = StorageClient::new(
                    S3Client::new(context.sdk_config(), &settings.transfer),
                    settings.transfer.clone(),
                )?;
                let report = run_roundtrip(&settings, &storage).await?;
                println!("{}", report.location);
            }
            Commands::ResetPassword { email } => {
                let mailer = SesMailer::new(context.sdk_config());
                let message_id = run_reset_password(&settings, &mailer, &email).await?;
                println!("{}", message_id);
            }
        }
        Ok::<(), MinimalgapError>(())
    })
}
