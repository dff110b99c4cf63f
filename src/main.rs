use anyhow::Result;
use clap::Parser;
use nrush_install::application::{AppOptions, BinaryUseCase};
use nrush_install::http::HttpClient;
use nrush_install::install::HttpInstaller;
use nrush_install::platform::DefaultPlatformDetector;
use nrush_install::runtime::RealRuntime;
use std::path::PathBuf;
use std::process::ExitCode;

/// nrush-install - fetch the prebuilt nrush binary for this machine
///
/// Detects the host OS and architecture, picks the matching release archive
/// for the version in package.json, and installs it.
///
/// Examples:
///   nrush-install resolve         # Show which archive would be downloaded
///   nrush-install install         # Download and install it
///   nrush-install run -- --help   # Run the installed binary
#[derive(Parser, Debug)]
#[command(author, version = env!("NRUSH_INSTALL_VERSION"), about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to package.json (defaults to ./package.json)
    #[arg(long, short = 'm', value_name = "PATH", global = true)]
    manifest: Option<PathBuf>,

    /// Install root directory (also via NRUSH_INSTALL_ROOT)
    #[arg(
        long = "root",
        short = 'r',
        env = "NRUSH_INSTALL_ROOT",
        value_name = "PATH",
        global = true
    )]
    install_root: Option<PathBuf>,

    /// Release download host (defaults to https://github.com)
    #[arg(long, env = "NRUSH_BASE_URL", value_name = "URL", global = true)]
    base_url: Option<String>,

    /// Override the detected OS type (e.g. Windows_NT, Linux, Darwin)
    #[arg(long, env = "NRUSH_OS_TYPE", value_name = "OS", global = true)]
    os_type: Option<String>,

    /// Override the detected architecture (e.g. x64, ia32, arm64)
    #[arg(long, env = "NRUSH_ARCH", value_name = "ARCH", global = true)]
    arch: Option<String>,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Print the release that matches this machine as JSON
    Resolve,

    /// Download and install the binary
    Install,

    /// Remove the installed binary
    Uninstall,

    /// Run the installed binary
    Run(RunArgs),
}

#[derive(clap::Args, Debug)]
struct RunArgs {
    /// Arguments passed through to the binary
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    args: Vec<String>,
}

impl Cli {
    fn options(&self) -> AppOptions {
        AppOptions {
            manifest: self.manifest.clone(),
            install_root: self.install_root.clone(),
            base_url: self.base_url.clone(),
            os_type: self.os_type.clone(),
            arch: self.arch.clone(),
        }
    }
}

fn installer(
    use_case: &BinaryUseCase<'_, RealRuntime, DefaultPlatformDetector>,
) -> Result<HttpInstaller<RealRuntime>> {
    Ok(HttpInstaller::new(
        RealRuntime,
        HttpClient::build()?,
        use_case.install_root()?,
    ))
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    let runtime = RealRuntime;
    let detector = DefaultPlatformDetector;
    let options = cli.options();
    let use_case = BinaryUseCase::new(&runtime, &detector, &options);

    match cli.command {
        Commands::Resolve => {
            let descriptor = use_case.resolve()?;
            println!("{}", serde_json::to_string_pretty(&descriptor)?);
        }
        Commands::Install => {
            let installer = installer(&use_case)?;
            let (descriptor, executable) = use_case.install(&installer).await?;
            println!(
                "Installed {} {} ({}) to {}",
                descriptor.name,
                descriptor.version,
                descriptor.platform,
                executable.display()
            );
        }
        Commands::Uninstall => {
            let installer = installer(&use_case)?;
            if use_case.uninstall(&installer)? {
                println!("Uninstalled from {}", installer.root().display());
            } else {
                println!("Nothing to remove.");
            }
        }
        Commands::Run(args) => {
            let installer = installer(&use_case)?;
            let code = use_case.run(&installer, &args.args)?;
            std::process::exit(code);
        }
    }
    Ok(ExitCode::SUCCESS)
}
