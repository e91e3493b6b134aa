use std::path::PathBuf;
use std::process;

use clap::{Args, Parser, Subcommand};
use symres_core::image::signature_from_image;
use symres_core::search::resolve_in_symbol_path;
use symres_core::{resolve_symbol_address, Address, BuildSignature, SymbolError, SymbolResult};
use symres_utils::{
    debug, init_logging, init_logging_with_format, init_logging_with_level, LogFormat, LogLevel, LoggingError,
    LoggingGuard,
};

/// Exit code when the symbol could not be resolved.
const EXIT_NO_RESULT: i32 = 1;
/// Exit code for invalid arguments (matches clap's usage errors).
const EXIT_INVALID_ARGUMENTS: i32 = 2;

/// Resolve function addresses in loaded modules from build-matched debug information.
#[derive(Parser, Debug)]
#[command(name = "symres")]
#[command(version)]
#[command(about = "Resolve function addresses from PDB debug information", long_about = None)]
struct Cli
{
    /// Log level (overrides RUST_LOG)
    #[arg(long, global = true, env = "SYMRES_LOG_LEVEL")]
    log_level: Option<LogLevel>,

    /// Log output format (pretty or json)
    #[arg(long, global = true, env = "SYMRES_LOG_FORMAT")]
    log_format: Option<LogFormat>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands
{
    /// Resolve a function using one debug-information file
    Resolve
    {
        /// Exact, case-sensitive function name
        name: String,
        /// Path to the .pdb or .xdb file
        #[arg(long)]
        pdb: PathBuf,
        /// Load address of the module (hex with 0x prefix, or decimal)
        #[arg(long)]
        base: Address,
        #[command(flatten)]
        signature: SignatureArgs,
    },
    /// Resolve a function by trying every debug-information file under a directory
    Search
    {
        /// Exact, case-sensitive function name
        name: String,
        /// Directory holding .pdb / .xdb files
        #[arg(long, env = "SYMRES_SYMBOL_PATH")]
        symbols_dir: PathBuf,
        /// Load address of the module (hex with 0x prefix, or decimal)
        #[arg(long)]
        base: Address,
        #[command(flatten)]
        signature: SignatureArgs,
    },
    /// Print the build signature recorded in a PE image
    Signature
    {
        /// Path to the executable or DLL
        image: PathBuf,
    },
}

/// Where the expected build signature comes from
#[derive(Args, Debug)]
struct SignatureArgs
{
    /// Signature GUID (hyphenated, braced, or plain hex)
    #[arg(long, requires = "age", conflicts_with_all = ["debug_id", "image"])]
    guid: Option<String>,
    /// Signature age
    #[arg(long, requires = "guid")]
    age: Option<u32>,
    /// Combined debug identifier (GUID hex digits followed by the age in hex)
    #[arg(long, conflicts_with = "image")]
    debug_id: Option<String>,
    /// Read the signature from this PE image
    #[arg(long)]
    image: Option<PathBuf>,
}

impl SignatureArgs
{
    fn signature(&self) -> SymbolResult<BuildSignature>
    {
        match (&self.guid, self.age, &self.debug_id, &self.image) {
            (Some(guid), Some(age), None, None) => BuildSignature::parse(guid, age),
            (None, None, Some(debug_id), None) => BuildSignature::from_debug_id(debug_id),
            (None, None, None, Some(image)) => Ok(signature_from_image(image)?.signature),
            _ => Err(SymbolError::InvalidArgument(
                "specify the signature with --guid and --age, --debug-id, or --image".to_string(),
            )),
        }
    }
}

fn main()
{
    let cli = Cli::parse();

    let guard = match start_logging(cli.logging_setup()) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {e}");
            process::exit(1);
        }
    };

    let code = match run_command(cli) {
        Ok(Outcome::Resolved(address)) => {
            println!("{address}");
            0
        }
        Ok(Outcome::Unresolved) => {
            println!("no result");
            EXIT_NO_RESULT
        }
        Ok(Outcome::Printed) => 0,
        Err(e) => {
            eprintln!("Error: {e}");
            EXIT_INVALID_ARGUMENTS
        }
    };

    // Flush file logging before exiting.
    drop(guard);
    process::exit(code);
}

/// How logging is configured for one invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LoggingSetup
{
    /// Neither flag given: `RUST_LOG` and `SYMRES_LOG_FORMAT` decide
    Environment,
    /// Format given, level filter from `RUST_LOG`
    Format(LogFormat),
    /// Level given; format defaults to pretty
    Level(LogLevel, LogFormat),
}

impl Cli
{
    fn logging_setup(&self) -> LoggingSetup
    {
        match (self.log_level, self.log_format) {
            (Some(level), format) => LoggingSetup::Level(level, format.unwrap_or(LogFormat::Pretty)),
            (None, Some(format)) => LoggingSetup::Format(format),
            (None, None) => LoggingSetup::Environment,
        }
    }
}

fn start_logging(setup: LoggingSetup) -> Result<LoggingGuard, LoggingError>
{
    match setup {
        LoggingSetup::Environment => init_logging(),
        LoggingSetup::Format(format) => init_logging_with_format(format),
        LoggingSetup::Level(level, format) => init_logging_with_level(level, format),
    }
}

/// What a subcommand produced
enum Outcome
{
    Resolved(Address),
    Unresolved,
    /// Output was already written
    Printed,
}

impl From<Option<Address>> for Outcome
{
    fn from(address: Option<Address>) -> Self
    {
        address.map_or(Outcome::Unresolved, Outcome::Resolved)
    }
}

fn run_command(cli: Cli) -> SymbolResult<Outcome>
{
    match cli.command {
        Commands::Resolve {
            name,
            pdb,
            base,
            signature,
        } => {
            let signature = signature.signature()?;
            Ok(resolve_symbol_address(&name, &pdb, base, &signature).into())
        }
        Commands::Search {
            name,
            symbols_dir,
            base,
            signature,
        } => {
            let signature = signature.signature()?;
            debug!(symbol = %name, dir = %symbols_dir.display(), %base, %signature, "Searching symbol path");
            Ok(resolve_in_symbol_path(&name, &symbols_dir, base, &signature).into())
        }
        Commands::Signature { image } => {
            let info = signature_from_image(&image)?;
            println!("guid: {}", info.signature.id());
            println!("age: {}", info.signature.age());
            println!("debug id: {}", info.signature.debug_id());
            println!("pdb: {}", info.pdb_path);
            Ok(Outcome::Printed)
        }
    }
}

#[cfg(test)]
mod tests
{
    use super::*;

    fn parse(args: &[&str]) -> Cli
    {
        Cli::try_parse_from(args.iter().copied()).unwrap()
    }

    #[test]
    fn test_log_format_flag_alone_selects_format()
    {
        let cli = parse(&["symres", "--log-format", "json", "signature", "game.exe"]);
        assert_eq!(cli.logging_setup(), LoggingSetup::Format(LogFormat::Json));
    }

    #[test]
    fn test_log_format_flag_after_subcommand()
    {
        let cli = parse(&["symres", "signature", "game.exe", "--log-format", "pretty"]);
        assert_eq!(cli.logging_setup(), LoggingSetup::Format(LogFormat::Pretty));
    }

    #[test]
    fn test_log_level_with_and_without_format()
    {
        let cli = parse(&["symres", "--log-level", "warn", "--log-format", "json", "signature", "game.exe"]);
        assert_eq!(cli.logging_setup(), LoggingSetup::Level(LogLevel::Warn, LogFormat::Json));

        let cli = parse(&["symres", "--log-level", "debug", "signature", "game.exe"]);
        assert_eq!(cli.logging_setup(), LoggingSetup::Level(LogLevel::Debug, LogFormat::Pretty));
    }

    #[test]
    fn test_no_logging_flags_defers_to_environment()
    {
        let cli = parse(&["symres", "signature", "game.exe"]);
        assert_eq!(cli.logging_setup(), LoggingSetup::Environment);
    }

    #[test]
    fn test_signature_sources_are_exclusive()
    {
        let result = Cli::try_parse_from([
            "symres",
            "resolve",
            "DoWork",
            "--pdb",
            "game.pdb",
            "--base",
            "0x40000000",
            "--guid",
            "11111111-2222-3333-4444-555555555555",
            "--age",
            "3",
            "--debug-id",
            "111111112222333344445555555555553",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_resolve_arguments_build_signature()
    {
        let cli = parse(&[
            "symres",
            "resolve",
            "DoWork",
            "--pdb",
            "game.pdb",
            "--base",
            "0x40000000",
            "--debug-id",
            "111111112222333344445555555555553",
        ]);
        let Commands::Resolve { base, signature, .. } = cli.command else {
            panic!("Expected the resolve subcommand");
        };
        assert_eq!(base, Address::new(0x4000_0000));
        assert_eq!(
            signature.signature().unwrap(),
            BuildSignature::parse("11111111-2222-3333-4444-555555555555", 3).unwrap()
        );
    }
}
