//! CLI argument parsing for the signing workflow.
//!
//! Every workflow input doubles as a GitHub Actions input: clap falls back to
//! the runner's `INPUT_<NAME>` environment variable when a flag is absent, so
//! the same binary works as an action step and from a terminal.
use crate::options::parse_input_bool;
use clap::{ArgAction, Args, Parser, Subcommand};

/// rcodesign release used when no version is configured.
pub const DEFAULT_RCODESIGN_VERSION: &str = "0.22.0";

/// Root CLI entrypoint.
#[derive(Parser, Debug)]
#[command(
    name = "rcodesign-action",
    version,
    about = "Sign, notarize, and staple Apple artifacts with rcodesign",
    after_help = "Commands:\n  run --input-path <path> [--sign true] [--notarize true] [--staple true]\n  plan --input-path <path> [--os <os> --arch <arch>] [--json]\n\nExamples:\n  rcodesign-action run --input-path app.zip --sign true --p12-file cert.p12\n  rcodesign-action run --input-path app.dmg --notarize true --staple true \\\n      --app-store-connect-api-key-json-file key.json\n  rcodesign-action plan --input-path app.zip --sign true --os windows --arch x64 --json",
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct RootArgs {
    /// Emit debug-level logs (RUST_LOG takes precedence)
    #[arg(long, global = true)]
    pub verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    Run(RunArgs),
    Plan(PlanArgs),
}

/// Run command inputs: acquire rcodesign and execute every enabled stage.
#[derive(Parser, Debug)]
#[command(about = "Acquire rcodesign and run the enabled stages")]
pub struct RunArgs {
    #[command(flatten)]
    pub inputs: InputArgs,

    /// Use this rcodesign executable instead of downloading a release
    #[arg(long, env = "INPUT_RCODESIGN_PATH", value_name = "PATH")]
    pub rcodesign_path: Option<String>,
}

/// Plan command inputs: describe the run without downloading or executing.
#[derive(Parser, Debug)]
#[command(about = "Print the release archive and stage invocations without running them")]
pub struct PlanArgs {
    #[command(flatten)]
    pub inputs: InputArgs,

    /// Operating system to plan for (defaults to the host)
    #[arg(long, value_name = "OS")]
    pub os: Option<String>,

    /// Architecture to plan for (defaults to the host)
    #[arg(long, value_name = "ARCH")]
    pub arch: Option<String>,

    /// Emit machine-readable JSON output
    #[arg(long)]
    pub json: bool,
}

/// Workflow inputs, one flag per action input.
#[derive(Args, Debug, Clone, Default)]
pub struct InputArgs {
    /// Artifact to sign, notarize, or staple
    #[arg(long, env = "INPUT_INPUT_PATH", value_name = "PATH")]
    pub input_path: String,

    /// Destination for the signed artifact (signs in place when absent)
    #[arg(long, env = "INPUT_OUTPUT_PATH", value_name = "PATH")]
    pub output_path: Option<String>,

    /// Run the sign stage
    #[arg(long, env = "INPUT_SIGN", value_name = "BOOL", action = ArgAction::Set,
          num_args = 0..=1, default_value = "false", default_missing_value = "true",
          value_parser = parse_input_bool)]
    pub sign: bool,

    /// Submit the artifact for notarization
    #[arg(long, env = "INPUT_NOTARIZE", value_name = "BOOL", action = ArgAction::Set,
          num_args = 0..=1, default_value = "false", default_missing_value = "true",
          value_parser = parse_input_bool)]
    pub notarize: bool,

    /// Staple the notarization ticket to the artifact
    #[arg(long, env = "INPUT_STAPLE", value_name = "BOOL", action = ArgAction::Set,
          num_args = 0..=1, default_value = "false", default_missing_value = "true",
          value_parser = parse_input_bool)]
    pub staple: bool,

    /// rcodesign configuration file, passed to every stage (repeatable)
    #[arg(long, env = "INPUT_CONFIG_FILE", value_name = "PATH", value_delimiter = '\n')]
    pub config_file: Vec<String>,

    /// Configuration profile to activate
    #[arg(long, env = "INPUT_PROFILE")]
    pub profile: Option<String>,

    /// PEM file holding signing key and/or certificate (repeatable)
    #[arg(long, env = "INPUT_PEM_FILE", value_name = "PATH", value_delimiter = '\n')]
    pub pem_file: Vec<String>,

    /// PKCS#12 file holding the signing key and certificate
    #[arg(long, env = "INPUT_P12_FILE", value_name = "PATH")]
    pub p12_file: Option<String>,

    /// Password for the PKCS#12 file
    #[arg(long, env = "INPUT_P12_PASSWORD", hide_env_values = true)]
    pub p12_password: Option<String>,

    /// DER encoded certificate file (repeatable)
    #[arg(long, env = "INPUT_CERTIFICATE_DER_FILE", value_name = "PATH", value_delimiter = '\n')]
    pub certificate_der_file: Vec<String>,

    /// Remote signing public key; multiple lines are joined without a separator
    #[arg(long, env = "INPUT_REMOTE_SIGN_PUBLIC_KEY", value_delimiter = '\n',
          allow_hyphen_values = true)]
    pub remote_sign_public_key: Vec<String>,

    /// PEM file holding the remote signing public key
    #[arg(long, env = "INPUT_REMOTE_SIGN_PUBLIC_KEY_PEM_FILE", value_name = "PATH")]
    pub remote_sign_public_key_pem_file: Option<String>,

    /// Shared secret for remote signing
    #[arg(long, env = "INPUT_REMOTE_SIGN_SHARED_SECRET", hide_env_values = true)]
    pub remote_sign_shared_secret: Option<String>,

    /// App Store Connect API key JSON file (required for notarization)
    #[arg(long, env = "INPUT_APP_STORE_CONNECT_API_KEY_JSON_FILE", value_name = "PATH")]
    pub app_store_connect_api_key_json_file: Option<String>,

    /// App Store Connect API issuer ID
    #[arg(long, env = "INPUT_APP_STORE_CONNECT_API_ISSUER")]
    pub app_store_connect_api_issuer: Option<String>,

    /// App Store Connect API key ID
    #[arg(long, env = "INPUT_APP_STORE_CONNECT_API_KEY", hide_env_values = true)]
    pub app_store_connect_api_key: Option<String>,

    /// Extra arguments passed verbatim to `rcodesign sign` (repeatable)
    #[arg(long, env = "INPUT_SIGN_ARGS", value_name = "ARG", value_delimiter = '\n',
          allow_hyphen_values = true)]
    pub sign_args: Vec<String>,

    /// rcodesign release to download
    #[arg(long, env = "INPUT_RCODESIGN_VERSION", value_name = "VERSION",
          default_value = DEFAULT_RCODESIGN_VERSION)]
    pub rcodesign_version: String,
}
