//! Normalized workflow options.
//!
//! Raw inputs follow action-runner conventions: scalars are trimmed and an
//! empty value means unset, list entries are trimmed and blank lines dropped.
use crate::cli::InputArgs;
use crate::error::WorkflowError;

/// Every input the workflow understands, after normalization.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkflowOptions {
    pub input_path: String,
    pub output_path: Option<String>,
    pub sign: bool,
    pub notarize: bool,
    pub staple: bool,
    pub config_files: Vec<String>,
    pub profile: Option<String>,
    pub pem_files: Vec<String>,
    pub p12_file: Option<String>,
    pub p12_password: Option<String>,
    pub certificate_der_files: Vec<String>,
    pub remote_sign_public_key: Vec<String>,
    pub remote_sign_public_key_pem_file: Option<String>,
    pub remote_sign_shared_secret: Option<String>,
    pub api_key_file: Option<String>,
    pub api_issuer: Option<String>,
    pub api_key: Option<String>,
    pub sign_args: Vec<String>,
    pub rcodesign_version: String,
}

impl WorkflowOptions {
    pub fn from_inputs(inputs: &InputArgs) -> Result<Self, WorkflowError> {
        let input_path = inputs.input_path.trim();
        if input_path.is_empty() {
            return Err(WorkflowError::Configuration(
                "Input required and not supplied: input_path".to_string(),
            ));
        }
        let rcodesign_version = inputs.rcodesign_version.trim();
        if rcodesign_version.is_empty() {
            return Err(WorkflowError::Configuration(
                "rcodesign_version must be non-empty".to_string(),
            ));
        }

        Ok(Self {
            input_path: input_path.to_string(),
            output_path: scalar(&inputs.output_path),
            sign: inputs.sign,
            notarize: inputs.notarize,
            staple: inputs.staple,
            config_files: lines(&inputs.config_file),
            profile: scalar(&inputs.profile),
            pem_files: lines(&inputs.pem_file),
            p12_file: scalar(&inputs.p12_file),
            p12_password: scalar(&inputs.p12_password),
            certificate_der_files: lines(&inputs.certificate_der_file),
            remote_sign_public_key: lines(&inputs.remote_sign_public_key),
            remote_sign_public_key_pem_file: scalar(&inputs.remote_sign_public_key_pem_file),
            remote_sign_shared_secret: scalar(&inputs.remote_sign_shared_secret),
            api_key_file: scalar(&inputs.app_store_connect_api_key_json_file),
            api_issuer: scalar(&inputs.app_store_connect_api_issuer),
            api_key: scalar(&inputs.app_store_connect_api_key),
            sign_args: lines(&inputs.sign_args),
            rcodesign_version: rcodesign_version.to_string(),
        })
    }

    /// Checks that must pass before any download or process launch.
    pub fn preflight(&self) -> Result<(), WorkflowError> {
        if self.notarize && self.api_key_file.is_none() {
            return Err(WorkflowError::Configuration(
                "App Store Connect API Key not defined; cannot notarize".to_string(),
            ));
        }
        Ok(())
    }
}

/// Parse a boolean input using the YAML 1.2 core schema accepted by action runners.
///
/// An empty value reads as false so that unset inputs behave like defaults.
pub fn parse_input_bool(value: &str) -> Result<bool, String> {
    match value.trim() {
        "true" | "True" | "TRUE" => Ok(true),
        "false" | "False" | "FALSE" | "" => Ok(false),
        other => Err(format!(
            "{other:?} does not meet YAML 1.2 \"Core Schema\" specification; \
             support boolean input list: `true | True | TRUE | false | False | FALSE`"
        )),
    }
}

fn scalar(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

fn lines(values: &[String]) -> Vec<String> {
    values
        .iter()
        .flat_map(|value| value.lines())
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::DEFAULT_RCODESIGN_VERSION;

    fn inputs(input_path: &str) -> InputArgs {
        InputArgs {
            input_path: input_path.to_string(),
            rcodesign_version: DEFAULT_RCODESIGN_VERSION.to_string(),
            ..InputArgs::default()
        }
    }

    #[test]
    fn boolean_inputs_follow_core_schema() {
        for value in ["true", "True", "TRUE", " true "] {
            assert_eq!(parse_input_bool(value), Ok(true), "{value:?}");
        }
        for value in ["false", "False", "FALSE", ""] {
            assert_eq!(parse_input_bool(value), Ok(false), "{value:?}");
        }
        for value in ["yes", "1", "tRuE", "on"] {
            assert!(parse_input_bool(value).is_err(), "{value:?}");
        }
    }

    #[test]
    fn blank_scalars_are_unset() {
        let mut raw = inputs("app.zip");
        raw.output_path = Some("   ".to_string());
        raw.profile = Some(" release ".to_string());
        raw.p12_password = Some(String::new());

        let options = WorkflowOptions::from_inputs(&raw).expect("options");
        assert_eq!(options.output_path, None);
        assert_eq!(options.profile.as_deref(), Some("release"));
        assert_eq!(options.p12_password, None);
    }

    #[test]
    fn list_inputs_split_lines_and_drop_blanks() {
        let mut raw = inputs("app.zip");
        raw.config_file = vec!["a.toml\n\n  b.toml ".to_string(), "c.toml".to_string()];
        raw.sign_args = vec!["--code-signature-flags\nruntime\n".to_string()];

        let options = WorkflowOptions::from_inputs(&raw).expect("options");
        assert_eq!(options.config_files, ["a.toml", "b.toml", "c.toml"]);
        assert_eq!(options.sign_args, ["--code-signature-flags", "runtime"]);
    }

    #[test]
    fn input_path_and_version_are_required() {
        let err = WorkflowOptions::from_inputs(&inputs("  ")).expect_err("missing input");
        assert!(matches!(err, WorkflowError::Configuration(_)));

        let mut raw = inputs("app.zip");
        raw.rcodesign_version = " ".to_string();
        let err = WorkflowOptions::from_inputs(&raw).expect_err("missing version");
        assert_eq!(err.to_string(), "rcodesign_version must be non-empty");
    }

    #[test]
    fn notarize_requires_api_key_file() {
        let mut raw = inputs("app.zip");
        raw.notarize = true;
        let options = WorkflowOptions::from_inputs(&raw).expect("options");
        let err = options.preflight().expect_err("no api key");
        assert_eq!(
            err.to_string(),
            "App Store Connect API Key not defined; cannot notarize"
        );

        raw.app_store_connect_api_key_json_file = Some("key.json".to_string());
        let options = WorkflowOptions::from_inputs(&raw).expect("options");
        options.preflight().expect("api key configured");
    }
}
