//! Argument assembly for each rcodesign stage.
//!
//! rcodesign is sensitive to positional order, so every builder emits flags in
//! a fixed sequence and appends positional paths last. These functions are
//! pure: no I/O, and they never fail.
use crate::options::WorkflowOptions;
use serde::Serialize;

/// Flags whose values must never appear in logs or plans.
pub const SECRET_FLAGS: &[&str] = &["--p12-password", "--remote-shared-secret", "--api-key"];

const REDACTED: &str = "***";

/// One rcodesign subcommand in the workflow.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Stage {
    Sign,
    NotarySubmit,
    Staple,
}

impl Stage {
    /// Stages in execution order.
    pub const ALL: [Stage; 3] = [Stage::Sign, Stage::NotarySubmit, Stage::Staple];

    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Sign => "sign",
            Stage::NotarySubmit => "notary-submit",
            Stage::Staple => "staple",
        }
    }
}

/// A fully built rcodesign command line for one stage.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StageInvocation {
    stage: Stage,
    arguments: Vec<String>,
}

impl StageInvocation {
    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// Complete argv handed to rcodesign, subcommand first.
    pub fn argv(&self) -> Vec<String> {
        let mut argv = Vec::with_capacity(self.arguments.len() + 1);
        argv.push(self.stage.as_str().to_string());
        argv.extend(self.arguments.iter().cloned());
        argv
    }

    /// argv with secret flag values masked, for logging and plans.
    ///
    /// Covers both `--flag value` and `--flag=value` spellings.
    pub fn redacted_argv(&self) -> Vec<String> {
        let mut argv = self.argv();
        let mut mask_next = false;
        for arg in argv.iter_mut() {
            if std::mem::take(&mut mask_next) {
                *arg = REDACTED.to_string();
            } else if SECRET_FLAGS.contains(&arg.as_str()) {
                mask_next = true;
            } else if let Some(flag) = inline_secret_flag(arg) {
                *arg = format!("{flag}={REDACTED}");
            }
        }
        argv
    }
}

/// The secret flag of an `--flag=value` argument, if it is one.
fn inline_secret_flag(arg: &str) -> Option<&'static str> {
    let (flag, _) = arg.split_once('=')?;
    SECRET_FLAGS.iter().copied().find(|secret| *secret == flag)
}

/// Ordered accumulator of flag contributions.
#[derive(Default)]
struct ArgList {
    args: Vec<String>,
}

impl ArgList {
    /// One `flag value` pair per element, in input order.
    fn repeated(mut self, flag: &str, values: &[String]) -> Self {
        for value in values {
            self.args.push(flag.to_string());
            self.args.push(value.clone());
        }
        self
    }

    /// At most one `flag value` pair; unset and empty values contribute nothing.
    fn scalar(mut self, flag: &str, value: Option<&str>) -> Self {
        if let Some(value) = value.filter(|value| !value.is_empty()) {
            self.args.push(flag.to_string());
            self.args.push(value.to_string());
        }
        self
    }

    fn switch(mut self, flag: &str, enabled: bool) -> Self {
        if enabled {
            self.args.push(flag.to_string());
        }
        self
    }

    fn verbatim(mut self, values: &[String]) -> Self {
        self.args.extend(values.iter().cloned());
        self
    }

    fn positional(mut self, value: &str) -> Self {
        self.args.push(value.to_string());
        self
    }

    fn finish(self, stage: Stage) -> StageInvocation {
        StageInvocation {
            stage,
            arguments: self.args,
        }
    }
}

/// `rcodesign sign [flags] [sign_args] <input> [output]`.
pub fn build_sign_args(options: &WorkflowOptions) -> StageInvocation {
    // rcodesign expects the remote key as one value; input lines are joined as is.
    let remote_public_key = (!options.remote_sign_public_key.is_empty())
        .then(|| options.remote_sign_public_key.concat());

    let mut args = ArgList::default()
        .repeated("--config-file", &options.config_files)
        .scalar("--profile", options.profile.as_deref())
        .repeated("--pem-file", &options.pem_files)
        .scalar("--p12-file", options.p12_file.as_deref())
        .scalar("--p12-password", options.p12_password.as_deref())
        .repeated("--certificate-der-file", &options.certificate_der_files)
        .scalar("--remote-public-key", remote_public_key.as_deref())
        .scalar(
            "--remote-public-key-pem-file",
            options.remote_sign_public_key_pem_file.as_deref(),
        )
        .scalar(
            "--remote-shared-secret",
            options.remote_sign_shared_secret.as_deref(),
        )
        .verbatim(&options.sign_args)
        .positional(&options.input_path);
    if let Some(output_path) = options.output_path.as_deref() {
        args = args.positional(output_path);
    }
    args.finish(Stage::Sign)
}

/// `rcodesign notary-submit [flags] (--staple | --wait) <artifact>`.
pub fn build_notarize_args(options: &WorkflowOptions, artifact_path: &str) -> StageInvocation {
    ArgList::default()
        .repeated("--config-file", &options.config_files)
        .scalar("--api-key-file", options.api_key_file.as_deref())
        .scalar("--api-issuer", options.api_issuer.as_deref())
        .scalar("--api-key", options.api_key.as_deref())
        .switch("--staple", options.staple)
        .switch("--wait", !options.staple)
        .positional(artifact_path)
        .finish(Stage::NotarySubmit)
}

/// `rcodesign staple [flags] <artifact>`.
pub fn build_staple_args(options: &WorkflowOptions, artifact_path: &str) -> StageInvocation {
    ArgList::default()
        .repeated("--config-file", &options.config_files)
        .positional(artifact_path)
        .finish(Stage::Staple)
}

#[cfg(test)]
#[path = "args_tests.rs"]
mod tests;
