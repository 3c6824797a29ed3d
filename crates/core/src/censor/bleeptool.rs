//! bleeptool command-line engine.

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex_lite::Regex;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tokio::time::{timeout, Duration};
use tracing::{debug, info, warn};

use super::config::BleeptoolConfig;
use super::error::CensorError;
use super::traits::{CensorEngine, CensorOutcome};
use crate::settings::SettingsSnapshot;

/// Media containers the tool accepts.
const SUPPORTED_EXTENSIONS: &[&str] = &[
    "mp4", "mkv", "avi", "mov", "wmv", "m4v", "ts", "mpg", "mpeg", "webm",
];

static SWEAR_COUNT: Lazy<Option<Regex>> = Lazy::new(|| {
    Regex::new(r"(?i)(?:swears?[ _]found\W*(\d+))|(?:found\s+(\d+)\s+swears?)").ok()
});

/// Runs the external bleeptool program on one file at a time.
pub struct BleeptoolEngine {
    config: BleeptoolConfig,
}

impl BleeptoolEngine {
    pub fn new(config: BleeptoolConfig) -> Self {
        Self { config }
    }

    pub fn with_defaults() -> Self {
        Self::new(BleeptoolConfig::default())
    }

    fn spawn_error(&self, e: std::io::Error) -> CensorError {
        if e.kind() == std::io::ErrorKind::NotFound {
            CensorError::ToolNotFound {
                path: self.config.command.clone(),
            }
        } else {
            CensorError::Io(e)
        }
    }
}

/// Whether the file extension is one the tool can process.
pub fn is_supported_input(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| SUPPORTED_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

/// Where the censored copy of `input` is written.
///
/// `output_directory` when set, otherwise next to the input, with
/// `output_prefix` prepended to the file name.
pub fn plan_output_path(input: &Path, settings: &SettingsSnapshot) -> PathBuf {
    let dir = if settings.output_directory.trim().is_empty() {
        input.parent().map(Path::to_path_buf).unwrap_or_default()
    } else {
        PathBuf::from(settings.output_directory.trim())
    };
    let file_name = input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    dir.join(format!("{}{}", settings.output_prefix, file_name))
}

/// Builds the tool arguments for one run.
pub fn build_args(
    config: &BleeptoolConfig,
    input: &Path,
    output: &Path,
    settings: &SettingsSnapshot,
) -> Vec<String> {
    let mut args: Vec<String> = config.extra_args.clone();

    args.extend([
        "--input".to_string(),
        input.to_string_lossy().to_string(),
        "--output".to_string(),
        output.to_string_lossy().to_string(),
        "--bleeptool".to_string(),
        settings.bleeptool_profile.as_str().to_string(),
        "--boost".to_string(),
        settings.boost_db.to_string(),
        "--pre-buffer".to_string(),
        settings.pre_buffer_ms.to_string(),
        "--post-buffer".to_string(),
        settings.post_buffer_ms.to_string(),
        "--beep-mode".to_string(),
        settings.beep_mode.as_str().to_string(),
    ]);

    if !settings.swears_file.trim().is_empty() {
        args.extend(["--swears".to_string(), settings.swears_file.clone()]);
    }
    if !settings.temp_dir.trim().is_empty() {
        args.extend(["--temp-dir".to_string(), settings.temp_dir.clone()]);
    }
    if settings.use_beep {
        args.push("--beep".to_string());
    }
    if settings.retain_clips {
        args.push("--retain-clips".to_string());
    }

    args
}

/// Pulls the number of censored words out of the tool's output.
fn parse_swear_count(output: &str) -> Option<u32> {
    let re = SWEAR_COUNT.as_ref()?;
    output.lines().rev().find_map(|line| {
        let caps = re.captures(line)?;
        caps.get(1)
            .or_else(|| caps.get(2))
            .and_then(|m| m.as_str().parse().ok())
    })
}

/// True when `output` names the same file as `input`, including through
/// symlinks or a differently spelled output directory.
async fn overwrites_input(input: &Path, output: &Path) -> bool {
    if input == output {
        return true;
    }
    let Ok(input) = tokio::fs::canonicalize(input).await else {
        return false;
    };
    let (Some(dir), Some(name)) = (output.parent(), output.file_name()) else {
        return false;
    };
    match tokio::fs::canonicalize(dir).await {
        Ok(dir) => dir.join(name) == input,
        Err(_) => false,
    }
}

/// Creates `dir` when missing and checks a file can be written in it.
async fn ensure_writable(dir: &Path) -> Result<(), CensorError> {
    let unwritable = || CensorError::OutputDirectoryUnwritable {
        path: dir.to_path_buf(),
    };

    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|_| unwritable())?;

    let probe = dir.join(format!(".bleeparr-write-probe-{}", uuid::Uuid::new_v4()));
    tokio::fs::write(&probe, b"")
        .await
        .map_err(|_| unwritable())?;
    let _ = tokio::fs::remove_file(&probe).await;
    Ok(())
}

#[async_trait]
impl CensorEngine for BleeptoolEngine {
    fn name(&self) -> &str {
        "bleeptool"
    }

    async fn process(
        &self,
        input: &Path,
        settings: &SettingsSnapshot,
    ) -> Result<CensorOutcome, CensorError> {
        if !tokio::fs::try_exists(input).await.unwrap_or(false) {
            return Err(CensorError::InputNotFound {
                path: input.to_path_buf(),
            });
        }
        if !is_supported_input(input) {
            return Err(CensorError::UnsupportedFormat {
                extension: input
                    .extension()
                    .map(|e| e.to_string_lossy().into_owned())
                    .unwrap_or_default(),
            });
        }

        let output_path = plan_output_path(input, settings);
        if overwrites_input(input, &output_path).await {
            return Err(CensorError::OutputOverwritesInput { path: output_path });
        }
        if let Some(dir) = output_path.parent().filter(|d| !d.as_os_str().is_empty()) {
            ensure_writable(dir).await?;
        }

        let args = build_args(&self.config, input, &output_path, settings);
        info!("Censoring {} -> {}", input.display(), output_path.display());
        debug!("Running {} {:?}", self.config.command.display(), args);

        let child = Command::new(&self.config.command)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| self.spawn_error(e))?;

        // Dropping the wait future on timeout kills the child.
        let output = match timeout(
            Duration::from_secs(self.config.timeout_secs),
            child.wait_with_output(),
        )
        .await
        {
            Ok(result) => result?,
            Err(_) => {
                warn!(
                    "Censoring {} timed out after {}s",
                    input.display(),
                    self.config.timeout_secs
                );
                return Err(CensorError::Timeout {
                    timeout_secs: self.config.timeout_secs,
                });
            }
        };

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);

        if !output.status.success() {
            return Err(CensorError::tool_failed(
                output.status.code(),
                stderr.trim().to_string(),
            ));
        }

        if !tokio::fs::try_exists(&output_path).await.unwrap_or(false) {
            return Err(CensorError::tool_failed(
                output.status.code(),
                format!("output file not created: {}", output_path.display()),
            ));
        }

        let swears_found = parse_swear_count(&stdout)
            .or_else(|| parse_swear_count(&stderr))
            .unwrap_or(0);

        Ok(CensorOutcome {
            swears_found,
            output_path,
        })
    }

    async fn validate(&self) -> Result<(), CensorError> {
        let output = Command::new(&self.config.command)
            .arg("--help")
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| self.spawn_error(e))?;

        if !output.status.success() {
            return Err(CensorError::tool_failed(
                output.status.code(),
                String::from_utf8_lossy(&output.stderr).trim().to_string(),
            ));
        }
        Ok(())
    }
}
