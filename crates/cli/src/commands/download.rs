//! download command - Fetch a file into a local path
//!
//! Refuses to replace an existing file unless `--force` is given and
//! creates missing parent directories.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use bunny_core::{Error, StorageApi};
use clap::Args;
use serde::Serialize;
use tokio::io::AsyncWriteExt;

use crate::exit_code::ExitCode;
use crate::output::Formatter;

#[derive(Args, Debug)]
pub struct DownloadArgs {
    /// Remote file to download
    #[arg(short, long)]
    pub file: String,

    /// Local path to write to
    #[arg(short, long)]
    pub output: PathBuf,

    /// Overwrite the output file if it exists
    #[arg(short = 'F', long)]
    pub force: bool,

    /// Remote directory containing the file
    #[arg(short, long, default_value = "/")]
    pub path: String,
}

#[derive(Debug, Serialize)]
struct DownloadOutput {
    path: String,
    file: String,
    output: String,
    size_bytes: usize,
    size_human: String,
}

/// Execute the download command
pub async fn execute(
    args: DownloadArgs,
    store: &dyn StorageApi,
    formatter: &Formatter,
) -> ExitCode {
    if !args.force && args.output.exists() {
        formatter.error(&format!(
            "File already exists: '{}' (use --force to overwrite)",
            args.output.display()
        ));
        return ExitCode::GeneralError;
    }

    formatter.info(&format!(
        "Downloading '{}' from '{}' to '{}'...",
        args.file,
        args.path,
        args.output.display()
    ));

    let (body, response) = match store.download(&args.path, &args.file).await {
        Ok(result) => result,
        Err(e) => {
            formatter.error(&format!("Failed to download '{}': {e}", args.file));
            return ExitCode::from_error(&e);
        }
    };

    if response.is_not_found() {
        formatter.error(&format!(
            "File not found: '{}' in '{}'",
            args.file, args.path
        ));
        return ExitCode::NotFound;
    }

    if !response.is_success() {
        formatter.error(&format!(
            "Failed to download '{}': unexpected status {}",
            args.file, response.status
        ));
        return ExitCode::from_status(response.status.as_u16());
    }

    if let Err(e) = write_output(&args.output, &body, args.force).await {
        let message = if e.kind() == ErrorKind::AlreadyExists {
            format!(
                "File already exists: '{}' (use --force to overwrite)",
                args.output.display()
            )
        } else {
            format!("Failed to write '{}': {e}", args.output.display())
        };
        formatter.error(&message);
        return ExitCode::from_error(&Error::Io(e));
    }

    let size_human = humansize::format_size(body.len(), humansize::BINARY);
    if formatter.is_json() {
        formatter.json(&DownloadOutput {
            path: args.path,
            file: args.file,
            output: args.output.display().to_string(),
            size_bytes: body.len(),
            size_human,
        });
    } else {
        formatter.success(&format!(
            "Downloaded {} to '{}' ({size_human})",
            formatter.style_name(&args.file),
            args.output.display()
        ));
    }

    ExitCode::Success
}

/// Write `data` to `output`, owner-only permissions on unix.
///
/// Without `overwrite` the file must not exist yet, even if it appeared
/// while the download was running.
async fn write_output(output: &Path, data: &[u8], overwrite: bool) -> std::io::Result<()> {
    if let Some(parent) = output.parent()
        && !parent.as_os_str().is_empty()
    {
        tokio::fs::create_dir_all(parent).await?;
    }

    let mut options = tokio::fs::OpenOptions::new();
    options.write(true);
    if overwrite {
        options.create(true).truncate(true);
    } else {
        options.create_new(true);
    }
    #[cfg(unix)]
    options.mode(0o600);

    let mut file = options.open(output).await?;
    file.write_all(data).await?;
    file.flush().await
}
