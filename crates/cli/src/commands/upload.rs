//! upload command - Upload a local file
//!
//! The file keeps its base name and is sent with its SHA-256 checksum so
//! the server can verify it.

use std::path::PathBuf;

use bunny_core::{Error, StorageApi, sha256_hex};
use bytes::Bytes;
use clap::Args;
use serde::Serialize;

use crate::exit_code::ExitCode;
use crate::output::Formatter;

#[derive(Args, Debug)]
pub struct UploadArgs {
    /// Local file to upload
    #[arg(short, long)]
    pub file: PathBuf,

    /// Remote directory to upload into
    #[arg(short, long, default_value = "/")]
    pub path: String,
}

#[derive(Debug, Serialize)]
struct UploadOutput {
    path: String,
    file: String,
    size_bytes: usize,
    size_human: String,
    checksum: String,
    status: u16,
}

/// Execute the upload command
pub async fn execute(args: UploadArgs, store: &dyn StorageApi, formatter: &Formatter) -> ExitCode {
    let Some(filename) = args.file.file_name().and_then(|name| name.to_str()) else {
        formatter.error(&format!("Not a file name: '{}'", args.file.display()));
        return ExitCode::UsageError;
    };
    let filename = filename.to_string();

    let data = match tokio::fs::read(&args.file).await {
        Ok(data) => Bytes::from(data),
        Err(e) => {
            formatter.error(&format!("Failed to read '{}': {e}", args.file.display()));
            return ExitCode::from_error(&Error::Io(e));
        }
    };

    formatter.info(&format!(
        "Uploading '{}' to '{}'...",
        args.file.display(),
        args.path
    ));

    let size = data.len();
    let checksum = sha256_hex(&data);

    let response = match store.upload(&args.path, &filename, &checksum, data).await {
        Ok(response) => response,
        Err(e) => {
            formatter.error(&format!("Failed to upload '{filename}': {e}"));
            return ExitCode::from_error(&e);
        }
    };

    if !response.is_success() {
        formatter.error(&format!(
            "Failed to upload '{filename}': unexpected status {}",
            response.status
        ));
        return ExitCode::from_status(response.status.as_u16());
    }

    let size_human = humansize::format_size(size, humansize::BINARY);
    if formatter.is_json() {
        formatter.json(&UploadOutput {
            path: args.path,
            file: filename,
            size_bytes: size,
            size_human,
            checksum: checksum.to_uppercase(),
            status: response.status.as_u16(),
        });
    } else {
        formatter.success(&format!(
            "Uploaded {} to '{}' ({size_human})",
            formatter.style_name(&filename),
            args.path
        ));
    }

    ExitCode::Success
}
