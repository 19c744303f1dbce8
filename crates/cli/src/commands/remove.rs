//! remove command - Delete a file from the storage zone

use bunny_core::StorageApi;
use clap::Args;
use serde::Serialize;

use crate::exit_code::ExitCode;
use crate::output::Formatter;

#[derive(Args, Debug)]
pub struct RemoveArgs {
    /// Remote file to remove
    #[arg(short, long)]
    pub file: String,

    /// Remote directory containing the file
    #[arg(short, long, default_value = "/")]
    pub path: String,
}

#[derive(Debug, Serialize)]
struct RemoveOutput {
    path: String,
    file: String,
    status: u16,
}

/// Execute the remove command
pub async fn execute(args: RemoveArgs, store: &dyn StorageApi, formatter: &Formatter) -> ExitCode {
    formatter.info(&format!(
        "Deleting '{}' from '{}'...",
        args.file, args.path
    ));

    let response = match store.delete(&args.path, &args.file).await {
        Ok(response) => response,
        Err(e) => {
            formatter.error(&format!("Failed to remove '{}': {e}", args.file));
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
            "Failed to remove '{}': unexpected status {}",
            args.file, response.status
        ));
        return ExitCode::from_status(response.status.as_u16());
    }

    if formatter.is_json() {
        formatter.json(&RemoveOutput {
            status: response.status.as_u16(),
            path: args.path,
            file: args.file,
        });
    } else {
        formatter.success(&format!("Removed {}", formatter.style_name(&args.file)));
    }

    ExitCode::Success
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::{MockStore, quiet, response};

    fn args() -> RemoveArgs {
        RemoveArgs {
            file: "hello.txt".to_string(),
            path: "/testdata".to_string(),
        }
    }

    #[tokio::test]
    async fn test_remove_accepts_any_2xx() {
        for status in [200, 204] {
            let mut store = MockStore::new();
            store
                .expect_delete()
                .withf(|path, filename| path == "/testdata" && filename == "hello.txt")
                .times(1)
                .returning(move |_, _| Ok(response(status, b"")));

            assert_eq!(execute(args(), &store, &quiet()).await, ExitCode::Success);
        }
    }

    #[tokio::test]
    async fn test_remove_not_found() {
        let mut store = MockStore::new();
        store
            .expect_delete()
            .returning(|_, _| Ok(response(404, b"")));

        assert_eq!(execute(args(), &store, &quiet()).await, ExitCode::NotFound);
    }

    #[tokio::test]
    async fn test_remove_retries_exhausted() {
        let mut store = MockStore::new();
        store
            .expect_delete()
            .returning(|_, _| Err(bunny_core::Error::ServerBusy(503)));

        assert_eq!(execute(args(), &store, &quiet()).await, ExitCode::NetworkError);
    }
}
