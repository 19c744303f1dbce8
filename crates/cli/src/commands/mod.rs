//! Subcommands
//!
//! Storage commands receive the store as `&dyn StorageApi` so they can be
//! run against a mock in tests.

pub mod completions;
pub mod download;
pub mod list;
pub mod remove;
pub mod upload;

use bunny_core::StorageApi;
use clap::Subcommand;

use crate::exit_code::ExitCode;
use crate::output::Formatter;

#[derive(Subcommand, Debug)]
pub enum Commands {
    #[command(flatten)]
    Storage(StorageCommand),

    /// Generate shell completion scripts
    Completions(completions::CompletionsArgs),
}

/// Commands that talk to the storage zone
#[derive(Subcommand, Debug)]
pub enum StorageCommand {
    /// List files and directories in the storage zone
    #[command(visible_alias = "ls")]
    List(list::ListArgs),

    /// Upload a file to the storage zone
    #[command(visible_alias = "cp")]
    Upload(upload::UploadArgs),

    /// Download a file from the storage zone
    #[command(visible_alias = "dl")]
    Download(download::DownloadArgs),

    /// Remove a file from the storage zone
    #[command(visible_alias = "rm")]
    Remove(remove::RemoveArgs),
}

/// Run a storage command against `store`
pub async fn execute(
    command: StorageCommand,
    store: &dyn StorageApi,
    formatter: &Formatter,
) -> ExitCode {
    match command {
        StorageCommand::List(args) => list::execute(args, store, formatter).await,
        StorageCommand::Upload(args) => upload::execute(args, store, formatter).await,
        StorageCommand::Download(args) => download::execute(args, store, formatter).await,
        StorageCommand::Remove(args) => remove::execute(args, store, formatter).await,
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use async_trait::async_trait;
    use bunny_core::{Object, Response, Result, StorageApi};
    use bytes::Bytes;
    use http::{HeaderMap, StatusCode};

    use crate::output::{Formatter, OutputConfig};

    mockall::mock! {
        pub Store {}

        #[async_trait]
        impl StorageApi for Store {
            async fn list(&self, path: &str) -> Result<(Vec<Object>, Response)>;
            async fn download(&self, path: &str, filename: &str) -> Result<(Bytes, Response)>;
            async fn upload(
                &self,
                path: &str,
                filename: &str,
                checksum: &str,
                body: Bytes,
            ) -> Result<Response>;
            async fn delete(&self, path: &str, filename: &str) -> Result<Response>;
        }
    }

    pub fn response(status: u16, body: &'static [u8]) -> Response {
        Response {
            status: StatusCode::from_u16(status).unwrap(),
            headers: HeaderMap::new(),
            body: Bytes::from_static(body),
        }
    }

    pub fn quiet() -> Formatter {
        Formatter::new(OutputConfig {
            quiet: true,
            no_color: true,
            ..Default::default()
        })
    }
}
