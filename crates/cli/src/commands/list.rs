//! list command - List a directory of the storage zone
//!
//! Prints size, modification time and name for each entry, or the raw
//! objects as a JSON array.

use bunny_core::{Object, StorageApi};
use clap::Args;
use comfy_table::{Cell, CellAlignment, ContentArrangement, Table, presets};

use crate::exit_code::ExitCode;
use crate::output::Formatter;

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Directory path to list
    #[arg(short, long, default_value = "/")]
    pub path: String,
}

/// Execute the list command
pub async fn execute(args: ListArgs, store: &dyn StorageApi, formatter: &Formatter) -> ExitCode {
    let (objects, response) = match store.list(&args.path).await {
        Ok(result) => result,
        Err(e) => {
            formatter.error(&format!("Failed to list '{}': {e}", args.path));
            return ExitCode::from_error(&e);
        }
    };

    if !response.is_success() {
        formatter.error(&format!(
            "Failed to list '{}': unexpected status {}",
            args.path, response.status
        ));
        return ExitCode::from_status(response.status.as_u16());
    }

    if formatter.is_json() {
        formatter.json(&objects);
        return ExitCode::Success;
    }

    formatter.println(&format!("total {}", objects.len()));
    if !objects.is_empty() {
        for line in render_table(&objects, formatter).lines() {
            formatter.println(line.trim_end());
        }
    }

    ExitCode::Success
}

/// `Aug 10 12:34`, or the raw value when the server sent something else
fn format_modified(object: &Object) -> String {
    match object.last_changed_at() {
        Some(at) => at.strftime("%b %d %H:%M").to_string(),
        None => object.last_changed.clone(),
    }
}

fn format_size(object: &Object) -> String {
    if object.is_directory {
        "-".to_string()
    } else {
        humansize::format_size(object.length, humansize::BINARY)
    }
}

fn render_table(objects: &[Object], formatter: &Formatter) -> Table {
    let mut table = Table::new();
    table
        .load_preset(presets::NOTHING)
        .set_content_arrangement(ContentArrangement::Disabled);

    for object in objects {
        let name = if object.is_directory {
            formatter.style_dir(&format!("{}/", object.object_name))
        } else {
            object.object_name.clone()
        };

        table.add_row(vec![
            Cell::new(formatter.style_size(&format_size(object)))
                .set_alignment(CellAlignment::Right),
            Cell::new(formatter.style_date(&format_modified(object))),
            Cell::new(name),
        ]);
    }

    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::{MockStore, quiet, response};
    use bunny_core::Error;

    fn object(name: &str, length: u64, is_directory: bool) -> Object {
        Object {
            object_name: name.to_string(),
            length,
            is_directory,
            last_changed: "2023-08-10T12:34:56.789".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_format_modified() {
        assert_eq!(format_modified(&object("a", 1, false)), "Aug 10 12:34");

        let odd = Object {
            last_changed: "yesterday".to_string(),
            ..Default::default()
        };
        assert_eq!(format_modified(&odd), "yesterday");
    }

    #[test]
    fn test_render_table() {
        let objects = vec![object("hello.txt", 14, false), object("images", 0, true)];
        let rendered = render_table(&objects, &quiet()).to_string();

        assert!(rendered.contains("14 B"));
        assert!(rendered.contains("hello.txt"));
        assert!(rendered.contains("images/"));
        assert!(rendered.contains("Aug 10 12:34"));
        assert_eq!(rendered.lines().count(), 2);
    }

    #[test]
    fn test_render_table_uses_theme() {
        console::set_colors_enabled(true);
        let formatter = Formatter::new(crate::output::OutputConfig::default());
        let objects = vec![object("hello.txt", 14, false), object("images", 0, true)];
        let rendered = render_table(&objects, &formatter).to_string();

        assert!(rendered.contains(&formatter.style_dir("images/")));
        assert!(rendered.contains(&formatter.style_size("14 B")));
        assert!(rendered.contains(&formatter.style_date("Aug 10 12:34")));
        assert!(rendered.contains("hello.txt"));
    }

    #[tokio::test]
    async fn test_list_success() {
        let mut store = MockStore::new();
        store
            .expect_list()
            .withf(|path| path == "/testdata")
            .times(1)
            .returning(|_| Ok((vec![object("hello.txt", 14, false)], response(200, b""))));

        let args = ListArgs {
            path: "/testdata".to_string(),
        };
        assert_eq!(execute(args, &store, &quiet()).await, ExitCode::Success);
    }

    #[tokio::test]
    async fn test_list_not_found_status() {
        let mut store = MockStore::new();
        store
            .expect_list()
            .returning(|_| Ok((Vec::new(), response(404, b""))));

        let args = ListArgs {
            path: "/missing".to_string(),
        };
        assert_eq!(execute(args, &store, &quiet()).await, ExitCode::NotFound);
    }

    #[tokio::test]
    async fn test_list_network_error() {
        let mut store = MockStore::new();
        store
            .expect_list()
            .returning(|_| Err(Error::Network("connection refused".to_string())));

        let args = ListArgs {
            path: "/".to_string(),
        };
        assert_eq!(execute(args, &store, &quiet()).await, ExitCode::NetworkError);
    }
}
