pub mod config;
pub mod create;
pub mod delete;
pub mod edit;
pub mod list;
pub mod show;

use anyhow::{anyhow, Result};
use metareg::lens::registry::{Notice, NoticeLevel, RegistryLens};
use metareg::lens::utils::OutputFormat;

/// Print the lens snapshot to stdout
pub(crate) fn print_listing(lens: &RegistryLens, output: OutputFormat) -> Result<()> {
    if lens.records().is_empty() && output.is_table() {
        eprintln!("[info] no databases registered");
        return Ok(());
    }
    println!("{}", lens.format_listing(output)?);
    Ok(())
}

/// Load the listing a selection is made from; a failed read fails the command
pub(crate) fn load_listing(lens: &mut RegistryLens) -> Result<()> {
    match lens.refresh() {
        Some(notice) => {
            lens.take_notices();
            Err(anyhow!("cannot load the listing: {}", notice.message))
        }
        None => Ok(()),
    }
}

/// Print notices to stderr; the first warning or error fails the command
pub(crate) fn report(notices: Vec<Notice>) -> Result<()> {
    let mut failure: Option<Notice> = None;
    for notice in notices {
        match notice.level {
            NoticeLevel::Success | NoticeLevel::Info => eprintln!("{}", notice),
            NoticeLevel::Warning | NoticeLevel::Error => {
                if failure.is_none() {
                    failure = Some(notice);
                } else {
                    eprintln!("{}", notice);
                }
            }
        }
    }

    match failure {
        Some(notice) => Err(anyhow!("{}", notice)),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use metareg::{ConnectionProvider, MetadataRepository, RecordDraft, RecordFields, StoreSettings};

    fn provider(dir: &tempfile::TempDir) -> (ConnectionProvider, String) {
        let path = dir
            .path()
            .join("registry.sqlite3")
            .to_string_lossy()
            .to_string();
        let provider = ConnectionProvider::new(StoreSettings::Sqlite { path: path.clone() });
        provider
            .handle()
            .unwrap()
            .create(&RecordDraft::new("db1", RecordFields::new("Sales DB")))
            .unwrap();
        (provider, path)
    }

    /// Make every listing of the open store fail
    fn break_listing(path: &str) {
        rusqlite::Connection::open(path)
            .unwrap()
            .execute_batch("ALTER TABLE metadaten_info RENAME TO metadaten_info_old")
            .unwrap();
    }

    fn count_rows(path: &str, table: &str) -> i64 {
        rusqlite::Connection::open(path)
            .unwrap()
            .query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| {
                row.get(0)
            })
            .unwrap()
    }

    #[test]
    fn test_report_fails_on_first_warning() {
        assert!(report(vec![Notice::success("ok"), Notice::info("fyi")]).is_ok());

        let err = report(vec![
            Notice::info("fyi"),
            Notice::warning("first"),
            Notice::error("second"),
        ])
        .unwrap_err();
        assert!(err.to_string().contains("first"));
    }

    #[test]
    fn test_delete_removes_listed_record() {
        let dir = tempfile::tempdir().unwrap();
        let (provider, path) = provider(&dir);

        let args = delete::DeleteArgs {
            id: "db1".to_string(),
        };
        assert!(delete::run(&provider, args, OutputFormat::Psv).is_ok());
        assert_eq!(count_rows(&path, "metadaten_info"), 0);
    }

    #[test]
    fn test_delete_fails_when_listing_fails() {
        let dir = tempfile::tempdir().unwrap();
        let (provider, path) = provider(&dir);
        break_listing(&path);

        let args = delete::DeleteArgs {
            id: "db1".to_string(),
        };
        let err = delete::run(&provider, args, OutputFormat::Table).unwrap_err();
        assert!(err.to_string().contains("no data available"));
        assert_eq!(count_rows(&path, "metadaten_info_old"), 1);
    }

    #[test]
    fn test_show_and_edit_fail_when_listing_fails() {
        let dir = tempfile::tempdir().unwrap();
        let (provider, path) = provider(&dir);
        break_listing(&path);

        let show_args = show::ShowArgs {
            id: "db1".to_string(),
        };
        assert!(show::run(&provider, show_args, OutputFormat::Json).is_err());

        let edit_args = metareg::lens::registry::EditArgs {
            name: Some("Sales DB v2".to_string()),
            ..metareg::lens::registry::EditArgs::new("db1")
        };
        assert!(edit::run(&provider, edit_args, OutputFormat::Json).is_err());
    }

    #[test]
    fn test_unknown_id_fails_command() {
        let dir = tempfile::tempdir().unwrap();
        let (provider, _path) = provider(&dir);

        let args = show::ShowArgs {
            id: "nope".to_string(),
        };
        assert!(show::run(&provider, args, OutputFormat::Json).is_err());
    }
}
