//! Arguments and loading shared by commands that operate on a snapshot.

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::Args;
use homescreen_core::config::ProjectConfig;
use homescreen_core::lookup::{Context, JsonFileDirectory};
use homescreen_core::model::item::HomeScreen;
use tracing::debug;

#[derive(Args, Debug)]
pub struct SnapshotArgs {
    /// Home screen snapshot (JSON wire form).
    #[arg(value_name = "SNAPSHOT")]
    pub snapshot: PathBuf,

    /// Phone number directory file; overrides `sources.phone_numbers`.
    #[arg(long, value_name = "PATH")]
    pub phones: Option<PathBuf>,

    /// Email directory file; overrides `sources.emails`.
    #[arg(long, value_name = "PATH")]
    pub emails: Option<PathBuf>,

    /// Account the lookups are scoped to (recorded in logs).
    #[arg(long)]
    pub account: Option<String>,
}

impl SnapshotArgs {
    /// Build the directory collaborators from config plus CLI overrides.
    ///
    /// CLI paths are taken as given; configured paths are relative to the
    /// project root.
    pub fn directory(&self, project: &ProjectConfig, project_root: &Path) -> JsonFileDirectory {
        let configured = project.sources.resolve(project_root);
        let sources = configured.with_overrides(self.phones.clone(), self.emails.clone());
        debug!(
            phones = ?sources.phone_numbers,
            emails = ?sources.emails,
            "resolved directory sources"
        );
        JsonFileDirectory::new(sources.phone_numbers, sources.emails)
    }

    pub fn context(&self) -> Context {
        match self.account.as_deref() {
            Some(account) => Context::for_account(account),
            None => Context::new(),
        }
    }
}

/// Read and decode a snapshot file.
pub fn load_snapshot(path: &Path) -> Result<HomeScreen> {
    let home = HomeScreen::load(path)?;
    debug!(path = %path.display(), items = home.items.len(), "loaded snapshot");
    Ok(home)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use homescreen_core::config::SourcesConfig;

    #[derive(Parser)]
    struct Wrapper {
        #[command(flatten)]
        args: SnapshotArgs,
    }

    #[test]
    fn cli_paths_override_config() {
        let w = Wrapper::parse_from(["test", "home.json", "--phones", "/tmp/p.json"]);
        let project = ProjectConfig {
            sources: SourcesConfig {
                phone_numbers: Some(PathBuf::from("dir/phones.json")),
                emails: Some(PathBuf::from("dir/emails.json")),
            },
            ..ProjectConfig::default()
        };

        let directory = w.args.directory(&project, Path::new("/srv/project"));
        assert_eq!(directory.phone_numbers_path(), Some(Path::new("/tmp/p.json")));
        assert_eq!(
            directory.emails_path(),
            Some(Path::new("/srv/project/dir/emails.json"))
        );
    }

    #[test]
    fn account_flag_scopes_context() {
        let w = Wrapper::parse_from(["test", "home.json", "--account", "alice"]);
        assert_eq!(w.args.context().account(), Some("alice"));

        let w = Wrapper::parse_from(["test", "home.json"]);
        assert_eq!(w.args.context().account(), None);
    }
}
