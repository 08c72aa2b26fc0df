//! `hs enrich`: resolve user data for the TODO items of a snapshot.

use std::io::{self, Write};
use std::path::Path;

use anyhow::{Context as _, Result};
use clap::Args;
use homescreen_core::config::ProjectConfig;
use homescreen_core::enrich::Enricher;
use homescreen_core::model::item::{HomeScreen, HomeScreenItem, ItemKind};
use tracing::info;

use crate::cmd::snapshot::{SnapshotArgs, load_snapshot};
use crate::output::{OutputMode, pretty_kv, pretty_section, render_mode};

#[derive(Args, Debug)]
pub struct EnrichArgs {
    #[command(flatten)]
    pub snapshot: SnapshotArgs,

    /// Write the enriched snapshot back to SNAPSHOT.
    #[arg(long)]
    pub in_place: bool,
}

/// Load the snapshot named by `args` and run one enrichment pass over it.
pub fn enrich_snapshot(
    args: &SnapshotArgs,
    project: &ProjectConfig,
    project_root: &Path,
) -> Result<HomeScreen> {
    let directory = args.directory(project, project_root);
    let ctx = args.context();
    let mut home = load_snapshot(&args.snapshot)?;

    Enricher::new(&directory, &directory)
        .enrich_home_screen(&ctx, &mut home)
        .with_context(|| format!("Failed to enrich {}", args.snapshot.display()))?;
    Ok(home)
}

pub fn run_enrich(
    args: &EnrichArgs,
    output: OutputMode,
    project: &ProjectConfig,
    project_root: &Path,
) -> Result<()> {
    let home = enrich_snapshot(&args.snapshot, project, project_root)?;

    if args.in_place {
        let path = &args.snapshot.snapshot;
        let mut encoded = serde_json::to_string_pretty(&home)?;
        encoded.push('\n');
        std::fs::write(path, encoded)
            .with_context(|| format!("Failed to write snapshot {}", path.display()))?;
        info!(path = %path.display(), "wrote enriched snapshot");
    }

    render_mode(output, &home, render_text, render_pretty)
}

/// One `index  kind  todo_type  user_data` line per item.
fn render_text(home: &HomeScreen, w: &mut dyn Write) -> io::Result<()> {
    for (index, item) in home.items.iter().enumerate() {
        let (kind, todo_type, user_data) = describe(item);
        writeln!(w, "{index}\t{kind}\t{todo_type}\t{user_data}")?;
    }
    Ok(())
}

fn render_pretty(home: &HomeScreen, w: &mut dyn Write) -> io::Result<()> {
    pretty_section(w, "Home screen")?;
    pretty_kv(w, "version", home.version.to_string())?;
    pretty_kv(w, "items", home.items.len().to_string())?;
    let resolved = home.todos().filter(|todo| todo.is_validated()).count();
    pretty_kv(w, "resolved", resolved.to_string())?;
    writeln!(w)?;

    for (index, item) in home.items.iter().enumerate() {
        let (kind, todo_type, user_data) = describe(item);
        let badge = if item.badged { " *" } else { "" };
        if todo_type == "-" {
            writeln!(w, "  [{index}] {kind}{badge}")?;
        } else {
            writeln!(w, "  [{index}] {kind} {todo_type}{badge}  {user_data}")?;
        }
    }
    Ok(())
}

fn describe(item: &HomeScreenItem) -> (String, String, String) {
    let kind = ItemKind::from_wire(item.data.t).to_string();
    let Some(todo) = item.data.todo.as_ref() else {
        return (kind, "-".to_string(), "-".to_string());
    };
    let user_data = todo.user_data().unwrap_or("-").to_string();
    (kind, todo.todo_type().to_string(), user_data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use homescreen_core::model::item::{ItemData, TodoItem, TodoType, ValidatedTodo};

    fn sample() -> HomeScreen {
        HomeScreen::with_items(vec![
            HomeScreenItem::new(ItemData::todo(TodoItem::from(
                ValidatedTodo::VerifyAllEmail("e2".into()),
            ))),
            HomeScreenItem::new(ItemData::todo(TodoItem::raw(TodoType::Bio))),
            HomeScreenItem::new(ItemData::announcement(serde_json::json!({ "id": 1 }))),
        ])
    }

    #[test]
    fn enrich_args_parse_in_place() {
        use clap::Parser;

        #[derive(Parser)]
        struct Wrapper {
            #[command(flatten)]
            args: EnrichArgs,
        }
        let w = Wrapper::parse_from(["test", "home.json", "--in-place", "--emails", "e.json"]);
        assert!(w.args.in_place);
        assert_eq!(w.args.snapshot.snapshot, Path::new("home.json"));
        assert_eq!(w.args.snapshot.emails.as_deref(), Some(Path::new("e.json")));
    }

    #[test]
    fn text_lines_are_tab_separated() {
        let mut out = Vec::new();
        render_text(&sample(), &mut out).expect("render");
        let rendered = String::from_utf8(out).expect("utf8");
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0].split('\t').next_back(), Some("e2"));
        assert!(lines[1].ends_with("\t-"));
        assert!(lines[2].ends_with("\t-\t-"));
    }

    #[test]
    fn pretty_counts_resolved_todos() {
        let mut out = Vec::new();
        render_pretty(&sample(), &mut out).expect("render");
        let rendered = String::from_utf8(out).expect("utf8");
        assert!(rendered.contains("resolved:    1"));
        assert!(rendered.contains("e2"));
    }
}
