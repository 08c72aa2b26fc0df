//! `hs prompts`: enrich a snapshot and show the task prompt of each TODO.

use std::io::{self, Write};
use std::path::Path;

use anyhow::Result;
use clap::Args;
use homescreen_core::config::ProjectConfig;
use homescreen_core::model::item::HomeScreen;
use homescreen_core::prompt::{TaskPrompt, task_prompt};
use serde::Serialize;

use crate::cmd::enrich::enrich_snapshot;
use crate::cmd::snapshot::SnapshotArgs;
use crate::output::{OutputMode, pretty_kv, pretty_rule, pretty_section, render_mode};

#[derive(Args, Debug)]
pub struct PromptsArgs {
    #[command(flatten)]
    pub snapshot: SnapshotArgs,
}

/// A prompt together with the position of the item it belongs to.
#[derive(Debug, Serialize)]
pub struct ItemPrompt {
    pub index: usize,
    #[serde(flatten)]
    pub prompt: TaskPrompt,
}

pub fn collect_prompts(home: &HomeScreen) -> Vec<ItemPrompt> {
    home.items
        .iter()
        .enumerate()
        .filter_map(|(index, item)| {
            let prompt = task_prompt(item.data.todo.as_ref()?)?;
            Some(ItemPrompt { index, prompt })
        })
        .collect()
}

pub fn run_prompts(
    args: &PromptsArgs,
    output: OutputMode,
    project: &ProjectConfig,
    project_root: &Path,
) -> Result<()> {
    let home = enrich_snapshot(&args.snapshot, project, project_root)?;
    let prompts = collect_prompts(&home);
    render_mode(
        output,
        &prompts,
        |prompts, w| render_text(prompts, w),
        |prompts, w| render_pretty(prompts, w),
    )
}

fn render_text(prompts: &[ItemPrompt], w: &mut dyn Write) -> io::Result<()> {
    for entry in prompts {
        let buttons: Vec<&str> = entry.prompt.buttons.iter().map(|b| b.label).collect();
        writeln!(
            w,
            "{}\t{}\t{}\t{}",
            entry.index,
            entry.prompt.todo_type,
            entry.prompt.instructions,
            buttons.join(",")
        )?;
    }
    Ok(())
}

fn render_pretty(prompts: &[ItemPrompt], w: &mut dyn Write) -> io::Result<()> {
    if prompts.is_empty() {
        return writeln!(w, "No tasks to show.");
    }

    pretty_section(w, "Tasks")?;
    for entry in prompts {
        writeln!(w, "[{}] {}", entry.index, entry.prompt.instructions)?;
        if !entry.prompt.sub_text.is_empty() {
            writeln!(w, "    {}", entry.prompt.sub_text)?;
        }
        let buttons: Vec<&str> = entry.prompt.buttons.iter().map(|b| b.label).collect();
        pretty_kv(w, "    actions", buttons.join(" | "))?;
        if entry.prompt.dismissable {
            pretty_kv(w, "    later", "allowed")?;
        }
        pretty_rule(w)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use homescreen_core::model::item::{
        HomeScreenItem, ItemData, TodoItem, TodoType, ValidatedTodo,
    };

    fn sample() -> HomeScreen {
        HomeScreen::with_items(vec![
            HomeScreenItem::new(ItemData::people(serde_json::json!({}))),
            HomeScreenItem::new(ItemData::todo(TodoItem::raw(TodoType::VerifyAllEmail))),
            HomeScreenItem::new(ItemData::todo(TodoItem::from(
                ValidatedTodo::LegacyEmailVisibility("e1".into()),
            ))),
        ])
    }

    #[test]
    fn only_resolved_todos_have_prompts() {
        let prompts = collect_prompts(&sample());
        assert_eq!(prompts.len(), 1);
        assert_eq!(prompts[0].index, 2);
        assert_eq!(prompts[0].prompt.todo_type, TodoType::LegacyEmailVisibility);
    }

    #[test]
    fn json_form_flattens_prompt_fields() {
        let value = serde_json::to_value(collect_prompts(&sample())).expect("json");
        assert_eq!(value[0]["index"], 2);
        assert_eq!(value[0]["instructions"], "Allow friends to find you using e1");
        assert_eq!(value[0]["dismissable"], true);
    }

    #[test]
    fn text_lists_instructions_and_buttons() {
        let mut out = Vec::new();
        render_text(&collect_prompts(&sample()), &mut out).expect("render");
        let rendered = String::from_utf8(out).expect("utf8");
        assert_eq!(
            rendered,
            "2\tLEGACY_EMAIL_VISIBILITY\tAllow friends to find you using e1\tMake searchable\n"
        );
    }

    #[test]
    fn pretty_reports_empty_list() {
        let mut out = Vec::new();
        render_pretty(&[], &mut out).expect("render");
        assert_eq!(String::from_utf8(out).expect("utf8"), "No tasks to show.\n");
    }
}
