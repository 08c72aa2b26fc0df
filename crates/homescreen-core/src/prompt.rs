//! Client-facing task prompts for TODO items that carry user data.
//!
//! A prompt is only produced once the item holds its phone number or email.
//! Raw items render nothing rather than a sentence with a hole in it.

use serde::Serialize;

use crate::model::item::{TodoItem, TodoType, ValidatedTodo};

/// Visual weight of a task button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ButtonKind {
    Success,
    Default,
}

/// Primary or secondary styling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ButtonMode {
    Primary,
    Secondary,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskButton {
    pub label: &'static str,
    pub kind: ButtonKind,
    pub mode: ButtonMode,
}

impl TaskButton {
    const fn primary(label: &'static str) -> Self {
        Self {
            label,
            kind: ButtonKind::Success,
            mode: ButtonMode::Primary,
        }
    }

    const fn secondary(label: &'static str) -> Self {
        Self {
            label,
            kind: ButtonKind::Default,
            mode: ButtonMode::Secondary,
        }
    }
}

/// Text and actions shown for one TODO item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskPrompt {
    pub todo_type: TodoType,
    pub instructions: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub sub_text: String,
    pub buttons: Vec<TaskButton>,
    /// Whether the user may push the task to "later".
    pub dismissable: bool,
}

/// Build the prompt for a TODO item, if it has one.
#[must_use]
pub fn task_prompt(item: &TodoItem) -> Option<TaskPrompt> {
    let Some(validated) = item.validated() else {
        return None;
    };

    let prompt = match validated {
        ValidatedTodo::VerifyAllPhoneNumber(number) => TaskPrompt {
            todo_type: TodoType::VerifyAllPhoneNumber,
            instructions: format!("Your number {number} is unverified."),
            sub_text: String::new(),
            buttons: vec![
                TaskButton::primary("Verify"),
                TaskButton::secondary("Manage numbers"),
            ],
            dismissable: false,
        },
        ValidatedTodo::VerifyAllEmail(email) => TaskPrompt {
            todo_type: TodoType::VerifyAllEmail,
            instructions: format!("Your email address {email} is unverified."),
            sub_text: String::new(),
            buttons: vec![
                TaskButton::primary("Verify"),
                TaskButton::secondary("Manage email"),
            ],
            dismissable: false,
        },
        ValidatedTodo::LegacyEmailVisibility(email) => TaskPrompt {
            todo_type: TodoType::LegacyEmailVisibility,
            instructions: format!("Allow friends to find you using {email}"),
            sub_text: "Your email will never appear on your public profile.".to_string(),
            buttons: vec![TaskButton::primary("Make searchable")],
            dismissable: true,
        },
    };
    Some(prompt)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_items_have_no_prompt() {
        assert!(task_prompt(&TodoItem::raw(TodoType::VerifyAllEmail)).is_none());
        assert!(task_prompt(&TodoItem::raw(TodoType::Bio)).is_none());
    }

    #[test]
    fn phone_prompt_names_the_number() {
        let item = TodoItem::from(ValidatedTodo::VerifyAllPhoneNumber("+15550100".into()));
        let prompt = task_prompt(&item).expect("prompt");
        assert_eq!(prompt.instructions, "Your number +15550100 is unverified.");
        assert_eq!(prompt.buttons.len(), 2);
        assert_eq!(prompt.buttons[1].label, "Manage numbers");
        assert!(!prompt.dismissable);
    }

    #[test]
    fn legacy_visibility_prompt_is_dismissable() {
        let item = TodoItem::from(ValidatedTodo::LegacyEmailVisibility("p@example.com".into()));
        let prompt = task_prompt(&item).expect("prompt");
        assert_eq!(
            prompt.instructions,
            "Allow friends to find you using p@example.com"
        );
        assert!(prompt.dismissable);
        assert_eq!(prompt.buttons, vec![TaskButton::primary("Make searchable")]);
    }

    #[test]
    fn prompt_json_uses_wire_todo_type() {
        let item = TodoItem::from(ValidatedTodo::VerifyAllEmail("a@example.com".into()));
        let value = serde_json::to_value(task_prompt(&item).expect("prompt")).expect("json");
        assert_eq!(value["todo_type"], serde_json::json!(20));
        assert_eq!(value["buttons"][0]["kind"], "success");
        assert!(value.get("sub_text").is_none());
    }
}
