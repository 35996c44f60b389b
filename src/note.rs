use crate::answer::StructuredAnswer;

pub const TAKEAWAYS_LABEL: &str = "🔑 Key Takeaways:";
pub const MEMORY_HOOK_LABEL: &str = "🧠 Memory Hook:";

/// A note ready to show on the console or attach to a highlight.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormattedNote {
    pub title: String,
    pub body: String,
}

impl From<&StructuredAnswer> for FormattedNote {
    fn from(answer: &StructuredAnswer) -> Self {
        format_note(&answer.title, &answer.takeaways, &answer.memory_hook)
    }
}

/// Builds the note body: one bullet per takeaway in order, a blank line,
/// then the memory hook.
pub fn format_note(title: &str, takeaways: &[String], memory_hook: &str) -> FormattedNote {
    let bullets = takeaways
        .iter()
        .map(|point| format!("- {point}"))
        .collect::<Vec<_>>()
        .join("\n");

    FormattedNote {
        title: title.to_string(),
        body: format!("{TAKEAWAYS_LABEL}\n{bullets}\n\n{MEMORY_HOOK_LABEL}\n{memory_hook}"),
    }
}
