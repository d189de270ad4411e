//! Task brief handed to executors alongside the task definition.

use anyhow::{Context, Result};
use minijinja::{Environment, context};
use serde::Serialize;

use crate::core::types::{TaskDefinition, WorkerId};

const TASK_TEMPLATE: &str = include_str!("prompts/task.md");

#[derive(Debug, Serialize)]
struct TaskContext<'a> {
    id: &'a str,
    title: &'a str,
    description: &'a str,
    targets: &'a [String],
}

/// Per-worker emphasis appended to the brief.
pub fn worker_focus(worker: WorkerId) -> &'static str {
    match worker {
        WorkerId::Gemini => {
            "Focus on clean architecture and performance optimization.\n\
             Use modern React patterns with hooks and functional components."
        }
        WorkerId::Codex => {
            "Focus on code quality and TypeScript type safety.\n\
             Implement comprehensive error handling and edge cases."
        }
        WorkerId::Claude => {
            "Focus on user experience and intuitive interactions.\n\
             Ensure accessibility and responsive design."
        }
    }
}

/// Render the brief for `task` as handled by `worker`.
pub fn render_brief(task: &TaskDefinition, worker: WorkerId) -> Result<String> {
    let mut env = Environment::new();
    env.add_template("task", TASK_TEMPLATE)
        .context("load task template")?;
    let template = env.get_template("task").context("get task template")?;
    let rendered = template
        .render(context! {
            task => TaskContext {
                id: &task.id,
                title: &task.title,
                description: &task.description,
                targets: &task.targets,
            },
            focus => worker_focus(worker),
        })
        .with_context(|| format!("render brief for {}", task.id))?;
    Ok(rendered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::Priority;
    use crate::test_support::task;

    #[test]
    fn brief_lists_title_description_and_targets() {
        let mut t = task("graph-view", Priority::High, &[]);
        t.targets = vec!["a.tsx".to_string(), "b.tsx".to_string()];
        let brief = render_brief(&t, WorkerId::Codex).expect("render");
        assert!(brief.contains("Current Task: graph-view title"));
        assert!(brief.contains("Description: graph-view description"));
        assert!(brief.contains("Files to create/modify: a.tsx, b.tsx"));
        assert!(brief.contains("TypeScript type safety"));
    }

    #[test]
    fn brief_omits_file_line_without_targets() {
        let t = task("docs", Priority::Low, &[]);
        let brief = render_brief(&t, WorkerId::Claude).expect("render");
        assert!(!brief.contains("Files to create/modify"));
        assert!(brief.contains("accessibility"));
    }
}
