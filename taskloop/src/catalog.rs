//! Bootstrap catalog written on first load when none is persisted.

use crate::core::types::{Priority, TaskDefinition, TaskKind};

fn task(
    id: &str,
    kind: TaskKind,
    title: &str,
    description: &str,
    priority: Priority,
    dependencies: &[&str],
    targets: &[&str],
) -> TaskDefinition {
    TaskDefinition {
        id: id.to_string(),
        kind,
        title: title.to_string(),
        description: description.to_string(),
        priority,
        dependencies: dependencies.iter().map(|d| d.to_string()).collect(),
        targets: targets.iter().map(|t| t.to_string()).collect(),
    }
}

pub fn default_catalog() -> Vec<TaskDefinition> {
    vec![
        task(
            "block-component",
            TaskKind::Component,
            "Implement Block Component",
            "Create the core Block React component with flip animation and glassmorphism styling",
            Priority::High,
            &[],
            &[
                "src/components/Block/Block.tsx",
                "src/components/Block/Block.styles.ts",
            ],
        ),
        task(
            "template-system",
            TaskKind::Component,
            "Build Template System",
            "Implement the template system for block instantiation",
            Priority::High,
            &["block-component"],
            &[
                "src/lib/templates/index.ts",
                "src/lib/templates/defaultTemplates.ts",
            ],
        ),
        task(
            "graph-view",
            TaskKind::Component,
            "Create Graph View with React Flow",
            "Implement the main graph visualization using React Flow",
            Priority::High,
            &["block-component"],
            &[
                "src/components/GraphView/GraphView.tsx",
                "src/components/GraphView/GraphControls.tsx",
            ],
        ),
        task(
            "compositor",
            TaskKind::Feature,
            "Implement Document Compositor",
            "Build the document assembly system that traverses blocks",
            Priority::Medium,
            &["block-component", "template-system"],
            &["src/lib/compositor/index.ts", "src/lib/compositor/traversal.ts"],
        ),
        task(
            "llm-chunking",
            TaskKind::Feature,
            "LLM-Powered Chunking",
            "Implement intelligent document chunking using Gemini API",
            Priority::Medium,
            &["block-component"],
            &["src/lib/llm/chunking.ts", "src/lib/llm/gemini-client.ts"],
        ),
        task(
            "dashboard-system",
            TaskKind::Feature,
            "User-Composed Dashboard System",
            "Create the dashboard composition system with widgets",
            Priority::Medium,
            &["block-component", "graph-view"],
            &[
                "src/components/Dashboard/Dashboard.tsx",
                "src/components/Dashboard/Widget.tsx",
            ],
        ),
        task(
            "tag-system",
            TaskKind::Component,
            "Tag System with Inheritance",
            "Implement the tag system with inheritance rules",
            Priority::High,
            &["block-component"],
            &["src/lib/tags/index.ts", "src/lib/tags/inheritance.ts"],
        ),
        task(
            "persistence",
            TaskKind::Feature,
            "Local Storage Persistence",
            "Implement data persistence with localStorage and export/import",
            Priority::Medium,
            &["block-component", "graph-view"],
            &["src/lib/storage/index.ts", "src/lib/storage/export.ts"],
        ),
        task(
            "performance",
            TaskKind::Optimization,
            "Performance Optimization",
            "Optimize rendering for 60 FPS with smart edge culling",
            Priority::Low,
            &["graph-view"],
            &["src/lib/performance/index.ts", "src/hooks/usePerformance.ts"],
        ),
        task(
            "tests",
            TaskKind::Test,
            "Component Testing",
            "Write comprehensive tests for core components",
            Priority::Low,
            &["block-component", "template-system"],
            &["src/__tests__/Block.test.tsx", "src/__tests__/compositor.test.ts"],
        ),
    ]
}
