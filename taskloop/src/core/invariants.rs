//! Catalog invariants not expressible via JSON Schema.

use std::collections::{HashMap, HashSet};

use crate::core::types::TaskDefinition;

/// Check semantic catalog invariants:
/// - No duplicate ids
/// - Every dependency names a task in the catalog
/// - No task depends on itself
/// - The dependency graph is acyclic
pub fn validate_catalog(tasks: &[TaskDefinition]) -> Vec<String> {
    let mut errors = Vec::new();
    let mut seen = HashSet::new();
    for task in tasks {
        if !seen.insert(task.id.as_str()) {
            errors.push(format!("duplicate id '{}'", task.id));
        }
    }

    for task in tasks {
        for dep in &task.dependencies {
            if dep == &task.id {
                errors.push(format!("{}: depends on itself", task.id));
            } else if !seen.contains(dep.as_str()) {
                errors.push(format!("{}: unknown dependency '{}'", task.id, dep));
            }
        }
    }

    if let Some(cycle) = find_cycle(tasks) {
        errors.push(format!("dependency cycle: {}", cycle.join(" -> ")));
    }
    errors
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    Visiting,
    Done,
}

/// Depth-first search for a dependency cycle, returned as a closed id path.
///
/// Self-dependencies and unknown ids are reported elsewhere and skipped here.
fn find_cycle(tasks: &[TaskDefinition]) -> Option<Vec<String>> {
    let by_id: HashMap<&str, &TaskDefinition> =
        tasks.iter().map(|t| (t.id.as_str(), t)).collect();
    let mut marks: HashMap<&str, Mark> = HashMap::new();
    let mut path: Vec<&str> = Vec::new();

    for task in tasks {
        if marks.contains_key(task.id.as_str()) {
            continue;
        }
        if let Some(cycle) = visit(task.id.as_str(), &by_id, &mut marks, &mut path) {
            return Some(cycle);
        }
    }
    None
}

fn visit<'a>(
    id: &'a str,
    by_id: &HashMap<&'a str, &'a TaskDefinition>,
    marks: &mut HashMap<&'a str, Mark>,
    path: &mut Vec<&'a str>,
) -> Option<Vec<String>> {
    marks.insert(id, Mark::Visiting);
    path.push(id);

    if let Some(&task) = by_id.get(id) {
        for dep in &task.dependencies {
            let dep = dep.as_str();
            if dep == id || !by_id.contains_key(dep) {
                continue;
            }
            match marks.get(dep) {
                Some(Mark::Done) => {}
                Some(Mark::Visiting) => {
                    let start = path.iter().position(|p| *p == dep).unwrap_or(0);
                    let mut cycle: Vec<String> =
                        path[start..].iter().map(|p| p.to_string()).collect();
                    cycle.push(dep.to_string());
                    return Some(cycle);
                }
                None => {
                    if let Some(cycle) = visit(dep, by_id, marks, path) {
                        return Some(cycle);
                    }
                }
            }
        }
    }

    path.pop();
    marks.insert(id, Mark::Done);
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::Priority;
    use crate::test_support::task;

    #[test]
    fn valid_catalog_has_no_errors() {
        let tasks = vec![
            task("a", Priority::High, &[]),
            task("b", Priority::High, &["a"]),
            task("c", Priority::Low, &["a", "b"]),
        ];
        assert!(validate_catalog(&tasks).is_empty());
    }

    #[test]
    fn reports_duplicates_unknown_and_self_dependencies() {
        let tasks = vec![
            task("a", Priority::High, &["a"]),
            task("a", Priority::Low, &[]),
            task("b", Priority::Low, &["ghost"]),
        ];
        let errors = validate_catalog(&tasks);
        assert!(errors.iter().any(|e| e.contains("duplicate id 'a'")));
        assert!(errors.iter().any(|e| e.contains("depends on itself")));
        assert!(errors.iter().any(|e| e.contains("unknown dependency 'ghost'")));
    }

    #[test]
    fn reports_dependency_cycle_path() {
        let tasks = vec![
            task("a", Priority::High, &["c"]),
            task("b", Priority::High, &["a"]),
            task("c", Priority::High, &["b"]),
            task("d", Priority::High, &[]),
        ];
        let errors = validate_catalog(&tasks);
        assert_eq!(errors, vec!["dependency cycle: a -> c -> b -> a".to_string()]);
    }
}
