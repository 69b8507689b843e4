//! Practice task generation

use crate::profile::{TaskTemplate, Vocabulary};
use crate::rewrite::Task;

/// Build the practice tasks for a lesson
///
/// The understanding task is only offered when the lesson shows code.
pub fn generate(vocabulary: &Vocabulary, has_code: bool) -> Vec<Task> {
    let mut templates: Vec<&TaskTemplate> = vec![&vocabulary.warm_up_task];
    if has_code {
        templates.push(&vocabulary.understanding_task);
    }
    templates.push(&vocabulary.find_bug_task);

    templates
        .into_iter()
        .enumerate()
        .map(|(order_index, template)| Task {
            title: template.title.clone(),
            prompt_md: template.prompt_md.clone(),
            starter_code: template.starter_code.clone(),
            tests_code: template.tests_code.clone(),
            points: template.points,
            order_index,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_two_tasks_without_code() {
        let tasks = generate(&Vocabulary::english(), false);
        let points: Vec<_> = tasks.iter().map(|t| t.points).collect();
        let orders: Vec<_> = tasks.iter().map(|t| t.order_index).collect();
        assert_eq!(points, [10, 20]);
        assert_eq!(orders, [0, 1]);
    }

    #[test]
    fn test_three_tasks_with_code() {
        let tasks = generate(&Vocabulary::english(), true);
        let points: Vec<_> = tasks.iter().map(|t| t.points).collect();
        let orders: Vec<_> = tasks.iter().map(|t| t.order_index).collect();
        assert_eq!(points, [10, 15, 20]);
        assert_eq!(orders, [0, 1, 2]);
        assert_eq!(tasks[2].title, "Find the bug");
    }
}
