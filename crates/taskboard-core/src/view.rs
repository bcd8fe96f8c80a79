use taskboard_shared::{Tab, Task, TaskFilters};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Summary {
    pub total: usize,
    pub incomplete: usize,
    pub completed: usize,
}

/// Tasks passing every active filter, in collection order.
pub fn visible_tasks<'a>(tasks: &'a [Task], filters: &TaskFilters) -> Vec<&'a Task> {
    let needle = filters.search.to_lowercase();
    let want_completed = filters.tab == Tab::Complete;

    tasks
        .iter()
        .filter(|task| {
            if task.completed != want_completed {
                return false;
            }

            if !needle.is_empty() && !task.text.to_lowercase().contains(&needle) {
                return false;
            }

            filters.priority.admits(&task.priority) && filters.category.admits(&task.category)
        })
        .collect()
}

/// Counters over the whole collection, ignoring filters.
pub fn summary(tasks: &[Task]) -> Summary {
    let completed = tasks.iter().filter(|task| task.completed).count();
    Summary {
        total: tasks.len(),
        incomplete: tasks.len() - completed,
        completed,
    }
}

#[cfg(test)]
mod tests {
    use taskboard_shared::{
        Category, Priority, Selection, Tab, Task, TaskDraft, TaskFilters, TaskId,
    };

    use super::{summary, visible_tasks};

    fn task(id: u64, text: &str, priority: Priority, category: Category, done: bool) -> Task {
        let mut task = Task::from_draft(
            TaskId::number(id),
            TaskDraft::new(text)
                .with_priority(priority)
                .with_category(category),
        );
        task.completed = done;
        task
    }

    fn sample() -> Vec<Task> {
        vec![
            task(1, "Buy Milk", Priority::Low, Category::Shopping, false),
            task(2, "Buy eggs", Priority::Low, Category::Shopping, false),
            task(3, "Quarterly report", Priority::High, Category::Work, false),
            task(4, "Dentist", Priority::Medium, Category::Health, true),
            task(5, "Call mom", Priority::Medium, Category::Personal, true),
        ]
    }

    fn ids(tasks: &[&Task]) -> Vec<TaskId> {
        tasks.iter().map(|t| t.id.clone()).collect()
    }

    #[test]
    fn default_filters_show_incomplete_in_order() {
        let tasks = sample();
        let visible = visible_tasks(&tasks, &TaskFilters::default());
        assert_eq!(
            ids(&visible),
            vec![TaskId::number(1), TaskId::number(2), TaskId::number(3)]
        );
    }

    #[test]
    fn complete_tab_shows_only_completed() {
        let tasks = sample();
        let visible = visible_tasks(&tasks, &TaskFilters::default().tab(Tab::Complete));
        assert_eq!(ids(&visible), vec![TaskId::number(4), TaskId::number(5)]);
    }

    #[test]
    fn search_is_case_insensitive() {
        let tasks = sample();
        let visible = visible_tasks(&tasks, &TaskFilters::default().search("milk"));
        assert_eq!(ids(&visible), vec![TaskId::number(1)]);

        let visible = visible_tasks(&tasks, &TaskFilters::default().search("BUY"));
        assert_eq!(ids(&visible), vec![TaskId::number(1), TaskId::number(2)]);
    }

    #[test]
    fn priority_and_category_combine() {
        let tasks = sample();
        let filters = TaskFilters::default()
            .priority(Selection::Only(Priority::Low))
            .category(Selection::Only(Category::Work));
        assert!(visible_tasks(&tasks, &filters).is_empty());

        let filters = TaskFilters::default()
            .tab(Tab::Complete)
            .category(Selection::Only(Category::Health));
        assert_eq!(ids(&visible_tasks(&tasks, &filters)), vec![TaskId::number(4)]);
    }

    #[test]
    fn every_visible_task_satisfies_all_predicates() {
        let tasks = sample();
        let searches = ["", "buy", "o", "zzz"];
        let tabs = [Tab::Incomplete, Tab::Complete];
        let priorities = std::iter::once(Selection::All)
            .chain(Priority::ALL.into_iter().map(Selection::Only))
            .collect::<Vec<_>>();
        let categories = std::iter::once(Selection::All)
            .chain(Category::ALL.into_iter().map(Selection::Only))
            .collect::<Vec<_>>();

        for tab in tabs {
            for search in searches {
                for priority in &priorities {
                    for category in &categories {
                        let filters = TaskFilters::default()
                            .tab(tab)
                            .search(search)
                            .priority(*priority)
                            .category(*category);
                        let visible = visible_tasks(&tasks, &filters);
                        let expected = tasks
                            .iter()
                            .filter(|t| {
                                t.completed == (tab == Tab::Complete)
                                    && t.text.to_lowercase().contains(search)
                                    && priority.admits(&t.priority)
                                    && category.admits(&t.category)
                            })
                            .count();
                        assert_eq!(visible.len(), expected, "{filters:?}");
                        for t in visible {
                            assert_eq!(t.completed, tab == Tab::Complete);
                            assert!(priority.admits(&t.priority));
                            assert!(category.admits(&t.category));
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn summary_ignores_filters_and_adds_up() {
        let tasks = sample();
        let s = summary(&tasks);
        assert_eq!(s.total, 5);
        assert_eq!(s.incomplete, 3);
        assert_eq!(s.completed, 2);
        assert_eq!(s.total, s.incomplete + s.completed);

        assert_eq!(summary(&[]), super::Summary::default());
    }
}
