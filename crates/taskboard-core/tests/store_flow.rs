use std::sync::Mutex;

use async_trait::async_trait;
use taskboard_core::api::TodoApi;
use taskboard_core::error::{FetchError, StoreError, ValidationError};
use taskboard_core::store::TaskStore;
use taskboard_shared::{Category, Priority, Task, TaskDraft, TaskFilters, TaskId, TaskPatch};

/// In-memory stand-in for the todo service. Echoes what it is sent, can
/// hand out its own ids and can be told to fail.
#[derive(Default)]
struct FakeService {
    state: Mutex<FakeState>,
}

#[derive(Default)]
struct FakeState {
    tasks: Vec<Task>,
    requests: Vec<String>,
    sent: Vec<Task>,
    next_id: Option<u64>,
    failing: bool,
    rewrite_text: Option<String>,
}

impl FakeService {
    fn with_tasks(tasks: Vec<Task>) -> Self {
        let fake = Self::default();
        fake.state.lock().expect("lock").tasks = tasks;
        fake
    }

    fn assign_ids_from(&self, id: u64) {
        self.state.lock().expect("lock").next_id = Some(id);
    }

    fn set_failing(&self, failing: bool) {
        self.state.lock().expect("lock").failing = failing;
    }

    fn rewrite_text(&self, text: &str) {
        self.state.lock().expect("lock").rewrite_text = Some(text.to_string());
    }

    fn requests(&self) -> Vec<String> {
        self.state.lock().expect("lock").requests.clone()
    }

    fn last_sent(&self) -> Option<Task> {
        self.state.lock().expect("lock").sent.last().cloned()
    }
}

fn server_error(method: &'static str) -> FetchError {
    FetchError::Status {
        method,
        url: "fake://todos".to_string(),
        status: 500,
    }
}

#[async_trait]
impl TodoApi for FakeService {
    async fn list(&self) -> Result<Vec<Task>, FetchError> {
        let mut state = self.state.lock().expect("lock");
        state.requests.push("GET".to_string());
        if state.failing {
            return Err(server_error("GET"));
        }
        Ok(state.tasks.clone())
    }

    async fn create(&self, task: &Task) -> Result<Task, FetchError> {
        let mut state = self.state.lock().expect("lock");
        state.requests.push("POST".to_string());
        state.sent.push(task.clone());
        if state.failing {
            return Err(server_error("POST"));
        }

        let mut created = task.clone();
        if let Some(id) = state.next_id {
            created.id = TaskId::number(id);
            state.next_id = Some(id + 1);
        }
        if let Some(text) = state.rewrite_text.clone() {
            created.text = text;
        }
        state.tasks.push(created.clone());
        Ok(created)
    }

    async fn update(&self, id: &TaskId, task: &Task) -> Result<Task, FetchError> {
        let mut state = self.state.lock().expect("lock");
        state.requests.push(format!("PUT {id}"));
        state.sent.push(task.clone());
        if state.failing {
            return Err(server_error("PUT"));
        }

        let mut updated = task.clone();
        if let Some(text) = state.rewrite_text.clone() {
            updated.text = text;
        }
        if let Some(slot) = state.tasks.iter_mut().find(|t| &t.id == id) {
            *slot = updated.clone();
        }
        Ok(updated)
    }

    async fn delete(&self, id: &TaskId) -> Result<(), FetchError> {
        let mut state = self.state.lock().expect("lock");
        state.requests.push(format!("DELETE {id}"));
        if state.failing {
            return Err(server_error("DELETE"));
        }

        let before = state.tasks.len();
        state.tasks.retain(|t| &t.id != id);
        if state.tasks.len() == before {
            return Err(FetchError::Status {
                method: "DELETE",
                url: format!("fake://todos/{id}"),
                status: 404,
            });
        }
        Ok(())
    }
}

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

fn seeded() -> Vec<Task> {
    vec![
        task(1, "Buy Milk", Priority::Low, Category::Shopping, false),
        task(2, "Quarterly report", Priority::High, Category::Work, false),
        task(3, "Dentist", Priority::Medium, Category::Health, true),
    ]
}

async fn loaded_store(tasks: Vec<Task>) -> TaskStore<FakeService> {
    let mut store = TaskStore::new(FakeService::with_tasks(tasks));
    store.load().await.expect("initial load");
    store
}

#[tokio::test]
async fn load_replaces_collection_wholesale() {
    let mut store = loaded_store(seeded()).await;
    assert_eq!(store.tasks(), seeded().as_slice());

    store.api().state.lock().expect("lock").tasks = vec![task(9, "Only", Priority::Low, Category::Work, false)];
    store.load().await.expect("reload");
    assert_eq!(store.tasks().len(), 1);
    assert_eq!(store.tasks()[0].id, TaskId::number(9));
}

#[tokio::test]
async fn blank_text_is_rejected_without_a_request() {
    let mut store = loaded_store(seeded()).await;
    let before = store.api().requests().len();

    for text in ["", "  ", "\t\n"] {
        let err = store.create(TaskDraft::new(text)).await.expect_err("blank text");
        assert!(matches!(err, StoreError::Validation(ValidationError::EmptyText)));
        assert!(err.is_validation());
    }

    assert_eq!(store.api().requests().len(), before);
    assert_eq!(store.tasks(), seeded().as_slice());
}

#[tokio::test]
async fn create_appends_the_service_representation() {
    let mut store = loaded_store(vec![]).await;
    store.api().assign_ids_from(42);

    let draft = TaskDraft::new("Buy milk")
        .with_priority(Priority::Low)
        .with_category(Category::Shopping);
    let created = store.create(draft).await.expect("create").clone();

    assert_eq!(
        created,
        Task {
            id: TaskId::number(42),
            text: "Buy milk".to_string(),
            priority: Priority::Low,
            category: Category::Shopping,
            completed: false,
        }
    );
    assert_eq!(store.tasks(), &[created]);

    let sent = store.api().last_sent().expect("sent body");
    assert!(!sent.completed);
    assert_ne!(sent.id, TaskId::number(42));
}

#[tokio::test]
async fn provisional_ids_do_not_collide() {
    let mut store = loaded_store(vec![task(9_000_000_000_000, "Far future", Priority::Low, Category::Work, false)]).await;

    store.create(TaskDraft::new("a")).await.expect("create a");
    store.create(TaskDraft::new("b")).await.expect("create b");

    let ids = store.tasks().iter().map(|t| t.id.clone()).collect::<Vec<_>>();
    assert_eq!(ids.len(), 3);
    assert_ne!(ids[0], ids[1]);
    assert_ne!(ids[1], ids[2]);
    assert_ne!(ids[0], ids[2]);
}

#[tokio::test]
async fn service_answer_wins_over_local_values() {
    let mut store = loaded_store(seeded()).await;
    store.api().rewrite_text("normalized");

    let created = store.create(TaskDraft::new("  raw  ")).await.expect("create");
    assert_eq!(created.text, "normalized");

    let updated = store
        .update(&TaskId::number(1), TaskPatch {
            text: Some("Buy oat milk".to_string()),
            ..TaskPatch::default()
        })
        .await
        .expect("update");
    assert_eq!(updated.text, "normalized");
}

#[tokio::test]
async fn toggle_flips_only_the_target() {
    let mut store = loaded_store(seeded()).await;

    let toggled = store.toggle_completion(&TaskId::number(1)).await.expect("toggle");
    assert!(toggled.completed);

    let expected = {
        let mut tasks = seeded();
        tasks[0].completed = true;
        tasks
    };
    assert_eq!(store.tasks(), expected.as_slice());
    assert_eq!(store.api().requests().last().map(String::as_str), Some("PUT 1"));
}

#[tokio::test]
async fn sequential_toggles_do_not_lose_updates() {
    let mut store = loaded_store(seeded()).await;
    let id = TaskId::number(2);

    store.toggle_completion(&id).await.expect("first toggle");
    store.toggle_completion(&id).await.expect("second toggle");

    assert_eq!(store.get(&id).map(|t| t.completed), Some(false));
    let sent = store.api().last_sent().expect("sent body");
    assert!(!sent.completed);
}

#[tokio::test]
async fn update_sends_patch_merged_over_local_task() {
    let mut store = loaded_store(seeded()).await;

    store
        .update(&TaskId::number(2), TaskPatch {
            priority: Some(Priority::Low),
            ..TaskPatch::default()
        })
        .await
        .expect("update");

    let sent = store.api().last_sent().expect("sent body");
    assert_eq!(sent.text, "Quarterly report");
    assert_eq!(sent.priority, Priority::Low);
    assert_eq!(sent.category, Category::Work);
    assert_eq!(store.get(&TaskId::number(2)).map(|t| t.priority), Some(Priority::Low));
}

#[tokio::test]
async fn unknown_ids_are_rejected_locally() {
    let mut store = loaded_store(seeded()).await;
    let before = store.api().requests().len();
    let missing = TaskId::number(404);

    let err = store
        .update(&missing, TaskPatch::completed(true))
        .await
        .expect_err("unknown id");
    assert!(matches!(err, StoreError::Validation(ValidationError::UnknownTask(ref id)) if *id == missing));

    let err = store.toggle_completion(&missing).await.expect_err("unknown id");
    assert!(err.is_validation());

    let err = store
        .update(&TaskId::number(1), TaskPatch {
            text: Some("   ".to_string()),
            ..TaskPatch::default()
        })
        .await
        .expect_err("blank patch text");
    assert!(matches!(err, StoreError::Validation(ValidationError::EmptyText)));

    assert_eq!(store.api().requests().len(), before);
}

#[tokio::test]
async fn remove_forwards_and_drops_local_copy() {
    let mut store = loaded_store(seeded()).await;

    let removed = store.remove(&TaskId::number(2)).await.expect("remove");
    assert_eq!(removed.map(|t| t.text), Some("Quarterly report".to_string()));
    assert_eq!(store.tasks().len(), 2);
    assert!(store.get(&TaskId::number(2)).is_none());

    let err = store.remove(&TaskId::number(77)).await.expect_err("service 404");
    assert!(matches!(err, FetchError::Status { status: 404, .. }));
    assert_eq!(store.api().requests().last().map(String::as_str), Some("DELETE 77"));
    assert_eq!(store.tasks().len(), 2);
}

#[tokio::test]
async fn fetch_errors_leave_collection_untouched() {
    let mut store = loaded_store(seeded()).await;
    let snapshot = store.tasks().to_vec();
    store.api().set_failing(true);

    assert!(store.load().await.is_err());
    assert_eq!(store.tasks(), snapshot.as_slice());

    let err = store.create(TaskDraft::new("Walk dog")).await.expect_err("create fails");
    assert!(matches!(err, StoreError::Fetch(_)));
    assert_eq!(store.tasks(), snapshot.as_slice());

    let err = store
        .update(&TaskId::number(1), TaskPatch {
            category: Some(Category::Personal),
            ..TaskPatch::default()
        })
        .await
        .expect_err("update fails");
    assert!(matches!(err, StoreError::Fetch(_)));
    assert_eq!(store.tasks(), snapshot.as_slice());

    assert!(store.toggle_completion(&TaskId::number(3)).await.is_err());
    assert_eq!(store.tasks(), snapshot.as_slice());

    assert!(store.remove(&TaskId::number(1)).await.is_err());
    assert_eq!(store.tasks(), snapshot.as_slice());
}

#[tokio::test]
async fn summary_and_visible_follow_the_collection() {
    let mut store = loaded_store(seeded()).await;
    store.toggle_completion(&TaskId::number(1)).await.expect("toggle");

    let summary = store.summary();
    assert_eq!(summary.total, 3);
    assert_eq!(summary.incomplete, 1);
    assert_eq!(summary.completed, 2);

    let visible = store.visible(&TaskFilters::default().search("REPORT"));
    assert_eq!(visible.len(), 1);
    assert_eq!(visible[0].id, TaskId::number(2));
}

#[tokio::test]
async fn string_ids_match_ids_typed_on_the_command_line() {
    let listed: Vec<Task> = serde_json::from_str(
        r#"[{"id":"42","text":"Water plants","priority":"low","category":"personal","completed":false}]"#,
    )
    .expect("string id");
    let mut store = loaded_store(listed).await;
    let typed = "42".parse::<TaskId>().expect("typed id");

    let toggled = store.toggle_completion(&typed).await.expect("toggle");
    assert!(toggled.completed);

    store
        .update(&typed, TaskPatch {
            priority: Some(Priority::High),
            ..TaskPatch::default()
        })
        .await
        .expect("edit");

    let sent = store.api().last_sent().expect("sent body");
    assert_eq!(serde_json::to_value(&sent.id).expect("id json"), serde_json::json!("42"));
    assert_eq!(store.api().requests().last().map(String::as_str), Some("PUT 42"));

    let removed = store.remove(&typed).await.expect("remove");
    assert_eq!(removed.map(|t| t.text), Some("Water plants".to_string()));
    assert!(store.tasks().is_empty());
}
