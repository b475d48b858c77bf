// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use eto_core::SequentialIdGen;

fn new_task(description: &str) -> NewTask {
    NewTask {
        description: description.to_string(),
        project_path: ProjectTarget::Active,
        priority: Priority::Normal,
        tags: HashSet::new(),
        dependencies: HashSet::new(),
        retry_limit: 0,
        timeout_s: None,
    }
}

#[test]
fn create_rejects_empty_description() {
    let reg = TaskRegistry::new();
    let id_gen = SequentialIdGen::new("t");
    let err = reg.create(new_task("   "), &id_gen, 0, 1024).unwrap_err();
    assert_eq!(err, RegistryError::EmptyDescription);
}

#[test]
fn create_rejects_unknown_dependency() {
    let reg = TaskRegistry::new();
    let id_gen = SequentialIdGen::new("t");
    let mut fields = new_task("do work");
    fields.dependencies.insert(TaskId::new("t-999999"));
    let err = reg.create(fields, &id_gen, 0, 1024).unwrap_err();
    assert!(matches!(err, RegistryError::UnknownDependency(_)));
}

#[test]
fn create_then_get_roundtrips() {
    let reg = TaskRegistry::new();
    let id_gen = SequentialIdGen::new("t");
    let id = reg.create(new_task("do work"), &id_gen, 42, 1024).unwrap();
    let task = reg.get(&id).unwrap();
    assert_eq!(task.state, TaskState::Queued);
    assert_eq!(task.created_at_ms, 42);
}

#[test]
fn create_accepts_existing_dependency() {
    let reg = TaskRegistry::new();
    let id_gen = SequentialIdGen::new("t");
    let x = reg.create(new_task("x"), &id_gen, 0, 1024).unwrap();
    let mut fields = new_task("y");
    fields.dependencies.insert(x);
    assert!(reg.create(fields, &id_gen, 0, 1024).is_ok());
}

#[test]
fn update_state_drives_the_normal_graph() {
    let reg = TaskRegistry::new();
    let id_gen = SequentialIdGen::new("t");
    let id = reg.create(new_task("x"), &id_gen, 0, 1024).unwrap();

    reg.update_state(&id, TaskState::Started, 1).unwrap();
    reg.update_state(&id, TaskState::Running, 2).unwrap();
    reg.update_state(&id, TaskState::Completed, 3).unwrap();

    let task = reg.get(&id).unwrap();
    assert_eq!(task.state, TaskState::Completed);
    assert_eq!(task.started_at_ms, Some(1));
    assert_eq!(task.ended_at_ms, Some(3));
}

#[test]
fn update_state_rejects_invalid_transition() {
    let reg = TaskRegistry::new();
    let id_gen = SequentialIdGen::new("t");
    let id = reg.create(new_task("x"), &id_gen, 0, 1024).unwrap();

    let err = reg.update_state(&id, TaskState::Completed, 1).unwrap_err();
    assert!(matches!(err, RegistryError::InvalidTransition(_)));
}

#[test]
fn update_state_on_unknown_task_is_not_found() {
    let reg = TaskRegistry::new();
    let err = reg
        .update_state(&TaskId::new("missing"), TaskState::Started, 1)
        .unwrap_err();
    assert_eq!(err, RegistryError::TaskNotFound("missing".to_string()));
}

#[test]
fn append_output_accumulates_into_ring_buffers() {
    let reg = TaskRegistry::new();
    let id_gen = SequentialIdGen::new("t");
    let id = reg.create(new_task("x"), &id_gen, 0, 1024).unwrap();

    reg.append_stdout(&id, b"hello ").unwrap();
    reg.append_stdout(&id, b"world").unwrap();
    reg.append_stderr(&id, b"oops").unwrap();

    let task = reg.get(&id).unwrap();
    assert_eq!(task.stdout_buffer.as_bytes(), b"hello world");
    assert_eq!(task.stderr_buffer.as_bytes(), b"oops");
}

#[test]
fn list_orders_by_priority_desc_then_created_at_then_id() {
    let reg = TaskRegistry::new();
    let id_gen = SequentialIdGen::new("t");

    let mut low = new_task("low");
    low.priority = Priority::Low;
    let low_id = reg.create(low, &id_gen, 10, 1024).unwrap();

    let mut high = new_task("high");
    high.priority = Priority::High;
    let high_id = reg.create(high, &id_gen, 20, 1024).unwrap();

    let mut normal = new_task("normal");
    normal.priority = Priority::Normal;
    let normal_id = reg.create(normal, &id_gen, 5, 1024).unwrap();

    let ids: Vec<TaskId> = reg.list(&TaskFilter::default()).into_iter().map(|s| s.id).collect();
    assert_eq!(ids, vec![high_id, normal_id, low_id]);
}

#[test]
fn list_filters_by_state_and_tags() {
    let reg = TaskRegistry::new();
    let id_gen = SequentialIdGen::new("t");

    let mut tagged = new_task("tagged");
    tagged.tags.insert("ci".to_string());
    let tagged_id = reg.create(tagged, &id_gen, 0, 1024).unwrap();
    let untagged_id = reg.create(new_task("untagged"), &id_gen, 0, 1024).unwrap();

    reg.update_state(&tagged_id, TaskState::Started, 1).unwrap();

    let mut tags = HashSet::new();
    tags.insert("ci".to_string());
    let filtered = reg.list(&TaskFilter {
        states: None,
        tags: Some(tags),
    });
    assert_eq!(filtered.len(), 1);
    assert_eq!(filtered[0].id, tagged_id);

    let mut states = HashSet::new();
    states.insert(TaskState::Queued);
    let filtered = reg.list(&TaskFilter {
        states: Some(states),
        tags: None,
    });
    assert_eq!(filtered.len(), 1);
    assert_eq!(filtered[0].id, untagged_id);
}

#[test]
fn count_by_states_reflects_current_population() {
    let reg = TaskRegistry::new();
    let id_gen = SequentialIdGen::new("t");
    reg.create(new_task("a"), &id_gen, 0, 1024).unwrap();
    let b = reg.create(new_task("b"), &id_gen, 0, 1024).unwrap();
    reg.update_state(&b, TaskState::Started, 1).unwrap();

    let counts = reg.count_by_states(&[TaskState::Queued, TaskState::Started]);
    assert_eq!(counts[&TaskState::Queued], 1);
    assert_eq!(counts[&TaskState::Started], 1);
}
