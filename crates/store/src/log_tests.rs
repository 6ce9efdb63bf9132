// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::error::StoreError;
use orchard_core::{
    AgentRecordStatus, ExecutionStatus, Severity, TaskStatus, TerminationReason, Value,
};
use serde_json::json;

async fn log() -> DurableLog {
    let pool = crate::open_memory_db().await.unwrap();
    DurableLog::new(pool, Arc::new(Mutex::new(VersionMap::new())))
}

#[tokio::test]
async fn create_and_find_running_execution() {
    let log = log().await;
    let id = log.create_execution("demo", "programs/demo", 1_000).await.unwrap();

    let found = log.find_running("programs/demo").await.unwrap().unwrap();
    assert_eq!(found.id, id);
    assert_eq!(found.status, ExecutionStatus::Running);
    assert_eq!(found.started_at, 1_000);
    assert!(found.completed_at.is_none());
}

#[tokio::test]
async fn finished_executions_are_not_resumable() {
    let log = log().await;
    let id = log.create_execution("demo", "programs/demo", 1_000).await.unwrap();
    log.finish_execution(&id, ExecutionStatus::Completed, &TerminationReason::Quiescent, 2_000)
        .await
        .unwrap();

    assert!(log.find_running("programs/demo").await.unwrap().is_none());
    let row = log.execution(&id).await.unwrap().unwrap();
    assert_eq!(row.status, ExecutionStatus::Completed);
    assert_eq!(row.reason.as_deref(), Some("quiescent"));
    assert_eq!(row.completed_at, Some(2_000));
}

#[tokio::test]
async fn iteration_cap_reason_is_recorded() {
    let log = log().await;
    let id = log.create_execution("demo", "src", 1_000).await.unwrap();
    log.finish_execution(&id, ExecutionStatus::Completed, &TerminationReason::IterationCap, 2_000)
        .await
        .unwrap();
    let row = log.execution(&id).await.unwrap().unwrap();
    assert_eq!(row.reason.as_deref(), Some("iteration-cap"));
}

#[tokio::test]
async fn frame_sequences_are_dense_and_unique() {
    let log = log().await;
    let id = log.create_execution("demo", "src", 1_000).await.unwrap();

    assert_eq!(log.next_frame_sequence(&id).await.unwrap(), 1);
    log.append_frame(&id, 1, "<root/>\n", 1_000).await.unwrap();
    assert_eq!(log.next_frame_sequence(&id).await.unwrap(), 2);
    log.append_frame(&id, 2, "<root/>\n", 1_001).await.unwrap();

    // Duplicate sequence violates the UNIQUE constraint.
    let dup = log.append_frame(&id, 2, "<root/>\n", 1_002).await;
    assert!(matches!(dup, Err(StoreError::Sqlx(_))));

    let frames = log.frames(&id).await.unwrap();
    let sequence: Vec<u64> = frames.iter().map(|f| f.sequence_number).collect();
    assert_eq!(sequence, [1, 2]);
}

#[tokio::test]
async fn frame_retrieval_wraps_header() {
    let log = log().await;
    let id = log.create_execution("demo", "src", 1_000).await.unwrap();
    log.append_frame(&id, 1, "<agent/>\n", 1_000).await.unwrap();

    let frame = log.frame(&id, 1).await.unwrap().unwrap();
    assert_eq!(
        frame.with_header(),
        format!("-- execution {id} frame 1 --\n<agent/>\n")
    );
}

#[tokio::test]
async fn agent_rows_walk_the_status_ladder() {
    let log = log().await;
    let exec = log.create_execution("demo", "src", 1_000).await.unwrap();
    let id = log
        .insert_agent(&exec, "/agent:0", Some("small"), Some("do the thing"))
        .await
        .unwrap();

    let rows = log.agents(&exec).await.unwrap();
    assert_eq!(rows[0].status, AgentRecordStatus::Pending);
    assert_eq!(rows[0].prompt.as_deref(), Some("do the thing"));

    log.agent_running(&id).await.unwrap();
    log.agent_completed(&id, "done", Some(&json!({"score": 9}))).await.unwrap();

    let rows = log.agents(&exec).await.unwrap();
    assert_eq!(rows[0].status, AgentRecordStatus::Completed);
    assert_eq!(rows[0].output.as_deref(), Some("done"));
    assert_eq!(rows[0].structured_output, Some(json!({"score": 9})));
}

#[tokio::test]
async fn agent_failure_records_error() {
    let log = log().await;
    let exec = log.create_execution("demo", "src", 1_000).await.unwrap();
    let id = log.insert_agent(&exec, "/agent:0", None, None).await.unwrap();
    log.agent_running(&id).await.unwrap();
    log.agent_failed(&id, "model overloaded").await.unwrap();

    let rows = log.agents(&exec).await.unwrap();
    assert_eq!(rows[0].status, AgentRecordStatus::Failed);
    assert_eq!(rows[0].error.as_deref(), Some("model overloaded"));
}

#[tokio::test]
async fn tool_calls_and_reports_persist() {
    let log = log().await;
    let exec = log.create_execution("demo", "src", 1_000).await.unwrap();
    let agent = log.insert_agent(&exec, "/agent:0", None, None).await.unwrap();

    log.record_tool_call(&agent, "search", &json!({"q": "rust"}), &json!(["hit"]), 1_000)
        .await
        .unwrap();
    log.insert_report(
        &exec,
        Some(&agent),
        "finding",
        "Flaky test",
        "retry loop in CI",
        Severity::Warning,
        Some(&json!({"count": 3})),
        1_000,
    )
    .await
    .unwrap();

    let row = sqlx::query("SELECT tool_name FROM tool_calls WHERE agent_id = ?")
        .bind(agent.as_str())
        .fetch_one(log.pool())
        .await
        .unwrap();
    let tool: String = sqlx::Row::try_get(&row, 0).unwrap();
    assert_eq!(tool, "search");

    let row = sqlx::query("SELECT severity FROM reports WHERE execution_id = ?")
        .bind(exec.as_str())
        .fetch_one(log.pool())
        .await
        .unwrap();
    let severity: String = sqlx::Row::try_get(&row, 0).unwrap();
    assert_eq!(severity, "warning");
}

#[tokio::test]
async fn task_lifecycle_rows() {
    let log = log().await;
    let id = log.start_task("/phase:R/step:s1", 1_000).await.unwrap();
    assert_eq!(log.task_status(&id).await.unwrap(), Some(TaskStatus::Started));

    log.finish_task(&id, TaskStatus::Completed, 2_000).await.unwrap();
    assert_eq!(log.task_status(&id).await.unwrap(), Some(TaskStatus::Completed));
}
