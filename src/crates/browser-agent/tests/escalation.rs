//! Integration tests for the escalation entry point and the HTTP client.

use async_trait::async_trait;
use axum::{
    extract::Path,
    routing::{delete, post},
    Json, Router,
};
use browser_agent::{
    escalate, AgentConfig, AgentError, AgentOutput, AgentTask, BrowserAgent, EscalationBudget,
    HttpBrowserAgent, TimeoutScope, NO_TREATMENT_FOUND,
};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Agent that answers after a delay.
struct ScriptedAgent {
    delay: Duration,
    output: AgentOutput,
    seen: Arc<Mutex<Vec<AgentTask>>>,
}

impl ScriptedAgent {
    fn new(delay: Duration, output: AgentOutput) -> Self {
        Self {
            delay,
            output,
            seen: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

#[async_trait]
impl BrowserAgent for ScriptedAgent {
    async fn run(&self, task: &AgentTask, _budget: &EscalationBudget) -> browser_agent::Result<AgentOutput> {
        self.seen.lock().unwrap().push(task.clone());
        tokio::time::sleep(self.delay).await;
        Ok(self.output.clone())
    }
}

/// Agent whose browser crashes.
struct CrashingAgent;

#[async_trait]
impl BrowserAgent for CrashingAgent {
    async fn run(&self, _task: &AgentTask, _budget: &EscalationBudget) -> browser_agent::Result<AgentOutput> {
        Err(AgentError::SessionError("browser process exited".into()))
    }
}

fn quick_config() -> AgentConfig {
    AgentConfig::default().with_timeouts(1, 2, 3)
}

#[tokio::test(start_paused = true)]
async fn test_escalation_extracts_transcript_answer() {
    let agent = ScriptedAgent::new(
        Duration::from_millis(500),
        AgentOutput::RawTranscript("accepted cookies\nFINAL ANSWER: Use allopurinol to lower uric acid.\n".into()),
    );

    let treatment = escalate(&agent, &quick_config(), "gout").await.unwrap();
    assert_eq!(treatment, "Use allopurinol to lower uric acid.");

    let seen = agent.seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert!(seen[0].description.contains("treatments for gout"));
}

#[tokio::test(start_paused = true)]
async fn test_escalation_times_out_on_task_budget() {
    let agent = ScriptedAgent::new(
        Duration::from_secs(60),
        AgentOutput::Structured("too late".into()),
    );

    let err = escalate(&agent, &quick_config(), "gout").await.unwrap_err();
    match err {
        AgentError::Timeout { scope, after } => {
            assert_eq!(scope, TimeoutScope::Task);
            assert_eq!(after, Duration::from_secs(3));
        }
        other => panic!("Expected task timeout, got {other:?}"),
    }
}

#[tokio::test(start_paused = true)]
async fn test_unrecognized_output_is_sentinel() {
    let agent = ScriptedAgent::new(Duration::ZERO, AgentOutput::Unrecognized);
    let treatment = escalate(&agent, &quick_config(), "gout").await.unwrap();
    assert_eq!(treatment, NO_TREATMENT_FOUND);
}

#[tokio::test]
async fn test_agent_errors_propagate() {
    let err = escalate(&CrashingAgent, &quick_config(), "gout").await.unwrap_err();
    assert!(matches!(err, AgentError::SessionError(_)));
}

async fn spawn_sidecar(
    run_reply: Value,
    run_delay: Duration,
    closed: Arc<Mutex<Vec<String>>>,
) -> String {
    let app = Router::new()
        .route(
            "/sessions",
            post(|Json(body): Json<Value>| async move {
                assert_eq!(body["headless"], true);
                Json(json!({"session_id": "s-1"}))
            }),
        )
        .route(
            "/sessions/:id/run",
            post(move |Path(id): Path<String>, Json(task): Json<Value>| {
                let reply = run_reply.clone();
                async move {
                    tokio::time::sleep(run_delay).await;
                    assert_eq!(id, "s-1");
                    assert!(task["description"].as_str().unwrap().contains("asthma"));
                    assert_eq!(task["max_steps"], 20);
                    Json(reply)
                }
            }),
        )
        .route(
            "/sessions/:id",
            delete(move |Path(id): Path<String>| {
                let closed = closed.clone();
                async move {
                    closed.lock().unwrap().push(id);
                    Json(json!({}))
                }
            }),
        );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

#[tokio::test]
async fn test_http_agent_full_session() {
    let closed = Arc::new(Mutex::new(Vec::new()));
    let base = spawn_sidecar(
        json!({"output": "Use an inhaler with albuterol.", "steps": 7}),
        Duration::ZERO,
        closed.clone(),
    )
    .await;

    let config = AgentConfig::new(base);
    let agent = HttpBrowserAgent::new(&config).unwrap();
    let treatment = escalate(&agent, &config, "asthma").await.unwrap();

    assert_eq!(treatment, "Use an inhaler with albuterol.");
    assert_eq!(*closed.lock().unwrap(), vec!["s-1".to_string()]);
}

#[tokio::test]
async fn test_http_agent_reported_error_still_closes_session() {
    let closed = Arc::new(Mutex::new(Vec::new()));
    let base = spawn_sidecar(json!({"error": "captcha wall"}), Duration::ZERO, closed.clone()).await;

    let config = AgentConfig::new(base);
    let agent = HttpBrowserAgent::new(&config).unwrap();
    let err = escalate(&agent, &config, "asthma").await.unwrap_err();

    assert!(matches!(err, AgentError::AgentFailed(ref m) if m == "captcha wall"));
    assert_eq!(closed.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_http_agent_closes_session_after_task_timeout() {
    let closed = Arc::new(Mutex::new(Vec::new()));
    let base = spawn_sidecar(
        json!({"output": "Too late."}),
        Duration::from_secs(5),
        closed.clone(),
    )
    .await;

    let config = AgentConfig::new(base).with_timeouts(1, 2, 2);
    let agent = HttpBrowserAgent::new(&config).unwrap();
    let err = escalate(&agent, &config, "asthma").await.unwrap_err();
    assert!(matches!(err, AgentError::Timeout { scope: TimeoutScope::Task, .. }));

    // Teardown may finish in the background after the deadline.
    for _ in 0..40 {
        if !closed.lock().unwrap().is_empty() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    assert_eq!(*closed.lock().unwrap(), vec!["s-1".to_string()]);
}

#[tokio::test]
async fn test_http_agent_unreachable() {
    let config = AgentConfig::new("http://127.0.0.1:9");
    let agent = HttpBrowserAgent::new(&config).unwrap();
    let err = escalate(&agent, &config, "asthma").await.unwrap_err();
    assert!(matches!(err, AgentError::HttpError(_)));
}
