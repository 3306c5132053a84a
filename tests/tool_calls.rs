//! End-to-end tool calls through the registry, one section per component.

use std::sync::Arc;
use std::time::Duration;

use pretty_assertions::assert_eq;
use serde_json::{Value, json};

use toolhouse::config::{GuardConfig, LedgerConfig};
use toolhouse::tools::{CallContext, ToolError, ToolRegistry};
use toolhouse::{Config, Toolbox};

async fn registry_with(config: Config) -> ToolRegistry {
    ToolRegistry::with_toolbox(&Toolbox::new(&config)).await
}

async fn call(registry: &ToolRegistry, tool: &str, args: Value) -> Result<Value, ToolError> {
    registry
        .execute(tool, args, &CallContext::new())
        .await
        .map(|out| out.result)
}

async fn available(registry: &ToolRegistry, sku: &str) -> u64 {
    call(registry, "ledger.checkAvailability", json!({ "sku": sku }))
        .await
        .unwrap()["available"]
        .as_u64()
        .unwrap()
}

#[tokio::test(start_paused = true)]
async fn memo_hit_within_ttl_and_miss_after() {
    let registry = registry_with(Config::default()).await;
    let args = json!({ "input": "the quick brown fox" });

    let first = call(&registry, "memo.computeOrFetch", args.clone()).await.unwrap();
    let second = call(&registry, "memo.computeOrFetch", args.clone()).await.unwrap();
    assert_eq!(first["cached"], false);
    assert_eq!(second["cached"], true);
    assert_eq!(first["value"], second["value"]);
    assert_eq!(first["value"]["wordCount"], 4);

    tokio::time::advance(Duration::from_secs(31)).await;
    let stats = call(&registry, "memo.stats", json!({})).await.unwrap();
    assert_eq!(stats, json!({ "total": 1, "alive": 0, "ttl": 30 }));

    let third = call(&registry, "memo.computeOrFetch", args).await.unwrap();
    assert_eq!(third["cached"], false);
    assert_eq!(third["value"], first["value"]);
}

#[tokio::test(start_paused = true)]
async fn limiter_caps_then_resumes() {
    let registry = registry_with(Config::default()).await;
    let args = json!({ "clientId": "agent-7" });

    for _ in 0..5 {
        let out = call(&registry, "limiter.admit", args.clone()).await.unwrap();
        assert_eq!(out, json!({ "clientId": "agent-7", "accepted": true }));
    }
    let err = call(&registry, "limiter.admit", args.clone()).await.unwrap_err();
    assert_eq!(err.kind(), "rate_limit_exceeded");
    assert!(err.is_transient());

    // Other clients are unaffected.
    assert!(call(&registry, "limiter.admit", json!({ "clientId": "other" })).await.is_ok());

    tokio::time::advance(Duration::from_secs(61)).await;
    assert!(call(&registry, "limiter.admit", args).await.is_ok());
}

#[tokio::test(start_paused = true)]
async fn job_runs_to_completion() {
    let registry = registry_with(Config::default()).await;

    let submitted = call(&registry, "jobs.submit", json!({ "durationHint": 10 }))
        .await
        .unwrap();
    let job_id = submitted["jobId"].as_str().unwrap().to_string();

    let status = call(&registry, "jobs.status", json!({ "jobId": job_id })).await.unwrap();
    let early = status["status"].as_str().unwrap();
    assert!(early == "queued" || early == "running", "got {early}");

    tokio::time::sleep(Duration::from_secs(11)).await;
    let status = call(&registry, "jobs.status", json!({ "jobId": job_id })).await.unwrap();
    assert_eq!(status["status"], "completed");
    assert_eq!(status["result"], "Job waited 10 seconds.");
}

#[tokio::test]
async fn job_rejections() {
    let registry = registry_with(Config::default()).await;

    let err = call(&registry, "jobs.submit", json!({ "durationHint": -1 }))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), "invalid_argument");

    let err = call(&registry, "jobs.status", json!({ "jobId": uuid_like() }))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), "not_found");

    let err = call(&registry, "jobs.status", json!({ "jobId": "not-a-uuid" }))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), "not_found");
}

fn uuid_like() -> &'static str {
    "6f1c1f34-2a55-4d8e-9a43-0c8e2a1d4b7e"
}

#[tokio::test]
async fn guard_distinguishes_deployment_from_caller_errors() {
    let args = json!({ "credential": "s3cret", "message": "rotate keys" });

    let unset = registry_with(Config::default()).await;
    let err = call(&unset, "guard.guardedOp", args.clone()).await.unwrap_err();
    assert_eq!(err.kind(), "misconfigured");
    assert_eq!(call(&unset, "guard.publicOp", json!({})).await.unwrap(), "pong");

    let registry = registry_with(Config {
        guard: GuardConfig::with_secret("s3cret"),
        ..Config::default()
    })
    .await;
    let err = call(
        &registry,
        "guard.guardedOp",
        json!({ "credential": "s3cre", "message": "rotate keys" }),
    )
    .await
    .unwrap_err();
    assert_eq!(err.kind(), "unauthorized");

    let first = call(&registry, "guard.guardedOp", args.clone()).await.unwrap();
    let second = call(&registry, "guard.guardedOp", args).await.unwrap();
    assert_eq!(first["saved"], true);
    assert_eq!(first["message"], "rotate keys");
    assert_eq!(second["sequence"].as_u64(), first["sequence"].as_u64().map(|n| n + 1));
}

#[tokio::test]
async fn order_lifecycle_restores_stock() {
    let registry = registry_with(Config::default()).await;
    assert_eq!(available(&registry, "A-100").await, 5);

    let o1 = call(
        &registry,
        "ledger.createOrder",
        json!({ "orderId": "o1", "sku": "A-100", "quantity": 3 }),
    )
    .await
    .unwrap();
    assert_eq!(o1["status"], "created");
    assert_eq!(available(&registry, "A-100").await, 2);

    let err = call(
        &registry,
        "ledger.createOrder",
        json!({ "orderId": "o2", "sku": "A-100", "quantity": 3 }),
    )
    .await
    .unwrap_err();
    assert_eq!(err.kind(), "insufficient_stock");
    assert_eq!(available(&registry, "A-100").await, 2);
    let err = call(&registry, "ledger.getOrder", json!({ "orderId": "o2" }))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), "not_found");

    let cancelled = call(&registry, "ledger.cancelOrder", json!({ "orderId": "o1" }))
        .await
        .unwrap();
    assert_eq!(cancelled["status"], "cancelled");
    assert_eq!(available(&registry, "A-100").await, 5);

    let again = call(&registry, "ledger.cancelOrder", json!({ "orderId": "o1" }))
        .await
        .unwrap();
    assert_eq!(again, cancelled);
    assert_eq!(available(&registry, "A-100").await, 5);
}

#[tokio::test]
async fn order_rejections_change_nothing() {
    let registry = registry_with(Config::default()).await;

    for args in [
        json!({ "orderId": "z", "sku": "C-300", "quantity": 0 }),
        json!({ "orderId": "z", "sku": "C-300", "quantity": -2 }),
        json!({ "orderId": "z", "sku": "C-300", "quantity": 1.5 }),
        json!({ "orderId": "z", "sku": "C-300" }),
    ] {
        let err = call(&registry, "ledger.createOrder", args).await.unwrap_err();
        assert_eq!(err.kind(), "invalid_argument");
    }
    assert_eq!(available(&registry, "C-300").await, 12);

    let err = call(
        &registry,
        "ledger.createOrder",
        json!({ "orderId": "b", "sku": "B-200", "quantity": 1 }),
    )
    .await
    .unwrap_err();
    assert_eq!(err.kind(), "insufficient_stock");

    let err = call(&registry, "ledger.cancelOrder", json!({ "orderId": "never" }))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), "not_found");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_orders_never_oversell() {
    const STOCK: u64 = 7;
    const CALLS: usize = 20;

    let registry = Arc::new(
        registry_with(Config {
            ledger: LedgerConfig::new([("Z-1", STOCK)]),
            ..Config::default()
        })
        .await,
    );

    let handles: Vec<_> = (0..CALLS)
        .map(|i| {
            let registry = Arc::clone(&registry);
            tokio::spawn(async move {
                call(
                    &registry,
                    "ledger.createOrder",
                    json!({ "orderId": format!("c{i}"), "sku": "Z-1", "quantity": 1 }),
                )
                .await
            })
        })
        .collect();

    let mut succeeded = 0;
    let mut short = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => succeeded += 1,
            Err(e) => {
                assert_eq!(e.kind(), "insufficient_stock");
                short += 1;
            }
        }
    }

    assert_eq!(succeeded, STOCK as usize);
    assert_eq!(short, CALLS - STOCK as usize);
    assert_eq!(available(&registry, "Z-1").await, 0);
}

#[tokio::test]
async fn metrics_count_every_call() {
    let registry = registry_with(Config::default()).await;

    call(&registry, "guard.publicOp", json!({})).await.unwrap();
    let _ = call(&registry, "ledger.getOrder", json!({ "orderId": "x" })).await;

    let metrics = call(&registry, "server.metrics", json!({})).await.unwrap();
    assert_eq!(metrics["requestsTotal"], 2);
    assert_eq!(metrics["errorsTotal"], 1);
}
