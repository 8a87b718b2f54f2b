//! Loader pipeline tests
//!
//! Ordering, halting, cancellation, timeouts, and panic capture.

use proptest::prelude::*;
use serde_json::{Value, json};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Notify;

use crate::config::RouterConfig;
use crate::context::EmptyContext;
use crate::definition::{RouteDefinition, layout, route};
use crate::error::FailureKind;
use crate::loader::{
    LoaderArgs, LoaderOutcome, LoaderPipeline, LoaderResult, LoaderSignal, NavigationToken,
    PipelineOutcome,
};
use crate::matcher::MatchResult;
use crate::module::RouteModule;
use crate::tree::{NodeId, RouteTree};

type Log = Arc<Mutex<Vec<&'static str>>>;

fn matched(definitions: Vec<RouteDefinition>, path: &str) -> MatchResult {
    let tree: RouteTree = RouteTree::build(definitions, &RouterConfig::default()).unwrap();
    tree.match_path(path).unwrap()
}

fn pipeline() -> LoaderPipeline {
    LoaderPipeline::new(EmptyContext, &RouterConfig::default())
}

/// Loader that waits `delay_ms`, then records its name.
fn recording(name: &'static str, delay_ms: u64, log: &Log) -> RouteModule {
    let log = log.clone();
    RouteModule::new(name).loader(move |args: LoaderArgs| {
        let log = log.clone();
        async move {
            tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            log.lock().unwrap().push(name);
            Ok::<_, LoaderSignal>(json!({ "name": name, "ancestors": args.ancestors().count() }))
        }
    })
}

/// Loader that counts its invocations.
fn counting(name: &'static str, calls: &Arc<AtomicUsize>) -> RouteModule {
    let calls = calls.clone();
    RouteModule::new(name).loader(move |_args: LoaderArgs| {
        let calls = calls.clone();
        async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok::<_, LoaderSignal>(json!(name))
        }
    })
}

fn a_b_c(b: RouteModule, c: RouteModule) -> Vec<RouteDefinition> {
    vec![route("a", "a").children(vec![route("b", b).children(vec![route("c", c)])])]
}

// =============================================================================
// Ordering
// =============================================================================

#[tokio::test]
async fn test_loaders_run_strictly_parent_to_child() {
    let log: Log = Arc::new(Mutex::new(Vec::new()));

    // The outer loaders are the slowest; concurrent execution would invert the log.
    let chain = matched(
        vec![layout(
            recording("shell", 30, &log),
            vec![route("gallery", recording("gallery", 10, &log)).children(vec![route(
                "albums/:albumId",
                recording("album", 0, &log),
            )])],
        )],
        "/gallery/albums/42",
    );

    let outcome = pipeline().run(&chain, &NavigationToken::new()).await;

    assert_eq!(*log.lock().unwrap(), vec!["shell", "gallery", "album"]);
    let PipelineOutcome::Complete(outcomes) = outcome else {
        panic!("expected complete, got {:?}", outcome);
    };
    assert_eq!(outcomes.len(), 3);
    assert_eq!(
        outcomes.data("/gallery/albums/:albumId"),
        Some(&json!({ "name": "album", "ancestors": 2 }))
    );
    assert_eq!(
        outcomes.data("/#layout:shell"),
        Some(&json!({ "name": "shell", "ancestors": 0 }))
    );
}

#[tokio::test]
async fn test_child_sees_parent_data_and_params() {
    let gallery = RouteModule::new("gallery").loader(|_args: LoaderArgs| async move {
        Ok::<_, LoaderSignal>(json!({ "title": "Summer" }))
    });
    let album = RouteModule::new("album").loader(|args: LoaderArgs| async move {
        let title = args
            .parent_data("/gallery")
            .and_then(|data| data.get("title"))
            .cloned()
            .unwrap_or(Value::Null);
        Ok::<_, LoaderSignal>(json!({
            "title": title,
            "albumId": args.param("albumId"),
            "own": args.own_params.len(),
            "path": args.path,
        }))
    });

    let chain = matched(
        vec![route("gallery", gallery).children(vec![route("albums/:albumId", album)])],
        "/gallery/albums/42/",
    );

    let PipelineOutcome::Complete(outcomes) = pipeline().run(&chain, &NavigationToken::new()).await
    else {
        panic!("expected complete");
    };
    assert_eq!(
        outcomes.data("/gallery/albums/:albumId"),
        Some(&json!({ "title": "Summer", "albumId": "42", "own": 1, "path": "/gallery/albums/42" }))
    );
}

#[tokio::test]
async fn test_nodes_without_loader_get_null_data() {
    let calls = Arc::new(AtomicUsize::new(0));
    let chain = matched(a_b_c(RouteModule::new("b"), counting("c", &calls)), "/a/b/c");

    let PipelineOutcome::Complete(outcomes) = pipeline().run(&chain, &NavigationToken::new()).await
    else {
        panic!("expected complete");
    };

    assert_eq!(outcomes.get("/a"), Some(&LoaderOutcome::Data(Value::Null)));
    assert_eq!(outcomes.get("/a/b"), Some(&LoaderOutcome::Data(Value::Null)));
    assert_eq!(outcomes.data("/a/b/c"), Some(&json!("c")));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

// =============================================================================
// Halting
// =============================================================================

#[tokio::test]
async fn test_redirect_halts_deeper_loaders() {
    let calls = Arc::new(AtomicUsize::new(0));
    let guard = RouteModule::new("b").loader(|_args: LoaderArgs| async move {
        Err::<Value, _>(LoaderSignal::redirect("/login"))
    });

    let chain = matched(a_b_c(guard, counting("c", &calls)), "/a/b/c");
    let outcome = pipeline().run(&chain, &NavigationToken::new()).await;

    assert_eq!(
        outcome,
        PipelineOutcome::Redirect {
            node_id: "/a/b".into(),
            target: "/login".into(),
        }
    );
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_not_found_is_attributed_to_its_node() {
    let calls = Arc::new(AtomicUsize::new(0));
    let missing = RouteModule::new("b").loader(|_args: LoaderArgs| async move {
        Err::<Value, _>(LoaderSignal::not_found())
    });

    let chain = matched(a_b_c(missing, counting("c", &calls)), "/a/b/c");
    let outcome = pipeline().run(&chain, &NavigationToken::new()).await;

    let PipelineOutcome::Failed { failure, partial } = outcome else {
        panic!("expected failure, got {:?}", outcome);
    };
    assert_eq!(failure.kind, FailureKind::NotFound);
    assert_eq!(failure.node_id.as_ref().map(|id| id.as_str()), Some("/a/b"));
    assert_eq!(failure.ancestors, vec![NodeId::from("/a")]);
    assert!(failure.recoverable);

    assert_eq!(partial.len(), 2);
    assert_eq!(partial.get("/a/b"), Some(&LoaderOutcome::NotFound));
    assert!(!partial.contains("/a/b/c"));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_loader_error_is_surfaced() {
    let calls = Arc::new(AtomicUsize::new(0));
    let broken = RouteModule::new("a").loader(|_args: LoaderArgs| async move {
        Err::<Value, _>(LoaderSignal::error("database unavailable"))
    });

    let chain = matched(
        vec![route("a", broken).children(vec![route("b", counting("b", &calls))])],
        "/a/b",
    );
    let outcome = pipeline().run(&chain, &NavigationToken::new()).await;

    let PipelineOutcome::Failed { failure, partial } = outcome else {
        panic!("expected failure, got {:?}", outcome);
    };
    assert_eq!(failure.kind, FailureKind::LoaderError);
    assert_eq!(
        failure.cause.as_ref().map(|c| c.message.as_str()),
        Some("database unavailable")
    );
    assert!(failure.ancestors.is_empty());
    assert_eq!(partial.len(), 1);
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

// =============================================================================
// Cancellation
// =============================================================================

#[tokio::test]
async fn test_cancel_mid_flight_stops_the_chain() {
    let calls = Arc::new(AtomicUsize::new(0));
    let started = Arc::new(Notify::new());

    let stuck = {
        let started = started.clone();
        RouteModule::new("b").loader(move |_args: LoaderArgs| {
            let started = started.clone();
            async move {
                started.notify_one();
                futures::future::pending::<()>().await;
                Ok::<_, LoaderSignal>(Value::Null)
            }
        })
    };

    let chain = matched(a_b_c(stuck, counting("c", &calls)), "/a/b/c");
    let token = NavigationToken::new();
    let run = {
        let pipeline = pipeline();
        let token = token.clone();
        tokio::spawn(async move { pipeline.run(&chain, &token).await })
    };

    started.notified().await;
    token.cancel();

    let outcome = tokio::time::timeout(Duration::from_secs(1), run)
        .await
        .expect("pipeline should stop after cancel")
        .unwrap();
    assert!(outcome.is_cancelled());
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_outcome_arriving_after_cancel_is_discarded() {
    let calls = Arc::new(AtomicUsize::new(0));
    let late = RouteModule::new("b").loader(|args: LoaderArgs| async move {
        args.token.cancel();
        Ok::<_, LoaderSignal>(json!("late"))
    });

    let chain = matched(a_b_c(late, counting("c", &calls)), "/a/b/c");
    let outcome = pipeline().run(&chain, &NavigationToken::new()).await;

    assert_eq!(outcome, PipelineOutcome::Cancelled);
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_cancelled_token_runs_nothing() {
    let calls = Arc::new(AtomicUsize::new(0));
    let chain = matched(vec![route("a", counting("a", &calls))], "/a");

    let token = NavigationToken::new();
    token.cancel();

    assert!(pipeline().run(&chain, &token).await.is_cancelled());
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

// =============================================================================
// Timeouts and panics
// =============================================================================

#[tokio::test(start_paused = true)]
async fn test_slow_loader_times_out() {
    let slow = RouteModule::new("slow").loader(|_args: LoaderArgs| async move {
        tokio::time::sleep(Duration::from_secs(10)).await;
        Ok::<_, LoaderSignal>(json!("too late"))
    });
    let chain = matched(vec![route("slow", slow)], "/slow");
    let pipeline: LoaderPipeline =
        LoaderPipeline::new(EmptyContext, &RouterConfig::new().with_loader_timeout(50));

    let outcome = pipeline.run(&chain, &NavigationToken::new()).await;

    let PipelineOutcome::Failed { failure, .. } = outcome else {
        panic!("expected timeout failure, got {:?}", outcome);
    };
    assert_eq!(failure.kind, FailureKind::LoaderError);
    let cause = failure.cause.unwrap();
    assert!(cause.message.contains("timed out"));
    assert_eq!(cause.details, Some(json!({ "timeout_ms": 50 })));
}

async fn exploding_loader(_args: LoaderArgs) -> LoaderResult<Value> {
    panic!("loader exploded")
}

#[tokio::test]
async fn test_panicking_loader_becomes_error_outcome() {
    let chain = matched(
        vec![route("boom", RouteModule::new("boom").loader(exploding_loader))],
        "/boom",
    );

    let outcome = pipeline().run(&chain, &NavigationToken::new()).await;

    let PipelineOutcome::Failed { failure, partial } = outcome else {
        panic!("expected failure, got {:?}", outcome);
    };
    assert_eq!(failure.kind, FailureKind::LoaderError);
    assert_eq!(failure.cause.map(|c| c.message), Some("Loader panicked".to_string()));
    assert!(matches!(partial.get("/boom"), Some(LoaderOutcome::Error(_))));
}

// =============================================================================
// Property-Based Tests
// =============================================================================

fn chain_of_depth(depth: usize) -> (Vec<RouteDefinition>, String) {
    let names: Vec<String> = (0..depth).map(|i| format!("n{}", i)).collect();
    let innermost = route(names[depth - 1].clone(), names[depth - 1].clone());
    let definition = names[..depth - 1]
        .iter()
        .rev()
        .fold(innermost, |inner, name| route(name.clone(), name.clone()).child(inner));
    (vec![definition], format!("/{}", names.join("/")))
}

proptest! {
    /// A chain without loaders completes with one null outcome per node, in
    /// chain order.
    #[test]
    fn prop_loaderless_chain_yields_null_per_node(depth in 1usize..8) {
        let (definitions, path) = chain_of_depth(depth);
        let chain = matched(definitions, &path);

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        let token = NavigationToken::new();
        let outcome = runtime.block_on(pipeline().run(&chain, &token));

        let PipelineOutcome::Complete(outcomes) = outcome else {
            return Err(TestCaseError::fail("expected complete"));
        };
        prop_assert_eq!(outcomes.len(), depth);

        let loaded: Vec<_> = outcomes.iter().map(|(id, _)| id.clone()).collect();
        let expected: Vec<_> = chain.node_ids().into_iter().cloned().collect();
        prop_assert_eq!(loaded, expected);
        prop_assert!(outcomes.iter().all(|(_, o)| *o == LoaderOutcome::empty()));
    }
}
