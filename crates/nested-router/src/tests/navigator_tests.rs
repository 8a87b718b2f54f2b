//! Navigator tests
//!
//! End-to-end resolution: redirects, fallbacks, superseding, and prefetch.

use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;

use crate::config::RouterConfig;
use crate::context::EmptyContext;
use crate::definition::{RouteDefinition, index, route};
use crate::error::FailureKind;
use crate::loader::{LoaderArgs, LoaderSignal};
use crate::logging::OutcomeKind;
use crate::module::RouteModule;
use crate::navigator::{NavigationOutcome, Navigator};
use crate::tree::RouteTree;

fn navigator(definitions: Vec<RouteDefinition>, config: RouterConfig) -> Navigator {
    let tree: RouteTree = RouteTree::build(definitions, &config).unwrap();
    Navigator::new(tree, EmptyContext)
}

fn redirecting(name: &'static str, target: &'static str) -> RouteModule {
    RouteModule::new(name).loader(move |_args: LoaderArgs| async move {
        Err::<Value, _>(LoaderSignal::redirect(target))
    })
}

fn stuck(name: &'static str, started: &Arc<Notify>) -> RouteModule {
    let started = started.clone();
    RouteModule::new(name).loader(move |_args: LoaderArgs| {
        let started = started.clone();
        async move {
            started.notify_one();
            futures::future::pending::<()>().await;
            Ok::<_, LoaderSignal>(Value::Null)
        }
    })
}

fn gallery_routes() -> Vec<RouteDefinition> {
    let album = RouteModule::new("gallery-album").loader(|args: LoaderArgs| async move {
        match args.param("albumId") {
            Some("404") => Err(LoaderSignal::not_found()),
            id => Ok(json!({ "album": id })),
        }
    });

    vec![
        index("home"),
        route("about", "about"),
        route(
            "gallery",
            RouteModule::new("gallery").error_boundary(|props| json!({ "error": props.failure.kind })),
        )
        .children(vec![index("gallery-home"), route("albums/:albumId", album)]),
    ]
}

// =============================================================================
// Outcomes
// =============================================================================

#[tokio::test]
async fn test_navigate_renders_loaded_chain() {
    let nav = navigator(gallery_routes(), RouterConfig::default());

    let outcome = nav.navigate("/gallery/albums/42").await.unwrap();

    assert!(outcome.is_rendered());
    let composition = outcome.composition().unwrap();
    assert_eq!(composition.module_name(), "gallery");
    assert_eq!(composition.leaf().data(), &json!({ "album": "42" }));
    assert!(outcome.failure().is_none());
    assert_eq!(nav.manager().active_count(), 0);
}

#[tokio::test]
async fn test_unmatched_path_fails_not_found() {
    let nav = navigator(gallery_routes(), RouterConfig::default());

    let outcome = nav.navigate("/missing/page").await.unwrap();

    let NavigationOutcome::Failed(failure) = outcome else {
        panic!("expected failure, got {:?}", outcome);
    };
    assert_eq!(failure.kind, FailureKind::NotFound);
    assert!(failure.node_id.is_none());
}

#[tokio::test]
async fn test_loader_not_found_falls_back_to_boundary() {
    let nav = navigator(gallery_routes(), RouterConfig::default());

    let outcome = nav.navigate("/gallery/albums/404").await.unwrap();

    let NavigationOutcome::Fallback {
        composition,
        failure,
    } = outcome
    else {
        panic!("expected fallback, got {:?}", outcome);
    };
    assert_eq!(failure.kind, FailureKind::NotFound);
    assert_eq!(failure.node_id.as_ref().unwrap().as_str(), "/gallery/albums/:albumId");
    assert_eq!(composition.depth(), 1);
    assert_eq!(composition.render(), json!({ "error": "not_found" }));
}

#[tokio::test]
async fn test_failure_without_boundary_is_unrecoverable() {
    let broken = RouteModule::new("broken").loader(|_args: LoaderArgs| async move {
        Err::<Value, _>(LoaderSignal::error("boom"))
    });
    let nav = navigator(vec![route("broken", broken)], RouterConfig::default());

    let outcome = nav.navigate("/broken").await.unwrap();

    let NavigationOutcome::Failed(failure) = outcome else {
        panic!("expected failure, got {:?}", outcome);
    };
    assert_eq!(failure.kind, FailureKind::LoaderError);
    assert!(!failure.recoverable);
}

// =============================================================================
// Redirects
// =============================================================================

fn guarded_routes() -> Vec<RouteDefinition> {
    vec![
        route("admin", redirecting("admin", "/login")),
        route("login", "login"),
    ]
}

#[tokio::test]
async fn test_redirect_returned_to_caller_by_default() {
    let nav = navigator(guarded_routes(), RouterConfig::default());

    let outcome = nav.navigate("/admin").await.unwrap();
    assert!(matches!(outcome, NavigationOutcome::Redirect(ref target) if target == "/login"));
}

#[tokio::test]
async fn test_redirect_followed_when_configured() {
    let nav = navigator(guarded_routes(), RouterConfig::new().with_follow_redirects(true));

    let outcome = nav.navigate("/admin").await.unwrap();
    assert_eq!(outcome.composition().unwrap().module_name(), "login");
}

#[tokio::test]
async fn test_redirect_loop_exhausts_budget() {
    let config = RouterConfig::new()
        .with_follow_redirects(true)
        .with_max_redirects(3);
    let nav = navigator(
        vec![
            route("ping", redirecting("ping", "/pong")),
            route("pong", redirecting("pong", "/ping")),
        ],
        config,
    );

    let outcome = nav.navigate("/ping").await.unwrap();

    let NavigationOutcome::Failed(failure) = outcome else {
        panic!("expected redirect loop, got {:?}", outcome);
    };
    assert_eq!(failure.kind, FailureKind::RedirectLoop);
    assert!(!failure.recoverable);
    assert!(failure.redirect_target.is_some());
}

// =============================================================================
// Superseding and cancellation
// =============================================================================

#[tokio::test]
async fn test_new_navigation_supersedes_previous_on_same_key() {
    let started = Arc::new(Notify::new());
    let nav = navigator(
        vec![route("slow", stuck("slow", &started)), route("about", "about")],
        RouterConfig::default(),
    );

    let first = {
        let nav = nav.clone();
        tokio::spawn(async move { nav.navigate_keyed("tab", "/slow").await })
    };
    started.notified().await;

    let second = nav.navigate_keyed("tab", "/about").await.unwrap();
    assert!(second.is_rendered());

    let first = tokio::time::timeout(Duration::from_secs(1), first)
        .await
        .expect("superseded navigation should stop")
        .unwrap()
        .unwrap();
    assert!(first.is_cancelled());
    assert_eq!(nav.manager().active_count(), 0);
}

#[tokio::test]
async fn test_navigations_on_different_keys_are_independent() {
    let nav = navigator(gallery_routes(), RouterConfig::default());

    let (left, right) = tokio::join!(
        nav.navigate_keyed("left", "/about"),
        nav.navigate_keyed("right", "/gallery")
    );

    assert!(left.unwrap().is_rendered());
    assert_eq!(
        right.unwrap().composition().unwrap().leaf().module_name(),
        "gallery-home"
    );
}

#[tokio::test]
async fn test_explicit_cancel() {
    let started = Arc::new(Notify::new());
    let nav = navigator(vec![route("slow", stuck("slow", &started))], RouterConfig::default());

    let pending = {
        let nav = nav.clone();
        tokio::spawn(async move { nav.navigate_keyed("tab", "/slow").await })
    };
    started.notified().await;

    assert!(nav.cancel("tab"));
    assert!(!nav.cancel("tab"));

    let outcome = tokio::time::timeout(Duration::from_secs(1), pending)
        .await
        .expect("cancelled navigation should stop")
        .unwrap()
        .unwrap();
    assert!(outcome.is_cancelled());
}

// =============================================================================
// Prefetch and context
// =============================================================================

#[tokio::test]
async fn test_prefetch_returns_results_in_input_order() {
    let nav = navigator(gallery_routes(), RouterConfig::default());

    let results = nav.prefetch(["/about", "/nope", "/gallery/albums/7"]).await;

    let labels: Vec<_> = results.iter().map(|r| r.as_ref().unwrap().label()).collect();
    assert_eq!(labels, vec!["rendered", "failed", "rendered"]);
    assert_eq!(results[1].as_ref().unwrap().kind(), OutcomeKind::Failed);
    assert_eq!(nav.manager().active_count(), 0);
}

#[derive(Clone)]
struct Catalog {
    albums: Vec<&'static str>,
}

#[tokio::test]
async fn test_loaders_receive_application_context() {
    let listing = RouteModule::new("albums").loader(|args: LoaderArgs<Catalog>| async move {
        Ok::<_, LoaderSignal>(args.ctx.albums.clone())
    });
    let tree: RouteTree<Catalog> =
        RouteTree::build(vec![route("albums", listing)], &RouterConfig::default()).unwrap();
    let nav = Navigator::new(
        tree,
        Catalog {
            albums: vec!["summer", "winter"],
        },
    );

    let outcome = nav.navigate("/albums").await.unwrap();
    assert_eq!(
        outcome.composition().unwrap().data(),
        &json!(["summer", "winter"])
    );
}
