// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Construct-once behaviour of the resource cache under concurrent access.

mod common;

use futures::future::join_all;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

use common::{default_factory, feedback, harness, profile, MockFactory};

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_first_access_builds_once() {
    let dir = TempDir::new().unwrap();
    let factory = MockFactory {
        build_delay: Duration::from_millis(25),
        ..default_factory()
    };
    let h = harness(dir.path(), factory);

    let lookups = (0..16).map(|_| {
        let cache = Arc::clone(&h.cache);
        tokio::spawn(async move { cache.get_store(&profile("Jane Doe")).await })
    });
    let stores: Vec<_> = join_all(lookups)
        .await
        .into_iter()
        .map(|joined| joined.unwrap().unwrap())
        .collect();

    assert!(stores.iter().all(|s| Arc::ptr_eq(s, &stores[0])));
    assert_eq!(h.factory.embedding_builds.load(Ordering::SeqCst), 1);
    assert_eq!(h.cache.loaded_store_count(), 1);
}

#[tokio::test]
async fn test_generation_provider_built_once() {
    let dir = TempDir::new().unwrap();
    let h = harness(dir.path(), default_factory());

    let (a, b) = tokio::join!(
        h.cache.get_generation_provider(),
        h.cache.get_generation_provider()
    );
    assert!(Arc::ptr_eq(&a.ok().unwrap(), &b.ok().unwrap()));
    assert_eq!(h.factory.generation_builds.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_failed_construction_is_retried() {
    let dir = TempDir::new().unwrap();
    let factory = MockFactory {
        failing_builds: AtomicUsize::new(1),
        ..default_factory()
    };
    let h = harness(dir.path(), factory);
    let default = profile("default");

    assert!(h.cache.get_store(&default).await.is_err());
    assert_eq!(h.cache.loaded_store_count(), 0);

    assert!(h.cache.get_store(&default).await.is_ok());
    assert_eq!(h.factory.embedding_builds.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_warm_up_loads_profiles_with_feedback() {
    let dir = TempDir::new().unwrap();
    {
        let h = harness(dir.path(), default_factory());
        for name in ["Jane Doe", "alice"] {
            h.generator
                .submit_feedback(feedback(name, "ctx", "positive", "nice"))
                .await
                .unwrap();
        }
    }

    let h = harness(dir.path(), default_factory());
    assert_eq!(h.cache.known_profiles().await.unwrap(), vec!["alice", "jane_doe"]);
    assert_eq!(h.cache.warm_up().await.unwrap(), 2);
    assert_eq!(h.cache.loaded_store_count(), 2);

    let jane = h.cache.get_store(&profile("Jane Doe")).await.unwrap();
    assert_eq!(jane.len().await, 1);
}
