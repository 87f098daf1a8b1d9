//! Tests for the scoped session.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU16, AtomicUsize, Ordering};

use sparsegen::{Contamination, Regime, Sample, SampleGenerator, Task};
use sparsegen_session::{properties, with_session, Session, SessionConfig, DRIVER_PORT_KEY, HOST_PORT_KEY};
use test_case::test_case;

/// Whether the properties still name the session on `port`.
///
/// Other tests may have started their own session by the time this runs, so
/// this only checks that `port` is gone.
fn still_published(port: u16) -> bool {
    properties::get(DRIVER_PORT_KEY) == Some(port.to_string())
        || properties::get(HOST_PORT_KEY).is_some_and(|v| v.ends_with(&format!(":{port}")))
}

#[test]
fn publishes_and_cleans_up() -> Result<(), String> {
    let config = SessionConfig {
        host: "testhost".to_string(),
        ..SessionConfig::default()
    };

    let port = with_session(&config, |session| {
        let port = session.driver_port();
        assert_eq!(properties::get(DRIVER_PORT_KEY), Some(port.to_string()));
        assert_eq!(properties::get(HOST_PORT_KEY), Some(format!("testhost:{port}")));
        port
    })?;

    assert!(!still_published(port));
    Ok(())
}

#[test]
fn cleans_up_after_panic() -> Result<(), String> {
    let seen = AtomicU16::new(0);

    let result = catch_unwind(AssertUnwindSafe(|| {
        with_session(&SessionConfig::default(), |session| {
            seen.store(session.driver_port(), Ordering::SeqCst);
            panic!("test body failed");
        })
    }));
    assert!(result.is_err());

    let port = seen.load(Ordering::SeqCst);
    assert_ne!(port, 0);
    assert!(!still_published(port));

    // The lock is usable again after the panic.
    let next = with_session(&SessionConfig::default(), |session| session.driver_port())?;
    assert_ne!(next, port);

    Ok(())
}

#[test]
fn one_session_at_a_time() {
    let active = AtomicUsize::new(0);
    let max_active = AtomicUsize::new(0);

    std::thread::scope(|s| {
        for _ in 0..8 {
            s.spawn(|| {
                with_session(&SessionConfig::default(), |_| {
                    let now = active.fetch_add(1, Ordering::SeqCst) + 1;
                    max_active.fetch_max(now, Ordering::SeqCst);
                    std::thread::sleep(std::time::Duration::from_millis(5));
                    active.fetch_sub(1, Ordering::SeqCst);
                })
                .unwrap_or_else(|e| unreachable!("{e}"));
            });
        }
    });

    assert_eq!(max_active.load(Ordering::SeqCst), 1);
}

#[test]
fn rejects_zero_parallelism() {
    let config = SessionConfig {
        default_parallelism: 0,
        ..SessionConfig::default()
    };
    assert!(Session::acquire(&config).is_err());
}

#[test]
fn dedicated_pool() -> Result<(), String> {
    let config = SessionConfig {
        app_name: "pool-test".to_string(),
        num_threads: 3,
        ..SessionConfig::default()
    };

    let guard = Session::acquire(&config)?;
    assert_eq!(guard.num_threads(), 3);
    assert_eq!(guard.config(), &config);

    let names = guard.map_partitions_with_index(guard.parallelize(6), |_, _| {
        vec![std::thread::current().name().map(str::to_string)]
    });
    assert_eq!(names.len(), 4);
    assert!(names
        .iter()
        .all(|n| n.as_deref().is_some_and(|n| n.starts_with("pool-test-worker-"))));

    Ok(())
}

#[test_case(0, 1 ; "empty")]
#[test_case(10, 3 ; "uneven")]
#[test_case(3, 5 ; "more partitions than items")]
#[test_case(1_000, 16 ; "many")]
fn partitions_cover_input(count: usize, num_partitions: usize) {
    let config = SessionConfig {
        default_parallelism: num_partitions,
        ..SessionConfig::default()
    };

    with_session(&config, |session| {
        let partitions = session.parallelize(count);
        assert_eq!(partitions.len(), num_partitions);

        let indices = session.map_partitions_with_index(partitions, |_, r| r);
        assert_eq!(indices, (0..count).collect::<Vec<_>>());
    })
    .unwrap_or_else(|e| unreachable!("{e}"));
}

#[test]
fn slicing_matches_generator() -> Result<(), String> {
    with_session(&SessionConfig::default(), |session| {
        for (count, n) in [(0, 2), (10, 3), (257, 5)] {
            assert_eq!(session.parallelize_with(count, n), sparsegen::partition_ranges(count, n));
        }
        assert_eq!(session.parallelize(10), sparsegen::partition_ranges(10, 4));
    })
}

/// Generates a dataset inside a session, one generator call per partition.
fn distributed(config: &SessionConfig, generator: SampleGenerator, count: usize) -> Result<Vec<Sample>, String> {
    with_session(config, |session| {
        let partitions = session.parallelize(count);
        session.map_partitions_with_index(partitions, |i, indices| generator.partition(i as u64, indices))
    })
}

#[test]
fn distributed_generation_is_deterministic() -> Result<(), String> {
    let regime = Regime::new(Task::LinearRegression, Contamination::Invalid);
    let generator = SampleGenerator::new(regime, 12, 0.2, 40)?;

    let few_threads = SessionConfig {
        num_threads: 1,
        default_parallelism: 5,
        ..SessionConfig::default()
    };
    let many_threads = SessionConfig {
        num_threads: 8,
        ..few_threads.clone()
    };

    let a = distributed(&few_threads, generator, 257)?;
    let b = distributed(&many_threads, generator, 257)?;
    let expected = generator.generate_partitioned(257, 5);

    assert_eq!(a.len(), 257);
    for ((x, y), z) in a.iter().zip(b.iter()).zip(expected.iter()) {
        assert_eq!(x.label.to_bits(), y.label.to_bits());
        assert_eq!(x.label.to_bits(), z.label.to_bits());
        assert_eq!(x.features.indices(), y.features.indices());
        assert_eq!(x.features.indices(), z.features.indices());
        assert!(x.features.get(37).is_nan());
    }

    Ok(())
}
