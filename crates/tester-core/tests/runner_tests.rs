//! Integration tests for the stage runner.
//!
//! Stages here are plain closures; no server is involved.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tester_core::{
    Executable, LogLevel, MemorySink, RunnerConfig, Stage, StageLogger, StageRunner, TesterError,
};

fn executable() -> Arc<Executable> {
    Arc::new(Executable::new("127.0.0.1:6379"))
}

fn counting_stage(name: &str, counter: Arc<AtomicUsize>, fail: bool) -> Stage {
    Stage::new(name, StageLogger::new("", false), move |_ctx| {
        let counter = counter.clone();
        async move {
            counter.fetch_add(1, Ordering::SeqCst);
            if fail {
                Err(TesterError::assertion("Expected \"PONG\", got \"PING\""))
            } else {
                Ok(())
            }
        }
    })
}

fn names(runner: &StageRunner) -> Vec<String> {
    runner.stages().iter().map(|s| s.name().to_string()).collect()
}

// =============================================================================
// Sequencing
// =============================================================================

#[tokio::test]
async fn test_all_stages_pass() {
    let counters: Vec<_> = (0..4).map(|_| Arc::new(AtomicUsize::new(0))).collect();
    let stages = counters
        .iter()
        .enumerate()
        .map(|(i, c)| counting_stage(&format!("stage {}", i), c.clone(), false))
        .collect();

    let result = StageRunner::new(stages, false).run(executable()).await;

    assert!(result.is_success());
    assert_eq!(result.last_stage_index(), Some(3));
    assert_eq!(result.last_stage_name(), Some("stage 3"));
    assert!(result.error().is_none());
    for c in &counters {
        assert_eq!(c.load(Ordering::SeqCst), 1);
    }
}

#[tokio::test]
async fn test_pushed_stages_run_after_existing_ones() {
    let first = Arc::new(AtomicUsize::new(0));
    let second = Arc::new(AtomicUsize::new(0));
    let runner = StageRunner::new(vec![counting_stage("first", first.clone(), false)], false)
        .push(counting_stage("second", second.clone(), false));

    assert_eq!(names(&runner), vec!["first", "second"]);
    let result = runner.run(executable()).await;

    assert!(result.is_success());
    assert_eq!(result.last_stage_name(), Some("second"));
    assert_eq!(first.load(Ordering::SeqCst), 1);
    assert_eq!(second.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_stops_at_first_failure() {
    let counters: Vec<_> = (0..5).map(|_| Arc::new(AtomicUsize::new(0))).collect();
    let stages = counters
        .iter()
        .enumerate()
        .map(|(i, c)| counting_stage(&format!("stage {}", i), c.clone(), i == 2))
        .collect();

    let result = StageRunner::new(stages, false).run(executable()).await;

    assert!(!result.is_success());
    assert_eq!(result.last_stage_index(), Some(2));
    assert!(matches!(result.error(), Some(TesterError::Assertion(_))));
    let invoked: Vec<usize> = counters.iter().map(|c| c.load(Ordering::SeqCst)).collect();
    assert_eq!(invoked, vec![1, 1, 1, 0, 0]);
}

#[tokio::test]
async fn test_failing_logger_is_returned() {
    let sink = MemorySink::new();
    let ok = Stage::new("first", StageLogger::new("[stage-1] ", false), |_| async { Ok(()) });
    let bad = Stage::new(
        "second",
        StageLogger::with_sink("[stage-2] ", false, Arc::new(sink.clone())),
        |_| async { Err(TesterError::assertion("nope")) },
    );

    let result = StageRunner::new(vec![ok, bad], false).run(executable()).await;

    assert_eq!(result.logger().map(|l| l.prefix()), Some("[stage-2] "));
    assert!(sink.contains("[stage-2] Running test: second"));
}

#[tokio::test]
async fn test_empty_runner_succeeds() {
    let result = StageRunner::default().run(executable()).await;
    assert!(result.is_success());
    assert_eq!(result.last_stage_index(), None);
}

// =============================================================================
// Logging
// =============================================================================

#[tokio::test]
async fn test_pass_and_fail_log_lines() {
    let sink = MemorySink::new();
    let logger = StageLogger::with_sink("[stage-1] ", false, Arc::new(sink.clone()));
    let passing = Stage::new("Stage 1: Bind to a port", logger, |_| async { Ok(()) });
    StageRunner::new(vec![passing], false).run(executable()).await;

    let records = sink.records();
    assert_eq!(records[0].line, "[stage-1] Running test: Stage 1: Bind to a port");
    assert_eq!(records[0].level, LogLevel::Info);
    assert_eq!(records[1].line, "[stage-1] Test passed.");
    assert_eq!(records[1].level, LogLevel::Success);

    let sink = MemorySink::new();
    let logger = StageLogger::with_sink("", false, Arc::new(sink.clone()));
    let failing = Stage::new("broken", logger, |_| async { Err(TesterError::assertion("bad reply")) });
    StageRunner::new(vec![failing], false).run(executable()).await;

    let errors: Vec<String> = sink
        .records()
        .into_iter()
        .filter(|r| r.level == LogLevel::Error)
        .map(|r| r.line)
        .collect();
    assert_eq!(errors[0], "bad reply");
    assert!(errors[1].starts_with("Test failed (try running with --debug"));
}

#[tokio::test]
async fn test_debug_mode_omits_hint() {
    let sink = MemorySink::new();
    let logger = StageLogger::with_sink("", true, Arc::new(sink.clone()));
    let failing = Stage::new("broken", logger, |_| async { Err(TesterError::assertion("bad")) });
    StageRunner::new(vec![failing], true).run(executable()).await;

    assert_eq!(sink.lines().last().map(String::as_str), Some("Test failed"));
}

// =============================================================================
// Timeouts and cancellation
// =============================================================================

#[tokio::test]
async fn test_hanging_stage_times_out() {
    let after = Arc::new(AtomicUsize::new(0));
    let hang = Stage::new("hang", StageLogger::new("", false), |_| async {
        tokio::time::sleep(Duration::from_secs(30)).await;
        Ok(())
    });
    let config = RunnerConfig::default().stage_timeout(Duration::from_millis(200));
    let runner = StageRunner::with_config(vec![hang, counting_stage("after", after.clone(), false)], config);

    let start = Instant::now();
    let result = runner.run(executable()).await;
    let elapsed = start.elapsed();

    assert!(!result.is_success());
    assert_eq!(result.last_stage_index(), Some(0));
    assert!(result.error().map(TesterError::is_timeout).unwrap_or(false));
    assert_eq!(
        result.error().map(ToString::to_string).as_deref(),
        Some("timed out, test exceeded 200ms")
    );
    assert!(elapsed >= Duration::from_millis(200));
    assert!(elapsed < Duration::from_secs(2), "took {:?}", elapsed);
    assert_eq!(after.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_timeout_cancels_stage_token() {
    let observed = Arc::new(AtomicBool::new(false));
    let flag = observed.clone();
    let stage = Stage::new("watcher", StageLogger::new("", false), move |ctx| {
        let flag = flag.clone();
        async move {
            let token = ctx.cancellation_token().clone();
            tokio::spawn(async move {
                token.cancelled().await;
                flag.store(true, Ordering::SeqCst);
            });
            ctx.sleep(Duration::from_secs(30)).await
        }
    });
    let config = RunnerConfig::default().stage_timeout(Duration::from_millis(100));

    let result = StageRunner::with_config(vec![stage], config).run(executable()).await;
    assert!(result.error().map(TesterError::is_timeout).unwrap_or(false));

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(observed.load(Ordering::SeqCst));
}

#[tokio::test]
async fn test_panic_becomes_error() {
    let stage = Stage::new("panics", StageLogger::new("", false), |_| async {
        if true {
            panic!("boom");
        }
        Ok(())
    });

    let result = StageRunner::new(vec![stage], false).run(executable()).await;

    match result.error() {
        Some(TesterError::Panicked(msg)) => assert_eq!(msg, "boom"),
        other => panic!("expected panic error, got {:?}", other),
    }
}

// =============================================================================
// Truncation and randomization
// =============================================================================

fn letters(n: usize) -> StageRunner {
    let stages = (0..n)
        .map(|i| {
            let name = ((b'a' + i as u8) as char).to_string();
            Stage::new(name, StageLogger::new("", false), |_| async { Ok(()) })
        })
        .collect();
    StageRunner::new(stages, false)
}

#[test]
fn test_truncation_is_a_prefix() {
    let runner = letters(6);
    for k in 0..10 {
        let truncated = runner.truncated(k);
        let expected: Vec<String> = names(&runner).into_iter().take(k.min(5) + 1).collect();
        assert_eq!(names(&truncated), expected, "k = {}", k);
    }
    assert_eq!(runner.len(), 6);
}

#[test]
fn test_randomized_keeps_the_same_stages() {
    let runner = letters(6);
    for _ in 0..20 {
        let mut shuffled = names(&runner.randomized());
        shuffled.sort();
        assert_eq!(shuffled, names(&runner));
    }
}

#[test]
fn test_randomized_covers_every_permutation() {
    let runner = letters(3);
    let mut counts: HashMap<Vec<String>, usize> = HashMap::new();
    for seed in 0..600 {
        *counts.entry(names(&runner.randomized_with_seed(seed))).or_default() += 1;
    }

    assert_eq!(counts.len(), 6);
    for (order, count) in &counts {
        assert!(*count > 50, "{:?} appeared only {} times", order, count);
    }
}
