//! Executor behavior against the scripted backend

use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::thread::{self, ThreadId};
use std::time::Duration;

use wmiq::engine::mock::{MockBackend, MockItem, MockStage};
use wmiq::{
    Backend, BackendError, ConnectionArgs, NamedProperties, QueryExecutor, Value, WmiqError,
};

fn items() -> Vec<MockItem> {
    vec![
        MockItem::new().with("a", 1i64).with("b", "x"),
        MockItem::new().with("a", 2i64).with("b", "y"),
    ]
}

#[test]
fn property_read_failure_returns_earlier_records() {
    let backend = MockBackend::new(vec![
        MockItem::new().with("a", 1i64).with("b", "x"),
        MockItem::new().with("a", 2i64),
        MockItem::new().with("a", 3i64).with("b", "z"),
    ]);
    let counters = backend.counters();
    let executor = QueryExecutor::with_backend(backend);

    let failure = executor
        .execute("SELECT a, b FROM T", &ConnectionArgs::new())
        .unwrap_err();

    match &failure.error {
        WmiqError::PropertyRead { column, item, .. } => {
            assert_eq!(column, "b");
            assert_eq!(*item, 2);
        }
        other => panic!("Expected PropertyRead, got {:?}", other),
    }
    assert_eq!(failure.partial.len(), 1);
    assert_eq!(failure.partial[0]["a"], Value::Int(1));
    assert_eq!(failure.partial[0]["b"], Value::from("x"));
    assert_eq!(counters.outstanding(), 0);
}

#[test]
fn handles_balanced_on_success() {
    let backend = MockBackend::new(items());
    let counters = backend.counters();
    let executor = QueryExecutor::with_backend(backend);

    executor.execute("SELECT a FROM T", &ConnectionArgs::new()).unwrap();

    // runtime, locator, dispatch, service, result set, enumerator, 2 items
    assert_eq!(counters.acquired(), 8);
    assert_eq!(counters.released(), 8);
}

#[test]
fn handles_balanced_on_every_failure_stage() {
    let stages = [
        MockStage::Initialize,
        MockStage::CreateLocator,
        MockStage::Dispatch,
        MockStage::Connect,
        MockStage::ExecQuery,
        MockStage::Enumerate,
        MockStage::Next(1),
        MockStage::Next(2),
    ];

    for stage in stages {
        let backend = MockBackend::new(items()).failing_at(stage);
        let counters = backend.counters();
        let executor = QueryExecutor::with_backend(backend);

        let failure = executor
            .execute("SELECT a, b FROM T", &ConnectionArgs::new())
            .unwrap_err();

        let expected_stage = match stage {
            MockStage::Initialize => "initialize",
            MockStage::CreateLocator => "create_locator",
            MockStage::Dispatch => "dispatch",
            MockStage::Connect => "connect",
            MockStage::ExecQuery => "exec_query",
            MockStage::Enumerate | MockStage::Next(_) => "enumerate",
        };
        assert_eq!(failure.error.stage(), expected_stage, "stage {:?}", stage);
        assert!(failure.error.status_code().is_some());
        assert_eq!(counters.acquired(), counters.released(), "stage {:?}", stage);
    }
}

#[test]
fn empty_handles_are_reported() {
    let backend = MockBackend::new(items()).with_nil_locator();
    let counters = backend.counters();
    let failure = QueryExecutor::with_backend(backend)
        .execute("SELECT a FROM T", &ConnectionArgs::new())
        .unwrap_err();
    assert!(matches!(failure.error, WmiqError::NilObject));
    assert_eq!(counters.outstanding(), 0);

    let backend = MockBackend::new(items()).with_nil_enumerator();
    let counters = backend.counters();
    let failure = QueryExecutor::with_backend(backend)
        .execute("SELECT a FROM T", &ConnectionArgs::new())
        .unwrap_err();
    assert!(matches!(failure.error, WmiqError::NilEnumerator));
    assert_eq!(counters.outstanding(), 0);
}

#[test]
fn concurrent_calls_never_overlap() {
    let backend = MockBackend::new(items()).with_latency(Duration::from_millis(20));
    let counters = backend.counters();
    let executor = Arc::new(QueryExecutor::with_backend(backend));

    let workers: Vec<_> = (0..6)
        .map(|_| {
            let executor = Arc::clone(&executor);
            thread::spawn(move || {
                executor
                    .execute("SELECT a, b FROM T", &ConnectionArgs::new())
                    .map(|records| records.len())
            })
        })
        .collect();

    for worker in workers {
        assert_eq!(worker.join().unwrap().unwrap(), 2);
    }
    assert_eq!(counters.initializations(), 6);
    assert_eq!(counters.max_active_runtimes(), 1);
    assert_eq!(counters.outstanding(), 0);
}

#[test]
fn separate_executors_share_the_runtime_lock() {
    let first = MockBackend::new(items()).with_latency(Duration::from_millis(20));
    let second = first.clone();
    let counters = first.counters();

    let a = thread::spawn(move || {
        QueryExecutor::with_backend(first).execute("SELECT a FROM T", &ConnectionArgs::new())
    });
    let b = thread::spawn(move || {
        QueryExecutor::with_backend(second).execute("SELECT b FROM T", &ConnectionArgs::new())
    });

    assert!(a.join().unwrap().is_ok());
    assert!(b.join().unwrap().is_ok());
    assert_eq!(counters.max_active_runtimes(), 1);
}

/// Notes the calling thread of every backend and property call.
#[derive(Debug, Default)]
struct ThreadRecordingBackend {
    threads: Arc<Mutex<Vec<ThreadId>>>,
    items_left: Mutex<usize>,
}

impl ThreadRecordingBackend {
    fn serving(items: usize) -> Self {
        Self {
            threads: Arc::default(),
            items_left: Mutex::new(items),
        }
    }

    fn note(&self) {
        note(&self.threads);
    }
}

fn note(threads: &Mutex<Vec<ThreadId>>) {
    threads.lock().unwrap().push(thread::current().id());
}

struct RecordingItem {
    threads: Arc<Mutex<Vec<ThreadId>>>,
}

impl NamedProperties for RecordingItem {
    fn get(&self, _name: &str) -> Result<Value, BackendError> {
        note(&self.threads);
        Ok(Value::Bool(true))
    }

    fn property_names(&self) -> Result<Vec<String>, BackendError> {
        note(&self.threads);
        Ok(vec!["a".to_string()])
    }
}

impl Backend for ThreadRecordingBackend {
    type Runtime = ();
    type Locator = ();
    type Dispatch = ();
    type Service = ();
    type ResultSet = ();
    type Enumerator = ();
    type Item = RecordingItem;

    fn initialize(&self) -> Result<(), BackendError> {
        self.note();
        Ok(())
    }

    fn create_locator(&self, _runtime: &()) -> Result<Option<()>, BackendError> {
        self.note();
        Ok(Some(()))
    }

    fn dispatch(&self, _locator: &()) -> Result<(), BackendError> {
        self.note();
        Ok(())
    }

    fn connect(&self, _dispatch: &(), _args: &ConnectionArgs) -> Result<(), BackendError> {
        self.note();
        Ok(())
    }

    fn exec_query(&self, _service: &(), _query: &str) -> Result<(), BackendError> {
        self.note();
        Ok(())
    }

    fn enumerate(&self, _results: &mut ()) -> Result<Option<()>, BackendError> {
        self.note();
        Ok(Some(()))
    }

    fn next_item(&self, _enumerator: &mut ()) -> Result<Option<RecordingItem>, BackendError> {
        self.note();
        let mut left = self.items_left.lock().unwrap();
        if *left == 0 {
            return Ok(None);
        }
        *left -= 1;
        Ok(Some(RecordingItem {
            threads: Arc::clone(&self.threads),
        }))
    }
}

#[test]
fn every_backend_call_runs_on_one_worker_thread() {
    let backend = ThreadRecordingBackend::serving(3);
    let threads = Arc::clone(&backend.threads);
    let executor = QueryExecutor::with_backend(backend);

    let records = executor
        .execute("SELECT a FROM T", &ConnectionArgs::new())
        .unwrap();
    assert_eq!(records.len(), 3);

    let calls = threads.lock().unwrap().clone();
    // six setup steps, four advances, one read per item
    assert_eq!(calls.len(), 13);
    let distinct: HashSet<_> = calls.iter().collect();
    assert_eq!(distinct.len(), 1);
    assert!(!calls.contains(&thread::current().id()));
}

#[test]
fn each_call_gets_a_fresh_worker_thread() {
    let backend = ThreadRecordingBackend::serving(0);
    let threads = Arc::clone(&backend.threads);
    let executor = QueryExecutor::with_backend(backend);

    executor.execute("SELECT a FROM T", &ConnectionArgs::new()).unwrap();
    executor.execute("SELECT a FROM T", &ConnectionArgs::new()).unwrap();

    let calls = threads.lock().unwrap().clone();
    let distinct: HashSet<_> = calls.iter().collect();
    assert_eq!(distinct.len(), 2);
    assert!(!calls.contains(&thread::current().id()));
}
