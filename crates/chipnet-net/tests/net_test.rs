//! Integration tests for driving nets through their consumer hooks.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use chipnet_config::NetDef;
use chipnet_net::{
  AllowAll, Consumer, ErrorCode, HookError, Net, NetError, RouteConsumer, State,
};
use serde_json::json;

/// Records every hook call and enables a fixed set of transitions.
#[derive(Default)]
struct Recorder {
  enabled: Option<HashSet<String>>,
  calls: Mutex<Vec<String>>,
}

impl Recorder {
  fn allowing(transitions: &[&str]) -> Self {
    Self {
      enabled: Some(transitions.iter().map(|t| t.to_string()).collect()),
      calls: Mutex::new(Vec::new()),
    }
  }

  fn calls(&self) -> Vec<String> {
    self.calls.lock().unwrap().clone()
  }

  fn count(&self, prefix: &str) -> usize {
    self
      .calls()
      .iter()
      .filter(|c| c.starts_with(prefix))
      .count()
  }

  fn record(&self, call: String) {
    self.calls.lock().unwrap().push(call);
  }
}

impl Consumer for Recorder {
  fn before_place(&self, place_id: &str) -> Result<(), HookError> {
    self.record(format!("before_place:{place_id}"));
    Ok(())
  }

  fn after_place(&self, place_id: &str) {
    self.record(format!("after_place:{place_id}"));
  }

  fn can_transit(&self, transition_id: &str) -> bool {
    self.record(format!("can_transit:{transition_id}"));
    self
      .enabled
      .as_ref()
      .is_none_or(|enabled| enabled.contains(transition_id))
  }

  fn before_transit(&self, transition_id: &str) -> Result<(), HookError> {
    self.record(format!("before_transit:{transition_id}"));
    Ok(())
  }

  fn after_transit(&self, transition_id: &str) {
    self.record(format!("after_transit:{transition_id}"));
  }
}

fn def(value: serde_json::Value) -> NetDef {
  serde_json::from_value(value).unwrap()
}

/// S -> split -> {A, B} -> merge -> F
fn fork_join_def() -> NetDef {
  def(json!({
    "start": "S",
    "finish": ["F"],
    "places": ["S", "A", "B", "F"],
    "transitions": {
      "split": { "from": ["S"], "to": ["A", "B"] },
      "merge": { "from": ["A", "B"], "to": ["F"] }
    }
  }))
}

/// s -> t1 -> a -> t2 -> f
fn linear_def() -> NetDef {
  def(json!({
    "start": "s",
    "finish": ["f"],
    "places": ["s", "a", "f"],
    "transitions": {
      "t1": { "from": ["s"], "to": ["a"] },
      "t2": { "from": ["a"], "to": ["f"] }
    }
  }))
}

/// review -> approve -> approved | review -> reject -> rejected
fn choice_def() -> NetDef {
  def(json!({
    "start": "review",
    "finish": ["approved", "rejected"],
    "places": ["review", "approved", "rejected"],
    "transitions": {
      "approve": { "from": ["review"], "to": ["approved"] },
      "reject": { "from": ["review"], "to": ["rejected"] }
    }
  }))
}

fn started(def: &NetDef, consumer: Arc<dyn Consumer>) -> Net {
  let mut net = Net::build(def).unwrap().with_consumer(consumer);
  net.start().unwrap();
  net
}

#[test]
fn test_start_deposits_one_chip_and_evaluates_once() {
  let recorder = Arc::new(Recorder::default());
  let net = started(&fork_join_def(), recorder.clone());

  assert_eq!(
    recorder.calls(),
    vec![
      "before_place:S",
      "after_place:S",
      "can_transit:split",
      "before_transit:split",
      "after_transit:split",
    ]
  );
  assert_eq!(recorder.count("after_place:"), 1);
  // The start chip was consumed by the split, which now owes two chips.
  assert_eq!(net.state().chips_in_place("S"), 0);
  assert_eq!(net.state().chips_in_transition("split"), 2);
  assert!(!net.is_finished());
}

#[test]
fn test_fork_join_scenario() {
  let mut net = started(&fork_join_def(), Arc::new(AllowAll));

  assert!(!net.set_place("A").unwrap());
  assert!(!net.is_finished());
  // Join not ready: A waits for B.
  assert_eq!(net.state().chips_in_place("A"), 1);
  assert_eq!(net.state().chips_in_transition("split"), 1);
  assert_eq!(net.state().chips_in_transition("merge"), 0);

  assert!(!net.set_place("B").unwrap());
  assert_eq!(net.state().chips_in_place("A"), 0);
  assert_eq!(net.state().chips_in_place("B"), 0);
  assert_eq!(net.state().chips_in_transition("split"), 0);
  assert_eq!(net.state().chips_in_transition("merge"), 1);

  assert!(net.set_place("F").unwrap());
  assert!(net.is_finished());
  assert!(!net.is_error_state());
}

#[test]
fn test_fork_credits_one_chip_per_output() {
  let mut net = started(&fork_join_def(), Arc::new(AllowAll));
  assert_eq!(net.state().chips_in_transition("split"), 2);

  net.set_place("B").unwrap();
  assert_eq!(net.state().chips_in_transition("split"), 1);
  assert_eq!(net.state().chips_in_place("B"), 1);

  net.set_place("A").unwrap();
  assert_eq!(net.state().chips_in_transition("split"), 0);
}

#[test]
fn test_place_without_owed_chip_is_rejected_without_mutation() {
  let mut net = started(&linear_def(), Arc::new(AllowAll));
  let before = net.state().clone();

  let err = net.set_place("f").unwrap_err();

  assert_eq!(
    err,
    NetError::NoChipForPlace {
      place_id: "f".to_string(),
      transition_id: "t2".to_string(),
    }
  );
  assert_eq!(net.state(), &before);
  assert!(!net.is_error_state());

  // The same place cannot be entered twice on one credit either.
  net.set_place("a").unwrap();
  let after_a = net.state().clone();
  assert!(net.set_place("a").unwrap_err().is(ErrorCode::NoChipForPlace));
  assert_eq!(net.state(), &after_a);
}

#[test]
fn test_unknown_place() {
  let mut net = started(&linear_def(), Arc::new(AllowAll));
  let err = net.set_place("nowhere").unwrap_err();
  assert!(err.is(ErrorCode::PlaceNotRegistered));
  assert!(!net.is_error_state());
}

#[test]
fn test_place_without_producer() {
  let mut net = started(
    &def(json!({
      "start": "s",
      "finish": ["f"],
      "places": ["s", "orphan", "f"],
      "transitions": { "t": { "from": ["s"], "to": ["f"] } }
    })),
    Arc::new(AllowAll),
  );

  let err = net.set_place("orphan").unwrap_err();
  assert!(err.is(ErrorCode::PlaceHasNoProducer));
}

#[test]
fn test_consumer_required() {
  let mut net = Net::build(&linear_def()).unwrap();

  assert_eq!(net.start().unwrap_err(), NetError::ConsumerNotSet);
  assert_eq!(net.set_place("s").unwrap_err(), NetError::ConsumerNotSet);
  assert!(net.state().is_empty());
}

#[test]
fn test_exclusive_choice_follows_route() {
  let consumer = Arc::new(RouteConsumer::with_routes(["reject"]));
  let mut net = started(&choice_def(), consumer);

  let err = net.set_place("approved").unwrap_err();
  assert!(err.is(ErrorCode::NoChipForPlace));

  assert!(net.set_place("rejected").unwrap());
  assert!(net.is_finished());
}

#[test]
fn test_two_enabled_transitions_poison() {
  let mut net = Net::build(&choice_def())
    .unwrap()
    .with_consumer(Arc::new(AllowAll));

  assert_eq!(net.start().unwrap_err(), NetError::NetInErrorState);
  assert!(net.is_error_state());
  assert_eq!(
    net.error(),
    Some(&NetError::UnexpectedAvailableTransitions {
      place_id: "review".to_string(),
      count: 2,
    })
  );
}

#[test]
fn test_no_enabled_transition_poisons_and_freezes_ledger() {
  let consumer = Arc::new(RouteConsumer::with_routes(["t1"]));
  let mut net = started(&linear_def(), consumer.clone());

  // t2 is not routed, so entering `a` finds no available transition.
  assert_eq!(net.set_place("a").unwrap_err(), NetError::NetInErrorState);
  assert!(net.error().unwrap().is(ErrorCode::UnexpectedAvailableTransitions));
  let frozen = net.state().clone();

  consumer.allow("t2");
  assert_eq!(net.set_place("a").unwrap_err(), NetError::NetInErrorState);
  assert_eq!(net.set_place("f").unwrap_err(), NetError::NetInErrorState);
  assert_eq!(net.start().unwrap_err(), NetError::NetInErrorState);
  assert_eq!(net.state(), &frozen);
}

#[test]
fn test_before_place_veto_poisons_before_mutation() {
  let consumer = Arc::new(RouteConsumer::with_routes(["t1", "t2"]));
  consumer.block_place("a");
  let mut net = started(&linear_def(), consumer);
  let before = net.state().clone();

  assert_eq!(net.set_place("a").unwrap_err(), NetError::NetInErrorState);

  match net.error() {
    Some(NetError::BeforePlaceFailed { place_id, source }) => {
      assert_eq!(place_id, "a");
      assert_eq!(source.message(), "place 'a' is blocked");
    }
    other => panic!("expected before-place failure, got {other:?}"),
  }
  assert_eq!(net.state(), &before);
}

#[test]
fn test_before_transit_veto_poisons() {
  let consumer = Arc::new(RouteConsumer::with_routes(["t1", "t2"]));
  consumer.block_transition("t2");
  let mut net = started(&linear_def(), consumer);

  assert_eq!(net.set_place("a").unwrap_err(), NetError::NetInErrorState);
  assert!(net.error().unwrap().is(ErrorCode::BeforeTransitFailed));
  // The chip reached `a` but t2 never fired.
  assert_eq!(net.state().chips_in_place("a"), 1);
  assert_eq!(net.state().chips_in_transition("t2"), 0);
}

#[test]
fn test_finished_net_rejects_places() {
  let recorder = Arc::new(Recorder::default());
  let mut net = started(&linear_def(), recorder.clone());
  net.set_place("a").unwrap();
  assert!(net.set_place("f").unwrap());
  let calls = recorder.calls().len();

  for place in ["s", "a", "f", "nowhere"] {
    assert_eq!(net.set_place(place).unwrap_err(), NetError::Finished);
  }
  assert_eq!(recorder.calls().len(), calls);
}

#[test]
fn test_terminal_place_skips_transition_evaluation() {
  let recorder = Arc::new(Recorder::default());
  let mut net = started(&linear_def(), recorder.clone());
  net.set_place("a").unwrap();
  let evaluated = recorder.count("can_transit:");

  net.set_place("f").unwrap();
  assert_eq!(recorder.count("can_transit:"), evaluated);
  assert_eq!(recorder.calls().last().unwrap(), "after_place:f");
}

#[test]
fn test_reset_clears_poisoned_net() {
  let mut net = Net::build(&choice_def())
    .unwrap()
    .with_consumer(Arc::new(AllowAll));
  net.start().unwrap_err();
  assert!(net.is_error_state());

  net.reset();

  assert!(net.state().is_empty());
  assert!(!net.is_error_state());
  assert!(!net.is_finished());
  assert!(!net.has_consumer());
  assert!(net.error().is_none());
  assert_eq!(net.set_place("review").unwrap_err(), NetError::ConsumerNotSet);

  net.set_consumer(Arc::new(RouteConsumer::with_routes(["approve"])));
  net.start().unwrap();
  assert!(net.set_place("approved").unwrap());
}

#[test]
fn test_start_restarts_finished_net() {
  let mut net = started(&linear_def(), Arc::new(AllowAll));
  net.set_place("a").unwrap();
  net.set_place("f").unwrap();
  assert!(net.is_finished());

  net.start().unwrap();
  assert!(!net.is_finished());
  assert_eq!(net.state().chips_in_place("f"), 0);
  assert_eq!(net.state().chips_in_transition("t1"), 1);
}

#[test]
fn test_restore_state_resumes_run() {
  let mut first = started(&fork_join_def(), Arc::new(AllowAll));
  first.set_place("A").unwrap();
  let snapshot: State =
    serde_json::from_str(&serde_json::to_string(first.state()).unwrap()).unwrap();

  let mut second = Net::new(Arc::clone(first.graph())).with_consumer(Arc::new(AllowAll));
  second.restore_state(snapshot);

  second.set_place("B").unwrap();
  assert!(second.set_place("F").unwrap());
  assert_ne!(first.id(), second.id());
}

#[test]
fn test_branching_example_runs_to_finish() {
  let def = NetDef::from_json_str(
    r#"{
      "start": "placeStart",
      "finish": ["placeFinish"],
      "places": [
        "placeStart",
        "branch1Place1",
        "branch1Place2",
        "branch2Place1",
        "branchMergePlace1",
        "placeFinish"
      ],
      "transitions": {
        "placeStart__branching": {
          "from": ["placeStart"],
          "to": ["branch1Place1", "branch2Place1"]
        },
        "branch1Place1__branch1Place2": {
          "from": ["branch1Place1"],
          "to": ["branch1Place2"]
        },
        "branch1Place2_branch2Place1__branchMergePlace1": {
          "from": ["branch1Place2", "branch2Place1"],
          "to": ["branchMergePlace1"]
        },
        "branchMergePlace1__placeFinish": {
          "from": ["branchMergePlace1"],
          "to": ["placeFinish"]
        }
      }
    }"#,
  )
  .unwrap();

  let recorder = Arc::new(Recorder::default());
  let mut net = started(&def, recorder.clone());

  assert!(!net.set_place("branch2Place1").unwrap());
  assert!(!net.set_place("branch1Place1").unwrap());
  assert!(!net.set_place("branch1Place2").unwrap());
  assert!(!net.set_place("branchMergePlace1").unwrap());
  assert!(net.set_place("placeFinish").unwrap());

  assert_eq!(recorder.count("after_transit:"), 4);
  assert_eq!(
    recorder.count("after_transit:branch1Place2_branch2Place1__branchMergePlace1"),
    1
  );
}

#[test]
fn test_recorder_respects_enabled_set() {
  let recorder = Arc::new(Recorder::allowing(&["approve"]));
  let mut net = started(&choice_def(), recorder.clone());

  assert!(recorder.calls().contains(&"can_transit:reject".to_string()));
  assert!(net.set_place("approved").unwrap());
}
