//! End-to-end dispatch against the built-in rules.

use std::sync::Arc;

use assert_matches::assert_matches;
use hopper_actions::{
    ActionsError, CommandSpawner, Dispatcher, IdentityExpander, LaunchContext, Outcome,
    RuleKind, RuleStoreRegistry, SpawnError, VariableExpander,
};
use hopper_settings::{ConfigChannel, PropertyChannel};
use parking_lot::Mutex;

/// Records launches instead of starting processes.
#[derive(Default)]
struct RecordingSpawner {
    launched: Mutex<Vec<(String, LaunchContext)>>,
    fail: bool,
}

impl RecordingSpawner {
    fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    fn commands(&self) -> Vec<String> {
        self.launched.lock().iter().map(|(c, _)| c.clone()).collect()
    }
}

impl CommandSpawner for RecordingSpawner {
    fn spawn(&self, command_line: &str, context: &LaunchContext) -> Result<(), SpawnError> {
        if self.fail {
            return Err(SpawnError::Launch {
                program: command_line.split(' ').next().unwrap_or_default().to_owned(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
            });
        }
        self.launched
            .lock()
            .push((command_line.to_owned(), context.clone()));
        Ok(())
    }
}

struct Fixture {
    channel: Arc<PropertyChannel>,
    registry: RuleStoreRegistry,
    spawner: Arc<RecordingSpawner>,
    dispatcher: Dispatcher,
}

fn fixture_with(spawner: RecordingSpawner, variables: Arc<dyn VariableExpander>) -> Fixture {
    let channel = Arc::new(PropertyChannel::in_memory());
    let registry = RuleStoreRegistry::new(channel.clone());
    let spawner = Arc::new(spawner);
    let dispatcher = Dispatcher::new(spawner.clone(), variables);
    Fixture {
        channel,
        registry,
        spawner,
        dispatcher,
    }
}

fn fixture() -> Fixture {
    fixture_with(RecordingSpawner::default(), Arc::new(IdentityExpander))
}

#[test]
fn bang_prefix_opens_terminal() {
    let f = fixture();
    let store = f.registry.acquire();

    let outcome = f
        .dispatcher
        .execute(&store, "!ls", &LaunchContext::default())
        .unwrap();

    assert_eq!(outcome, Outcome::Succeeded);
    assert_eq!(f.spawner.commands(), vec!["x-terminal-emulator -e ls"]);
}

#[test]
fn http_url_is_opened() {
    let f = fixture();
    let store = f.registry.acquire();

    let outcome = f
        .dispatcher
        .execute(&store, "http://example.com", &LaunchContext::default())
        .unwrap();

    assert_eq!(outcome, Outcome::Succeeded);
    assert_eq!(f.spawner.commands(), vec!["xdg-open http://example.com"]);
}

#[test]
fn unmatched_text_launches_nothing() {
    let f = fixture();
    let store = f.registry.acquire();

    let outcome = f
        .dispatcher
        .execute(&store, "nomatch-xyz", &LaunchContext::default())
        .unwrap();

    assert_eq!(outcome, Outcome::NoRuleMatched);
    assert!(f.spawner.commands().is_empty());
}

#[test]
fn wikipedia_prefix_beats_bang() {
    let f = fixture();
    let store = f.registry.acquire();

    let _ = f
        .dispatcher
        .execute(&store, "!w foo", &LaunchContext::default())
        .unwrap();

    assert_eq!(
        f.spawner.commands(),
        vec!["xdg-open https://en.wikipedia.org/wiki/foo"]
    );
}

#[test]
fn man_page_prefix() {
    let f = fixture();
    let store = f.registry.acquire();
    let _ = f
        .dispatcher
        .execute(&store, "#  tar", &LaunchContext::default())
        .unwrap();
    assert_eq!(f.spawner.commands(), vec!["x-terminal-emulator -e man tar"]);
}

#[test]
fn launch_context_reaches_spawner() {
    let f = fixture();
    let store = f.registry.acquire();
    let ctx = LaunchContext::on_display(":1").with_working_directory("/tmp");

    let _ = f.dispatcher.execute(&store, "!top", &ctx).unwrap();

    let launched = f.spawner.launched.lock();
    assert_eq!(launched.len(), 1);
    assert_eq!(launched[0].1, ctx);
}

#[test]
fn spawn_failure_surfaces() {
    let f = fixture_with(RecordingSpawner::failing(), Arc::new(IdentityExpander));
    let store = f.registry.acquire();

    let err = f
        .dispatcher
        .execute(&store, "!ls", &LaunchContext::default())
        .unwrap_err();

    assert_matches!(
        err,
        ActionsError::Spawn(SpawnError::Launch { ref program, .. }) if program == "x-terminal-emulator"
    );
}

#[test]
fn user_rule_with_named_groups() {
    let f = fixture();
    let store = f.registry.acquire();
    let _ = store
        .lock()
        .add_rule(
            RuleKind::Regex,
            r"^(?P<proj>[A-Z]+)-(?P<num>\d+)$",
            r"xdg-open https://issues.example.com/\g<proj>/\g<num>",
        )
        .unwrap();

    let _ = f
        .dispatcher
        .execute(&store, "HOP-42", &LaunchContext::default())
        .unwrap();

    assert_eq!(
        f.spawner.commands(),
        vec!["xdg-open https://issues.example.com/HOP/42"]
    );
}

#[test]
fn live_edit_changes_dispatch() {
    let f = fixture();
    let store = f.registry.acquire();

    f.channel
        .set_string("/actions/action-2/command", "xterm -e %s")
        .unwrap();
    let _ = f
        .dispatcher
        .execute(&store, "!htop", &LaunchContext::default())
        .unwrap();

    assert_eq!(f.spawner.commands(), vec!["xterm -e htop"]);
}

#[test]
fn environment_variables_resolve_last() {
    struct Fixed;
    impl VariableExpander for Fixed {
        fn expand(&self, command: &str) -> String {
            hopper_core::text::expand_variables_with(command, |name| {
                (name == "BROWSER").then(|| "firefox".to_owned())
            })
        }
    }

    let f = fixture_with(RecordingSpawner::default(), Arc::new(Fixed));
    let store = f.registry.acquire();
    let _ = store
        .lock()
        .add_rule(RuleKind::Prefix, "web ", "$BROWSER %s")
        .unwrap();

    let _ = f
        .dispatcher
        .execute(&store, "web example.org", &LaunchContext::default())
        .unwrap();

    assert_eq!(f.spawner.commands(), vec!["firefox example.org"]);
}
