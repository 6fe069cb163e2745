use crate::input::{Action, InputMode};
use crate::model::{
    Card, LogsPane, LogsState, NamespaceScope, PodRef, Section, ViewState, next_tail, prev_tail,
};
use std::collections::HashMap;
use tracing::debug;

/// Side effect requested by a state transition; executed by the event loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    None,
    /// Start the cosmetic section transition; the swap and the data fetch
    /// happen only once the transition timer fires.
    SwitchSection {
        target: Section,
    },
    LoadSection {
        section: Section,
        scope: NamespaceScope,
        seq: u64,
    },
    LoadLogs {
        namespace: String,
        pod: String,
        container: Option<String>,
        tail_lines: u32,
        seq: u64,
    },
}

pub struct App {
    running: bool,
    api_target: String,
    active_index: usize,
    pending_section: Option<Section>,
    views: HashMap<Section, ViewState>,
    seqs: HashMap<Section, u64>,
    selected: HashMap<Section, usize>,
    namespaces: Vec<String>,
    scope: NamespaceScope,
    default_tail: u32,
    logs: Option<LogsPane>,
    logs_seq: u64,
    logs_scroll: u16,
    status: String,
    show_help: bool,
}

impl App {
    pub fn new(
        api_target: String,
        initial: Section,
        scope: NamespaceScope,
        default_tail: u32,
    ) -> Self {
        let views = Section::ALL
            .iter()
            .copied()
            .map(|section| (section, ViewState::Loading))
            .collect::<HashMap<_, _>>();
        let active_index = Section::ALL
            .iter()
            .position(|&section| section == initial)
            .unwrap_or(0);
        Self {
            running: true,
            api_target,
            active_index,
            pending_section: None,
            views,
            seqs: HashMap::new(),
            selected: HashMap::new(),
            namespaces: Vec::new(),
            scope,
            default_tail,
            logs: None,
            logs_seq: 0,
            logs_scroll: 0,
            status: String::new(),
            show_help: false,
        }
    }

    pub fn running(&self) -> bool {
        self.running
    }

    pub fn api_target(&self) -> &str {
        &self.api_target
    }

    pub fn active_section(&self) -> Section {
        Section::ALL[self.active_index]
    }

    pub fn view(&self, section: Section) -> &ViewState {
        self.views.get(&section).unwrap_or(&ViewState::Loading)
    }

    pub fn scope(&self) -> &NamespaceScope {
        &self.scope
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn show_help(&self) -> bool {
        self.show_help
    }

    pub fn logs(&self) -> Option<&LogsPane> {
        self.logs.as_ref()
    }

    pub fn logs_scroll(&self) -> u16 {
        self.logs_scroll
    }

    /// True while the 150 ms section transition timer is outstanding.
    pub fn switch_pending(&self) -> bool {
        self.pending_section.is_some()
    }

    pub fn selected_index(&self) -> usize {
        self.selected
            .get(&self.active_section())
            .copied()
            .unwrap_or(0)
    }

    pub fn input_mode(&self) -> InputMode {
        if self.logs.is_some() {
            InputMode::Logs
        } else {
            InputMode::Sections
        }
    }

    pub fn set_status(&mut self, status: impl Into<String>) {
        self.status = status.into();
    }

    pub fn apply_action(&mut self, action: Action) -> Command {
        match action {
            Action::Quit => {
                self.running = false;
                Command::None
            }
            Action::NextSection => self.start_section_switch(1),
            Action::PrevSection => self.start_section_switch(-1),
            Action::NextNamespace => self.cycle_namespace(1),
            Action::PrevNamespace => self.cycle_namespace(-1),
            Action::Down => self.move_cursor(1),
            Action::Up => self.move_cursor(-1),
            Action::Refresh => {
                if self.logs.is_some() {
                    self.refresh_logs()
                } else {
                    self.begin_section_load(self.active_section())
                }
            }
            Action::ViewLogs => self.view_logs_for_selected(),
            Action::NextContainer => self.cycle_container(1),
            Action::PrevContainer => self.cycle_container(-1),
            Action::NextTailLines => self.cycle_tail(true),
            Action::PrevTailLines => self.cycle_tail(false),
            Action::ToggleHelp => {
                self.show_help = !self.show_help;
                Command::None
            }
            Action::CloseOverlay => {
                if self.logs.take().is_none() {
                    self.show_help = false;
                }
                Command::None
            }
        }
    }

    /// Marks a section as loading and hands out the sequence number its
    /// response must carry to be applied.
    pub fn begin_section_load(&mut self, section: Section) -> Command {
        let seq = self.seqs.entry(section).or_insert(0);
        *seq += 1;
        let seq = *seq;
        self.views.insert(section, ViewState::Loading);
        Command::LoadSection {
            section,
            scope: self.scope.clone(),
            seq,
        }
    }

    /// Applies a fetch outcome unless a newer fetch for the same section has
    /// started since; stale responses are dropped no matter when they arrive.
    pub fn finish_section_load(
        &mut self,
        section: Section,
        seq: u64,
        result: Result<Vec<Card>, String>,
    ) {
        if self.seqs.get(&section).copied().unwrap_or(0) != seq {
            debug!("discarding stale response for {section} (seq {seq})");
            return;
        }
        match result {
            Err(message) => {
                self.status = format!("Failed to load {}", section.title().to_lowercase());
                self.views.insert(section, ViewState::Error(message));
                self.selected.insert(section, 0);
            }
            Ok(cards) if cards.is_empty() => {
                self.views.insert(section, ViewState::Empty);
                self.selected.insert(section, 0);
            }
            Ok(cards) => {
                let cursor = self
                    .selected
                    .get(&section)
                    .copied()
                    .unwrap_or(0)
                    .min(cards.len() - 1);
                self.selected.insert(section, cursor);
                self.status = format!(
                    "Loaded {} {} (namespace: {})",
                    cards.len(),
                    section.title().to_lowercase(),
                    self.scope
                );
                self.views.insert(section, ViewState::Populated(cards));
            }
        }
    }

    /// Completes the transition started by [`Command::SwitchSection`]. A
    /// newer pending target supersedes an older timer, whose completion then
    /// does nothing.
    pub fn complete_section_switch(&mut self, target: Section) -> Command {
        if self.pending_section != Some(target) {
            return Command::None;
        }
        self.pending_section = None;
        if let Some(index) = Section::ALL.iter().position(|&section| section == target) {
            self.active_index = index;
        }
        self.begin_section_load(target)
    }

    pub fn set_namespaces(&mut self, namespaces: Vec<String>) {
        self.namespaces = namespaces;
    }

    pub fn finish_logs_load(&mut self, seq: u64, result: Result<String, String>) {
        if seq != self.logs_seq {
            debug!("discarding stale logs response (seq {seq})");
            return;
        }
        let Some(pane) = self.logs.as_mut() else {
            return;
        };
        self.logs_scroll = 0;
        pane.state = match result {
            Err(message) => LogsState::Error(message),
            Ok(body) if body.is_empty() => LogsState::Loaded("No logs available".to_string()),
            Ok(body) => LogsState::Loaded(body),
        };
    }

    fn start_section_switch(&mut self, delta: isize) -> Command {
        let base = self.pending_section.unwrap_or(self.active_section());
        let count = Section::ALL.len() as isize;
        let index = Section::ALL
            .iter()
            .position(|&section| section == base)
            .unwrap_or(0) as isize;
        let target = Section::ALL[((index + delta + count) % count) as usize];
        self.pending_section = Some(target);
        Command::SwitchSection { target }
    }

    fn cycle_namespace(&mut self, delta: isize) -> Command {
        // Option 0 is the built-in "all namespaces" entry.
        let count = self.namespaces.len() as isize + 1;
        if count == 1 {
            return Command::None;
        }
        let index = match &self.scope {
            NamespaceScope::All => 0,
            NamespaceScope::Named(name) => self
                .namespaces
                .iter()
                .position(|candidate| candidate == name)
                .map(|position| position as isize + 1)
                .unwrap_or(0),
        };
        let next = (index + delta + count) % count;
        let scope = if next == 0 {
            NamespaceScope::All
        } else {
            NamespaceScope::Named(self.namespaces[(next - 1) as usize].clone())
        };
        if scope == self.scope {
            return Command::None;
        }
        self.scope = scope;
        self.begin_section_load(self.active_section())
    }

    fn move_cursor(&mut self, delta: isize) -> Command {
        if self.logs.is_some() {
            self.logs_scroll = if delta > 0 {
                self.logs_scroll.saturating_add(1)
            } else {
                self.logs_scroll.saturating_sub(1)
            };
            return Command::None;
        }
        let section = self.active_section();
        let count = self.view(section).cards().len();
        if count == 0 {
            return Command::None;
        }
        let current = self.selected.get(&section).copied().unwrap_or(0) as isize;
        let next = (current + delta).clamp(0, count as isize - 1) as usize;
        self.selected.insert(section, next);
        Command::None
    }

    fn view_logs_for_selected(&mut self) -> Command {
        let section = self.active_section();
        let index = self.selected.get(&section).copied().unwrap_or(0);
        let Some(pod) = self
            .view(section)
            .cards()
            .get(index)
            .and_then(|card| card.pod.clone())
        else {
            return Command::None;
        };
        self.open_logs(pod)
    }

    /// Opens the logs overlay for a pod, resetting the session to its
    /// defaults, and issues the initial fetch.
    fn open_logs(&mut self, pod: PodRef) -> Command {
        self.logs_scroll = 0;
        let mut pane = LogsPane {
            pod,
            container: None,
            tail_lines: self.default_tail,
            state: LogsState::Loading,
        };
        let command = Self::logs_fetch_command(&mut pane, &mut self.logs_seq);
        self.logs = Some(pane);
        command
    }

    /// Re-fetches with the current selector values; a no-op when the overlay
    /// is closed.
    fn refresh_logs(&mut self) -> Command {
        let Some(pane) = self.logs.as_mut() else {
            return Command::None;
        };
        pane.state = LogsState::Loading;
        Self::logs_fetch_command(pane, &mut self.logs_seq)
    }

    /// Namespace and pod name are required; without them the pane shows an
    /// error and no request is made.
    fn logs_fetch_command(pane: &mut LogsPane, logs_seq: &mut u64) -> Command {
        let namespace = pane
            .pod
            .namespace
            .as_deref()
            .filter(|value| !value.is_empty());
        let pod_name = pane.pod.name.as_deref().filter(|value| !value.is_empty());
        let (Some(namespace), Some(pod_name)) = (namespace, pod_name) else {
            pane.state = LogsState::Error("namespace and pod name are required".to_string());
            return Command::None;
        };
        *logs_seq += 1;
        Command::LoadLogs {
            namespace: namespace.to_string(),
            pod: pod_name.to_string(),
            container: pane.container.clone(),
            tail_lines: pane.tail_lines,
            seq: *logs_seq,
        }
    }

    fn cycle_container(&mut self, delta: isize) -> Command {
        let Some(pane) = self.logs.as_mut() else {
            return Command::None;
        };
        // Option 0 is "all containers" (no container parameter).
        let count = pane.pod.containers.len() as isize + 1;
        let index = match &pane.container {
            None => 0,
            Some(name) => pane
                .pod
                .containers
                .iter()
                .position(|candidate| candidate == name)
                .map(|position| position as isize + 1)
                .unwrap_or(0),
        };
        let next = (index + delta + count) % count;
        let selection = if next == 0 {
            None
        } else {
            Some(pane.pod.containers[(next - 1) as usize].clone())
        };
        if selection == pane.container {
            return Command::None;
        }
        pane.container = selection;
        self.refresh_logs()
    }

    fn cycle_tail(&mut self, forward: bool) -> Command {
        let Some(pane) = self.logs.as_mut() else {
            return Command::None;
        };
        pane.tail_lines = if forward {
            next_tail(pane.tail_lines)
        } else {
            prev_tail(pane.tail_lines)
        };
        self.refresh_logs()
    }
}

#[cfg(test)]
mod tests {
    use super::{App, Command};
    use crate::input::Action;
    use crate::model::{
        Card, LogsState, NamespaceScope, PodRef, Section, Tone, ViewState,
    };

    fn app() -> App {
        App::new(
            "http://127.0.0.1:8080/".to_string(),
            Section::Nodes,
            NamespaceScope::All,
            100,
        )
    }

    fn pod_card(name: &str, namespace: Option<&str>, containers: &[&str]) -> Card {
        Card {
            name: name.to_string(),
            badge: "Running".to_string(),
            tone: Tone::Ready,
            lines: Vec::new(),
            pod: Some(PodRef {
                namespace: namespace.map(str::to_string),
                name: Some(name.to_string()),
                containers: containers.iter().map(|c| c.to_string()).collect(),
            }),
        }
    }

    /// Switches to the pods section, lands one card, and activates View Logs
    /// on it.
    fn open_logs(app: &mut App, card: Card) -> Command {
        let switch = app.apply_action(Action::NextSection);
        let Command::SwitchSection { target } = switch else {
            panic!("expected switch command");
        };
        let Command::LoadSection { seq, .. } = app.complete_section_switch(target) else {
            panic!("expected load command");
        };
        app.finish_section_load(Section::Pods, seq, Ok(vec![card]));
        app.apply_action(Action::ViewLogs)
    }

    #[test]
    fn section_switch_swaps_only_after_the_timer() {
        let mut app = app();
        assert_eq!(app.active_section(), Section::Nodes);

        let command = app.apply_action(Action::NextSection);
        assert_eq!(command, Command::SwitchSection { target: Section::Pods });
        assert_eq!(app.active_section(), Section::Nodes);
        assert!(app.switch_pending());

        let load = app.complete_section_switch(Section::Pods);
        assert_eq!(app.active_section(), Section::Pods);
        assert!(!app.switch_pending());
        assert!(matches!(
            load,
            Command::LoadSection { section: Section::Pods, .. }
        ));
    }

    #[test]
    fn superseded_switch_timer_does_nothing() {
        let mut app = app();
        app.apply_action(Action::NextSection);
        app.apply_action(Action::NextSection);

        assert_eq!(app.complete_section_switch(Section::Pods), Command::None);
        assert_eq!(app.active_section(), Section::Nodes);

        let load = app.complete_section_switch(Section::Deployments);
        assert_eq!(app.active_section(), Section::Deployments);
        assert!(matches!(load, Command::LoadSection { .. }));
    }

    #[test]
    fn stale_section_response_is_discarded() {
        let mut app = app();
        let Command::LoadSection { seq: first, .. } = app.begin_section_load(Section::Nodes) else {
            panic!("expected load command");
        };
        let Command::LoadSection { seq: second, .. } = app.begin_section_load(Section::Nodes)
        else {
            panic!("expected load command");
        };

        app.finish_section_load(Section::Nodes, first, Err("late failure".to_string()));
        assert_eq!(app.view(Section::Nodes), &ViewState::Loading);

        app.finish_section_load(Section::Nodes, second, Ok(Vec::new()));
        assert_eq!(app.view(Section::Nodes), &ViewState::Empty);
    }

    #[test]
    fn fetch_failure_sets_error_state_and_retry_reloads() {
        let mut app = app();
        let Command::LoadSection { seq, .. } = app.begin_section_load(Section::Nodes) else {
            panic!("expected load command");
        };
        app.finish_section_load(Section::Nodes, seq, Err("connection refused".to_string()));
        assert_eq!(
            app.view(Section::Nodes),
            &ViewState::Error("connection refused".to_string())
        );

        let retry = app.apply_action(Action::Refresh);
        match retry {
            Command::LoadSection { section, seq: retry_seq, .. } => {
                assert_eq!(section, Section::Nodes);
                assert_eq!(retry_seq, seq + 1);
            }
            other => panic!("expected reload, got {other:?}"),
        }
        assert_eq!(app.view(Section::Nodes), &ViewState::Loading);
    }

    #[test]
    fn namespace_cycle_reloads_active_section_with_new_scope() {
        let mut app = app();
        app.set_namespaces(vec!["default".to_string(), "prod".to_string()]);

        let command = app.apply_action(Action::NextNamespace);
        match command {
            Command::LoadSection { section, scope, .. } => {
                assert_eq!(section, Section::Nodes);
                assert_eq!(scope, NamespaceScope::Named("default".to_string()));
            }
            other => panic!("expected reload, got {other:?}"),
        }
    }

    #[test]
    fn namespace_cycle_without_options_is_a_no_op() {
        let mut app = app();
        assert_eq!(app.apply_action(Action::NextNamespace), Command::None);
    }

    #[test]
    fn view_logs_opens_overlay_and_issues_fetch() {
        let mut app = app();
        let command = open_logs(&mut app, pod_card("web-1", Some("default"), &["app"]));
        match command {
            Command::LoadLogs { namespace, pod, container, tail_lines, .. } => {
                assert_eq!(namespace, "default");
                assert_eq!(pod, "web-1");
                assert_eq!(container, None);
                assert_eq!(tail_lines, 100);
            }
            other => panic!("expected logs fetch, got {other:?}"),
        }
        let pane = app.logs().expect("open pane");
        assert_eq!(pane.state, LogsState::Loading);
    }

    #[test]
    fn view_logs_without_pod_identity_errors_without_request() {
        let mut app = app();
        let command = open_logs(&mut app, pod_card("ghost", None, &[]));
        assert_eq!(command, Command::None);
        let pane = app.logs().expect("open pane");
        assert_eq!(
            pane.state,
            LogsState::Error("namespace and pod name are required".to_string())
        );
    }

    #[test]
    fn container_cycle_refetches_with_selection() {
        let mut app = app();
        open_logs(&mut app, pod_card("web-1", Some("default"), &["app", "init"]));

        let command = app.apply_action(Action::NextContainer);
        match command {
            Command::LoadLogs { container, .. } => {
                assert_eq!(container, Some("app".to_string()));
            }
            other => panic!("expected logs fetch, got {other:?}"),
        }
    }

    #[test]
    fn selector_changes_are_no_ops_when_overlay_is_closed() {
        let mut app = app();
        assert_eq!(app.apply_action(Action::NextContainer), Command::None);
        assert_eq!(app.apply_action(Action::NextTailLines), Command::None);
        assert!(app.logs().is_none());
    }

    #[test]
    fn empty_log_body_shows_placeholder() {
        let mut app = app();
        let command = open_logs(&mut app, pod_card("web-1", Some("default"), &[]));
        let Command::LoadLogs { seq, .. } = command else {
            panic!("expected logs fetch");
        };

        app.finish_logs_load(seq, Ok(String::new()));
        let pane = app.logs().expect("open pane");
        assert_eq!(
            pane.state,
            LogsState::Loaded("No logs available".to_string())
        );
    }

    #[test]
    fn logs_error_stays_inline_and_overlay_stays_open() {
        let mut app = app();
        let command = open_logs(&mut app, pod_card("web-1", Some("default"), &[]));
        let Command::LoadLogs { seq, .. } = command else {
            panic!("expected logs fetch");
        };

        app.finish_logs_load(seq, Err("HTTP 500".to_string()));
        let pane = app.logs().expect("overlay still open");
        assert_eq!(pane.state, LogsState::Error("HTTP 500".to_string()));

        app.apply_action(Action::CloseOverlay);
        assert!(app.logs().is_none());
    }

    #[test]
    fn stale_logs_response_is_discarded() {
        let mut app = app();
        let first = open_logs(&mut app, pod_card("web-1", Some("default"), &[]));
        let Command::LoadLogs { seq: first_seq, .. } = first else {
            panic!("expected logs fetch");
        };
        let Command::LoadLogs { seq: second_seq, .. } = app.apply_action(Action::Refresh) else {
            panic!("expected logs fetch");
        };

        app.finish_logs_load(first_seq, Ok("stale".to_string()));
        assert_eq!(app.logs().expect("pane").state, LogsState::Loading);

        app.finish_logs_load(second_seq, Ok("fresh".to_string()));
        assert_eq!(
            app.logs().expect("pane").state,
            LogsState::Loaded("fresh".to_string())
        );
    }
}
