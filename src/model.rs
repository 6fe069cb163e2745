use std::fmt::{Display, Formatter};

/// One of the four resource categories, each with its own tab and view.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum Section {
    Nodes,
    Pods,
    Deployments,
    Services,
}

impl Section {
    pub const ALL: [Self; 4] = [Self::Nodes, Self::Pods, Self::Deployments, Self::Services];

    pub fn title(self) -> &'static str {
        match self {
            Self::Nodes => "Nodes",
            Self::Pods => "Pods",
            Self::Deployments => "Deployments",
            Self::Services => "Services",
        }
    }

    /// The `{section}` token in `/api/{section}` request paths.
    pub fn api_path(self) -> &'static str {
        match self {
            Self::Nodes => "nodes",
            Self::Pods => "pods",
            Self::Deployments => "deployments",
            Self::Services => "services",
        }
    }

    pub fn empty_message(self) -> &'static str {
        match self {
            Self::Nodes => "No nodes found.",
            Self::Pods => "No pods found.",
            Self::Deployments => "No deployments found.",
            Self::Services => "No services found.",
        }
    }

    pub fn from_token(token: &str) -> Option<Self> {
        match token.to_ascii_lowercase().as_str() {
            "no" | "node" | "nodes" => Some(Self::Nodes),
            "po" | "pod" | "pods" => Some(Self::Pods),
            "deploy" | "deployment" | "deployments" => Some(Self::Deployments),
            "svc" | "service" | "services" => Some(Self::Services),
            _ => None,
        }
    }
}

impl Display for Section {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.title())
    }
}

/// Visual class of a status badge.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Tone {
    Ready,
    Pending,
    Failed,
}

/// Identity and container list captured from a pod item, enough to open the
/// logs overlay for it later.
#[derive(Debug, Clone, Eq, PartialEq, Default)]
pub struct PodRef {
    pub namespace: Option<String>,
    pub name: Option<String>,
    pub containers: Vec<String>,
}

/// The rendered form of one resource object.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Card {
    pub name: String,
    pub badge: String,
    pub tone: Tone,
    pub lines: Vec<(&'static str, String)>,
    pub pod: Option<PodRef>,
}

/// Per-section view state; a section is in exactly one of these at any time,
/// determined by the most recent fetch outcome.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewState {
    Loading,
    Populated(Vec<Card>),
    Empty,
    Error(String),
}

impl ViewState {
    pub fn cards(&self) -> &[Card] {
        match self {
            Self::Populated(cards) => cards,
            _ => &[],
        }
    }
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub enum NamespaceScope {
    All,
    Named(String),
}

impl NamespaceScope {
    /// Query value for the `namespace` parameter; `None` means no filter.
    pub fn query_value(&self) -> Option<&str> {
        match self {
            Self::All => None,
            Self::Named(namespace) => Some(namespace.as_str()),
        }
    }
}

impl Display for NamespaceScope {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::All => write!(f, "all"),
            Self::Named(namespace) => write!(f, "{namespace}"),
        }
    }
}

/// Tail-lines choices offered by the log pane selector.
pub const TAIL_OPTIONS: [u32; 5] = [50, 100, 200, 500, 1000];

pub fn next_tail(current: u32) -> u32 {
    let index = TAIL_OPTIONS
        .iter()
        .position(|&value| value == current)
        .unwrap_or(TAIL_OPTIONS.len() - 1);
    TAIL_OPTIONS[(index + 1) % TAIL_OPTIONS.len()]
}

pub fn prev_tail(current: u32) -> u32 {
    let index = TAIL_OPTIONS
        .iter()
        .position(|&value| value == current)
        .unwrap_or(1);
    TAIL_OPTIONS[(index + TAIL_OPTIONS.len() - 1) % TAIL_OPTIONS.len()]
}

#[derive(Debug, Clone, PartialEq)]
pub enum LogsState {
    Loading,
    Loaded(String),
    Error(String),
}

/// Logs overlay session; exists only while the overlay is open and is reset
/// when a new pod's logs are requested.
#[derive(Debug, Clone, PartialEq)]
pub struct LogsPane {
    pub pod: PodRef,
    /// `None` means all containers (the `container` query parameter is omitted).
    pub container: Option<String>,
    pub tail_lines: u32,
    pub state: LogsState,
}

#[cfg(test)]
mod tests {
    use super::{NamespaceScope, Section, TAIL_OPTIONS, next_tail, prev_tail};

    #[test]
    fn section_aliases_map_to_expected_sections() {
        assert_eq!(Section::from_token("po"), Some(Section::Pods));
        assert_eq!(
            Section::from_token("Deployments"),
            Some(Section::Deployments)
        );
        assert_eq!(Section::from_token("svc"), Some(Section::Services));
        assert_eq!(Section::from_token("node"), Some(Section::Nodes));
        assert_eq!(Section::from_token("ingress"), None);
    }

    #[test]
    fn empty_messages_name_the_resource() {
        assert_eq!(Section::Pods.empty_message(), "No pods found.");
        assert_eq!(Section::Nodes.empty_message(), "No nodes found.");
    }

    #[test]
    fn all_scope_has_no_query_value() {
        assert_eq!(NamespaceScope::All.query_value(), None);
        assert_eq!(
            NamespaceScope::Named("prod".to_string()).query_value(),
            Some("prod")
        );
    }

    #[test]
    fn tail_cycling_wraps_both_directions() {
        assert_eq!(next_tail(100), 200);
        assert_eq!(next_tail(1000), 50);
        assert_eq!(prev_tail(50), 1000);
        // Unknown current value resumes from the defaults.
        assert_eq!(next_tail(42), TAIL_OPTIONS[0]);
    }
}
