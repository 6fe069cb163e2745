use chrono::{DateTime, Local};
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::model::{Card, PodRef, Tone};

/// A collection response from the backend API. A missing `items` field is
/// valid and equivalent to an empty collection.
#[derive(Debug, Clone, Deserialize)]
pub struct ResourceList<T> {
    #[serde(default)]
    pub items: Vec<T>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct ObjectMeta {
    pub name: Option<String>,
    pub namespace: Option<String>,
    pub creation_timestamp: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct NamespaceItem {
    pub metadata: ObjectMeta,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct NodeItem {
    pub metadata: ObjectMeta,
    pub status: NodeStatus,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct NodeStatus {
    pub conditions: Vec<NodeCondition>,
    pub node_info: Option<NodeSystemInfo>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct NodeCondition {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    /// Kept as a raw value: readiness requires the literal string "True", so
    /// a boolean here must read as not ready rather than fail the parse.
    pub status: Option<Value>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct NodeSystemInfo {
    pub os_image: Option<String>,
    pub kernel_version: Option<String>,
    pub container_runtime_version: Option<String>,
    pub kubelet_version: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct PodItem {
    pub metadata: ObjectMeta,
    pub spec: PodSpec,
    pub status: PodStatus,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct PodSpec {
    pub node_name: Option<String>,
    pub containers: Vec<NamedContainer>,
    pub init_containers: Vec<NamedContainer>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct NamedContainer {
    pub name: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct PodStatus {
    pub phase: Option<String>,
    #[serde(rename = "podIP")]
    pub pod_ip: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct DeploymentItem {
    pub metadata: ObjectMeta,
    pub spec: DeploymentSpec,
    pub status: DeploymentStatus,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct DeploymentSpec {
    pub replicas: Option<i64>,
    pub selector: Option<LabelSelector>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct LabelSelector {
    pub match_labels: Option<Map<String, Value>>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct DeploymentStatus {
    pub ready_replicas: Option<i64>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct ServiceItem {
    pub metadata: ObjectMeta,
    pub spec: ServiceSpec,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct ServiceSpec {
    #[serde(rename = "type")]
    pub type_: Option<String>,
    #[serde(rename = "clusterIP")]
    pub cluster_ip: Option<String>,
    pub ports: Option<Vec<ServicePort>>,
    pub selector: Option<Map<String, Value>>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct ServicePort {
    pub port: Option<i64>,
    /// Either a number or a named port string.
    pub target_port: Option<Value>,
    pub protocol: Option<String>,
}

/// One card per item, built independently and kept in input order.
pub fn node_cards(items: Vec<NodeItem>) -> Vec<Card> {
    items.into_iter().map(node_card).collect()
}

fn node_card(node: NodeItem) -> Card {
    let ready = node.status.conditions.iter().any(|condition| {
        condition.kind.as_deref() == Some("Ready")
            && condition.status.as_ref().and_then(Value::as_str) == Some("True")
    });
    let info = node.status.node_info.as_ref();

    Card {
        name: text_or(node.metadata.name.as_deref(), "Unknown"),
        badge: if ready { "Ready" } else { "Not Ready" }.to_string(),
        tone: if ready { Tone::Ready } else { Tone::Failed },
        lines: vec![
            (
                "OS",
                text_or(info.and_then(|i| i.os_image.as_deref()), "Unknown"),
            ),
            (
                "Kernel",
                text_or(info.and_then(|i| i.kernel_version.as_deref()), "Unknown"),
            ),
            (
                "Container Runtime",
                text_or(
                    info.and_then(|i| i.container_runtime_version.as_deref()),
                    "Unknown",
                ),
            ),
            (
                "Kubelet",
                text_or(info.and_then(|i| i.kubelet_version.as_deref()), "Unknown"),
            ),
        ],
        pod: None,
    }
}

pub fn pod_cards(items: Vec<PodItem>) -> Vec<Card> {
    items.into_iter().map(pod_card).collect()
}

fn pod_card(pod: PodItem) -> Card {
    let phase = text_or(pod.status.phase.as_deref(), "Unknown");
    let tone = match phase.as_str() {
        "Running" => Tone::Ready,
        "Failed" => Tone::Failed,
        _ => Tone::Pending,
    };
    let containers = pod
        .spec
        .containers
        .iter()
        .chain(pod.spec.init_containers.iter())
        .filter_map(|container| container.name.clone())
        .collect::<Vec<_>>();

    Card {
        name: text_or(pod.metadata.name.as_deref(), "Unknown"),
        badge: phase,
        tone,
        lines: vec![
            (
                "Namespace",
                text_or(pod.metadata.namespace.as_deref(), "Unknown"),
            ),
            ("Node", text_or(pod.spec.node_name.as_deref(), "N/A")),
            ("IP", text_or(pod.status.pod_ip.as_deref(), "N/A")),
            (
                "Created",
                format_timestamp(pod.metadata.creation_timestamp.as_deref()),
            ),
        ],
        pod: Some(PodRef {
            namespace: pod.metadata.namespace,
            name: pod.metadata.name,
            containers,
        }),
    }
}

pub fn deployment_cards(items: Vec<DeploymentItem>) -> Vec<Card> {
    items.into_iter().map(deployment_card).collect()
}

fn deployment_card(deployment: DeploymentItem) -> Card {
    let ready = deployment.status.ready_replicas.unwrap_or(0);
    let desired = deployment.spec.replicas.unwrap_or(0);
    // A zero-desired-replica deployment is never ready, even at 0/0.
    let is_ready = ready == desired && desired > 0;
    let selector = deployment
        .spec
        .selector
        .and_then(|selector| selector.match_labels)
        .map(|labels| join_labels(&labels))
        .unwrap_or_else(|| "N/A".to_string());

    Card {
        name: text_or(deployment.metadata.name.as_deref(), "Unknown"),
        badge: format!("{ready}/{desired} Ready"),
        tone: if is_ready { Tone::Ready } else { Tone::Pending },
        lines: vec![
            (
                "Namespace",
                text_or(deployment.metadata.namespace.as_deref(), "Unknown"),
            ),
            (
                "Created",
                format_timestamp(deployment.metadata.creation_timestamp.as_deref()),
            ),
            ("Selector", selector),
        ],
        pod: None,
    }
}

pub fn service_cards(items: Vec<ServiceItem>) -> Vec<Card> {
    items.into_iter().map(service_card).collect()
}

fn service_card(service: ServiceItem) -> Card {
    let ports = service
        .spec
        .ports
        .map(|ports| {
            ports
                .iter()
                .map(format_port)
                .collect::<Vec<_>>()
                .join(", ")
        })
        .unwrap_or_else(|| "N/A".to_string());
    let selector = service
        .spec
        .selector
        .map(|labels| join_labels(&labels))
        .unwrap_or_else(|| "N/A".to_string());

    Card {
        name: text_or(service.metadata.name.as_deref(), "Unknown"),
        badge: text_or(service.spec.type_.as_deref(), "Unknown"),
        // Services have no readiness concept; the badge tone is cosmetic.
        tone: Tone::Ready,
        lines: vec![
            (
                "Namespace",
                text_or(service.metadata.namespace.as_deref(), "Unknown"),
            ),
            (
                "Cluster IP",
                text_or(service.spec.cluster_ip.as_deref(), "N/A"),
            ),
            ("Ports", ports),
            ("Selector", selector),
        ],
        pod: None,
    }
}

fn format_port(port: &ServicePort) -> String {
    let number = port.port.unwrap_or(0);
    let protocol = text_or(port.protocol.as_deref(), "TCP");
    match target_port_segment(port.target_port.as_ref()) {
        Some(target) => format!("{number}:{target}/{protocol}"),
        None => format!("{number}/{protocol}"),
    }
}

/// The target-port segment is omitted when the value is absent, zero, or an
/// empty string.
fn target_port_segment(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::Number(number) if number.as_i64() != Some(0) => Some(number.to_string()),
        Value::String(name) if !name.is_empty() => Some(name.clone()),
        _ => None,
    }
}

/// `key=value` pairs joined with ", " in the mapping's own order.
fn join_labels(labels: &Map<String, Value>) -> String {
    labels
        .iter()
        .map(|(key, value)| match value {
            Value::String(text) => format!("{key}={text}"),
            other => format!("{key}={other}"),
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// Empty strings degrade to the fallback just like absent fields.
fn text_or(value: Option<&str>, fallback: &str) -> String {
    match value {
        Some(text) if !text.is_empty() => text.to_string(),
        _ => fallback.to_string(),
    }
}

/// RFC 3339 timestamps render in local time; an absent value shows "Unknown"
/// and an unparseable one is shown as received.
fn format_timestamp(raw: Option<&str>) -> String {
    match raw {
        None => "Unknown".to_string(),
        Some(text) if text.is_empty() => "Unknown".to_string(),
        Some(text) => DateTime::parse_from_rfc3339(text)
            .map(|parsed| {
                parsed
                    .with_timezone(&Local)
                    .format("%Y-%m-%d %H:%M:%S")
                    .to_string()
            })
            .unwrap_or_else(|_| text.to_string()),
    }
}
