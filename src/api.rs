use anyhow::{Context, Result, bail};
use url::Url;

use crate::model::{Card, NamespaceScope, Section};
use crate::resources::{
    self, DeploymentItem, NamespaceItem, NodeItem, PodItem, ResourceList, ServiceItem,
};

/// HTTP gateway to the cluster-management API proxy. Carries no state beyond
/// the connection pool and the base URL; every call is a fresh request.
#[derive(Debug, Clone)]
pub struct ApiGateway {
    client: reqwest::Client,
    base: Url,
}

impl ApiGateway {
    pub fn new(base: Url) -> Self {
        Self {
            client: reqwest::Client::new(),
            base,
        }
    }

    pub fn target(&self) -> &str {
        self.base.as_str()
    }

    /// Fetches the namespace list. Entries without a non-empty name are
    /// skipped silently.
    pub async fn fetch_namespaces(&self) -> Result<Vec<String>> {
        let url = namespaces_url(&self.base)?;
        let list: ResourceList<NamespaceItem> = self.get_json(url).await?;
        Ok(list
            .items
            .into_iter()
            .filter_map(|item| item.metadata.name)
            .filter(|name| !name.is_empty())
            .collect())
    }

    /// Fetches one section's collection and builds its display cards.
    pub async fn fetch_section(
        &self,
        section: Section,
        scope: &NamespaceScope,
    ) -> Result<Vec<Card>> {
        let url = section_url(&self.base, section, scope)?;
        let cards = match section {
            Section::Nodes => {
                let list: ResourceList<NodeItem> = self.get_json(url).await?;
                resources::node_cards(list.items)
            }
            Section::Pods => {
                let list: ResourceList<PodItem> = self.get_json(url).await?;
                resources::pod_cards(list.items)
            }
            Section::Deployments => {
                let list: ResourceList<DeploymentItem> = self.get_json(url).await?;
                resources::deployment_cards(list.items)
            }
            Section::Services => {
                let list: ResourceList<ServiceItem> = self.get_json(url).await?;
                resources::service_cards(list.items)
            }
        };
        Ok(cards)
    }

    /// Fetches raw log text for a pod. The body is plain text, not JSON.
    pub async fn fetch_logs(
        &self,
        namespace: &str,
        pod: &str,
        tail_lines: u32,
        container: Option<&str>,
    ) -> Result<String> {
        let url = logs_url(&self.base, namespace, pod, tail_lines, container)?;
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .with_context(|| format!("request to {url} failed"))?;
        let status = response.status();
        if !status.is_success() {
            bail!("logs request returned HTTP {status}");
        }
        response
            .text()
            .await
            .with_context(|| format!("failed to read log body from {url}"))
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: Url) -> Result<T> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .with_context(|| format!("request to {url} failed"))?;
        let status = response.status();
        if !status.is_success() {
            bail!("{url} returned HTTP {status}");
        }
        response
            .json::<T>()
            .await
            .with_context(|| format!("failed to decode response from {url}"))
    }
}

fn namespaces_url(base: &Url) -> Result<Url> {
    base.join("/api/namespaces")
        .context("invalid namespaces URL")
}

/// `/api/{section}`, with the `namespace` parameter appended only for a
/// non-empty filter.
fn section_url(base: &Url, section: Section, scope: &NamespaceScope) -> Result<Url> {
    let mut url = base
        .join(&format!("/api/{}", section.api_path()))
        .with_context(|| format!("invalid URL for section {section}"))?;
    if let Some(namespace) = scope.query_value() {
        url.query_pairs_mut().append_pair("namespace", namespace);
    }
    Ok(url)
}

fn logs_url(
    base: &Url,
    namespace: &str,
    pod: &str,
    tail_lines: u32,
    container: Option<&str>,
) -> Result<Url> {
    let mut url = base.join("/api/logs").context("invalid logs URL")?;
    {
        let mut pairs = url.query_pairs_mut();
        pairs.append_pair("namespace", namespace);
        pairs.append_pair("pod", pod);
        pairs.append_pair("tailLines", &tail_lines.to_string());
        if let Some(container) = container {
            pairs.append_pair("container", container);
        }
    }
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::{logs_url, section_url};
    use crate::model::{NamespaceScope, Section};
    use url::Url;

    fn base() -> Url {
        Url::parse("http://127.0.0.1:8080").expect("base url")
    }

    #[test]
    fn section_url_without_filter_has_no_query() {
        let url = section_url(&base(), Section::Nodes, &NamespaceScope::All).expect("url");
        assert_eq!(url.as_str(), "http://127.0.0.1:8080/api/nodes");
    }

    #[test]
    fn section_url_with_filter_appends_namespace() {
        let scope = NamespaceScope::Named("prod".to_string());
        let url = section_url(&base(), Section::Nodes, &scope).expect("url");
        assert_eq!(url.as_str(), "http://127.0.0.1:8080/api/nodes?namespace=prod");
    }

    #[test]
    fn section_url_uses_the_section_token() {
        let url = section_url(&base(), Section::Deployments, &NamespaceScope::All).expect("url");
        assert_eq!(url.path(), "/api/deployments");
    }

    #[test]
    fn logs_url_omits_container_when_unselected() {
        let url = logs_url(&base(), "default", "web-1", 100, None).expect("url");
        assert_eq!(
            url.as_str(),
            "http://127.0.0.1:8080/api/logs?namespace=default&pod=web-1&tailLines=100"
        );
    }

    #[test]
    fn logs_url_carries_selected_container_verbatim() {
        let url = logs_url(&base(), "default", "web-1", 500, Some("sidecar")).expect("url");
        assert_eq!(
            url.as_str(),
            "http://127.0.0.1:8080/api/logs?namespace=default&pod=web-1&tailLines=500&container=sidecar"
        );
    }
}
