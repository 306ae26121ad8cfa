//! The `DoClient` facade.
//!
//! One method per API operation, each a thin composition of a mediator call
//! plus JSON-to-record decoding. The facade owns the credential and holds the
//! droplet and SSH key collections; droplet listings replace the held
//! collection wholesale, so record references held by a caller are not
//! invalidated on refresh.

use crate::models::{
    Account, AccountEnvelope, ActionStatus, CreateDomainRequest, CreateDroplet, CreateDroplets,
    Domain, DomainEnvelope, DomainListEnvelope, Droplet, DropletActionRequest, DropletEnvelope,
    DropletId, DropletListEnvelope, Image, ImageListEnvelope, Kernel, KernelListEnvelope, Region,
    RegionListEnvelope, Size, SizeListEnvelope, Snapshot, SnapshotListEnvelope, SshKey,
    SshKeyListEnvelope,
};
use crate::resize::ResizeOperation;
use doclient_core::client::{ApiClient, ApiClientBuilder, Verb};
use doclient_core::config::DoClientConfig;
use doclient_core::transport::Transport;
use doclient_core::{Error, Result};
use reqwest::StatusCode;
use std::sync::Arc;
use tracing::warn;
use validator::Validate;

const USER_AGENT: &str = concat!("doclient/", env!("CARGO_PKG_VERSION"));

/// Collections are fetched at a fixed page size; further pages are never
/// requested, so 100 items is a hard per-collection limit.
const LIST_PAGE: u32 = 1;
const LIST_PER_PAGE: u32 = 100;

fn list_params() -> [(&'static str, String); 2] {
    [
        ("page", LIST_PAGE.to_string()),
        ("per_page", LIST_PER_PAGE.to_string()),
    ]
}

/// Builder for [`DoClient`].
pub struct DoClientBuilder {
    inner: ApiClientBuilder,
}

impl DoClientBuilder {
    /// Create a builder holding the bearer token.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            inner: ApiClientBuilder::new(token).with_user_agent(USER_AGENT),
        }
    }

    /// Override the client configuration.
    #[must_use]
    pub fn with_config(mut self, config: DoClientConfig) -> Self {
        self.inner = self.inner.with_config(config);
        self
    }

    /// Register an additional header sent with every request.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.inner = self.inner.with_header(name, value);
        self
    }

    /// Substitute the HTTP transport (used by tests).
    #[must_use]
    pub fn with_transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.inner = self.inner.with_transport(transport);
        self
    }

    /// Build the facade.
    ///
    /// Construction is eager: the droplet list and account information are
    /// fetched immediately, with the droplet count merged into the account
    /// record. There is no partial facade; if either fetch fails the error
    /// propagates.
    ///
    /// # Errors
    ///
    /// Whatever the mediator raised for the failing initialization fetch,
    /// or a configuration error from the builder itself.
    pub async fn build(self) -> Result<DoClient> {
        let api = self.inner.build()?;

        let droplets = DoClient::fetch_droplets(&api).await?;
        let mut account = DoClient::fetch_account(&api).await?;
        account.droplet_count = droplets.len() as u64;

        Ok(DoClient {
            api,
            droplets,
            ssh_keys: Vec::new(),
            account,
        })
    }
}

/// DigitalOcean APIv2 client facade.
///
/// Strictly sequential: every operation issues one HTTP exchange and
/// completes it before returning. The facade is not designed to be shared
/// across concurrent callers; collection-refreshing operations take
/// `&mut self`.
pub struct DoClient {
    api: ApiClient,
    droplets: Vec<Droplet>,
    ssh_keys: Vec<SshKey>,
    account: Account,
}

impl DoClient {
    /// Construct a facade from a bearer token with default configuration.
    ///
    /// # Errors
    ///
    /// See [`DoClientBuilder::build`].
    pub async fn connect(token: impl Into<String>) -> Result<Self> {
        DoClientBuilder::new(token).build().await
    }

    /// Start a builder holding the bearer token.
    #[must_use]
    pub fn builder(token: impl Into<String>) -> DoClientBuilder {
        DoClientBuilder::new(token)
    }

    /// Account information captured at initialization (droplet count merged
    /// from the droplet list fetched alongside it).
    #[must_use]
    pub fn account(&self) -> &Account {
        &self.account
    }

    /// The held droplet collection, as of the last listing call.
    #[must_use]
    pub fn droplets(&self) -> &[Droplet] {
        &self.droplets
    }

    /// The held SSH key collection.
    #[must_use]
    pub fn ssh_keys(&self) -> &[SshKey] {
        &self.ssh_keys
    }

    /// Register additional headers sent with every subsequent request.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] for names or values that are not
    /// legal HTTP headers.
    pub fn add_request_headers(
        &mut self,
        headers: &[(impl AsRef<str>, impl AsRef<str>)],
    ) -> Result<()> {
        self.api.add_request_headers(headers)
    }

    async fn fetch_droplets(api: &ApiClient) -> Result<Vec<Droplet>> {
        let envelope: DropletListEnvelope = api
            .request_json(Verb::Get, "droplets", &list_params(), None::<&()>)
            .await?;
        Ok(envelope.droplets)
    }

    async fn fetch_account(api: &ApiClient) -> Result<Account> {
        let envelope: AccountEnvelope = api
            .request_json(Verb::Get, "account", &[], None::<&()>)
            .await?;
        Ok(envelope.account)
    }

    /// Fetch the droplet list and replace the held collection wholesale.
    ///
    /// # Errors
    ///
    /// Propagates mediator errors unchanged.
    pub async fn get_droplets(&mut self) -> Result<&[Droplet]> {
        self.droplets = Self::fetch_droplets(&self.api).await?;
        Ok(&self.droplets)
    }

    /// Find a held droplet by id. Purely local; no network call.
    ///
    /// String input is accepted through [`DropletId`]'s `FromStr`, which
    /// fails with [`Error::InvalidArgument`] for non-integer input.
    #[must_use]
    pub fn get_droplet(&self, id: DropletId) -> Option<&Droplet> {
        self.droplets.iter().find(|droplet| droplet.id == id)
    }

    /// Filter the held droplets. Purely local; no network call.
    ///
    /// With no matcher the full collection is returned in order. A matcher
    /// that parses as an integer performs an exact-id match and never falls
    /// through to name matching. Anything else is an unanchored,
    /// case-sensitive substring match on droplet names.
    #[must_use]
    pub fn filter_droplets(&self, matcher: Option<&str>) -> Vec<Droplet> {
        let Some(token) = matcher else {
            return self.droplets.clone();
        };

        match token.parse::<DropletId>() {
            Ok(id) => self
                .droplets
                .iter()
                .filter(|droplet| droplet.id == id)
                .cloned()
                .collect(),
            Err(_) => self
                .droplets
                .iter()
                .filter(|droplet| droplet.name.contains(token))
                .cloned()
                .collect(),
        }
    }

    /// Power off a droplet.
    ///
    /// Unlike other mutating operations, an authentication failure is
    /// converted into the returned status message instead of an error. This
    /// asymmetry is long-standing observable behavior; callers that need to
    /// distinguish the cases should inspect the message.
    ///
    /// # Errors
    ///
    /// Non-authentication mediator errors propagate unchanged.
    pub async fn poweroff_droplet(&self, id: DropletId) -> Result<ActionStatus> {
        self.power_action(id, DropletActionRequest::PowerOff).await
    }

    /// Power on a droplet. Same auth-failure handling as
    /// [`Self::poweroff_droplet`].
    ///
    /// # Errors
    ///
    /// Non-authentication mediator errors propagate unchanged.
    pub async fn poweron_droplet(&self, id: DropletId) -> Result<ActionStatus> {
        self.power_action(id, DropletActionRequest::PowerOn).await
    }

    /// Power cycle a droplet. Same auth-failure handling as
    /// [`Self::poweroff_droplet`].
    ///
    /// # Errors
    ///
    /// Non-authentication mediator errors propagate unchanged.
    pub async fn powercycle_droplet(&self, id: DropletId) -> Result<ActionStatus> {
        self.power_action(id, DropletActionRequest::PowerCycle).await
    }

    async fn power_action(
        &self,
        id: DropletId,
        action: DropletActionRequest,
    ) -> Result<ActionStatus> {
        match self.droplet_action(id, &action).await {
            Err(Error::Auth(message)) => {
                warn!(droplet = %id, action = action.kind(), "authentication failure returned as status message");
                Ok(ActionStatus::new(message))
            }
            other => other,
        }
    }

    pub(crate) async fn droplet_action(
        &self,
        id: DropletId,
        action: &DropletActionRequest,
    ) -> Result<ActionStatus> {
        let path = format!("droplets/{id}/actions");
        let response = self.api.request_raw(Verb::Post, &path, &[], Some(action)).await?;

        if response.is_success() {
            Ok(ActionStatus::new(format!(
                "Initiated {} on droplet {id}",
                action.kind()
            )))
        } else {
            Err(Error::Api(response.message().unwrap_or_else(|| {
                format!(
                    "Droplet action {} failed with status {}",
                    action.kind(),
                    response.status
                )
            })))
        }
    }

    /// Create a droplet.
    ///
    /// The request is validated before any network call; only status 202
    /// signals success. On success the droplet list is refreshed in full
    /// and the created record returned.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidArgument`] for an invalid request, [`Error::Api`]
    /// for any non-202 response, plus mediator errors.
    pub async fn create_droplet(&mut self, request: &CreateDroplet) -> Result<Droplet> {
        request.validate()?;

        let response = self
            .api
            .request_raw(Verb::Post, "droplets", &[], Some(request))
            .await?;
        if response.status != StatusCode::ACCEPTED {
            return Err(Error::Api(response.message().unwrap_or_else(|| {
                format!("Droplet create failed with status {}", response.status)
            })));
        }

        let created: DropletEnvelope = response.json()?;
        self.get_droplets().await?;

        let held = self.get_droplet(created.droplet.id).cloned();
        Ok(held.unwrap_or(created.droplet))
    }

    /// Create a batch of droplets with identical parameters.
    ///
    /// Performs one full droplet-list refresh after the batch is accepted,
    /// not one per droplet.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidArgument`] when the batch is empty or any name is
    /// empty, [`Error::Api`] for any non-202 response, plus mediator errors.
    pub async fn create_droplets(&mut self, request: &CreateDroplets) -> Result<Vec<Droplet>> {
        request.validate()?;
        if request.names.iter().any(String::is_empty) {
            return Err(Error::InvalidArgument(
                "Droplet names must be non-empty strings".to_string(),
            ));
        }

        let response = self
            .api
            .request_raw(Verb::Post, "droplets", &[], Some(request))
            .await?;
        if response.status != StatusCode::ACCEPTED {
            return Err(Error::Api(response.message().unwrap_or_else(|| {
                format!("Droplet create failed with status {}", response.status)
            })));
        }

        let created: DropletListEnvelope = response.json()?;
        self.get_droplets().await?;

        Ok(created
            .droplets
            .into_iter()
            .map(|droplet| self.get_droplet(droplet.id).cloned().unwrap_or(droplet))
            .collect())
    }

    /// Delete a droplet.
    ///
    /// The id must refer to a held droplet; an unknown id fails locally
    /// without a network round trip. Success requires status 204. The held
    /// collection is not refreshed; re-list to reconcile.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidArgument`] for an unknown droplet, [`Error::Api`]
    /// for any non-204 response, plus mediator errors.
    pub async fn delete_droplet(&self, id: DropletId) -> Result<ActionStatus> {
        if self.get_droplet(id).is_none() {
            return Err(Error::InvalidArgument(format!("Unknown droplet {id}")));
        }

        let path = format!("droplets/{id}");
        let response = self
            .api
            .request_raw(Verb::Delete, &path, &[], None::<&()>)
            .await?;

        if response.status == StatusCode::NO_CONTENT {
            Ok(ActionStatus::new(format!(
                "Successfully initiated delete of droplet {id}"
            )))
        } else {
            Err(Error::Api(response.message().unwrap_or_else(|| {
                format!("Droplet delete failed with status {}", response.status)
            })))
        }
    }

    /// Begin the multi-step resize choreography for a droplet.
    ///
    /// The returned operation issues power-off, resize, and power-on as
    /// separate steps; the caller decides how long to wait between them.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidArgument`] for an empty size slug.
    pub fn resize_droplet(
        &self,
        id: DropletId,
        size: impl Into<String>,
        disk: Option<bool>,
    ) -> Result<ResizeOperation<'_>> {
        let size = size.into();
        if size.is_empty() {
            return Err(Error::InvalidArgument(
                "A non-empty size slug is required".to_string(),
            ));
        }
        Ok(ResizeOperation::new(self, id, size, disk))
    }

    /// List snapshots taken of a droplet.
    ///
    /// # Errors
    ///
    /// Propagates mediator errors unchanged.
    pub async fn get_droplet_snapshots(&self, id: DropletId) -> Result<Vec<Snapshot>> {
        let path = format!("droplets/{id}/snapshots");
        let envelope: SnapshotListEnvelope = self
            .api
            .request_json(Verb::Get, &path, &[], None::<&()>)
            .await?;
        Ok(envelope.snapshots)
    }

    /// List kernels available to a droplet.
    ///
    /// # Errors
    ///
    /// Propagates mediator errors unchanged.
    pub async fn get_droplet_kernels(&self, id: DropletId) -> Result<Vec<Kernel>> {
        let path = format!("droplets/{id}/kernels");
        let envelope: KernelListEnvelope = self
            .api
            .request_json(Verb::Get, &path, &[], None::<&()>)
            .await?;
        Ok(envelope.kernels)
    }

    /// List droplets sharing physical hardware with the given droplet.
    ///
    /// # Errors
    ///
    /// Propagates mediator errors unchanged.
    pub async fn get_droplet_neighbours(&self, id: DropletId) -> Result<Vec<Droplet>> {
        let path = format!("droplets/{id}/neighbors");
        let envelope: DropletListEnvelope = self
            .api
            .request_json(Verb::Get, &path, &[], None::<&()>)
            .await?;
        Ok(envelope.droplets)
    }

    /// List available images.
    ///
    /// # Errors
    ///
    /// Propagates mediator errors unchanged.
    pub async fn get_images(&self) -> Result<Vec<Image>> {
        let envelope: ImageListEnvelope = self
            .api
            .request_json(Verb::Get, "images", &list_params(), None::<&()>)
            .await?;
        Ok(envelope.images)
    }

    /// List available droplet sizes.
    ///
    /// # Errors
    ///
    /// Propagates mediator errors unchanged.
    pub async fn get_sizes(&self) -> Result<Vec<Size>> {
        let envelope: SizeListEnvelope = self
            .api
            .request_json(Verb::Get, "sizes", &list_params(), None::<&()>)
            .await?;
        Ok(envelope.sizes)
    }

    /// List available regions.
    ///
    /// # Errors
    ///
    /// Propagates mediator errors unchanged.
    pub async fn get_regions(&self) -> Result<Vec<Region>> {
        let envelope: RegionListEnvelope = self
            .api
            .request_json(Verb::Get, "regions", &list_params(), None::<&()>)
            .await?;
        Ok(envelope.regions)
    }

    /// Create a DNS domain mapping. Success requires status 201.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidArgument`] for empty arguments, [`Error::Api`] for
    /// any non-201 response (carrying the body message when present), plus
    /// mediator errors.
    pub async fn create_domain(&self, name: &str, ip_address: &str) -> Result<Domain> {
        require_non_empty(name, "domain name")?;
        require_non_empty(ip_address, "ip address")?;

        let body = CreateDomainRequest {
            name: name.to_string(),
            ip_address: ip_address.to_string(),
        };
        let response = self
            .api
            .request_raw(Verb::Post, "domains", &[], Some(&body))
            .await?;

        if response.status != StatusCode::CREATED {
            return Err(Error::Api(response.message().unwrap_or_else(|| {
                format!("Domain create failed with status {}", response.status)
            })));
        }

        let envelope: DomainEnvelope = response.json()?;
        Ok(envelope.domain)
    }

    /// Fetch a DNS domain mapping by name. Success requires status 200.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidArgument`] for an empty name, [`Error::Api`] for any
    /// non-200 response, plus mediator errors.
    pub async fn get_domain(&self, name: &str) -> Result<Domain> {
        require_non_empty(name, "domain name")?;

        let path = format!("domains/{name}");
        let response = self
            .api
            .request_raw(Verb::Get, &path, &[], None::<&()>)
            .await?;

        if response.status != StatusCode::OK {
            return Err(Error::Api(response.message().unwrap_or_else(|| {
                format!("Domain fetch failed with status {}", response.status)
            })));
        }

        let envelope: DomainEnvelope = response.json()?;
        Ok(envelope.domain)
    }

    /// List all DNS domain mappings.
    ///
    /// # Errors
    ///
    /// Propagates mediator errors unchanged.
    pub async fn get_domains(&self) -> Result<Vec<Domain>> {
        let envelope: DomainListEnvelope = self
            .api
            .request_json(Verb::Get, "domains", &list_params(), None::<&()>)
            .await?;
        Ok(envelope.domains)
    }

    /// Delete a DNS domain mapping. Success requires status 204.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidArgument`] for an empty name, [`Error::Api`] for any
    /// non-204 response, plus mediator errors.
    pub async fn delete_domain(&self, name: &str) -> Result<ActionStatus> {
        require_non_empty(name, "domain name")?;

        let path = format!("domains/{name}");
        let response = self
            .api
            .request_raw(Verb::Delete, &path, &[], None::<&()>)
            .await?;

        if response.status == StatusCode::NO_CONTENT {
            Ok(ActionStatus::new(
                "Successfully initiated domain mapping delete",
            ))
        } else {
            Err(Error::Api(response.message().unwrap_or_else(|| {
                format!("Domain delete failed with status {}", response.status)
            })))
        }
    }

    /// Fetch the account's SSH keys, appending previously unseen keys to
    /// the held collection (the collection is appended to, never replaced).
    ///
    /// # Errors
    ///
    /// Propagates mediator errors unchanged.
    pub async fn get_ssh_keys(&mut self) -> Result<&[SshKey]> {
        let envelope: SshKeyListEnvelope = self
            .api
            .request_json(Verb::Get, "account/keys", &list_params(), None::<&()>)
            .await?;

        for key in envelope.ssh_keys {
            if !self.ssh_keys.contains(&key) {
                self.ssh_keys.push(key);
            }
        }
        Ok(&self.ssh_keys)
    }

    /// Fetch current account information from the API.
    ///
    /// Unlike [`Self::account`], this always performs a network call and
    /// reports the account exactly as the API returns it.
    ///
    /// # Errors
    ///
    /// Propagates mediator errors unchanged.
    pub async fn get_user_information(&self) -> Result<Account> {
        Self::fetch_account(&self.api).await
    }
}

impl std::fmt::Debug for DoClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DoClient")
            .field("droplets", &self.droplets.len())
            .field("ssh_keys", &self.ssh_keys.len())
            .field("account", &self.account.uuid)
            .finish_non_exhaustive()
    }
}

fn require_non_empty(value: &str, what: &str) -> Result<()> {
    if value.is_empty() {
        Err(Error::InvalidArgument(format!(
            "A non-empty {what} is required"
        )))
    } else {
        Ok(())
    }
}

/// Operations a droplet record can route back through the facade. The
/// facade is always an explicit argument; records never hold a reference to
/// the client that produced them.
impl Droplet {
    /// Power off this droplet. See [`DoClient::poweroff_droplet`].
    ///
    /// # Errors
    ///
    /// Non-authentication mediator errors propagate unchanged.
    pub async fn power_off(&self, client: &DoClient) -> Result<ActionStatus> {
        client.poweroff_droplet(self.id).await
    }

    /// Power on this droplet. See [`DoClient::poweron_droplet`].
    ///
    /// # Errors
    ///
    /// Non-authentication mediator errors propagate unchanged.
    pub async fn power_on(&self, client: &DoClient) -> Result<ActionStatus> {
        client.poweron_droplet(self.id).await
    }

    /// Power cycle this droplet. See [`DoClient::powercycle_droplet`].
    ///
    /// # Errors
    ///
    /// Non-authentication mediator errors propagate unchanged.
    pub async fn power_cycle(&self, client: &DoClient) -> Result<ActionStatus> {
        client.powercycle_droplet(self.id).await
    }

    /// Reset the root password of this droplet.
    ///
    /// # Errors
    ///
    /// Propagates mediator errors unchanged.
    pub async fn reset_password(&self, client: &DoClient) -> Result<ActionStatus> {
        client
            .droplet_action(self.id, &DropletActionRequest::PasswordReset)
            .await
    }

    /// Delete this droplet. See [`DoClient::delete_droplet`].
    ///
    /// # Errors
    ///
    /// See [`DoClient::delete_droplet`].
    pub async fn delete(&self, client: &DoClient) -> Result<ActionStatus> {
        client.delete_droplet(self.id).await
    }

    /// Begin the resize choreography for this droplet. See
    /// [`DoClient::resize_droplet`].
    ///
    /// # Errors
    ///
    /// [`Error::InvalidArgument`] for an empty size slug.
    pub fn resize<'a>(
        &self,
        client: &'a DoClient,
        size: impl Into<String>,
        disk: Option<bool>,
    ) -> Result<ResizeOperation<'a>> {
        client.resize_droplet(self.id, size, disk)
    }

    /// List snapshots taken of this droplet.
    ///
    /// # Errors
    ///
    /// Propagates mediator errors unchanged.
    pub async fn get_snapshots(&self, client: &DoClient) -> Result<Vec<Snapshot>> {
        client.get_droplet_snapshots(self.id).await
    }

    /// List kernels available to this droplet.
    ///
    /// # Errors
    ///
    /// Propagates mediator errors unchanged.
    pub async fn get_kernels(&self, client: &DoClient) -> Result<Vec<Kernel>> {
        client.get_droplet_kernels(self.id).await
    }

    /// List droplets sharing physical hardware with this droplet.
    ///
    /// # Errors
    ///
    /// Propagates mediator errors unchanged.
    pub async fn get_neighbours(&self, client: &DoClient) -> Result<Vec<Droplet>> {
        client.get_droplet_neighbours(self.id).await
    }
}
