//! Typed resource records decoded from DigitalOcean APIv2 responses.
//!
//! Every record is a closed struct with an explicit field list; unknown JSON
//! fields are ignored during decoding. Records are read-mostly: they are
//! created fresh on every fetch and never mutated in place.

use chrono::{DateTime, Utc};
use doclient_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use validator::Validate;

/// Droplet identifier.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct DropletId(i64);

impl DropletId {
    /// Wrap a raw integer id.
    #[must_use]
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// The raw integer value.
    #[must_use]
    pub const fn value(self) -> i64 {
        self.0
    }
}

impl From<i64> for DropletId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl FromStr for DropletId {
    type Err = Error;

    /// Parse an id from its integer-literal form; anything else fails with
    /// [`Error::InvalidArgument`].
    fn from_str(s: &str) -> Result<Self> {
        s.trim()
            .parse::<i64>()
            .map(Self)
            .map_err(|_| Error::InvalidArgument("A valid integer droplet id is required".to_string()))
    }
}

impl fmt::Display for DropletId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Whether a network interface is publicly routable or private.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NetworkKind {
    /// Publicly routable address.
    Public,
    /// Private (VPC) address.
    Private,
}

/// A single network interface attached to a droplet.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NetworkInterface {
    /// Assigned IP address.
    pub ip_address: String,
    /// Netmask; a dotted quad for v4, a prefix length for v6.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub netmask: Option<serde_json::Value>,
    /// Gateway address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gateway: Option<String>,
    /// Public/private tag as reported by the API.
    #[serde(rename = "type")]
    pub kind: NetworkKind,
}

/// Droplet network interfaces, grouped by IP version.
///
/// Interface order within each group matches the API response order.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Networks {
    /// IPv4 interfaces.
    #[serde(default)]
    pub v4: Vec<NetworkInterface>,
    /// IPv6 interfaces.
    #[serde(default)]
    pub v6: Vec<NetworkInterface>,
}

/// A droplet (virtual machine instance).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Droplet {
    /// Droplet id, immutable once assigned.
    pub id: DropletId,
    /// Droplet name (hostname).
    pub name: String,
    /// Provisioned memory in MiB.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory: Option<u32>,
    /// Virtual CPU count.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vcpus: Option<u32>,
    /// Disk size in GiB.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disk: Option<u32>,
    /// Droplet status as reported by the API (active, off, new, ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// Slug of the provisioned size.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size_slug: Option<String>,
    /// Creation timestamp.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    /// Attached network interfaces.
    #[serde(default)]
    pub networks: Networks,
}

impl Droplet {
    /// First public IPv4 address, if one is attached.
    #[must_use]
    pub fn public_ipv4(&self) -> Option<&str> {
        self.first_address(&self.networks.v4, NetworkKind::Public)
    }

    /// First private IPv4 address, if one is attached.
    #[must_use]
    pub fn private_ipv4(&self) -> Option<&str> {
        self.first_address(&self.networks.v4, NetworkKind::Private)
    }

    /// First public IPv6 address, if one is attached.
    #[must_use]
    pub fn public_ipv6(&self) -> Option<&str> {
        self.first_address(&self.networks.v6, NetworkKind::Public)
    }

    fn first_address<'a>(
        &self,
        interfaces: &'a [NetworkInterface],
        kind: NetworkKind,
    ) -> Option<&'a str> {
        interfaces
            .iter()
            .find(|interface| interface.kind == kind)
            .map(|interface| interface.ip_address.as_str())
    }
}

impl fmt::Display for Droplet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Droplet {} <ID: {}>", self.name, self.id)
    }
}

/// A droplet base image or snapshot image.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Image {
    /// Image id.
    pub id: i64,
    /// Image name.
    pub name: String,
    /// Slug, when the image has one (distribution base images do).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    /// Distribution name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distribution: Option<String>,
    /// Whether the image is public.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public: Option<bool>,
    /// Region slugs the image is available in, in response order.
    #[serde(default)]
    pub regions: Vec<String>,
    /// Minimum disk size in GiB required to use the image.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_disk_size: Option<u32>,
    /// Image type (snapshot, backup, base, ...).
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    /// Creation timestamp.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// A droplet size (plan).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Size {
    /// Size slug, e.g. `512mb` or `s-1vcpu-1gb`.
    pub slug: String,
    /// Memory in MiB.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory: Option<u32>,
    /// Virtual CPU count.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vcpus: Option<u32>,
    /// Disk size in GiB.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disk: Option<u32>,
    /// Transfer allowance in TiB.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transfer: Option<f64>,
    /// Monthly price in USD.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_monthly: Option<f64>,
    /// Hourly price in USD.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_hourly: Option<f64>,
    /// Region slugs the size is available in, in response order.
    #[serde(default)]
    pub regions: Vec<String>,
    /// Whether the size is currently available for new droplets.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub available: Option<bool>,
}

/// A datacenter region.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Region {
    /// Region display name.
    pub name: String,
    /// Region slug, e.g. `nyc1`.
    pub slug: String,
    /// Feature flags enabled for the region.
    #[serde(default)]
    pub features: Vec<String>,
    /// Size slugs offered in the region.
    #[serde(default)]
    pub sizes: Vec<String>,
    /// Whether new droplets can be created in the region.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub available: Option<bool>,
}

/// An SSH key registered with the account.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SshKey {
    /// Key id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    /// Key fingerprint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fingerprint: Option<String>,
    /// Key display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Public key material.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_key: Option<String>,
}

impl fmt::Display for SshKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "SSH Key {} {{{}}}",
            self.name.as_deref().unwrap_or("<unnamed>"),
            self.fingerprint.as_deref().unwrap_or("<no fingerprint>")
        )
    }
}

/// A kernel available to a droplet.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Kernel {
    /// Kernel id.
    pub id: i64,
    /// Kernel name.
    pub name: String,
    /// Kernel version string.
    pub version: String,
}

/// A snapshot taken of a droplet.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Snapshot {
    /// Snapshot id.
    pub id: i64,
    /// Snapshot name.
    pub name: String,
    /// Distribution the snapshot runs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distribution: Option<String>,
    /// Whether the snapshot is publicly visible.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public: Option<bool>,
    /// Region slugs the snapshot is stored in.
    #[serde(default)]
    pub regions: Vec<String>,
    /// Creation timestamp.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    /// Minimum disk size in GiB required to restore the snapshot.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_disk_size: Option<u32>,
    /// Snapshot type.
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    /// Owning droplet id, when reported.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub droplet: Option<DropletId>,
}

/// A DNS domain managed through the provider.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Domain {
    /// Domain name.
    pub name: String,
    /// Record TTL in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ttl: Option<u32>,
    /// Rendered zone file contents.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zone_file: Option<String>,
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Domain {}", self.name)
    }
}

/// Account information for the authenticated user.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Account {
    /// Account uuid.
    pub uuid: String,
    /// Account email address.
    pub email: String,
    /// Whether the email address has been verified.
    #[serde(default)]
    pub email_verified: bool,
    /// Maximum number of droplets the account may create.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub droplet_limit: Option<u32>,
    /// Number of droplets currently held. Not an API field; merged in from
    /// the droplet list fetched at client initialization.
    #[serde(default)]
    pub droplet_count: u64,
    /// Account status (active, warning, locked).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

/// Reference to an image by numeric id or by slug.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ImageRef {
    /// Numeric image id.
    Id(i64),
    /// Image slug, e.g. `ubuntu-24-04-x64`.
    Slug(String),
}

impl From<i64> for ImageRef {
    fn from(id: i64) -> Self {
        Self::Id(id)
    }
}

impl From<&str> for ImageRef {
    fn from(slug: &str) -> Self {
        Self::Slug(slug.to_string())
    }
}

impl From<String> for ImageRef {
    fn from(slug: String) -> Self {
        Self::Slug(slug)
    }
}

/// Reference to an SSH key by numeric id or by fingerprint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum KeyRef {
    /// Numeric key id.
    Id(i64),
    /// Key fingerprint.
    Fingerprint(String),
}

impl From<i64> for KeyRef {
    fn from(id: i64) -> Self {
        Self::Id(id)
    }
}

impl From<&str> for KeyRef {
    fn from(fingerprint: &str) -> Self {
        Self::Fingerprint(fingerprint.to_string())
    }
}

/// An action posted to a droplet's `actions` endpoint.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DropletActionRequest {
    /// Hard power-off.
    PowerOff,
    /// Power on.
    PowerOn,
    /// Power cycle (hard reset).
    PowerCycle,
    /// Reset the root password.
    PasswordReset,
    /// Resize to a new size slug.
    Resize {
        /// Target size slug.
        size: String,
        /// Whether to also grow the disk (irreversible when true).
        #[serde(skip_serializing_if = "Option::is_none")]
        disk: Option<bool>,
    },
}

impl DropletActionRequest {
    /// The wire-level action type string.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::PowerOff => "power_off",
            Self::PowerOn => "power_on",
            Self::PowerCycle => "power_cycle",
            Self::PasswordReset => "password_reset",
            Self::Resize { .. } => "resize",
        }
    }
}

/// Request payload for creating a single droplet.
#[derive(Debug, Clone, Serialize, PartialEq, Validate)]
pub struct CreateDroplet {
    /// Droplet name.
    #[validate(length(min = 1, message = "droplet name must be a non-empty string"))]
    pub name: String,
    /// Region slug to create in.
    #[validate(length(min = 1, message = "region must be a non-empty string"))]
    pub region: String,
    /// Size slug to provision.
    #[validate(length(min = 1, message = "size must be a non-empty string"))]
    pub size: String,
    /// Base image, by id or slug.
    pub image: ImageRef,
    /// SSH keys to install, by id or fingerprint.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub ssh_keys: Vec<KeyRef>,
    /// Enable automated backups.
    pub backups: bool,
    /// Enable IPv6 networking.
    pub ipv6: bool,
    /// Cloud-init user data.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_data: Option<String>,
    /// Enable private networking.
    pub private_networking: bool,
}

impl CreateDroplet {
    /// Create a request with the required fields; optional features default
    /// to off and the ssh key list starts empty.
    pub fn new(
        name: impl Into<String>,
        region: impl Into<String>,
        size: impl Into<String>,
        image: impl Into<ImageRef>,
    ) -> Self {
        Self {
            name: name.into(),
            region: region.into(),
            size: size.into(),
            image: image.into(),
            ssh_keys: Vec::new(),
            backups: false,
            ipv6: false,
            user_data: None,
            private_networking: false,
        }
    }

    /// Install the given SSH keys on first boot.
    #[must_use]
    pub fn with_ssh_keys(mut self, keys: Vec<KeyRef>) -> Self {
        self.ssh_keys = keys;
        self
    }

    /// Enable automated backups.
    #[must_use]
    pub const fn with_backups(mut self, backups: bool) -> Self {
        self.backups = backups;
        self
    }

    /// Enable IPv6 networking.
    #[must_use]
    pub const fn with_ipv6(mut self, ipv6: bool) -> Self {
        self.ipv6 = ipv6;
        self
    }

    /// Attach cloud-init user data.
    #[must_use]
    pub fn with_user_data(mut self, user_data: impl Into<String>) -> Self {
        self.user_data = Some(user_data.into());
        self
    }

    /// Enable private networking.
    #[must_use]
    pub const fn with_private_networking(mut self, private_networking: bool) -> Self {
        self.private_networking = private_networking;
        self
    }
}

/// Request payload for creating a batch of droplets with identical
/// parameters.
#[derive(Debug, Clone, Serialize, PartialEq, Validate)]
pub struct CreateDroplets {
    /// Names of the droplets to create.
    #[validate(length(min = 1, message = "at least one droplet name is required"))]
    pub names: Vec<String>,
    /// Region slug to create in.
    #[validate(length(min = 1, message = "region must be a non-empty string"))]
    pub region: String,
    /// Size slug to provision.
    #[validate(length(min = 1, message = "size must be a non-empty string"))]
    pub size: String,
    /// Base image, by id or slug.
    pub image: ImageRef,
    /// SSH keys to install, by id or fingerprint.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub ssh_keys: Vec<KeyRef>,
    /// Enable automated backups.
    pub backups: bool,
    /// Enable IPv6 networking.
    pub ipv6: bool,
    /// Cloud-init user data.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_data: Option<String>,
    /// Enable private networking.
    pub private_networking: bool,
}

impl CreateDroplets {
    /// Create a batch request with the required fields.
    pub fn new(
        names: Vec<String>,
        region: impl Into<String>,
        size: impl Into<String>,
        image: impl Into<ImageRef>,
    ) -> Self {
        Self {
            names,
            region: region.into(),
            size: size.into(),
            image: image.into(),
            ssh_keys: Vec::new(),
            backups: false,
            ipv6: false,
            user_data: None,
            private_networking: false,
        }
    }
}

/// Request payload for creating a DNS domain.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct CreateDomainRequest {
    /// Domain name.
    pub name: String,
    /// Address the apex record points at.
    pub ip_address: String,
}

/// Status message returned by mutating operations.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ActionStatus {
    /// Human-readable outcome description.
    pub message: String,
}

impl ActionStatus {
    /// Wrap a message.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

// Response envelopes. The API wraps every payload in a single-key object.

#[derive(Debug, Deserialize)]
pub(crate) struct DropletListEnvelope {
    #[serde(default)]
    pub droplets: Vec<Droplet>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct DropletEnvelope {
    pub droplet: Droplet,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AccountEnvelope {
    pub account: Account,
}

#[derive(Debug, Deserialize)]
pub(crate) struct DomainEnvelope {
    pub domain: Domain,
}

#[derive(Debug, Deserialize)]
pub(crate) struct DomainListEnvelope {
    #[serde(default)]
    pub domains: Vec<Domain>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ImageListEnvelope {
    #[serde(default)]
    pub images: Vec<Image>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SizeListEnvelope {
    #[serde(default)]
    pub sizes: Vec<Size>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RegionListEnvelope {
    #[serde(default)]
    pub regions: Vec<Region>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SshKeyListEnvelope {
    #[serde(default)]
    pub ssh_keys: Vec<SshKey>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SnapshotListEnvelope {
    #[serde(default)]
    pub snapshots: Vec<Snapshot>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct KernelListEnvelope {
    #[serde(default)]
    pub kernels: Vec<Kernel>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn droplet_id_parses_integer_literals() {
        assert_eq!("42".parse::<DropletId>().unwrap(), DropletId::new(42));
        assert_eq!(" 42 ".parse::<DropletId>().unwrap(), DropletId::new(42));
    }

    #[test]
    fn droplet_id_rejects_non_integer_input() {
        for input in ["web-1", "", "4.2", "1e3", "None"] {
            let err = input.parse::<DropletId>().unwrap_err();
            assert!(matches!(err, Error::InvalidArgument(_)), "input: {input}");
        }
    }

    #[test]
    fn droplet_decodes_nested_networks() {
        let json = json!({
            "id": 7,
            "name": "web-1",
            "networks": {
                "v4": [
                    {"ip_address": "1.2.3.4", "netmask": "255.255.240.0", "gateway": "1.2.3.1", "type": "public"},
                    {"ip_address": "10.0.0.4", "netmask": "255.255.0.0", "gateway": "10.0.0.1", "type": "private"}
                ],
                "v6": [
                    {"ip_address": "2604:a880::1", "netmask": 64, "gateway": "2604:a880::", "type": "public"}
                ]
            }
        });

        let droplet: Droplet = serde_json::from_value(json).unwrap();
        assert_eq!(droplet.id, DropletId::new(7));
        assert_eq!(droplet.name, "web-1");
        assert_eq!(droplet.public_ipv4(), Some("1.2.3.4"));
        assert_eq!(droplet.private_ipv4(), Some("10.0.0.4"));
        assert_eq!(droplet.public_ipv6(), Some("2604:a880::1"));
        assert_eq!(droplet.networks.v4.len(), 2);
    }

    #[test]
    fn droplet_ignores_unknown_fields() {
        let json = json!({
            "id": 7,
            "name": "web-1",
            "locked": false,
            "kernel": {"id": 2233},
            "backup_ids": [42]
        });

        let droplet: Droplet = serde_json::from_value(json).unwrap();
        assert_eq!(droplet.id, DropletId::new(7));
        assert!(droplet.networks.v4.is_empty());
    }

    #[test]
    fn droplet_without_public_address() {
        let json = json!({
            "id": 8,
            "name": "internal-1",
            "networks": {"v4": [{"ip_address": "10.0.0.8", "type": "private"}]}
        });

        let droplet: Droplet = serde_json::from_value(json).unwrap();
        assert_eq!(droplet.public_ipv4(), None);
        assert_eq!(droplet.private_ipv4(), Some("10.0.0.8"));
    }

    #[test]
    fn droplet_display() {
        let droplet: Droplet =
            serde_json::from_value(json!({"id": 7, "name": "web-1"})).unwrap();
        assert_eq!(droplet.to_string(), "Droplet web-1 <ID: 7>");
    }

    #[test]
    fn image_ref_serializes_untagged() {
        assert_eq!(serde_json::to_value(ImageRef::Id(6918990)).unwrap(), json!(6918990));
        assert_eq!(
            serde_json::to_value(ImageRef::from("ubuntu-24-04-x64")).unwrap(),
            json!("ubuntu-24-04-x64")
        );
    }

    #[test]
    fn action_request_wire_format() {
        assert_eq!(
            serde_json::to_value(&DropletActionRequest::PowerOff).unwrap(),
            json!({"type": "power_off"})
        );
        assert_eq!(
            serde_json::to_value(&DropletActionRequest::PasswordReset).unwrap(),
            json!({"type": "password_reset"})
        );
        assert_eq!(
            serde_json::to_value(&DropletActionRequest::Resize {
                size: "2gb".to_string(),
                disk: Some(true)
            })
            .unwrap(),
            json!({"type": "resize", "size": "2gb", "disk": true})
        );
        assert_eq!(
            serde_json::to_value(&DropletActionRequest::Resize {
                size: "2gb".to_string(),
                disk: None
            })
            .unwrap(),
            json!({"type": "resize", "size": "2gb"})
        );
    }

    #[test]
    fn create_droplet_validates_required_strings() {
        let valid = CreateDroplet::new("web-1", "nyc1", "512mb", "ubuntu-24-04-x64");
        assert!(valid.validate().is_ok());

        let empty_name = CreateDroplet::new("", "nyc1", "512mb", "ubuntu-24-04-x64");
        assert!(empty_name.validate().is_err());

        let empty_region = CreateDroplet::new("web-1", "", "512mb", "ubuntu-24-04-x64");
        assert!(empty_region.validate().is_err());

        let empty_size = CreateDroplet::new("web-1", "nyc1", "", "ubuntu-24-04-x64");
        assert!(empty_size.validate().is_err());
    }

    #[test]
    fn create_droplet_serialization_defaults() {
        let request = CreateDroplet::new("web-1", "nyc1", "512mb", ImageRef::Id(6918990));
        let value = serde_json::to_value(&request).unwrap();

        assert_eq!(value["name"], "web-1");
        assert_eq!(value["image"], 6918990);
        assert_eq!(value["backups"], false);
        assert_eq!(value["ipv6"], false);
        assert_eq!(value["private_networking"], false);
        // Empty key list and absent user data stay off the wire.
        assert!(value.get("ssh_keys").is_none());
        assert!(value.get("user_data").is_none());
    }

    #[test]
    fn create_droplet_with_options() {
        let request = CreateDroplet::new("web-1", "nyc1", "512mb", "ubuntu-24-04-x64")
            .with_ssh_keys(vec![KeyRef::Id(12), KeyRef::from("3b:16:bf:e4")])
            .with_backups(true)
            .with_ipv6(true)
            .with_user_data("#cloud-config")
            .with_private_networking(true);

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["ssh_keys"], json!([12, "3b:16:bf:e4"]));
        assert_eq!(value["backups"], true);
        assert_eq!(value["user_data"], "#cloud-config");
    }

    #[test]
    fn create_droplets_requires_names() {
        let empty = CreateDroplets::new(Vec::new(), "nyc1", "512mb", "ubuntu-24-04-x64");
        assert!(empty.validate().is_err());

        let batch = CreateDroplets::new(
            vec!["web-1".to_string(), "web-2".to_string()],
            "nyc1",
            "512mb",
            "ubuntu-24-04-x64",
        );
        assert!(batch.validate().is_ok());
        assert_eq!(
            serde_json::to_value(&batch).unwrap()["names"],
            json!(["web-1", "web-2"])
        );
    }

    #[test]
    fn snapshot_decodes_timestamp() {
        let json = json!({
            "id": 7724,
            "name": "web-1 2026-08-01",
            "distribution": "Ubuntu",
            "public": false,
            "regions": ["nyc1", "nyc2"],
            "created_at": "2026-08-01T02:04:00Z",
            "min_disk_size": 20,
            "type": "snapshot"
        });

        let snapshot: Snapshot = serde_json::from_value(json).unwrap();
        assert_eq!(snapshot.id, 7724);
        assert_eq!(snapshot.regions, vec!["nyc1", "nyc2"]);
        assert!(snapshot.created_at.is_some());
        assert_eq!(snapshot.kind.as_deref(), Some("snapshot"));
    }

    #[test]
    fn account_droplet_count_defaults_to_zero() {
        let json = json!({
            "uuid": "b6fr89dbf6d9156cace5f3c78dc9851e",
            "email": "dev@example.com",
            "email_verified": true,
            "droplet_limit": 25,
            "status": "active"
        });

        let account: Account = serde_json::from_value(json).unwrap();
        assert_eq!(account.droplet_count, 0);
        assert_eq!(account.droplet_limit, Some(25));
        assert!(account.email_verified);
    }

    #[test]
    fn ssh_keys_compare_by_full_equality() {
        let a: SshKey = serde_json::from_value(json!({
            "id": 512190,
            "fingerprint": "3b:16:bf:e4:8b:00:8b:b8:59:8c:a9:d3:f0:19:45:fa",
            "name": "laptop"
        }))
        .unwrap();
        let b = a.clone();
        let c: SshKey = serde_json::from_value(json!({"id": 512191, "name": "desktop"})).unwrap();

        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn network_kind_round_trips() {
        assert_eq!(
            serde_json::to_value(NetworkKind::Public).unwrap(),
            json!("public")
        );
        let kind: NetworkKind = serde_json::from_value(json!("private")).unwrap();
        assert_eq!(kind, NetworkKind::Private);
    }
}
