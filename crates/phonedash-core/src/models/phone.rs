//! Phone inventory and sync job models.

use serde::{Deserialize, Serialize};

/// A phone as reported by `GET /phonedata/info`.
/// Timestamps arrive preformatted (`%m/%d/%y %H:%M:%S`) or empty.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PhoneInfo {
    #[serde(rename = "dname")]
    pub device_name: String,
    #[serde(rename = "fw")]
    pub firmware: Option<String>,
    pub ipv4: Option<String>,
    #[serde(rename = "fdate")]
    pub first_seen: Option<String>,
    #[serde(rename = "ldate")]
    pub last_seen: Option<String>,
    #[serde(rename = "regstamp")]
    pub registered_at: Option<String>,
    pub cluster: Option<String>,
    #[serde(rename = "prot")]
    pub protocol: Option<String>,
    pub model: Option<String>,

    // AXL fields
    #[serde(rename = "dpool")]
    pub device_pool: Option<String>,
    #[serde(rename = "dcss")]
    pub device_css: Option<String>,
    #[serde(rename = "descr")]
    pub description: Option<String>,
    pub em_profile: Option<String>,
    pub em_time: Option<String>,
}

impl PhoneInfo {
    /// One-line summary for listings
    pub fn summary(&self) -> String {
        let field = |v: &Option<String>| match v.as_deref() {
            Some(s) if !s.is_empty() => s.to_string(),
            _ => "-".to_string(),
        };
        format!(
            "{:<16} {:<12} {:<15} {}",
            self.device_name,
            field(&self.model),
            field(&self.ipv4),
            field(&self.description)
        )
    }

    /// True if the phone has ever been seen registered
    pub fn has_registered(&self) -> bool {
        self.first_seen.as_deref().map(|s| !s.is_empty()).unwrap_or(false)
    }
}

/// A phone as reported by `GET /phonedata/scraper`.
/// Phones that were never scraped carry only name, model, and address.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PhoneScraper {
    #[serde(rename = "devicename", default)]
    pub device_name: String,
    #[serde(rename = "sn")]
    pub serial_number: Option<String>,
    pub firmware: Option<String>,
    #[serde(rename = "dn")]
    pub directory_number: Option<String>,
    pub model: Option<String>,
    pub kem1: Option<String>,
    pub kem2: Option<String>,

    // Network
    pub domain_name: Option<String>,
    pub dhcp_server: Option<String>,
    pub dhcp: Option<String>,
    pub ip_address: Option<String>,
    pub subnetmask: Option<String>,
    pub gateway: Option<String>,
    pub dns1: Option<String>,
    pub dns2: Option<String>,
    pub alt_tftp: Option<String>,
    pub tftp1: Option<String>,
    pub tftp2: Option<String>,
    pub op_vlan: Option<String>,
    pub admin_vlan: Option<String>,
    pub cucm1: Option<String>,
    pub cucm2: Option<String>,
    pub cucm3: Option<String>,
    pub cucm4: Option<String>,
    pub cucm5: Option<String>,

    // Phone service URLs
    pub info_url: Option<String>,
    pub dir_url: Option<String>,
    pub msg_url: Option<String>,
    pub svc_url: Option<String>,
    pub idle_url: Option<String>,
    pub info_url_time: Option<String>,
    pub proxy_url: Option<String>,
    pub auth_url: Option<String>,
    pub tvs: Option<String>,

    // Switch neighbors
    #[serde(rename = "CDP_Neighbor_ID")]
    pub cdp_neighbor_id: Option<String>,
    #[serde(rename = "CDP_Neighbor_IP")]
    pub cdp_neighbor_ip: Option<String>,
    #[serde(rename = "CDP_Neighbor_Port")]
    pub cdp_neighbor_port: Option<String>,
    #[serde(rename = "LLDP_Neighbor_ID")]
    pub lldp_neighbor_id: Option<String>,
    #[serde(rename = "LLDP_Neighbor_IP")]
    pub lldp_neighbor_ip: Option<String>,
    #[serde(rename = "LLDP_Neighbor_Port")]
    pub lldp_neighbor_port: Option<String>,

    #[serde(rename = "ITL")]
    pub itl: Option<String>,
    pub date_modified: Option<String>,
}

impl PhoneScraper {
    /// True if the phone's web pages have been scraped at least once
    pub fn has_scrape(&self) -> bool {
        self.serial_number.as_deref().map(|s| !s.is_empty()).unwrap_or(false)
    }

    /// Switch the phone is patched into, preferring CDP over LLDP
    pub fn switch_port(&self) -> Option<String> {
        let pick = |id: &Option<String>, port: &Option<String>| match (id.as_deref(), port.as_deref()) {
            (Some(id), Some(port)) if !id.is_empty() => Some(format!("{} {}", id, port)),
            (Some(id), _) if !id.is_empty() => Some(id.to_string()),
            _ => None,
        };
        pick(&self.cdp_neighbor_id, &self.cdp_neighbor_port)
            .or_else(|| pick(&self.lldp_neighbor_id, &self.lldp_neighbor_port))
    }

    /// One-line summary for listings
    pub fn summary(&self) -> String {
        let field = |v: &Option<String>| match v.as_deref() {
            Some(s) if !s.is_empty() => s.to_string(),
            _ => "-".to_string(),
        };
        format!(
            "{:<16} {:<12} {:<8} {:<15} {}",
            self.device_name,
            field(&self.serial_number),
            field(&self.directory_number),
            field(&self.ip_address),
            self.switch_port().unwrap_or_else(|| "-".to_string())
        )
    }
}

/// Body of `GET /phonedata/device_pool_list`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DevicePoolList {
    #[serde(default)]
    pub device_pool_list: Vec<String>,
}

/// Body of `GET /phonedata/jobstatus`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JobStatus {
    #[serde(rename = "Job_Status", default)]
    pub jobs: Vec<JobEntry>,
    #[serde(rename = "RQ_Status")]
    pub queue: QueueStatus,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JobEntry {
    #[serde(rename = "jobname")]
    pub job_name: String,
    #[serde(rename = "laststarttime")]
    pub last_start_time: Option<String>,
    pub result: Option<String>,
}

/// Scrape queue counters. The server reports -1 for both when the queue
/// backend is unreachable.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueStatus {
    pub current_size: i64,
    pub started_count: i64,
}

impl QueueStatus {
    pub fn is_available(&self) -> bool {
        self.current_size >= 0 && self.started_count >= 0
    }
}

/// Body of the manual trigger endpoints.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TriggerResult {
    #[serde(rename = "Result")]
    pub result: String,
}
