use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use super::DrugInfoSource;
use crate::config::DrugRegistryConfig;
use crate::error::{MedtrackError, Result};
use crate::models::{DrugInfo, DrugInfoOrigin};

const SUCCESS_CODE: &str = "00";

/// Client for the public e-Drug easy-information registry (XML).
#[derive(Clone, Debug)]
pub struct RegistryClient {
    client: Client,
    base_url: String,
    api_key: String,
    page_size: u32,
}

#[derive(Debug, Deserialize)]
struct RegistryResponse {
    header: RegistryHeader,
    #[serde(default)]
    body: Option<RegistryBody>,
}

#[derive(Debug, Deserialize)]
struct RegistryHeader {
    #[serde(rename = "resultCode")]
    result_code: String,
    #[serde(rename = "resultMsg", default)]
    result_msg: String,
}

#[derive(Debug, Deserialize)]
struct RegistryBody {
    #[serde(default)]
    items: Option<RegistryItems>,
}

#[derive(Debug, Default, Deserialize)]
struct RegistryItems {
    #[serde(default)]
    item: Vec<RegistryItem>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RegistryItem {
    item_name: Option<String>,
    entp_name: Option<String>,
    efcy_qesitm: Option<String>,
    use_method_qesitm: Option<String>,
    atpn_qesitm: Option<String>,
    se_qesitm: Option<String>,
    deposit_method_qesitm: Option<String>,
    item_image: Option<String>,
}

impl From<RegistryItem> for DrugInfo {
    fn from(item: RegistryItem) -> Self {
        DrugInfo {
            name: non_empty(item.item_name).unwrap_or_default(),
            manufacturer: non_empty(item.entp_name),
            category: None,
            efficacy: non_empty(item.efcy_qesitm),
            dosage: non_empty(item.use_method_qesitm),
            warnings: non_empty(item.atpn_qesitm),
            side_effects: non_empty(item.se_qesitm),
            storage: non_empty(item.deposit_method_qesitm),
            image_url: non_empty(item.item_image),
            origin: Some(DrugInfoOrigin::Registry),
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl RegistryClient {
    pub fn new(config: &DrugRegistryConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| {
                MedtrackError::DrugRegistry(format!("Failed to create HTTP client: {e}"))
            })?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            api_key: config.api_key.clone(),
            page_size: config.page_size,
        })
    }

    pub async fn search(&self, drug_name: &str) -> Result<Vec<DrugInfo>> {
        let page_size = self.page_size.to_string();
        let resp = self
            .client
            .get(&self.base_url)
            .query(&[
                ("serviceKey", self.api_key.as_str()),
                ("itemName", drug_name),
                ("pageNo", "1"),
                ("numOfRows", page_size.as_str()),
                ("type", "xml"),
            ])
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(MedtrackError::DrugRegistry(format!(
                "Registry request failed: {status}"
            )));
        }

        parse_registry_xml(&resp.text().await?)
    }
}

fn parse_registry_xml(xml: &str) -> Result<Vec<DrugInfo>> {
    let response: RegistryResponse = quick_xml::de::from_str(xml)?;

    if response.header.result_code != SUCCESS_CODE {
        return Err(MedtrackError::DrugRegistry(format!(
            "Registry returned {}: {}",
            response.header.result_code, response.header.result_msg
        )));
    }

    Ok(response
        .body
        .and_then(|body| body.items)
        .unwrap_or_default()
        .item
        .into_iter()
        .map(DrugInfo::from)
        .filter(|info| !info.name.is_empty())
        .collect())
}

#[async_trait]
impl DrugInfoSource for RegistryClient {
    fn name(&self) -> &'static str {
        "registry"
    }

    async fn lookup(&self, drug_name: &str) -> Result<Vec<DrugInfo>> {
        self.search(drug_name).await
    }
}
